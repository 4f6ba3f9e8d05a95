// a run of consecutive games: the current game plus the best score so far
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::snake::SnakeGame;

#[derive(Debug, Clone)]
pub struct Session<R> {
    game: SnakeGame<R>,
    high_score: u32,
    games_played: u32,
}

impl<R: Rng> Session<R> {
    pub fn new(game: SnakeGame<R>, high_score: u32) -> Self {
        Session {
            game,
            high_score,
            games_played: 1,
        }
    }

    /// Folds the running score into the high score and starts a fresh game.
    pub fn restart(&mut self) {
        self.record_final();
        self.game.reset();
        self.games_played += 1;
        info!(game = self.games_played, high_score = self.high_score, "game restarted");
    }

    /// Returns true when the current score is a new high score.
    pub fn record_final(&mut self) -> bool {
        let score = self.game.score();
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    pub fn game(&self) -> &SnakeGame<R> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut SnakeGame<R> {
        &mut self.game
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u32,
}

/// High score persisted as a small TOML file.
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<u32> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no high score file yet");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        let record: HighScoreRecord = toml::from_str(&text)?;
        Ok(record.high_score)
    }

    pub fn save(&self, high_score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&HighScoreRecord { high_score })?)?;
        debug!(path = %self.path.display(), high_score, "high score saved");
        Ok(())
    }
}
