use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GameError, Result};
use crate::snake::{BoardSize, GameDifficulty, DEFAULT_FOOD_SCORE, DEFAULT_TICK_MS};
use crate::steering::{DEFAULT_COOLDOWN_MS, DEFAULT_DEAD_ZONE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Keyboard,
    Pointer,
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "handsnake")]
#[command(about = "Snake steered by a fingertip pointer feed or the arrow keys")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub input: Option<InputMode>,

    /// Pointer feed to read, `-` for stdin; implies `--input pointer`
    #[arg(long)]
    pub pointer_feed: Option<PathBuf>,

    /// Delay between feed lines, for replaying recorded feeds
    #[arg(long)]
    pub pointer_interval_ms: Option<u64>,

    #[arg(long, value_enum, conflicts_with = "tick_ms")]
    pub difficulty: Option<GameDifficulty>,

    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Pixels the pointer must be away from the head before it steers
    #[arg(long)]
    pub dead_zone: Option<i32>,

    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Write a PNG of the final frame here on game over
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    #[arg(long)]
    pub high_score_file: Option<PathBuf>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Do not mirror pointer x coordinates
    #[arg(long)]
    pub no_mirror: bool,

    #[arg(long)]
    pub exit_on_game_over: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            width: 640,
            height: 480,
            cell_size: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub input: InputMode,
    pub pointer_feed: Option<PathBuf>,
    pub pointer_interval_ms: Option<u64>,
    pub dead_zone: i32,
    pub cooldown_ms: u64,
    pub mirror: bool,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        SteeringConfig {
            input: InputMode::Keyboard,
            pointer_feed: None,
            pointer_interval_ms: None,
            dead_zone: DEFAULT_DEAD_ZONE,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    pub difficulty: Option<GameDifficulty>,
    pub tick_ms: u64,
    pub food_score: u32,
    pub exit_on_game_over: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig {
            difficulty: None,
            tick_ms: DEFAULT_TICK_MS,
            food_score: DEFAULT_FOOD_SCORE,
            exit_on_game_over: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub snapshot_dir: Option<PathBuf>,
    pub high_score_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub steering: SteeringConfig,
    pub game: PlayConfig,
    pub output: OutputConfig,
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            GameError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Config file (if any) with command line flags layered on top.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(feed) = &cli.pointer_feed {
            self.steering.pointer_feed = Some(feed.clone());
            self.steering.input = InputMode::Pointer;
        }
        if let Some(input) = cli.input {
            self.steering.input = input;
        }
        if let Some(interval) = cli.pointer_interval_ms {
            self.steering.pointer_interval_ms = Some(interval);
        }
        if let Some(difficulty) = cli.difficulty {
            self.game.difficulty = Some(difficulty);
        }
        if let Some(tick_ms) = cli.tick_ms {
            self.game.tick_ms = tick_ms;
            self.game.difficulty = None;
        }
        if let Some(dead_zone) = cli.dead_zone {
            self.steering.dead_zone = dead_zone;
        }
        if let Some(cooldown) = cli.cooldown_ms {
            self.steering.cooldown_ms = cooldown;
        }
        if cli.no_mirror {
            self.steering.mirror = false;
        }
        if cli.exit_on_game_over {
            self.game.exit_on_game_over = true;
        }
        if let Some(dir) = &cli.snapshot_dir {
            self.output.snapshot_dir = Some(dir.clone());
        }
        if let Some(file) = &cli.high_score_file {
            self.output.high_score_file = Some(file.clone());
        }
        if let Some(file) = &cli.log_file {
            self.output.log_file = Some(file.clone());
        }
    }

    pub fn board_size(&self) -> Result<BoardSize> {
        BoardSize::from_pixels(self.board.width, self.board.height, self.board.cell_size)
    }

    pub fn tick_interval(&self) -> Duration {
        let millis = self
            .game
            .difficulty
            .map(|d| d.get_speed())
            .unwrap_or(self.game.tick_ms);
        Duration::from_millis(millis)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.steering.cooldown_ms)
    }

    pub fn pointer_interval(&self) -> Option<Duration> {
        self.steering.pointer_interval_ms.map(Duration::from_millis)
    }

    /// True when the pointer feed is read from stdin, leaving no keyboard.
    pub fn feed_uses_stdin(&self) -> bool {
        self.steering.input == InputMode::Pointer
            && self.steering.pointer_feed.as_deref() == Some(Path::new("-"))
    }
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<()> {
        self.board_size()?;
        if self.game.difficulty.is_none() && self.game.tick_ms == 0 {
            return Err(GameError::config("tick_ms must be greater than zero"));
        }
        if self.steering.dead_zone < 0 {
            return Err(GameError::config("dead_zone cannot be negative"));
        }
        if self.steering.input == InputMode::Pointer && self.steering.pointer_feed.is_none() {
            return Err(GameError::config(
                "pointer input needs a pointer feed (--pointer-feed or steering.pointer_feed)",
            ));
        }
        Ok(())
    }
}
