// main game loop: drain inputs every few milliseconds, advance the snake once per tick,
// redraw only when something changed
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::{GameConfig, InputMode};
use crate::error::Result;
use crate::input::{Control, KeyboardInput, RawModeGuard};
use crate::overlay::{write_snapshot, FramePainter};
use crate::pointer::{FeedPointer, PointerSource, PointerState};
use crate::render::render_screen;
use crate::session::{HighScoreStore, Session};
use crate::snake::{SnakeDirection, SnakeGame, TickOutcome};
use crate::steering::{GestureSteering, PixelPoint};

const POLL_INTERVAL: Duration = Duration::from_millis(3);
const MAX_PENDING_TURNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub final_score: u32,
    pub high_score: u32,
    pub games_played: u32,
}

pub struct GameLoop<R, P> {
    session: Session<R>,
    steering: GestureSteering,
    pointer: Option<P>,
    painter: FramePainter,
    mirror: bool,
    snapshot_dir: Option<PathBuf>,
    exit_on_game_over: bool,
    pending_turns: VecDeque<SnakeDirection>,
    last_pointer: Option<PixelPoint>,
}

impl<R: Rng, P: PointerSource> GameLoop<R, P> {
    pub fn new(session: Session<R>, config: &GameConfig, pointer: Option<P>) -> Self {
        let painter = FramePainter::new(session.game().board_size());
        GameLoop {
            session,
            steering: GestureSteering::new(config.steering.dead_zone, config.cooldown()),
            pointer,
            painter,
            mirror: config.steering.mirror,
            snapshot_dir: config.output.snapshot_dir.clone(),
            exit_on_game_over: config.game.exit_on_game_over,
            pending_turns: VecDeque::with_capacity(MAX_PENDING_TURNS),
            last_pointer: None,
        }
    }

    pub fn handle_control(&mut self, control: Control) -> LoopSignal {
        match control {
            Control::Turn(direction) => {
                if self.pending_turns.len() < MAX_PENDING_TURNS {
                    self.pending_turns.push_back(direction);
                }
                LoopSignal::Continue
            }
            Control::Restart => {
                self.restart();
                LoopSignal::Continue
            }
            Control::Quit => LoopSignal::Quit,
        }
    }

    pub fn restart(&mut self) {
        self.session.restart();
        self.steering.reset();
        self.pending_turns.clear();
    }

    /// Reads the pointer source and steers; returns the new direction if it turned.
    pub fn poll_pointer(&mut self, now: Instant) -> Result<Option<SnakeDirection>> {
        let Some(pointer) = self.pointer.as_mut() else {
            return Ok(None);
        };
        match pointer.poll()? {
            PointerState::Tracked(sample) => {
                let board = self.session.game().board_size();
                self.last_pointer =
                    Some(sample.to_pixels(board.pixel_width(), board.pixel_height(), self.mirror));
            }
            PointerState::Lost => self.last_pointer = None,
            PointerState::Unchanged => {}
        }
        // a hand held still keeps pulling the head
        Ok(match self.last_pointer {
            Some(position) => self.steering.steer(position, self.session.game_mut(), now),
            None => None,
        })
    }

    /// Applies at most one queued keyboard turn, then advances the snake.
    pub fn step(&mut self) -> TickOutcome {
        while let Some(turn) = self.pending_turns.pop_front() {
            if self.session.game_mut().set_direction(turn) {
                break;
            }
        }
        let outcome = self.session.game_mut().tick();
        match outcome {
            TickOutcome::Ate => debug!(score = self.session.game().score(), "food eaten"),
            TickOutcome::Died | TickOutcome::Won => self.on_game_over(outcome),
            TickOutcome::Moved | TickOutcome::Idle => {}
        }
        outcome
    }

    fn on_game_over(&mut self, outcome: TickOutcome) {
        let game = self.session.game();
        info!(
            score = game.score(),
            length = game.len(),
            won = outcome == TickOutcome::Won,
            "game over"
        );
        if let Some(dir) = &self.snapshot_dir {
            let frame = self.painter.render(game, self.last_pointer);
            let game_number = self.session.games_played();
            if let Err(e) = write_snapshot(&frame, dir, game_number, game.score()) {
                warn!(error = %e, "could not write snapshot");
            }
        }
    }

    /// A finished game ends the loop unless an open keyboard can still restart it.
    pub fn should_exit(&self, keyboard_open: bool) -> bool {
        self.game().is_over() && (self.exit_on_game_over || !keyboard_open)
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn game(&self) -> &SnakeGame<R> {
        self.session.game()
    }

    pub fn last_pointer(&self) -> Option<PixelPoint> {
        self.last_pointer
    }

    /// Folds the last score into the high score.
    pub fn finish(&mut self) -> RunSummary {
        self.session.record_final();
        RunSummary {
            final_score: self.session.game().score(),
            high_score: self.session.high_score(),
            games_played: self.session.games_played(),
        }
    }
}

pub fn run(config: &GameConfig) -> Result<RunSummary> {
    let board = config.board_size()?;
    let store = config.output.high_score_file.clone().map(HighScoreStore::new);
    let high_score = match &store {
        Some(store) => store.load()?,
        None => 0,
    };
    let game = SnakeGame::new(board, config.game.food_score, StdRng::from_os_rng());

    let pointer = match (&config.steering.input, &config.steering.pointer_feed) {
        (InputMode::Pointer, Some(path)) => {
            Some(FeedPointer::open(path, config.pointer_interval())?)
        }
        _ => None,
    };

    // the keyboard shares stdin, so it is unavailable when the feed comes from there
    let (_raw_mode, mut keyboard) = if config.feed_uses_stdin() {
        (None, None)
    } else {
        match RawModeGuard::enable() {
            Ok(guard) => (Some(guard), Some(KeyboardInput::spawn())),
            Err(e) if config.steering.input == InputMode::Pointer => {
                warn!(error = %e, "keyboard unavailable, steering by pointer only");
                (None, None)
            }
            Err(e) => return Err(e),
        }
    };

    info!(
        columns = board.columns(),
        rows = board.rows(),
        tick_ms = config.tick_interval().as_millis() as u64,
        input = ?config.steering.input,
        "starting game"
    );

    let mut game_loop = GameLoop::new(Session::new(game, high_score), config, pointer);
    let tick_interval = config.tick_interval();
    let mut stdout = io::stdout();
    let mut frame_start_time = Instant::now();
    let mut dirty = true;

    'frames: loop {
        if let Some(keyboard) = keyboard.as_mut() {
            while let Some(control) = keyboard.next_control() {
                if game_loop.handle_control(control) == LoopSignal::Quit {
                    break 'frames;
                }
                dirty = true;
            }
        }

        game_loop.poll_pointer(Instant::now())?;

        if frame_start_time.elapsed() >= tick_interval {
            frame_start_time = Instant::now();
            if game_loop.step() != TickOutcome::Idle {
                dirty = true;
            }
        }

        if dirty {
            write!(stdout, "{}", render_screen(game_loop.session()))?;
            stdout.flush()?;
            dirty = false;
        }

        if game_loop.should_exit(keyboard.as_ref().is_some_and(|k| !k.is_closed())) {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    let summary = game_loop.finish();
    if let Some(store) = &store {
        store.save(summary.high_score)?;
    }
    info!(
        final_score = summary.final_score,
        high_score = summary.high_score,
        games = summary.games_played,
        "session finished"
    );
    Ok(summary)
}
