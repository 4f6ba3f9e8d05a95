pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod logger;
pub mod overlay;
pub mod pointer;
pub mod render;
pub mod session;
pub mod snake;
pub mod steering;

pub use app::{run, GameLoop, LoopSignal, RunSummary};
pub use config::{Cli, GameConfig, InputMode, Validate};
pub use error::{GameError, Result};
pub use pointer::{FeedPointer, PointerSample, PointerSource, PointerState, ScriptedPointer};
pub use session::{HighScoreStore, Session};
pub use snake::{BoardSize, Coordinates, GameDifficulty, SnakeDirection, SnakeGame, TickOutcome};
