use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid board: {message}")]
    InvalidBoard { message: String },

    #[error("Malformed pointer line {line:?}: {message}")]
    PointerFeed { line: String, message: String },

    #[error("Terminal error: {message}")]
    Terminal { message: String },
}

impl GameError {
    pub fn config(message: impl Into<String>) -> Self {
        GameError::Config {
            message: message.into(),
        }
    }

    pub fn invalid_board(message: impl Into<String>) -> Self {
        GameError::InvalidBoard {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
