use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{GameError, Result};

/// Logs go to `log_file` when given; otherwise only warnings reach stderr so
/// the board drawn on stdout stays readable.
pub fn init_logger(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_filter = match (log_file.is_some(), verbose) {
        (_, true) => "handsnake=debug",
        (true, false) => "handsnake=info",
        (false, false) => "handsnake=warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    let initialised = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_ids(false)
                        .compact(),
                )
                .try_init()
        }
        None => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .try_init(),
    };
    initialised.map_err(|e| GameError::config(format!("logger already initialised: {e}")))
}
