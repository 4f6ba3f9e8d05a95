use anyhow::Context;
use clap::Parser;
use handsnake::{logger, Cli, GameConfig, RunSummary};

fn display_final_screen(summary: &RunSummary) {
    println!("Game Over!");
    println!("Final Score: {}", summary.final_score);
    println!("High Score: {}", summary.high_score);
    println!("Games Played: {}", summary.games_played);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = GameConfig::resolve(&cli).context("invalid configuration")?;
    logger::init_logger(cli.verbose, config.output.log_file.as_deref())
        .context("failed to set up logging")?;
    tracing::debug!(?config, "configuration resolved");

    let summary = handsnake::run(&config).context("game aborted")?;
    display_final_screen(&summary);
    Ok(())
}
