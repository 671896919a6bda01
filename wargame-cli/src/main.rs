//! AI Wargame - command-line match runner
//!
//! Plays one match (computer, keyboard or broker driven) and writes its
//! trace file. Logging goes to stderr; set RUST_LOG to adjust.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wargame_cli::play::{self, PlayArgs};

#[derive(Parser)]
#[command(name = "ai_wargame")]
#[command(about = "Two-faction grid wargame with minimax / alpha-beta computer players")]
struct Cli {
    #[command(flatten)]
    play: PlayArgs,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    play::run(cli.play)
}
