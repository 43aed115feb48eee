//! Command-line entry point for the whodunit game simulation.
//!
//! Runs one session, prints the summary and transcript to stdout, and
//! optionally saves a Markdown rendering. Logs go to stderr so stdout
//! stays pipeable.

mod markdown;

use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use whodunit_core::{Game, GameConfig, Outcome, DEFAULT_MODEL};

/// Run the whodunit murder-mystery game.
#[derive(Parser, Debug)]
#[command(name = "whodunit")]
#[command(about = "Run the whodunit murder-mystery game", long_about = None)]
struct Args {
    /// Optional random seed for reproducible transcripts
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of rounds to play before the murderer wins by default
    #[arg(long, default_value = "4")]
    rounds: u32,

    /// Optional path to save the transcript as Markdown
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// OpenAI model to use for live dialogue
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Force the game to use built-in scripted dialogue instead of calling OpenAI
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GameConfig::new()
        .with_model(args.model)
        .with_offline(args.offline);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut game = Game::new(config)?;
    let outcome = game.play(args.rounds).await?;

    print_summary(&outcome);

    if let Some(path) = &args.markdown {
        save_markdown(path, &outcome)?;
    }

    Ok(())
}

fn print_summary(outcome: &Outcome) {
    println!("Whodunit: murder-mystery deduction");
    println!("Murderer: {}", outcome.murderer);
    println!("Winner: {}", outcome.winner);
    println!("Accusations: {}", outcome.accusations);
    println!();
    for line in &outcome.transcript {
        println!("{line}");
    }
}

fn save_markdown(path: &Path, outcome: &Outcome) -> std::io::Result<()> {
    // A bare filename has an empty parent, which create_dir_all rejects.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, markdown::render(outcome))?;

    println!();
    println!("Transcript saved to {}", path.display());
    Ok(())
}
