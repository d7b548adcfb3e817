use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedlab_cli::cli::{cmd_demo, cmd_info, cmd_roster, DemoArgs, RosterArgs};
use feedlab_cli::config::FeedConfig;

#[derive(Parser, Debug)]
#[command(
    name = "feedlab",
    version,
    about = "Simulated social-feed research instrument"
)]
struct Cli {
    /// Configuration file; discovery plus FEEDLAB_* env vars otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect or export the persisted participant roster
    Roster(RosterArgs),
    /// Run a scripted session through the full pipeline
    Demo(DemoArgs),
    /// Show version, build and configuration details
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = FeedConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Roster(args) => cmd_roster(args, &config),
        Command::Demo(args) => cmd_demo(args, &config).await,
        Command::Info => cmd_info(&config),
    }
}
