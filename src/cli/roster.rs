use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand, ValueEnum};

use feedlab_roster::{export, JsonFileKv, RosterStore};

use crate::config::FeedConfig;

#[derive(Args, Clone, Debug)]
pub struct RosterArgs {
    #[command(subcommand)]
    pub command: RosterCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum RosterCommand {
    /// Print a summary of the persisted roster
    List,

    /// Export the roster for offline analysis
    Export {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(short, long, default_value = "csv")]
        format: DataFormat,
    },

    /// Delete every persisted row
    Clear {
        /// Skip the confirmation requirement
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Debug, ValueEnum)]
pub enum DataFormat {
    Csv,
    Json,
}

pub fn cmd_roster(args: RosterArgs, config: &FeedConfig) -> Result<()> {
    let store = RosterStore::new(JsonFileKv::new(config.storage_dir()));
    match args.command {
        RosterCommand::List => {
            let rows = store.load();
            if rows.is_empty() {
                println!("Roster is empty");
                return Ok(());
            }
            println!("{} persisted row(s):", rows.len());
            for row in rows {
                let participant = if row.participant_id.is_empty() {
                    "<no participant id>"
                } else {
                    row.participant_id.as_str()
                };
                println!(
                    "  - session={} participant={} submitted_at={}",
                    row.session_id,
                    participant,
                    if row.submitted_at.is_empty() {
                        "<never>"
                    } else {
                        row.submitted_at.as_str()
                    }
                );
            }
            Ok(())
        }
        RosterCommand::Export { output, format } => {
            let rows = store.load();
            let width = export::column_width(&rows, config.posts.len());
            let text = match format {
                DataFormat::Csv => export::roster_to_csv(&rows, width)?,
                DataFormat::Json => export::roster_to_json(&rows)?,
            };
            match output {
                Some(path) => {
                    fs::write(&path, text)?;
                    println!("Exported {} row(s) to {}", rows.len(), path.display());
                }
                None => print!("{text}"),
            }
            Ok(())
        }
        RosterCommand::Clear { yes } => {
            if !yes {
                bail!("refusing to clear the roster without --yes");
            }
            store.clear()?;
            println!("Roster cleared");
            Ok(())
        }
    }
}
