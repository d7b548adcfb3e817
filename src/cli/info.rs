use anyhow::Result;

use feedlab_roster::{JsonFileKv, RosterStore};

use crate::config::FeedConfig;

pub fn cmd_info(config: &FeedConfig) -> Result<()> {
    println!("Feedlab System Information");
    println!("==========================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", env!("BUILD_DATE", "unknown"));
    println!("Git Commit: {}", env!("GIT_HASH", "unknown"));
    println!();

    println!("Configuration:");
    println!("- Storage Directory: {}", config.storage_dir().display());
    println!("- Posts in catalog: {}", config.posts.len());
    match &config.collector {
        Some(collector) => println!("- Collector: {}", collector.endpoint),
        None => println!("- Collector: [none, local-only]"),
    }

    let rows = RosterStore::new(JsonFileKv::new(config.storage_dir())).load();
    println!();
    println!("Roster: {} persisted row(s)", rows.len());
    Ok(())
}
