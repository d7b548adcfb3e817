use std::path::{Path, PathBuf};

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use feedlab_collector::CollectorConfig;
use feedlab_core_types::PostCatalog;

/// Application configuration: the remote collector, where durable state
/// lives, and the mock-feed catalog.
///
/// Loaded from an optional file source plus `FEEDLAB_*` environment
/// overrides; every field has a workable default so the instrument runs
/// with no configuration at all (local-only persistence).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Remote collection endpoint; submissions stay local-only when unset.
    #[serde(default)]
    pub collector: Option<CollectorConfig>,
    /// Directory the roster document lives in; platform data dir when unset.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    /// Ordered post ids making up the mock feed.
    #[serde(default = "default_posts")]
    pub posts: Vec<String>,
}

fn default_posts() -> Vec<String> {
    (1..=8).map(|index| format!("post-{index}")).collect()
}

impl FeedConfig {
    /// Loads configuration from the given file (or a discovered `feedlab.*`
    /// next to the working directory) layered under environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path.to_path_buf())),
            None => builder.add_source(File::with_name("feedlab").required(false)),
        };
        let settings = builder
            .add_source(Environment::with_prefix("FEEDLAB").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn catalog(&self) -> PostCatalog {
        PostCatalog::from_labels(self.posts.iter().cloned())
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("feedlab")
        })
    }
}
