use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use feedlab_core_types::FeedError;
use feedlab_event_log::EventRecord;
use feedlab_roster::ParticipantRow;

/// Delivery port for the remote collection endpoint.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Delivers one participant row plus the raw event log and reports
    /// whether the collector acknowledged it.
    ///
    /// Never errors: transport failures, non-success statuses and not-ok
    /// response bodies all fold into `false`. Local persistence must already
    /// be durable before this is attempted.
    async fn deliver(&self, row: &ParticipantRow, events: &[EventRecord]) -> bool;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Collection endpoint receiving submissions via POST.
    pub endpoint: String,
    /// Shared secret expected by the collector.
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Serialize)]
struct Submission<'a> {
    token: &'a str,
    row: serde_json::Value,
    events: &'a [EventRecord],
}

#[derive(Deserialize)]
struct CollectorAck {
    #[serde(default)]
    ok: bool,
}

/// Single-shot HTTP delivery. No automatic retry: the roster is already
/// durable locally, and a retry layer would be a separate extension.
pub struct HttpCollector {
    client: reqwest::Client,
    config: CollectorConfig,
}

impl HttpCollector {
    pub fn new(config: CollectorConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| FeedError::new(format!("failed to configure HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn deliver(&self, row: &ParticipantRow, events: &[EventRecord]) -> bool {
        let payload = Submission {
            token: &self.config.token,
            row: row.to_flat_json(),
            events,
        };
        let response = match self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(endpoint = %self.config.endpoint, error = %err, "collector unreachable");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.config.endpoint, %status, "collector rejected submission");
            return false;
        }
        match response.json::<CollectorAck>().await {
            Ok(ack) if ack.ok => {
                debug!(session = %row.session_id, "collector acknowledged submission");
                true
            }
            Ok(_) => {
                warn!(session = %row.session_id, "collector answered without ok");
                false
            }
            Err(err) => {
                warn!(error = %err, "collector response unreadable");
                false
            }
        }
    }
}

/// Accepts every submission without touching the network; for tests and
/// offline runs.
#[derive(Default)]
pub struct NoopCollector;

#[async_trait]
impl Collector for NoopCollector {
    async fn deliver(&self, row: &ParticipantRow, events: &[EventRecord]) -> bool {
        debug!(
            session = %row.session_id,
            events = events.len(),
            "noop collector accepted submission"
        );
        true
    }
}
