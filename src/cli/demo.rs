use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use feedlab_collector::{Collector, HttpCollector, NoopCollector};
use feedlab_core_types::ParticipantId;
use feedlab_event_log::{actions, EventMeta};
use feedlab_roster::{JsonFileKv, RosterStore};
use feedlab_trackers::IntersectionEntry;

use crate::config::FeedConfig;
use crate::session::{FeedSession, SubmitOutcome};

#[derive(Args, Clone, Debug)]
pub struct DemoArgs {
    /// Participant id recorded for the scripted session
    #[arg(long, default_value = "demo-participant")]
    pub participant: String,

    /// Deliver to the configured remote collector instead of the local noop
    #[arg(long)]
    pub upload: bool,
}

/// Drives one scripted session through the whole pipeline: dwell, scroll,
/// reactions, a comment, a share, then submission.
pub async fn cmd_demo(args: DemoArgs, config: &FeedConfig) -> Result<()> {
    let catalog = config.catalog();
    if catalog.is_empty() {
        bail!("the configured post catalog is empty");
    }
    let store = RosterStore::new(JsonFileKv::new(config.storage_dir()));
    let collector: Arc<dyn Collector> = if args.upload {
        match &config.collector {
            Some(settings) => Arc::new(HttpCollector::new(settings.clone())?),
            None => bail!("--upload requires a [collector] section in the configuration"),
        }
    } else {
        Arc::new(NoopCollector)
    };

    let session = FeedSession::new(catalog.clone(), store, collector);
    session.enter_participant(ParticipantId(args.participant));

    let first = catalog.ids()[0].clone();
    session.observe_visibility(&[IntersectionEntry {
        post_id: first.clone(),
        ratio: 0.9,
        at_ms: session.elapsed_ms(),
    }]);
    session.sample_scroll(0);
    session.sample_scroll(240);
    session.flush_scroll();
    session.record_interaction(
        actions::REACT_PICK,
        EventMeta::for_post(first.clone()).with_reaction("like"),
    )?;
    session.record_interaction(
        actions::COMMENT_SUBMIT,
        EventMeta::for_post(first.clone()).with_text("interesting take"),
    )?;
    if let Some(second) = catalog.ids().get(1) {
        session.record_interaction(actions::SHARE, EventMeta::for_post(second.clone()))?;
    }
    session.observe_visibility(&[IntersectionEntry {
        post_id: first.clone(),
        ratio: 0.0,
        at_ms: session.elapsed_ms() + 1_200,
    }]);

    let outcome = session.submit().await?;
    session.teardown();

    let row = session.build_current_row();
    println!("Scripted session {} complete", session.session_id().0);
    println!(
        "Outcome: {}",
        match outcome {
            SubmitOutcome::Delivered => "delivered to collector",
            SubmitOutcome::LocalOnly => "persisted locally only",
        }
    );
    if let Some(notice) = session.notices().current() {
        println!("Notice: {notice}");
    }
    println!("Events recorded: {}", session.events().len());
    println!("Dwell on {}: {} ms", first.0, session.dwell_ms(&first));
    println!("{}", serde_json::to_string_pretty(&row.to_flat_json())?);
    Ok(())
}
