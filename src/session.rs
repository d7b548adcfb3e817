use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use feedlab_collector::Collector;
use feedlab_core_types::{ParticipantId, PostCatalog, PostId, SessionId};
use feedlab_event_log::{actions, EventMeta, EventRecord, EventRecorder, LogError, LogResult};
use feedlab_roster::{build_row, ParticipantRow, RosterError, RosterStore};
use feedlab_trackers::{IntersectionEntry, ScrollTracker, VisibilityTracker};

use crate::notices::NoticeBoard;

/// Lifetime of the share acknowledgement notice.
pub const SHARE_NOTICE_MS: u64 = 1_500;
/// Lifetime of the delivery-failure notice.
pub const SYNC_NOTICE_MS: u64 = 4_000;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a submission is already in flight")]
    SubmitInFlight,
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// How a submission ended. Either way the row is durable locally.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Acknowledged by the remote collector.
    Delivered,
    /// Remote delivery failed or was rejected; roster holds the row.
    LocalOnly,
}

/// One participant session over the mock feed.
///
/// Owns the recorder, both trackers and the notice board, and drives the
/// submit path: reduce the log to a row, persist it durably, then attempt
/// remote delivery. A second submit is rejected while one is in flight.
pub struct FeedSession {
    recorder: Arc<EventRecorder>,
    visibility: Mutex<VisibilityTracker>,
    scroll: Mutex<ScrollTracker>,
    catalog: PostCatalog,
    roster: Arc<RosterStore>,
    collector: Arc<dyn Collector>,
    notices: Arc<NoticeBoard>,
    submitting: AtomicBool,
}

impl FeedSession {
    pub fn new(
        catalog: PostCatalog,
        roster: Arc<RosterStore>,
        collector: Arc<dyn Collector>,
    ) -> Arc<Self> {
        let recorder = EventRecorder::new();
        let notices = Arc::new(NoticeBoard::new());

        // Shares get a short-lived acknowledgement; a view concern attached
        // as a hook so the log contract stays untouched.
        let board = Arc::clone(&notices);
        recorder.register_post_hook_fn(move |event| {
            if event.action == actions::SHARE {
                board.post("Post shared", SHARE_NOTICE_MS);
            }
        });

        let mut visibility = VisibilityTracker::new(Arc::clone(&recorder));
        visibility.retarget(catalog.ids());
        let scroll = ScrollTracker::new(Arc::clone(&recorder));

        emit(&recorder, actions::SESSION_START, EventMeta::default());

        Arc::new(Self {
            visibility: Mutex::new(visibility),
            scroll: Mutex::new(scroll),
            catalog,
            roster,
            collector,
            notices,
            submitting: AtomicBool::new(false),
            recorder,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        self.recorder.session_id()
    }

    pub fn notices(&self) -> &Arc<NoticeBoard> {
        &self.notices
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.recorder.elapsed_ms()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.recorder.snapshot()
    }

    /// Registers the self-reported participant id and records the entry.
    pub fn enter_participant(&self, participant: ParticipantId) {
        self.recorder.set_participant(participant);
        emit(
            &self.recorder,
            actions::PARTICIPANT_ID_ENTERED,
            EventMeta::default(),
        );
    }

    /// Records one interaction coming from the view layer.
    pub fn record_interaction(&self, action: &str, meta: EventMeta) -> LogResult<EventRecord> {
        self.recorder.record(action, meta)
    }

    /// Routes one intersection batch into the visibility tracker.
    pub fn observe_visibility(&self, entries: &[IntersectionEntry]) {
        if let Err(err) = self.visibility.lock().observe(entries) {
            warn!(error = %err, "visibility observation dropped");
        }
    }

    /// Re-registers the observed post set after the feed re-ordered.
    pub fn retarget_feed(&self, posts: &[PostId]) {
        self.visibility.lock().retarget(posts);
    }

    pub fn dwell_ms(&self, post: &PostId) -> u64 {
        self.visibility.lock().dwell_ms(post)
    }

    pub fn sample_scroll(&self, y: i64) {
        self.scroll.lock().sample(y);
    }

    /// Frame boundary: emits at most one coalesced scroll event.
    pub fn flush_scroll(&self) {
        if let Err(err) = self.scroll.lock().flush() {
            warn!(error = %err, "scroll flush dropped");
        }
    }

    /// The row the log reduces to right now, without persisting anything.
    pub fn build_current_row(&self) -> ParticipantRow {
        let participant = self.recorder.participant();
        build_row(
            self.recorder.session_id(),
            participant.as_ref(),
            &self.recorder.snapshot(),
            &self.catalog,
        )
    }

    /// Submits the session: records `feed_submit`, reduces the log, upserts
    /// the roster (durable first), then attempts remote delivery.
    ///
    /// Further submissions are rejected until the delivery resolves, so a
    /// double-click cannot race the network call.
    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(SessionError::SubmitInFlight);
        }
        let outcome = self.submit_inner().await;
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    async fn submit_inner(&self) -> Result<SubmitOutcome, SessionError> {
        self.recorder
            .record(actions::FEED_SUBMIT, EventMeta::default())?;
        let events = self.recorder.snapshot();
        let participant = self.recorder.participant();
        let row = build_row(
            self.recorder.session_id(),
            participant.as_ref(),
            &events,
            &self.catalog,
        );

        self.roster.upsert(row.clone())?;
        info!(session = %row.session_id, "participant row persisted");

        if self.collector.deliver(&row, &events).await {
            Ok(SubmitOutcome::Delivered)
        } else {
            self.notices
                .post("Saved locally; upload failed", SYNC_NOTICE_MS);
            Ok(SubmitOutcome::LocalOnly)
        }
    }

    /// Best-effort terminal event, recorded synchronously before teardown.
    pub fn teardown(&self) {
        emit(&self.recorder, actions::SESSION_END, EventMeta::default());
    }

    /// Administrative reset: empties the log and all tracker state.
    pub fn reset(&self) {
        self.recorder.clear();
        self.visibility.lock().reset();
        self.scroll.lock().reset();
        self.notices.clear();
        info!(session = %self.recorder.session_id().0, "session state reset");
    }
}

fn emit(recorder: &EventRecorder, action: &str, meta: EventMeta) {
    if let Err(err) = recorder.record(action, meta) {
        warn!(action, error = %err, "event not recorded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use feedlab_collector::NoopCollector;
    use feedlab_roster::InMemoryKv;

    fn session() -> Arc<FeedSession> {
        FeedSession::new(
            PostCatalog::from_labels(["p1", "p2"]),
            RosterStore::new(InMemoryKv::new()),
            Arc::new(NoopCollector),
        )
    }

    #[test]
    fn construction_records_session_start() {
        let session = session();
        let events = session.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, actions::SESSION_START);
    }

    #[test]
    fn sharing_posts_a_transient_notice() {
        let session = session();
        session
            .record_interaction(
                actions::SHARE,
                EventMeta::for_post(PostId("p1".into())),
            )
            .unwrap();
        assert_eq!(session.notices().current().as_deref(), Some("Post shared"));
    }

    #[test]
    fn reset_empties_log_and_trackers() {
        let session = session();
        session.enter_participant(ParticipantId("p".into()));
        session.observe_visibility(&[IntersectionEntry {
            post_id: PostId("p1".into()),
            ratio: 1.0,
            at_ms: 0,
        }]);
        session.observe_visibility(&[IntersectionEntry {
            post_id: PostId("p1".into()),
            ratio: 0.0,
            at_ms: 700,
        }]);
        assert!(session.dwell_ms(&PostId("p1".into())) > 0);

        session.reset();
        assert!(session.events().is_empty());
        assert_eq!(session.dwell_ms(&PostId("p1".into())), 0);
    }

    #[test]
    fn teardown_records_session_end() {
        let session = session();
        session.teardown();
        let events = session.events();
        assert_eq!(events.last().unwrap().action, actions::SESSION_END);
    }
}
