use std::panic;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::RwLock;

use feedlab_core_types::{ParticipantId, SessionId};

use crate::errors::{LogError, LogResult};
use crate::model::{EventMeta, EventRecord};

pub type PostHook = Arc<dyn Fn(&EventRecord) + Send + Sync + 'static>;

/// Session-scoped append-only event log.
///
/// The recorder exclusively owns the in-memory sequence for the session's
/// lifetime. Appends are synchronous; consumers observe them immediately.
/// The log is never mutated in place, only appended and, on explicit
/// administrative reset, cleared.
pub struct EventRecorder {
    session_id: SessionId,
    started: Instant,
    participant: RwLock<Option<ParticipantId>>,
    log: RwLock<Vec<EventRecord>>,
    hooks: HookRegistry,
}

impl EventRecorder {
    /// Creates a recorder with a freshly generated session id.
    pub fn new() -> Arc<Self> {
        Self::with_session(SessionId::new())
    }

    pub fn with_session(session_id: SessionId) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            started: Instant::now(),
            participant: RwLock::new(None),
            log: RwLock::new(Vec::new()),
            hooks: HookRegistry::default(),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn participant(&self) -> Option<ParticipantId> {
        self.participant.read().clone()
    }

    /// Stamps every subsequently recorded event with the given participant id.
    pub fn set_participant(&self, participant: ParticipantId) {
        *self.participant.write() = Some(participant);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Appends one event to the log and returns it.
    ///
    /// The only rejected input is an empty action tag; metadata is not
    /// validated. Registered post-hooks run after the append.
    pub fn record(&self, action: &str, meta: EventMeta) -> LogResult<EventRecord> {
        if action.is_empty() {
            return Err(LogError::EmptyAction);
        }
        let event = EventRecord {
            session_id: self.session_id.clone(),
            participant_id: self.participant.read().clone(),
            ts_wall: Utc::now(),
            elapsed_ms: self.elapsed_ms(),
            action: action.to_string(),
            meta,
        };
        self.log.write().push(event.clone());
        self.hooks.emit(&event);
        Ok(event)
    }

    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.log.read().clone()
    }

    /// Empties the log. Used only via an explicit administrative action.
    pub fn clear(&self) {
        self.log.write().clear();
    }

    pub fn register_post_hook(&self, hook: PostHook) {
        self.hooks.register(hook);
    }

    pub fn register_post_hook_fn<F>(&self, hook: F)
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        self.hooks.register(Arc::new(hook));
    }
}

#[derive(Default)]
struct HookRegistry {
    hooks: RwLock<Vec<PostHook>>,
}

impl HookRegistry {
    fn register(&self, hook: PostHook) {
        self.hooks.write().push(hook);
    }

    fn emit(&self, event: &EventRecord) {
        let snapshot: Vec<PostHook> = self.hooks.read().iter().cloned().collect();
        for hook in snapshot {
            if panic::catch_unwind(panic::AssertUnwindSafe(|| (hook)(event))).is_err() {
                eprintln!("[event-log] post-hook panicked; continuing");
            }
        }
    }
}
