use std::collections::HashMap;
use std::fs;
use std::panic;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::errors::RosterResult;
use crate::model::ParticipantRow;

/// Well-known key the roster array is persisted under.
pub const ROSTER_KEY: &str = "feedlab.roster.v1";

/// Minimal persistence port. The medium is swappable so tests run against
/// memory and the application against disk; durable state may also be
/// touched by another execution context (last write wins).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> RosterResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RosterResult<()>;
}

/// In-memory medium for tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKv {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl KeyValueStore for InMemoryKv {
    fn get(&self, key: &str) -> RosterResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RosterResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON document per key inside a directory.
pub struct JsonFileKv {
    dir: PathBuf,
}

impl JsonFileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self { dir: dir.into() })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileKv {
    fn get(&self, key: &str) -> RosterResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> RosterResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

pub type RosterHook = Arc<dyn Fn(&[ParticipantRow]) + Send + Sync + 'static>;

/// RAII handle for a change subscription; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    store: Weak<RosterStore>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.hooks.write().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Durable, keyed-by-session upsert store of participant rows.
///
/// The store exclusively owns durable rows. Rows keep insertion order;
/// upserting an existing session id replaces that row in place. Corrupt or
/// missing durable state degrades to an empty roster, never an error.
pub struct RosterStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    hooks: RwLock<Vec<(u64, RosterHook)>>,
    next_hook_id: AtomicU64,
}

impl RosterStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Arc<Self> {
        Self::with_key(kv, ROSTER_KEY)
    }

    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            kv,
            key: key.into(),
            hooks: RwLock::new(Vec::new()),
            next_hook_id: AtomicU64::new(0),
        })
    }

    /// Loads the durable roster; empty on missing or corrupt state.
    pub fn load(&self) -> Vec<ParticipantRow> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "roster read failed; treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ParticipantRow>>(&raw) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(key = %self.key, error = %err, "roster state corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    /// Inserts the row, or replaces the existing row with the same session
    /// id, then persists the whole roster in one write.
    pub fn upsert(&self, row: ParticipantRow) -> RosterResult<Vec<ParticipantRow>> {
        let mut rows = self.load();
        match rows
            .iter()
            .position(|existing| existing.session_id == row.session_id)
        {
            Some(index) => rows[index] = row,
            None => rows.push(row),
        }
        self.persist(&rows)?;
        debug!(key = %self.key, rows = rows.len(), "roster persisted");
        self.notify(&rows);
        Ok(rows)
    }

    /// Persists an empty roster.
    pub fn clear(&self) -> RosterResult<()> {
        let rows = Vec::new();
        self.persist(&rows)?;
        self.notify(&rows);
        Ok(())
    }

    /// Re-reads durable state after an external writer changed it (another
    /// tab on the same origin) and notifies in-memory mirrors.
    pub fn sync_external(self: &Arc<Self>) -> Vec<ParticipantRow> {
        let rows = self.load();
        self.notify(&rows);
        rows
    }

    /// Registers a change callback; the returned guard unsubscribes on drop.
    pub fn on_change<F>(self: &Arc<Self>, hook: F) -> Subscription
    where
        F: Fn(&[ParticipantRow]) + Send + Sync + 'static,
    {
        let id = self.next_hook_id.fetch_add(1, Ordering::SeqCst);
        self.hooks.write().push((id, Arc::new(hook)));
        Subscription {
            id,
            store: Arc::downgrade(self),
        }
    }

    fn persist(&self, rows: &[ParticipantRow]) -> RosterResult<()> {
        let payload = serde_json::to_string(rows)?;
        self.kv.set(&self.key, &payload)
    }

    fn notify(&self, rows: &[ParticipantRow]) {
        let snapshot: Vec<RosterHook> = self
            .hooks
            .read()
            .iter()
            .map(|(_, hook)| Arc::clone(hook))
            .collect();
        for hook in snapshot {
            if panic::catch_unwind(panic::AssertUnwindSafe(|| (hook)(rows))).is_err() {
                eprintln!("[roster] change hook panicked; continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    fn row(session: &str, participant: &str) -> ParticipantRow {
        ParticipantRow {
            session_id: session.to_string(),
            participant_id: participant.to_string(),
            ..ParticipantRow::default()
        }
    }

    #[test]
    fn upsert_appends_then_replaces_in_place() {
        let store = RosterStore::new(InMemoryKv::new());

        store.upsert(row("s-1", "alpha")).unwrap();
        store.upsert(row("s-2", "beta")).unwrap();
        let updated = store.upsert(row("s-1", "alpha-revised")).unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].session_id, "s-1");
        assert_eq!(updated[0].participant_id, "alpha-revised");
        assert_eq!(updated[1].session_id, "s-2");

        let reloaded = store.load();
        assert_eq!(reloaded, updated);
    }

    #[test]
    fn corrupt_state_loads_as_empty() {
        let kv = InMemoryKv::new();
        kv.set(ROSTER_KEY, "{this is not json").unwrap();
        let store = RosterStore::new(kv);
        assert!(store.load().is_empty());
    }

    #[test]
    fn missing_state_loads_as_empty() {
        let store = RosterStore::new(InMemoryKv::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn clear_persists_an_empty_roster() {
        let store = RosterStore::new(InMemoryKv::new());
        store.upsert(row("s-1", "alpha")).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn change_hooks_fire_until_the_subscription_drops() {
        let store = RosterStore::new(InMemoryKv::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = store.on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.upsert(row("s-1", "alpha")).unwrap();
        store.clear().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        drop(subscription);
        store.upsert(row("s-2", "beta")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn external_sync_reloads_and_notifies() {
        let kv = InMemoryKv::new();
        let store = RosterStore::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>);
        let seen = Arc::new(AtomicUsize::new(0));
        let mirror = Arc::clone(&seen);
        let _subscription = store.on_change(move |rows| {
            mirror.store(rows.len(), Ordering::SeqCst);
        });

        // Another execution context writes the same key directly.
        let foreign = serde_json::to_string(&vec![row("s-9", "gamma")]).unwrap();
        kv.set(ROSTER_KEY, &foreign).unwrap();

        let rows = store.sync_external();
        assert_eq!(rows.len(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn file_backed_roster_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = RosterStore::new(JsonFileKv::new(dir.path()));

        store.upsert(row("s-1", "alpha")).unwrap();
        let reloaded = RosterStore::new(JsonFileKv::new(dir.path())).load();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].participant_id, "alpha");
    }

    #[test]
    fn corrupt_file_state_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::new(dir.path());
        kv.set(ROSTER_KEY, "no json here").unwrap();
        let store = RosterStore::new(kv);
        assert!(store.load().is_empty());
    }
}
