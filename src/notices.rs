use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Transient user-facing feedback ("Post shared", "upload failed").
///
/// Holds at most one notice; a newer post replaces the current one and an
/// expired notice disappears on the next read. Purely a view concern layered
/// over the pipeline, never part of the log contract.
pub struct NoticeBoard {
    current: Mutex<Option<Notice>>,
}

struct Notice {
    text: String,
    expires_at: Instant,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    pub fn post(&self, text: impl Into<String>, ttl_ms: u64) {
        *self.current.lock() = Some(Notice {
            text: text.into(),
            expires_at: Instant::now() + Duration::from_millis(ttl_ms),
        });
    }

    /// The active notice, if it has not expired yet.
    pub fn current(&self) -> Option<String> {
        let mut guard = self.current.lock();
        match guard.as_ref() {
            Some(notice) if notice.expires_at > Instant::now() => Some(notice.text.clone()),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    pub fn clear(&self) {
        *self.current.lock() = None;
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_expire_after_their_ttl() {
        let board = NoticeBoard::new();
        board.post("Post shared", 10);
        assert_eq!(board.current().as_deref(), Some("Post shared"));

        std::thread::sleep(Duration::from_millis(30));
        assert!(board.current().is_none());
    }

    #[test]
    fn a_newer_notice_replaces_the_current_one() {
        let board = NoticeBoard::new();
        board.post("first", 10_000);
        board.post("second", 10_000);
        assert_eq!(board.current().as_deref(), Some("second"));

        board.clear();
        assert!(board.current().is_none());
    }
}
