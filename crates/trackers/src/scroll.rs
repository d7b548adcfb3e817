use std::sync::Arc;

use feedlab_event_log::{actions, EventMeta, EventRecorder, LogResult};

/// Direction of a scroll step relative to the previously emitted position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScrollDirection {
    Up,
    Down,
    None,
}

impl ScrollDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::None => "none",
        }
    }
}

/// Emits one `scroll {y, direction}` event per flushed frame.
///
/// Hosts deliver scroll positions at arbitrary frequency; `sample` only
/// stores the latest position and `flush` (called once per animation frame)
/// emits it, so bursts within a frame collapse to a single event.
pub struct ScrollTracker {
    recorder: Arc<EventRecorder>,
    last_y: Option<i64>,
    pending_y: Option<i64>,
}

impl ScrollTracker {
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self {
            recorder,
            last_y: None,
            pending_y: None,
        }
    }

    /// Buffers the latest observed vertical position.
    pub fn sample(&mut self, y: i64) {
        self.pending_y = Some(y);
    }

    /// Emits the buffered position, if any, and returns the direction taken.
    pub fn flush(&mut self) -> LogResult<Option<ScrollDirection>> {
        let Some(y) = self.pending_y.take() else {
            return Ok(None);
        };
        let direction = match self.last_y {
            Some(prev) if y < prev => ScrollDirection::Up,
            Some(prev) if y > prev => ScrollDirection::Down,
            _ => ScrollDirection::None,
        };
        let meta = EventMeta {
            y: Some(y),
            direction: Some(direction.as_str().to_string()),
            ..EventMeta::default()
        };
        self.recorder.record(actions::SCROLL, meta)?;
        self.last_y = Some(y);
        Ok(Some(direction))
    }

    pub fn reset(&mut self) {
        self.last_y = None;
        self.pending_y = None;
    }
}
