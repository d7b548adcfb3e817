use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use feedlab_core_types::PostId;
use feedlab_event_log::{actions, EventMeta, EventRecorder, LogResult};

/// Upper bound on a single visible interval. A backgrounded tab can stretch
/// an interval arbitrarily; the clamp keeps pathological values out of the
/// accumulated totals.
pub const MAX_DWELL_INTERVAL_MS: u64 = 3_600_000;

/// One observation delivered by the host's viewport-intersection mechanism.
///
/// `at_ms` is the host-supplied observation timestamp on the same monotonic
/// scale across a session; dwell arithmetic never reads a clock itself.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub post_id: PostId,
    pub ratio: f64,
    pub at_ms: u64,
}

#[derive(Clone, Debug, Default)]
struct VisState {
    visible: bool,
    interval_start_ms: Option<u64>,
    accumulated_ms: u64,
}

/// Converts intersection transitions into paired `view_start` / `view_end`
/// events, accumulating dwell per post.
///
/// Hosts may fire several callbacks per transition (multiple thresholds);
/// observing an already-visible post again is a no-op.
pub struct VisibilityTracker {
    recorder: Arc<EventRecorder>,
    registered: HashSet<PostId>,
    states: HashMap<PostId, VisState>,
}

impl VisibilityTracker {
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self {
            recorder,
            registered: HashSet::new(),
            states: HashMap::new(),
        }
    }

    /// Replaces the observed post set, e.g. after the feed re-ordered.
    ///
    /// Accumulated dwell survives a retarget; entries for posts outside the
    /// current set are ignored until they are registered again.
    pub fn retarget(&mut self, posts: &[PostId]) {
        self.registered = posts.iter().cloned().collect();
    }

    /// Processes one observation batch from the host.
    pub fn observe(&mut self, entries: &[IntersectionEntry]) -> LogResult<()> {
        for entry in entries {
            if !self.registered.contains(&entry.post_id) {
                continue;
            }
            let state = self.states.entry(entry.post_id.clone()).or_default();
            let intersecting = entry.ratio > 0.0;

            if intersecting && !state.visible {
                state.visible = true;
                state.interval_start_ms = Some(entry.at_ms);
                let meta = EventMeta {
                    post_id: Some(entry.post_id.clone()),
                    ratio: Some(entry.ratio),
                    ..EventMeta::default()
                };
                self.recorder.record(actions::VIEW_START, meta)?;
            } else if !intersecting && state.visible {
                let started = state.interval_start_ms.take().unwrap_or(entry.at_ms);
                let duration = entry
                    .at_ms
                    .saturating_sub(started)
                    .min(MAX_DWELL_INTERVAL_MS);
                state.accumulated_ms += duration;
                state.visible = false;
                let meta = EventMeta {
                    post_id: Some(entry.post_id.clone()),
                    duration_ms: Some(duration),
                    total_ms: Some(state.accumulated_ms),
                    ..EventMeta::default()
                };
                self.recorder.record(actions::VIEW_END, meta)?;
            }
        }
        Ok(())
    }

    pub fn is_visible(&self, post: &PostId) -> bool {
        self.states
            .get(post)
            .map(|state| state.visible)
            .unwrap_or(false)
    }

    /// Total accumulated dwell for one post, closed intervals only.
    pub fn dwell_ms(&self, post: &PostId) -> u64 {
        self.states
            .get(post)
            .map(|state| state.accumulated_ms)
            .unwrap_or(0)
    }

    pub fn totals(&self) -> BTreeMap<PostId, u64> {
        self.states
            .iter()
            .map(|(post, state)| (post.clone(), state.accumulated_ms))
            .collect()
    }

    /// Drops all visibility state. Administrative reset only.
    pub fn reset(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(posts: &[&str]) -> (VisibilityTracker, Arc<EventRecorder>) {
        let recorder = EventRecorder::new();
        let mut tracker = VisibilityTracker::new(Arc::clone(&recorder));
        let ids: Vec<PostId> = posts.iter().map(|p| PostId((*p).into())).collect();
        tracker.retarget(&ids);
        (tracker, recorder)
    }

    fn entry(post: &str, ratio: f64, at_ms: u64) -> IntersectionEntry {
        IntersectionEntry {
            post_id: PostId(post.into()),
            ratio,
            at_ms,
        }
    }

    fn actions_of(recorder: &EventRecorder) -> Vec<String> {
        recorder
            .snapshot()
            .into_iter()
            .map(|ev| ev.action)
            .collect()
    }

    #[test]
    fn transitions_emit_paired_events_with_duration() {
        let (mut tracker, recorder) = tracker_with(&["p1"]);

        tracker.observe(&[entry("p1", 0.6, 1_000)]).unwrap();
        tracker.observe(&[entry("p1", 0.0, 3_500)]).unwrap();

        let log = recorder.snapshot();
        assert_eq!(actions_of(&recorder), vec!["view_start", "view_end"]);
        assert_eq!(log[0].meta.ratio, Some(0.6));
        assert_eq!(log[1].meta.duration_ms, Some(2_500));
        assert_eq!(log[1].meta.total_ms, Some(2_500));
        assert_eq!(tracker.dwell_ms(&PostId("p1".into())), 2_500);
    }

    #[test]
    fn repeated_visible_callbacks_are_idempotent() {
        let (mut tracker, recorder) = tracker_with(&["p1"]);

        tracker.observe(&[entry("p1", 0.3, 1_000)]).unwrap();
        tracker.observe(&[entry("p1", 0.7, 1_100)]).unwrap();
        tracker.observe(&[entry("p1", 1.0, 1_200)]).unwrap();

        assert_eq!(actions_of(&recorder), vec!["view_start"]);
        assert!(tracker.is_visible(&PostId("p1".into())));
    }

    #[test]
    fn view_end_never_exceeds_view_start_count() {
        let (mut tracker, recorder) = tracker_with(&["p1"]);

        // Hidden callbacks with no open interval must not emit.
        tracker.observe(&[entry("p1", 0.0, 500)]).unwrap();
        tracker.observe(&[entry("p1", 0.5, 1_000)]).unwrap();
        tracker.observe(&[entry("p1", 0.0, 1_400)]).unwrap();
        tracker.observe(&[entry("p1", 0.0, 1_500)]).unwrap();
        tracker.observe(&[entry("p1", 0.8, 2_000)]).unwrap();

        let log = recorder.snapshot();
        let starts = log.iter().filter(|ev| ev.action == "view_start").count();
        let ends = log.iter().filter(|ev| ev.action == "view_end").count();
        assert!(ends <= starts);
        for ev in log.iter().filter(|ev| ev.action == "view_end") {
            let duration = ev.meta.duration_ms.unwrap();
            assert!(duration <= MAX_DWELL_INTERVAL_MS);
        }
    }

    #[test]
    fn pathological_intervals_are_clamped_to_one_hour() {
        let (mut tracker, recorder) = tracker_with(&["p1"]);

        tracker.observe(&[entry("p1", 0.9, 0)]).unwrap();
        // A backgrounded tab resurfacing five hours later.
        tracker
            .observe(&[entry("p1", 0.0, 5 * 3_600_000)])
            .unwrap();

        let log = recorder.snapshot();
        assert_eq!(log[1].meta.duration_ms, Some(MAX_DWELL_INTERVAL_MS));
        assert_eq!(tracker.dwell_ms(&PostId("p1".into())), MAX_DWELL_INTERVAL_MS);
    }

    #[test]
    fn dwell_accumulates_across_intervals() {
        let (mut tracker, _recorder) = tracker_with(&["p1"]);

        tracker.observe(&[entry("p1", 0.5, 1_000)]).unwrap();
        tracker.observe(&[entry("p1", 0.0, 2_000)]).unwrap();
        tracker.observe(&[entry("p1", 0.5, 5_000)]).unwrap();
        tracker.observe(&[entry("p1", 0.0, 5_500)]).unwrap();

        assert_eq!(tracker.dwell_ms(&PostId("p1".into())), 1_500);
    }

    #[test]
    fn unregistered_posts_are_ignored_after_retarget() {
        let (mut tracker, recorder) = tracker_with(&["p1", "p2"]);

        tracker.observe(&[entry("p2", 0.4, 1_000)]).unwrap();
        tracker.retarget(&[PostId("p1".into())]);
        tracker.observe(&[entry("p2", 0.0, 2_000)]).unwrap();
        tracker.observe(&[entry("p1", 0.4, 2_000)]).unwrap();

        // p2's close was dropped with its registration; only p1 progressed.
        let log = recorder.snapshot();
        assert_eq!(actions_of(&recorder), vec!["view_start", "view_start"]);
        assert_eq!(log[1].meta.post_id, Some(PostId("p1".into())));
    }

    #[test]
    fn reset_drops_accumulated_state() {
        let (mut tracker, _recorder) = tracker_with(&["p1"]);

        tracker.observe(&[entry("p1", 0.5, 0)]).unwrap();
        tracker.observe(&[entry("p1", 0.0, 800)]).unwrap();
        assert_eq!(tracker.dwell_ms(&PostId("p1".into())), 800);

        tracker.reset();
        assert_eq!(tracker.dwell_ms(&PostId("p1".into())), 0);
        assert!(!tracker.is_visible(&PostId("p1".into())));
    }
}
