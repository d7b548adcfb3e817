pub mod scroll;
pub mod visibility;

pub use scroll::{ScrollDirection, ScrollTracker};
pub use visibility::{IntersectionEntry, VisibilityTracker, MAX_DWELL_INTERVAL_MS};
