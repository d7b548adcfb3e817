//! feedlab: a simulated social-media feed used as a behavioral-research
//! instrument.
//!
//! The pipeline crates capture every participant interaction as timestamped
//! events, accumulate viewport dwell, reduce the log into one denormalized
//! row per session, persist the roster durably and deliver submissions to a
//! remote collector best-effort. This crate wires them into a session
//! runtime and an operator CLI.

pub mod cli;
pub mod config;
pub mod notices;
pub mod session;

pub use config::FeedConfig;
pub use notices::NoticeBoard;
pub use session::{FeedSession, SessionError, SubmitOutcome};

// Pipeline crates re-exported under one roof for downstream consumers.
pub use feedlab_collector as collector;
pub use feedlab_core_types as core_types;
pub use feedlab_event_log as event_log;
pub use feedlab_roster as roster;
pub use feedlab_trackers as trackers;
