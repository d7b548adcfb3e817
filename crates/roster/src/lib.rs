pub mod build;
pub mod errors;
pub mod export;
pub mod model;
pub mod store;

pub use build::build_row;
pub use errors::{RosterError, RosterResult};
pub use model::{ParticipantRow, PostActivity, CELL_JOIN};
pub use store::{InMemoryKv, JsonFileKv, KeyValueStore, RosterStore, Subscription, ROSTER_KEY};
