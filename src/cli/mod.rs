pub mod demo;
pub mod info;
pub mod roster;

pub use demo::{cmd_demo, DemoArgs};
pub use info::cmd_info;
pub use roster::{cmd_roster, RosterArgs};
