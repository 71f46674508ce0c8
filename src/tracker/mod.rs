pub mod controller;
pub mod state;

pub use controller::Tracker;
pub use state::{StartOutcome, StopOutcome};
