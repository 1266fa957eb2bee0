pub mod api;
pub mod auth;
pub mod config;
pub mod error;
mod scheduler;
mod state;

pub use scheduler::start_snapshot_scheduler;
pub use state::{build_state, AppState};
