//! Application configuration.
//!
//! - `layout`: display dimensions and pre-computed layout constants
//! - `link`: diagnostic-link timing and the worker's runtime configuration

pub mod layout;
pub mod link;

pub use layout::{SCREEN_HEIGHT, SCREEN_WIDTH};
pub use link::{RetryPolicy, WorkerConfig};
