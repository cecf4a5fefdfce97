//! Data models and structures for the speed test

pub mod config;
pub mod result;
pub mod state;

// Re-export main model types
pub use config::Config;
pub use result::SpeedResult;
pub use state::TestState;
