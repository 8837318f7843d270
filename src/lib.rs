// taskpulse library - public API

// Re-export error types
pub mod error;
pub use error::{Result, TaskpulseError};

// Module declarations
pub mod cli;
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Config;

/// Initialize logging. `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: log::LevelFilter) {
    // A logger may already be installed (tests, embedding)
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
