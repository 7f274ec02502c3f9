//! Core utilities and types shared across all Arbor crates

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{default_config, load_config, save_config, Config, LabelConfig, OutputConfig};
pub use error::{ArborError, ArborResult};

/// Version information for the Arbor project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
