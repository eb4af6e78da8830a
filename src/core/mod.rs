pub mod config;
pub mod errors;
pub mod logging;
pub mod memory_protection;

pub use config::{KeyCoreConfig, LoggingConfig};
pub use errors::KeyError;
