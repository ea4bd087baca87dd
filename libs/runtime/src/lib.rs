//! Process-level plumbing shared by the binaries: layered configuration
//! and logging setup.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, HalConfig, LogSection, LoggingConfig};
pub use logging::init_logging_from_config;
