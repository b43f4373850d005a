//! Process-level plumbing shared by binaries: layered configuration and
//! logging initialization.

pub mod config;
pub mod logging;

pub use config::{
    default_logging_config, ApiConfig, AppConfig, CliArgs, LoggingConfig, Section, ENV_PREFIX,
};
