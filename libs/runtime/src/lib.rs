//! Process-level plumbing shared by the clinic client binaries:
//! layered configuration loading and logging initialization.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, ClientConfig, ConfigProvider, LoggingConfig,
    Section,
};
