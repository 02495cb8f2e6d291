pub mod config;
pub mod constants;

pub use config::{load_config, ConfigError, HarmoniaConfig, LaunchSettings};
