//! Runtime configuration loaded from a JSON file.
//!
//! Every field is optional; missing values fall back to the launch defaults in
//! [`super::constants`].

use super::constants::{DEFAULT_BLOCK_SIZE_2D, DEFAULT_BLOCK_SIZE_3D};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LaunchSettings {
    pub block2d: [u32; 2],
    pub block3d: [u32; 3],
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            block2d: DEFAULT_BLOCK_SIZE_2D,
            block3d: DEFAULT_BLOCK_SIZE_3D,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct HarmoniaConfig {
    pub launch: LaunchSettings,
    /// Size of the global rayon pool; `None` keeps rayon's default.
    pub threads: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid configuration '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl HarmoniaConfig {
    /// Names the first setting that cannot drive a dispatch.
    pub fn validation_error(&self) -> Option<String> {
        let launch = &self.launch;
        if launch.block2d.contains(&0) {
            return Some(format!(
                "launch.block2d must be positive on every axis, got {:?}",
                launch.block2d
            ));
        }
        if launch.block3d.contains(&0) {
            return Some(format!(
                "launch.block3d must be positive on every axis, got {:?}",
                launch.block3d
            ));
        }
        if self.threads == Some(0) {
            return Some("threads must be positive when set".to_string());
        }
        None
    }
}

pub fn load_config(config_path: impl AsRef<Path>) -> Result<HarmoniaConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: HarmoniaConfig =
        serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;

    match config.validation_error() {
        Some(message) => Err(ConfigError::Invalid {
            path: config_path.to_path_buf(),
            message,
        }),
        None => Ok(config),
    }
}
