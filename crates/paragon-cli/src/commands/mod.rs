//! CLI subcommands.

pub mod config;
pub mod process;
pub mod run;

use std::path::{Path, PathBuf};

use paragon_core::PipelineConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paragon")
        .join("config.json")
}

/// Load configuration from an explicit path, the default path if it exists,
/// or built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(p) => Ok(PipelineConfig::from_file(Path::new(p))?),
        None => {
            let default = default_config_path();
            if default.exists() {
                Ok(PipelineConfig::from_file(&default)?)
            } else {
                Ok(PipelineConfig::default())
            }
        }
    }
}
