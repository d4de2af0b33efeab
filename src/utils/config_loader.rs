use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::config::proc_loader::file_to_config;
use crate::config::service::ServiceConfig;

/// Load the config file, or fall back to built-in defaults when no path is given.
pub fn run(config_path: Option<&str>) -> Result<ServiceConfig> {
    match config_path {
        Some(config_path) => {
            let path = Path::new(config_path);
            file_to_config(path).map_err(|e| anyhow!(format!("Invalid config format: {:#}", e)))
        }
        None => {
            info!("no config file given, using defaults");
            Ok(ServiceConfig::default())
        }
    }
}
