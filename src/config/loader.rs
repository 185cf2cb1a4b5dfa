use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;
use crate::config::AppConfig;

/// Load an `AppConfig` from YAML. Keys absent from the file keep their defaults.
pub fn load_config_from_yaml(file_path: &Path) -> Result<AppConfig> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read config file from {}", file_path.display()))?;

    let config: AppConfig = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize config from {}", file_path.display()))?;

    Ok(config)
}

/// `None` means built-in defaults.
pub fn load_config(file_path: Option<&Path>) -> Result<AppConfig> {
    match file_path {
        Some(path) => load_config_from_yaml(path),
        None => Ok(AppConfig::default()),
    }
}
