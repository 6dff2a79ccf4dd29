use crate::paths::StudybotPaths;
use std::fs;
use std::path::Path;
use studybot_core::config::AssistantConfig;
use studybot_core::{Result, StudybotError};

/// Loads the engine configuration from the default path
/// (`~/.config/studybot/config.toml`).
///
/// Falls back to defaults when the config directory cannot be determined.
pub fn load_default_config() -> Result<AssistantConfig> {
    match StudybotPaths::config_file() {
        Ok(path) => load_config(&path),
        Err(e) => {
            tracing::warn!("[Config] {}; using defaults", e);
            Ok(AssistantConfig::default())
        }
    }
}

/// Loads and validates the engine configuration from `path`.
///
/// # Returns
///
/// - `Ok(AssistantConfig::default())` if the file does not exist or is empty.
/// - `Err(StudybotError::Io)` if the file exists but cannot be read.
/// - `Err(StudybotError::Serialization)` if the TOML is malformed.
/// - `Err(StudybotError::Config)` if a value is out of range.
pub fn load_config(path: &Path) -> Result<AssistantConfig> {
    if !path.exists() {
        tracing::debug!("[Config] No config file at {:?}, using defaults", path);
        return Ok(AssistantConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        StudybotError::io(format!("Failed to read config file at {:?}: {}", path, e))
    })?;

    if content.trim().is_empty() {
        return Ok(AssistantConfig::default());
    }

    let config: AssistantConfig = toml::from_str(&content)?;
    config.validate()?;
    tracing::info!("[Config] Loaded configuration from {:?}", path);
    Ok(config)
}

/// Saves the engine configuration to `path`, creating parent directories.
pub fn save_config(path: &Path, config: &AssistantConfig) -> Result<()> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            StudybotError::io(format!("Failed to create config directory {:?}: {}", parent, e))
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(|e| {
        StudybotError::io(format!("Failed to write config file at {:?}: {}", path, e))
    })?;

    tracing::info!("[Config] Saved configuration to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AssistantConfig::default());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(load_config(&path).unwrap(), AssistantConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = AssistantConfig::default();
        config.stream.tick_ms = 30;
        config.policy.fallback_threshold = 4;
        config.texts.reset = Some("Fresh start!".to_string());

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[stream\ntick_ms = 3").unwrap();
        assert!(load_config(&path).unwrap_err().is_serialization());
    }

    #[test]
    fn test_invalid_values_are_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[stream]\ntick_ms = 0\n").unwrap();
        assert!(load_config(&path).unwrap_err().is_config());
    }
}
