use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CLASSIFIER_TIMEOUT_SECS, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_HISTORY_LIMIT,
    DEFAULT_PREVIEW_CHARS, ENV_PREFIX, GENERATION_TIMEOUT_SECS, GOOGLE_BASE_URL, GROQ_BASE_URL,
    PROBE_TIMEOUT_SECS,
};
use crate::display::DisplayTheme;
use crate::models::RegistryConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the credential record lives
    #[serde(default)]
    pub storage: StorageConfig,

    /// Timeouts and startup routing mode
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Provider endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Model catalog and router models
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Terminal output
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Credential record location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides `$HOME/.ai_agent_config.json`
    pub record_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub generation_timeout_secs: u64,
    pub classifier_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// Start each run in automatic mode
    pub start_in_auto: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            generation_timeout_secs: GENERATION_TIMEOUT_SECS,
            classifier_timeout_secs: CLASSIFIER_TIMEOUT_SECS,
            probe_timeout_secs: PROBE_TIMEOUT_SECS,
            start_in_auto: true,
        }
    }
}

impl RoutingConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub google_base_url: String,
    pub groq_base_url: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            google_base_url: GOOGLE_BASE_URL.to_string(),
            groq_base_url: GROQ_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Colored output
    pub color: bool,
    /// Entries shown by the history viewer
    pub history_limit: usize,
    /// Characters of each response shown by the history viewer
    pub preview_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl DisplayConfig {
    pub fn theme(&self) -> DisplayTheme {
        DisplayTheme::new(self.color)
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join(CONFIG_FILE_NAME);
    let local_config = PathBuf::from(format!(".{}/{}", CONFIG_DIR_NAME, CONFIG_FILE_NAME));

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    // NEUROLINK_ROUTING__GENERATION_TIMEOUT_SECS=60 and friends
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Load configuration from one explicit TOML file
pub fn load_config_from(path: &Path) -> Result<Config> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", CONFIG_DIR_NAME) {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join(CONFIG_FILE_NAME),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the path and whether a file was written.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let config_file = get_config_dir()?.join(CONFIG_FILE_NAME);

    if config_file.exists() {
        return Ok((config_file, false));
    }

    save_config(&Config::default(), Some(config_file.clone()))?;
    Ok((config_file, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(config.storage.record_path.is_none());
        assert_eq!(config.routing.generation_timeout(), Duration::from_secs(20));
        assert_eq!(config.routing.probe_timeout(), Duration::from_secs(5));
        assert!(config.routing.start_in_auto);
        assert_eq!(config.registry.models.len(), 8);
        assert_eq!(config.display.history_limit, 10);
    }

    #[test]
    fn test_saved_config_round_trips_through_figment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.routing.generation_timeout_secs = 45;
        config.display.color = false;
        save_config(&config, Some(path.clone())).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.routing.generation_timeout_secs, 45);
        assert!(!loaded.display.color);
        assert_eq!(loaded.registry, RegistryConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
record_path = "/tmp/neurolink-record.json"

[display]
history_limit = 3
"#,
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.storage.record_path,
            Some(PathBuf::from("/tmp/neurolink-record.json"))
        );
        assert_eq!(loaded.display.history_limit, 3);
        assert_eq!(loaded.display.preview_chars, 200);
        assert_eq!(loaded.routing.classifier_timeout_secs, 20);
    }
}
