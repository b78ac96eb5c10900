pub mod parser;
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    /// Staleness and subprocess limits
    #[serde(default)]
    pub scan: ScanConfig,

    /// Content name resolution on the command line
    #[serde(default)]
    pub names: NamesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreConfig {
    #[serde(default = "default_content_path")]
    pub content_path: PathBuf,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// How long a VCS or integrity check stays fresh, e.g. `"1h"`
    #[serde(default = "default_update_interval")]
    pub update_interval: String,
    /// Upper bound for a single VCS command, e.g. `"2m"`
    #[serde(default = "default_command_timeout")]
    pub command_timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamesConfig {
    /// Replace unknown names with their closest match instead of dropping them
    #[serde(default = "default_assume")]
    pub assume: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            content_path: default_content_path(),
            cache_path: default_cache_path(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            update_interval: default_update_interval(),
            command_timeout: default_command_timeout(),
        }
    }
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            assume: default_assume(),
        }
    }
}

impl Config {
    /// Load configuration from a file, writing the defaults there first if it
    /// does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - A duration field is malformed or zero
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Parsed `scan.update_interval`
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration.
    pub fn update_interval(&self) -> Result<Duration> {
        parse_duration("scan.update_interval", &self.scan.update_interval)
    }

    /// Parsed `scan.command_timeout`
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration.
    pub fn command_timeout(&self) -> Result<Duration> {
        parse_duration("scan.command_timeout", &self.scan.command_timeout)
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).with_context(|| format!("Invalid duration for {key}: {value:?}"))
}

// Default functions for serde
fn default_content_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join("Content")
}

fn default_cache_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(crate::DEFAULT_CACHE_PATH)
}

fn default_update_interval() -> String {
    humantime::format_duration(crate::UPDATE_INTERVAL).to_string()
}

fn default_command_timeout() -> String {
    "2m".to_string()
}

const fn default_assume() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.update_interval().unwrap(), Duration::from_secs(3600));
        assert_eq!(config.command_timeout().unwrap(), Duration::from_secs(120));
        assert!(config.names.assume);
        assert!(config.core.content_path.ends_with("Content"));
        assert!(config.core.cache_path.ends_with("rserv/cache.bin"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");

        let config = Config::load(&path).unwrap();

        assert!(path.exists());
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[scan]\nupdate_interval = \"30m\"\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.update_interval().unwrap(), Duration::from_secs(1800));
        assert_eq!(config.scan.command_timeout, "2m");
        assert!(config.names.assume);
    }
}
