use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults applied by the CLI when no flags are given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Format spec used when none is passed on the command line
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Bits per byte for bit/byte conversions
    #[serde(default = "default_word_length")]
    pub word_length: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            word_length: default_word_length(),
        }
    }
}

fn default_format() -> String {
    String::from("a")
}

fn default_word_length() -> u32 {
    8
}

impl Config {
    /// Load config from file, or fall back to defaults if it doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("datasize").join("config.toml")
        } else {
            PathBuf::from(".datasize.toml")
        }
    }

    /// Create config directory if it doesn't exist
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_path = Self::default_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_save_load() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        let config = Config {
            default_format: String::from(".2I"),
            word_length: 16,
        };

        config.save(&config_path).unwrap();

        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded.default_format, ".2I");
        assert_eq!(loaded.word_length, 16);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_format, "a");
        assert_eq!(config.word_length, 8);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_or_default(temp.path().join("missing.toml")).unwrap();
        assert_eq!(config.word_length, 8);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "default_format = \"m\"\n").unwrap();

        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded.default_format, "m");
        assert_eq!(loaded.word_length, 8);
    }
}
