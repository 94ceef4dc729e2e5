//! User preferences read from `~/.photo-batch-renamer/config.toml`.
//!
//! A missing file or unparsable TOML yields the defaults so a broken config
//! never keeps the renamer from starting.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::controller::DEFAULT_MAX_FILES;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".photo-batch-renamer";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_DIR_NAME: &str = "logs";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on files accepted by one intake.
    pub max_files: usize,
    /// Where archives are saved; the Downloads folder when unset.
    pub download_dir: Option<PathBuf>,
    /// Fallback filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            download_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Root of everything the renamer writes outside the download folder.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub fn log_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_DIR_NAME))
}

/// Load the user's config. On first run the defaults are written out so
/// there is a file to edit.
pub fn load() -> Result<Config> {
    let path = data_dir()?.join(CONFIG_FILE_NAME);
    if path.exists() {
        return load_from_path(&path);
    }

    let config = Config::default();
    if let Err(err) = save_to_path(&config, &path) {
        warn!(path = %path.display(), error = %err, "could not write default config");
    }
    Ok(config)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut config = match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid config, using defaults");
            Config::default()
        }
    };
    if config.max_files == 0 {
        warn!("max_files must be positive, using default");
        config.max_files = DEFAULT_MAX_FILES;
    }
    Ok(config)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    let content = toml::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_allow_fifteen_files() {
        let config = Config::default();
        assert_eq!(config.max_files, 15);
        assert!(config.download_dir.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "download_dir = \"/srv/out\"\n").unwrap();

        let config = load_from_path(&path).expect("config should load");
        assert_eq!(config.download_dir, Some(PathBuf::from("/srv/out")));
        assert_eq!(config.max_files, DEFAULT_MAX_FILES);
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = valid = toml").unwrap();

        assert_eq!(load_from_path(&path).unwrap(), Config::default());
    }

    #[test]
    fn zero_limit_is_replaced() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_files = 0\n").unwrap();

        assert_eq!(load_from_path(&path).unwrap().max_files, DEFAULT_MAX_FILES);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("deep").join("config.toml");
        let config = Config {
            max_files: 30,
            download_dir: Some(PathBuf::from("/tmp/zips")),
            log_level: "debug".into(),
        };

        save_to_path(&config, &path).expect("save should create directories");
        assert_eq!(load_from_path(&path).unwrap(), config);
    }
}
