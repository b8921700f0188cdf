use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{RecallError, Result};

/// File name of the notes collection inside the data directory.
pub const NOTES_FILE: &str = "notes.json";

/// File name of the tag registry inside the data directory.
pub const TAGS_FILE: &str = "tags.json";

/// Optional settings file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory where the note and tag collections are stored
    pub data_dir: PathBuf,

    /// Directory for backup archives
    pub backup_dir: PathBuf,

    /// Maximum number of backup archives to keep (0 keeps all)
    pub max_backups: u32,

    /// Whether to snapshot a backup after every successful save
    pub auto_backup: bool,
}

/// Overridable settings read from `config.json`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    backup_dir: Option<PathBuf>,
    max_backups: Option<u32>,
    auto_backup: Option<bool>,
}

impl Config {
    /// Resolves the effective configuration.
    ///
    /// The data directory comes from the CLI override or the platform data
    /// dir. Settings in `config.json` under that directory override the
    /// defaults; CLI flags are applied by the caller on top of the result.
    pub fn resolve(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir_override {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "recaller")
                .map(|dirs| dirs.data_local_dir().to_path_buf())
                .ok_or_else(|| RecallError::ConfigError {
                    message: "Could not determine a platform data directory".to_string(),
                })?,
        };

        let file = Self::load_config_file(&data_dir)?;

        Ok(Config {
            backup_dir: file
                .backup_dir
                .unwrap_or_else(|| data_dir.join("backups")),
            max_backups: file.max_backups.unwrap_or(5),
            auto_backup: file.auto_backup.unwrap_or(false),
            data_dir,
        })
    }

    fn load_config_file(data_dir: &Path) -> Result<ConfigFile> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(ConfigFile::default());
        }

        debug!("Loading settings from {}", path.display());
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| RecallError::ConfigError {
            message: format!("Invalid settings file {}: {}", path.display(), e),
        })
    }

    /// Path of the persisted notes collection.
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(NOTES_FILE)
    }

    /// Path of the persisted tag registry.
    pub fn tags_path(&self) -> PathBuf {
        self.data_dir.join(TAGS_FILE)
    }
}
