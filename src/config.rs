use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::store::SortKey;

const CONFIG_FILE_NAME: &str = "config.json";

/// Resolved configuration for a console session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_sort_key: String,
    pub show_banner: bool,
}

impl AppConfig {
    /// Resolve the stored file, the `DESKQ_DEFAULT_SORT` override, and the
    /// built-in defaults, in that order of precedence (env wins).
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;

        let default_sort_key = env::var("DESKQ_DEFAULT_SORT")
            .ok()
            .or(stored.default_sort_key)
            .unwrap_or_else(|| "priority".to_string());
        SortKey::parse(&default_sort_key).map_err(|_| {
            AppError::Configuration(format!("invalid default sort key '{default_sort_key}'"))
        })?;

        Ok(Self {
            default_sort_key,
            show_banner: stored.show_banner.unwrap_or(true),
        })
    }
}

/// On-disk configuration, all fields optional.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub default_sort_key: Option<String>,
    pub show_banner: Option<bool>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<StoredConfig>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid config file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Ok(dir) = env::var("DESKQ_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = env::var("HOME")
        .map_err(|_| AppError::Configuration("cannot determine home directory".to_string()))?;
    Ok(PathBuf::from(home).join(".config").join("deskq"))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
