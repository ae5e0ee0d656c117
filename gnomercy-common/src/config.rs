//! Configuration loading
//!
//! Root folder resolution priority (highest wins):
//! 1. Command line argument
//! 2. `GNOMERCY_ROOT_FOLDER` environment variable
//! 3. `root_folder` key in the TOML config file
//! 4. OS default data directory
//!
//! The root folder holds the SQLite database (`gnomercy.db`) and the served
//! image tree (`images/`). Runtime-tunable values live in the `settings`
//! table instead of the TOML file so they can change without a restart.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "GNOMERCY_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DB_FILE_NAME: &str = "gnomercy.db";

/// Image tree directory name inside the root folder
pub const IMAGES_DIR_NAME: &str = "images";

/// Per-service TOML configuration
///
/// Lives at `<config dir>/gnomercy/gnomercy-mc.toml`. Every field is
/// optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder for the database and images
    pub root_folder: Option<PathBuf>,
    /// API key for the review summarization collaborator
    pub gemini_api_key: Option<String>,
    /// Base URL of the identity provider
    pub identity_url: Option<String>,
}

impl TomlConfig {
    /// Location of the config file, when the OS exposes a config directory
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gnomercy").join("gnomercy-mc.toml"))
    }

    /// Load the config file from its default location
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load a config file from an explicit path; a missing file is empty
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// Resolve the root folder from the priority ladder
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        info!("Root folder from command line: {}", path.display());
        return path.to_path_buf();
    }

    if let Ok(value) = std::env::var(ROOT_FOLDER_ENV) {
        if !value.trim().is_empty() {
            info!("Root folder from {}: {}", ROOT_FOLDER_ENV, value);
            return PathBuf::from(value);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        info!("Root folder from config file: {}", path.display());
        return path.clone();
    }

    let default = default_root_folder();
    info!("Root folder defaulted to {}", default.display());
    default
}

/// OS default root folder: `<data dir>/gnomercy`
///
/// Falls back to the current directory on platforms without a data
/// directory convention.
pub fn default_root_folder() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("gnomercy"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Database file path inside a root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DB_FILE_NAME)
}

/// Image tree path inside a root folder
pub fn images_path(root: &Path) -> PathBuf {
    root.join(IMAGES_DIR_NAME)
}
