//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `MTA_ROOT`
//! 3. `root_folder` key in the module's TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is not an error: defaults apply. A config file that
//! exists but does not parse is a `Config` error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "MTA_ROOT";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "MTA_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "magic_tricks.db";

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fields of the TOML config shared by every module
///
/// Module-specific sections live in the same file and are parsed by the
/// module itself; unknown keys are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compiled fallback values for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
        }
    }
}

fn default_root_folder() -> PathBuf {
    // ~/.local/share/mta, ~/Library/Application Support/mta, %LOCALAPPDATA%\mta
    dirs::data_local_dir()
        .map(|d| d.join("mta"))
        .unwrap_or_else(|| PathBuf::from("./mta_data"))
}

/// Default location of a module's config file
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mta").join(format!("{}.toml", module_name)))
}

/// Locate the config file: explicit path → `MTA_CONFIG` → platform default
pub fn locate_config_file(module_name: &str, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    default_config_path(module_name)
}

/// Parse a TOML file into `T`, falling back to `T::default()` when the file is absent
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        return Ok(T::default());
    };

    if !path.exists() {
        debug!("Config file {} not found, using defaults", path.display());
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Write a config struct as TOML, creating parent directories
pub fn write_toml_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Resolves the root folder using the documented priority order
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_path: None,
        }
    }

    /// Command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Explicit config file (otherwise `locate_config_file` decides)
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Config file this resolver reads for priority 3
    pub fn config_path(&self) -> Option<PathBuf> {
        locate_config_file(&self.module_name, self.config_path.as_deref())
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        match load_toml_or_default::<TomlConfig>(self.config_path().as_deref()) {
            Ok(TomlConfig {
                root_folder: Some(root),
                ..
            }) => return root,
            Ok(_) => {}
            Err(e) => warn!("Ignoring unreadable config for root folder: {}", e),
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Ensures the root folder exists and names the files inside it
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
