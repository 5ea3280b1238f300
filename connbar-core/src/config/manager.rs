//! Configuration manager for TOML file operations
//!
//! This module provides the `ConfigManager` which handles loading and saving
//! the profile store, sidebar settings, collapse state and recency list.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{GroupDefinition, Profile, RecentList};

use super::settings::AppSettings;

/// File names for configuration files
const PROFILES_FILE: &str = "profiles.toml";
const CONFIG_FILE: &str = "config.toml";
const UI_STATE_FILE: &str = "ui_state.toml";
const RECENT_FILE: &str = "recent.toml";

/// Contents of the profile store file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilesFile {
    /// Custom group definitions
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
    /// Profiles in store order
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Wrapper for serializing the collapse state map
#[derive(Debug, Default, Serialize, Deserialize)]
struct UiStateFile {
    #[serde(default)]
    collapsed: BTreeMap<String, bool>,
}

/// Configuration manager for ConnBar
///
/// Handles loading and saving configuration files in TOML format.
/// Configuration is stored in `~/.config/connbar/` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Base directory for configuration files
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new `ConfigManager` with the default configuration directory
    ///
    /// # Errors
    ///
    /// Returns an error if the platform configuration directory cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound(PathBuf::from("~/.config")))?
            .join("connbar");
        Ok(Self { config_dir })
    }

    /// Creates a new `ConfigManager` with a custom configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensures the configuration directory exists
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ConfigError::Write(format!(
                    "Failed to create config directory {}: {}",
                    self.config_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    // ========== Profiles ==========

    /// Loads profiles and group definitions
    ///
    /// Returns an empty store if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_profiles(&self) -> ConfigResult<ProfilesFile> {
        Self::load_toml_file(&self.config_dir.join(PROFILES_FILE))
    }

    /// Saves profiles and group definitions
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_profiles(&self, store: &ProfilesFile) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        Self::save_toml_file(&self.config_dir.join(PROFILES_FILE), store)
    }

    // ========== Application Settings ==========

    /// Loads sidebar settings, falling back to defaults if the file is missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        Self::load_toml_file(&self.config_dir.join(CONFIG_FILE))
    }

    /// Saves sidebar settings
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        Self::save_toml_file(&self.config_dir.join(CONFIG_FILE), settings)
    }

    // ========== UI State ==========

    /// Loads the group collapse map
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_collapse_state(&self) -> ConfigResult<BTreeMap<String, bool>> {
        Self::load_toml_file::<UiStateFile>(&self.config_dir.join(UI_STATE_FILE))
            .map(|f| f.collapsed)
    }

    /// Saves the group collapse map
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_collapse_state(&self, collapsed: &BTreeMap<String, bool>) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let file = UiStateFile {
            collapsed: collapsed.clone(),
        };
        Self::save_toml_file(&self.config_dir.join(UI_STATE_FILE), &file)
    }

    // ========== Recency ==========

    /// Loads the most-recently-used list
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_recent(&self) -> ConfigResult<RecentList> {
        Self::load_toml_file(&self.config_dir.join(RECENT_FILE))
    }

    /// Saves the most-recently-used list
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_recent(&self, recent: &RecentList) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        Self::save_toml_file(&self.config_dir.join(RECENT_FILE), recent)
    }

    // ========== Generic TOML Operations ==========

    fn load_toml_file<T>(path: &Path) -> ConfigResult<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        if !path.exists() {
            return Ok(T::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| {
            ConfigError::Deserialize(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn save_toml_file<T>(path: &Path, data: &T) -> ConfigResult<()>
    where
        T: Serialize,
    {
        let content = toml::to_string_pretty(data)
            .map_err(|e| ConfigError::Serialize(format!("Failed to serialize: {e}")))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::Write(format!("Failed to write {}: {}", path.display(), e)))
    }

    // ========== Validation ==========

    /// Validates a profile before it is written to the store
    ///
    /// Only the name is mandatory; profiles without a host are stored but
    /// never shown in the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid.
    pub fn validate_profile(profile: &Profile) -> ConfigResult<()> {
        if profile.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "name".to_string(),
                reason: "Profile name cannot be empty".to_string(),
            });
        }
        if profile.options.host.contains(['\r', '\n']) {
            return Err(ConfigError::Validation {
                field: "host".to_string(),
                reason: "Host cannot contain line breaks".to_string(),
            });
        }
        Ok(())
    }

    /// Validates a custom group definition
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is invalid.
    pub fn validate_group(group: &GroupDefinition) -> ConfigResult<()> {
        if group.id.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "id".to_string(),
                reason: "Group id cannot be empty".to_string(),
            });
        }
        if group.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "name".to_string(),
                reason: "Group name cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Validates every profile, returning the index and error of each failure
    #[must_use]
    pub fn validate_profiles(profiles: &[Profile]) -> Vec<(usize, ConfigError)> {
        profiles
            .iter()
            .enumerate()
            .filter_map(|(i, p)| Self::validate_profile(p).err().map(|e| (i, e)))
            .collect()
    }
}
