//! Profile store
//!
//! This module provides the `ProfileStore`, an ordered profile collection
//! with find/insert/update/remove semantics and explicit persistence
//! through `ConfigManager`.

use crate::config::{ConfigManager, ProfilesFile};
use crate::error::{StoreError, StoreResult};
use crate::models::{GroupDefinition, Profile};

use super::matching::same_target;

/// Ordered collection of profiles and custom group definitions
///
/// Mutations stay in memory until [`ProfileStore::save`] is called.
#[derive(Debug)]
pub struct ProfileStore {
    /// Profiles in store order
    profiles: Vec<Profile>,
    /// Custom group definitions
    groups: Vec<GroupDefinition>,
    /// Configuration manager for persistence; `None` for in-memory stores
    config_manager: Option<ConfigManager>,
}

impl ProfileStore {
    /// Loads the store from profiles.toml
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(config_manager: ConfigManager) -> StoreResult<Self> {
        let file = config_manager.load_profiles()?;
        Ok(Self {
            profiles: file.profiles,
            groups: file.groups,
            config_manager: Some(config_manager),
        })
    }

    /// Creates a store that lives only in memory
    #[must_use]
    pub fn in_memory(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            groups: Vec::new(),
            config_manager: None,
        }
    }

    /// Adds custom group definitions
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<GroupDefinition>) -> Self {
        self.groups = groups;
        self
    }

    /// Re-reads the backing file, replacing the in-memory state
    ///
    /// In-memory stores are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed; the in-memory state is
    /// kept in that case.
    pub fn reload(&mut self) -> StoreResult<()> {
        if let Some(manager) = &self.config_manager {
            let file = manager.load_profiles()?;
            self.profiles = file.profiles;
            self.groups = file.groups;
        }
        Ok(())
    }

    /// Writes the store to profiles.toml
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> StoreResult<()> {
        let Some(manager) = &self.config_manager else {
            return Ok(());
        };
        let file = ProfilesFile {
            groups: self.groups.clone(),
            profiles: self.profiles.clone(),
        };
        manager.save_profiles(&file)?;
        tracing::debug!(count = self.profiles.len(), "Profile store saved");
        Ok(())
    }

    /// Profiles in store order
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Custom group definitions
    #[must_use]
    pub fn groups(&self) -> &[GroupDefinition] {
        &self.groups
    }

    /// Display name of the custom group with `id`
    #[must_use]
    pub fn group_name(&self, id: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }

    /// Finds a profile by identifier
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id.as_deref() == Some(id))
    }

    /// Finds a profile by exact name
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Index of the stored entry corresponding to `profile`
    ///
    /// Matches by identifier when the snapshot has one; identifier-less
    /// snapshots fall back to comparing the connection target.
    #[must_use]
    pub fn position_of(&self, profile: &Profile) -> Option<usize> {
        match &profile.id {
            Some(id) => self.profiles.iter().position(|p| p.id.as_ref() == Some(id)),
            None => self.profiles.iter().position(|p| same_target(p, profile)),
        }
    }

    /// Appends a profile
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invalid` if the profile fails validation.
    pub fn insert(&mut self, profile: Profile) -> StoreResult<()> {
        ConfigManager::validate_profile(&profile).map_err(|e| StoreError::Invalid(e.to_string()))?;
        self.profiles.push(profile);
        Ok(())
    }

    /// Replaces the stored entry matching `profile`
    ///
    /// # Errors
    ///
    /// Returns an error if no entry matches or the profile is invalid.
    pub fn update(&mut self, profile: Profile) -> StoreResult<()> {
        ConfigManager::validate_profile(&profile).map_err(|e| StoreError::Invalid(e.to_string()))?;
        let idx = self
            .position_of(&profile)
            .ok_or_else(|| StoreError::NotFound(profile.name.clone()))?;
        self.profiles[idx] = profile;
        Ok(())
    }

    /// Replaces the entry at `idx`
    pub(crate) fn replace_at(&mut self, idx: usize, profile: Profile) {
        self.profiles[idx] = profile;
    }

    /// Removes the stored entry matching `profile`
    ///
    /// Builtin entries are never removed, whatever the snapshot says.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Builtin` for builtin profiles and
    /// `StoreError::NotFound` when nothing matches.
    pub fn remove(&mut self, profile: &Profile) -> StoreResult<Profile> {
        if profile.is_builtin {
            return Err(StoreError::Builtin(profile.name.clone()));
        }
        let idx = self
            .position_of(profile)
            .ok_or_else(|| StoreError::NotFound(profile.name.clone()))?;
        if self.profiles[idx].is_builtin {
            return Err(StoreError::Builtin(self.profiles[idx].name.clone()));
        }
        Ok(self.profiles.remove(idx))
    }

    /// Adds or renames a custom group definition
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invalid` if the definition fails validation.
    pub fn upsert_group(&mut self, group: GroupDefinition) -> StoreResult<()> {
        ConfigManager::validate_group(&group).map_err(|e| StoreError::Invalid(e.to_string()))?;
        match self.groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => existing.name = group.name,
            None => self.groups.push(group),
        }
        Ok(())
    }

    /// Returns the number of profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the store holds no profiles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_store() -> ProfileStore {
        let mut builtin = Profile::new_ssh("local", "localhost").with_id("builtin-1");
        builtin.is_builtin = true;
        ProfileStore::in_memory(vec![
            Profile::new_ssh("web", "10.0.0.1").with_id("p1"),
            Profile::new_telnet("switch", "10.0.0.2"),
            builtin,
        ])
    }

    #[test]
    fn test_find_and_position() {
        let store = sample_store();
        assert_eq!(store.find("p1").unwrap().name, "web");
        assert!(store.find("missing").is_none());
        assert_eq!(store.position_of(&Profile::new_telnet("switch", " 10.0.0.2 ")), Some(1));
        assert_eq!(store.position_of(&Profile::new_telnet("switch", "10.0.0.3")), None);
    }

    #[test]
    fn test_remove_refuses_builtin() {
        let mut store = sample_store();
        let mut snapshot = store.find("builtin-1").unwrap().clone();
        assert!(matches!(store.remove(&snapshot), Err(StoreError::Builtin(_))));

        // A stale snapshot claiming non-builtin still cannot remove it
        snapshot.is_builtin = false;
        assert!(matches!(store.remove(&snapshot), Err(StoreError::Builtin(_))));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_remove_by_id_and_structure() {
        let mut store = sample_store();
        store.remove(&Profile::new_ssh("renamed", "x").with_id("p1")).unwrap();
        store.remove(&Profile::new_telnet("switch", "10.0.0.2")).unwrap();
        assert_eq!(store.len(), 1);
        assert!(matches!(
            store.remove(&Profile::new_ssh("ghost", "h")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_insert_validates() {
        let mut store = ProfileStore::in_memory(Vec::new());
        assert!(store.insert(Profile::new_ssh(" ", "h")).is_err());
        store.insert(Profile::new_ssh("a", "h")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_groups() {
        let mut store = ProfileStore::in_memory(Vec::new())
            .with_groups(vec![GroupDefinition::new("ops", "Operations")]);
        assert_eq!(store.group_name("ops"), Some("Operations"));
        store
            .upsert_group(GroupDefinition::new("ops", "Ops Team"))
            .unwrap();
        store.upsert_group(GroupDefinition::new("dev", "Dev")).unwrap();
        assert_eq!(store.group_name("ops"), Some("Ops Team"));
        assert_eq!(store.groups().len(), 2);
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path().to_path_buf());

        let mut store = ProfileStore::load(manager.clone()).unwrap();
        assert!(store.is_empty());
        store.insert(Profile::new_rdp("desk", "10.0.0.5").with_id("r1")).unwrap();
        store.save().unwrap();

        let mut other = ProfileStore::load(manager).unwrap();
        assert_eq!(other.find("r1").unwrap().name, "desk");

        store.insert(Profile::new_ssh("web", "h")).unwrap();
        store.save().unwrap();
        other.reload().unwrap();
        assert_eq!(other.len(), 2);
    }
}
