//! Group collapse state, stored apart from the configuration in ui_state.toml

use std::collections::BTreeMap;

use crate::config::ConfigManager;

/// Collapsed flags keyed by group id
///
/// Reads and writes are best effort: failures leave the in-memory state as is.
#[derive(Debug, Default)]
pub struct CollapseState {
    collapsed: BTreeMap<String, bool>,
    config_manager: Option<ConfigManager>,
}

impl CollapseState {
    /// Loads the state, starting empty if the file is missing or broken
    #[must_use]
    pub fn load(config_manager: ConfigManager) -> Self {
        let collapsed = config_manager.load_collapse_state().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Ignoring unreadable collapse state");
            BTreeMap::new()
        });
        Self {
            collapsed,
            config_manager: Some(config_manager),
        }
    }

    /// Creates a state that is never persisted
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Returns true if the group is collapsed
    #[must_use]
    pub fn is_collapsed(&self, group_id: &str) -> bool {
        self.collapsed.get(group_id).copied().unwrap_or(false)
    }

    /// Flips the group's flag, persists, and returns the new value
    pub fn toggle(&mut self, group_id: &str) -> bool {
        let flag = self.collapsed.entry(group_id.to_string()).or_insert(false);
        *flag = !*flag;
        let collapsed = *flag;
        self.persist();
        collapsed
    }

    /// All stored flags
    #[must_use]
    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.collapsed
    }

    fn persist(&self) {
        if let Some(manager) = &self.config_manager {
            if let Err(e) = manager.save_collapse_state(&self.collapsed) {
                tracing::debug!(error = %e, "Failed to save collapse state");
            }
        }
    }
}
