//! Owning service for the sidebar configuration
//!
//! `SettingsService` is the only writer of `SidebarConfig`. Components get a
//! cloned handle at construction, read through accessors and write through
//! [`SettingsService::update`]. Writes are persisted after a quiet period so
//! a burst of field changes costs a single file write.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ConfigResult;
use crate::scheduler::Debouncer;

use super::manager::ConfigManager;
use super::settings::{AppSettings, GroupBy, HotkeySettings, ProtocolFilter, SidebarConfig, SortMode};

/// Quiet period before a configuration change is written to disk
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(200);

struct Inner {
    settings: Mutex<AppSettings>,
    manager: Option<ConfigManager>,
    saver: Debouncer,
}

impl Inner {
    fn settings(&self) -> MutexGuard<'_, AppSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self) -> ConfigResult<()> {
        let Some(manager) = &self.manager else {
            return Ok(());
        };
        let snapshot = self.settings().clone();
        manager.save_settings(&snapshot)
    }

    fn persist_logged(&self) {
        match self.persist() {
            Ok(()) => debug!("Sidebar configuration saved"),
            Err(e) => warn!(error = %e, "Failed to save sidebar configuration"),
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // The debounced action only holds a weak handle, so save directly
        if self.saver.is_pending() {
            self.saver.cancel();
            self.persist_logged();
        }
    }
}

/// Shared handle to the sidebar configuration
#[derive(Clone)]
pub struct SettingsService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("settings", &*self.inner.settings())
            .field("persistent", &self.inner.manager.is_some())
            .finish()
    }
}

impl SettingsService {
    /// Loads settings through `manager` and persists changes back to it
    ///
    /// # Errors
    ///
    /// Returns an error if config.toml exists but cannot be parsed.
    pub fn load(manager: ConfigManager) -> ConfigResult<Self> {
        let settings = manager.load_settings()?;
        Ok(Self::build(settings, Some(manager)))
    }

    /// Creates a service that never touches the filesystem
    #[must_use]
    pub fn in_memory(settings: AppSettings) -> Self {
        Self::build(settings, None)
    }

    fn build(settings: AppSettings, manager: Option<ConfigManager>) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings: Mutex::new(settings),
                manager,
                saver: Debouncer::new(SAVE_DEBOUNCE),
            }),
        }
    }

    /// Snapshot of the sidebar configuration
    #[must_use]
    pub fn sidebar(&self) -> SidebarConfig {
        self.inner.settings().sidebar.clone()
    }

    /// Snapshot of the hotkey bindings
    #[must_use]
    pub fn hotkeys(&self) -> HotkeySettings {
        self.inner.settings().hotkeys.clone()
    }

    /// Reads the sidebar configuration without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&SidebarConfig) -> R) -> R {
        f(&self.inner.settings().sidebar)
    }

    /// Current sort mode
    #[must_use]
    pub fn sort_by(&self) -> SortMode {
        self.read(|c| c.sort_by)
    }

    /// Current protocol filter
    #[must_use]
    pub fn protocol_filter(&self) -> ProtocolFilter {
        self.read(|c| c.protocol_filter)
    }

    /// Current grouping mode
    #[must_use]
    pub fn group_by(&self) -> GroupBy {
        self.read(|c| c.group_by)
    }

    /// Identifiers of pinned profiles
    #[must_use]
    pub fn pinned_profiles(&self) -> Vec<String> {
        self.read(|c| c.pinned_profiles.clone())
    }

    /// Returns true if `id` is pinned
    #[must_use]
    pub fn is_pinned(&self, id: &str) -> bool {
        self.read(|c| c.is_pinned(id))
    }

    /// Resolved external RDP client path
    #[must_use]
    pub fn rdp_client(&self) -> PathBuf {
        self.read(SidebarConfig::rdp_client)
    }

    /// Applies `f` to the sidebar configuration and schedules a save
    pub fn update<R>(&self, f: impl FnOnce(&mut SidebarConfig) -> R) -> R {
        let result = f(&mut self.inner.settings().sidebar);
        self.schedule_save();
        result
    }

    /// Replaces the hotkey bindings and schedules a save
    pub fn set_hotkeys(&self, hotkeys: HotkeySettings) {
        self.inner.settings().hotkeys = hotkeys;
        self.schedule_save();
    }

    /// Flips sidebar visibility, returning the new state
    pub fn toggle_sidebar(&self) -> bool {
        self.update(|c| {
            c.sidebar_visible = !c.sidebar_visible;
            c.sidebar_visible
        })
    }

    /// Returns true if a change is waiting to be written
    #[must_use]
    pub fn has_pending_save(&self) -> bool {
        self.inner.saver.is_pending()
    }

    /// Writes any pending change immediately
    pub fn flush(&self) {
        self.inner.saver.flush();
    }

    /// Cancels any pending write and saves synchronously
    ///
    /// # Errors
    ///
    /// Returns an error if config.toml cannot be written.
    pub fn save_now(&self) -> ConfigResult<()> {
        self.inner.saver.cancel();
        self.inner.persist()
    }

    fn schedule_save(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.saver.call(move || {
            if let Some(inner) = weak.upgrade() {
                inner.persist_logged();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn persistent() -> (SettingsService, ConfigManager, TempDir) {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path().to_path_buf());
        let service = SettingsService::load(manager.clone()).unwrap();
        (service, manager, temp)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_updates_coalesce_into_one_write() {
        let (service, manager, _temp) = persistent();

        service.update(|c| c.sort_by = SortMode::Host);
        service.update(|c| c.group_by = GroupBy::Protocol);
        assert!(service.has_pending_save());
        assert_eq!(manager.load_settings().unwrap(), AppSettings::default());

        tokio::time::sleep(SAVE_DEBOUNCE + Duration::from_millis(50)).await;
        let saved = manager.load_settings().unwrap();
        assert_eq!(saved.sidebar.sort_by, SortMode::Host);
        assert_eq!(saved.sidebar.group_by, GroupBy::Protocol);
        assert!(!service.has_pending_save());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately() {
        let (service, manager, _temp) = persistent();
        service.update(|c| c.pinned_profiles.push("p1".to_string()));
        service.flush();
        assert_eq!(
            manager.load_settings().unwrap().sidebar.pinned_profiles,
            vec!["p1".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_last_handle_saves_pending_change() {
        let (service, manager, _temp) = persistent();
        let clone = service.clone();
        clone.update(|c| c.width = 320);
        drop(clone);
        assert!(service.has_pending_save());
        drop(service);
        assert_eq!(manager.load_settings().unwrap().sidebar.width, 320);
    }

    #[test]
    fn test_toggle_and_accessors() {
        let service = SettingsService::in_memory(AppSettings::default());
        assert!(service.read(|c| c.sidebar_visible));
        assert!(!service.toggle_sidebar());
        assert!(service.toggle_sidebar());
        assert_eq!(service.protocol_filter(), ProtocolFilter::Ssh);
        assert!(!service.is_pinned("x"));
        service.update(|c| c.pinned_profiles.push("x".to_string()));
        assert!(service.is_pinned("x"));
        assert_eq!(service.rdp_client(), PathBuf::from("mstsc.exe"));
    }
}
