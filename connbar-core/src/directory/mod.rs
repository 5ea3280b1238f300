//! Connection directory
//!
//! `ConnectionDirectory` projects the profile store into sorted, filtered
//! and grouped lists, keeps the search index and description cache, and
//! carries out the per-profile actions (pin, duplicate, delete, launch,
//! copy). User-facing actions report failures through the [`Notifier`]
//! and return plain outcomes.

mod collaborators;
mod collapse;
mod grouping;
mod search;
mod sort;

pub use collaborators::{
    Clipboard, CollectingNotifier, ConfirmRequest, Confirmation, FixedConfirmation, LogNotifier,
    MemoryClipboard, NoTerminal, Notification, NotificationLevel, Notifier, RecencyTracker,
    RecentProfiles, SessionOpener,
};
pub use collapse::CollapseState;
pub use grouping::{build_groups, protocol_group_id, GroupingOptions};
pub use search::SearchIndex;
pub use sort::{compare_names, sort_profiles};

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::{ConfigManager, GroupBy, ProtocolFilter, SettingsService, SortMode};
use crate::connection::ProfileStore;
use crate::error::{Result, StoreError};
use crate::models::{Profile, ProfileGroup, ProtocolType, RecentList};
use crate::protocol::{normalize_options, render_descriptor, ProtocolRegistry};
use crate::session::{ActiveSessions, LaunchOutcome, RdpLauncher, SessionRegistry};

/// Label of the confirming button in the delete dialog
pub const DELETE_BUTTON: &str = "Delete";

/// Label of the cancel button in the delete dialog
pub const CANCEL_BUTTON: &str = "Cancel";

/// Result of a delete request
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The profile was removed and the store saved
    Deleted(Profile),
    /// The user chose not to delete
    Declined,
    /// Builtin profiles are never removed
    Refused,
    /// Removal or saving failed; the notifier has the details
    Failed,
}

/// Result of a launch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStatus {
    /// A client or session was started
    Launched,
    /// A repeated launch of the same target was ignored
    Suppressed,
    /// Nothing was started; the notifier has the details
    Failed,
}

/// Sorted, filtered and grouped view of the profile store
pub struct ConnectionDirectory {
    store: ProfileStore,
    settings: SettingsService,
    collapse: CollapseState,
    registry: ProtocolRegistry,
    launcher: RdpLauncher,
    recent: Box<dyn RecentProfiles>,
    sessions: Box<dyn SessionRegistry>,
    confirmation: Box<dyn Confirmation>,
    notifier: Box<dyn Notifier>,
    clipboard: Box<dyn Clipboard>,
    opener: Box<dyn SessionOpener>,
    /// Eligible profiles in store order
    profiles: Vec<Profile>,
    groups: Vec<ProfileGroup>,
    search: SearchIndex,
}

impl fmt::Debug for ConnectionDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDirectory")
            .field("profiles", &self.profiles.len())
            .field("groups", &self.groups.len())
            .field("search_term", &self.search.term())
            .field("launcher", &self.launcher)
            .finish_non_exhaustive()
    }
}

impl ConnectionDirectory {
    /// Creates a directory over `store` and `settings` with in-process collaborators
    ///
    /// The projection is empty until [`ConnectionDirectory::refresh`] runs.
    #[must_use]
    pub fn new(store: ProfileStore, settings: SettingsService) -> Self {
        let launcher = RdpLauncher::new(settings.rdp_client());
        Self {
            store,
            settings,
            collapse: CollapseState::in_memory(),
            registry: ProtocolRegistry::new(),
            launcher,
            recent: Box::new(RecencyTracker::in_memory(RecentList::new())),
            sessions: Box::new(ActiveSessions::new()),
            confirmation: Box::new(FixedConfirmation::Decline),
            notifier: Box::new(LogNotifier),
            clipboard: Box::new(MemoryClipboard::new()),
            opener: Box::new(NoTerminal),
            profiles: Vec::new(),
            groups: Vec::new(),
            search: SearchIndex::default(),
        }
    }

    /// Opens the directory backed by the files under `manager`'s directory
    ///
    /// # Errors
    ///
    /// Returns an error if profiles.toml or config.toml exist but cannot be
    /// parsed.
    pub fn open(manager: ConfigManager) -> Result<Self> {
        let store = ProfileStore::load(manager.clone())?;
        let settings = SettingsService::load(manager.clone())?;
        let mut directory = Self::new(store, settings)
            .with_collapse_state(CollapseState::load(manager.clone()))
            .with_recent(Box::new(RecencyTracker::load(manager)));
        directory.refresh();
        Ok(directory)
    }

    /// Replaces the collapse-state store
    #[must_use]
    pub fn with_collapse_state(mut self, collapse: CollapseState) -> Self {
        self.collapse = collapse;
        self
    }

    /// Replaces the RDP launcher
    #[must_use]
    pub fn with_launcher(mut self, launcher: RdpLauncher) -> Self {
        self.launcher = launcher;
        self
    }

    /// Replaces the recency service
    #[must_use]
    pub fn with_recent(mut self, recent: Box<dyn RecentProfiles>) -> Self {
        self.recent = recent;
        self
    }

    /// Replaces the open-session source
    #[must_use]
    pub fn with_sessions(mut self, sessions: Box<dyn SessionRegistry>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Replaces the confirmation dialog
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: Box<dyn Confirmation>) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Replaces the notification sink
    #[must_use]
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the clipboard
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Replaces the terminal session opener
    #[must_use]
    pub fn with_opener(mut self, opener: Box<dyn SessionOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Underlying profile store
    #[must_use]
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Mutable access to the store; call [`ConnectionDirectory::refresh`] after saving
    pub fn store_mut(&mut self) -> &mut ProfileStore {
        &mut self.store
    }

    /// Shared settings handle
    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    /// The RDP launcher
    #[must_use]
    pub fn launcher(&self) -> &RdpLauncher {
        &self.launcher
    }

    /// Eligible profiles in store order
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Current group projection
    #[must_use]
    pub fn groups(&self) -> &[ProfileGroup] {
        &self.groups
    }

    /// Reloads the store and rebuilds every derived structure
    ///
    /// A store that fails to reload leaves the directory empty.
    pub fn refresh(&mut self) {
        match self.store.reload() {
            Ok(()) => {
                self.profiles = self
                    .store
                    .profiles()
                    .iter()
                    .filter(|p| p.is_eligible())
                    .cloned()
                    .collect();
            }
            Err(e) => {
                warn!(error = %e, "Failed to reload profiles");
                self.profiles.clear();
            }
        }
        self.search.rebuild(&self.profiles, &self.registry);
        self.rebuild_groups();
        debug!(
            profiles = self.profiles.len(),
            groups = self.groups.len(),
            "Directory refreshed"
        );
    }

    /// Rebuilds the group projection from the current profile set
    pub fn rebuild_groups(&mut self) {
        let mut sorted = self.profiles.clone();
        let recent = self.recent.recent_ids();
        sort_profiles(&mut sorted, self.settings.sort_by(), &recent, |p| {
            self.is_active_connection(p)
        });

        let pinned = self.settings.pinned_profiles();
        let store = &self.store;
        let group_name = |id: &str| store.group_name(id).map(str::to_string);
        let groups = build_groups(
            &sorted,
            &GroupingOptions {
                filter: self.settings.protocol_filter(),
                group_by: self.settings.group_by(),
                pinned: &pinned,
                group_name: &group_name,
                collapsed: self.collapse.flags(),
            },
        );
        self.groups = groups;
    }

    /// Sets the search term; an empty term shows everything
    pub fn set_search_term(&mut self, term: &str) {
        self.search.set_term(term);
    }

    /// Active search term, lowercased
    #[must_use]
    pub fn search_term(&self) -> &str {
        self.search.term()
    }

    /// Returns true if the profile matches the search term
    #[must_use]
    pub fn is_profile_visible(&self, profile: &Profile) -> bool {
        self.search.matches(profile)
    }

    /// Returns true if any member of the group matches the search term
    #[must_use]
    pub fn is_group_visible(&self, group: &ProfileGroup) -> bool {
        group.profiles.iter().any(|p| self.is_profile_visible(p))
    }

    /// Number of group members matching the search term
    #[must_use]
    pub fn visible_count(&self, group: &ProfileGroup) -> usize {
        group
            .profiles
            .iter()
            .filter(|p| self.is_profile_visible(p))
            .count()
    }

    /// Returns true if any group has a visible profile
    #[must_use]
    pub fn has_visible_profiles(&self) -> bool {
        self.groups.iter().any(|g| self.is_group_visible(g))
    }

    /// One-line summary of the profile's target
    #[must_use]
    pub fn description(&self, profile: &Profile) -> String {
        match self.search.description(profile) {
            Some(cached) => cached.to_string(),
            None => self.registry.describe(profile),
        }
    }

    /// Returns true if a session for the profile is open
    ///
    /// Profiles without an identifier are never active. RDP profiles also
    /// count as active for an hour after a launch.
    #[must_use]
    pub fn is_active_connection(&self, profile: &Profile) -> bool {
        let Some(id) = profile.id.as_deref() else {
            return false;
        };
        self.sessions.is_profile_open(id)
            || (profile.protocol == ProtocolType::Rdp && self.launcher.is_active(profile))
    }

    /// Returns true if the profile is pinned
    #[must_use]
    pub fn is_pinned(&self, profile: &Profile) -> bool {
        profile
            .id
            .as_deref()
            .is_some_and(|id| self.settings.is_pinned(id))
    }

    /// Connection count for the active protocol filter
    #[must_use]
    pub fn summary(&self) -> String {
        let filter = self.settings.protocol_filter();
        let shown: Vec<&Profile> = self
            .profiles
            .iter()
            .filter(|p| filter.matches(&p.protocol))
            .collect();
        let total = shown.len();
        let active = shown
            .iter()
            .filter(|p| self.is_active_connection(p))
            .count();
        if active == 0 {
            format!("{total} connection{}", if total == 1 { "" } else { "s" })
        } else {
            format!("{total} connections ({active} active)")
        }
    }

    /// Pins the profile; returns false if it has no identifier or is already pinned
    pub fn pin(&mut self, profile: &Profile) -> bool {
        let Some(id) = profile.id.clone() else {
            return false;
        };
        let added = self.settings.update(|cfg| {
            if cfg.is_pinned(&id) {
                false
            } else {
                cfg.pinned_profiles.push(id);
                true
            }
        });
        if added {
            self.rebuild_groups();
        }
        added
    }

    /// Unpins the profile; returns false if it has no identifier
    pub fn unpin(&mut self, profile: &Profile) -> bool {
        let Some(id) = profile.id.as_deref() else {
            return false;
        };
        self.settings
            .update(|cfg| cfg.pinned_profiles.retain(|pinned| pinned != id));
        self.rebuild_groups();
        true
    }

    /// Appends a detached copy of the profile and saves the store
    ///
    /// Returns the stored copy, or `None` if saving failed.
    pub fn duplicate(&mut self, profile: &Profile) -> Option<Profile> {
        let copy = profile.duplicate();
        let result = self
            .store
            .insert(copy.clone())
            .and_then(|()| self.store.save());
        if let Err(e) = result {
            self.notifier
                .error(&format!("Failed to duplicate '{}': {e}", profile.name));
            return None;
        }
        info!(name = %copy.name, "Profile duplicated");
        self.refresh();
        Some(copy)
    }

    /// Deletes the profile after confirmation
    ///
    /// Builtin profiles are refused without asking.
    pub fn delete(&mut self, profile: &Profile) -> DeleteOutcome {
        if profile.is_builtin {
            debug!(name = %profile.name, "Refusing to delete builtin profile");
            return DeleteOutcome::Refused;
        }

        let request = ConfirmRequest {
            message: format!("Delete \"{}\"?", profile.name),
            detail: None,
            buttons: vec![DELETE_BUTTON.to_string(), CANCEL_BUTTON.to_string()],
            cancel_index: 1,
        };
        if self.confirmation.confirm(&request) != 0 {
            return DeleteOutcome::Declined;
        }

        let removed = match self.store.remove(profile) {
            Ok(removed) => removed,
            Err(StoreError::Builtin(_)) => return DeleteOutcome::Refused,
            Err(e) => {
                self.notifier
                    .error(&format!("Failed to delete '{}': {e}", profile.name));
                return DeleteOutcome::Failed;
            }
        };
        if let Err(e) = self.store.save() {
            self.notifier
                .error(&format!("Failed to delete '{}': {e}", profile.name));
            return DeleteOutcome::Failed;
        }
        info!(name = %removed.name, "Profile deleted");
        self.refresh();
        DeleteOutcome::Deleted(removed)
    }

    /// Changes the sort mode, persists it and rebuilds
    pub fn set_sort_order(&mut self, mode: SortMode) {
        self.settings.update(|cfg| cfg.sort_by = mode);
        self.rebuild_groups();
    }

    /// Changes the protocol filter, persists it and rebuilds
    pub fn set_protocol_filter(&mut self, filter: ProtocolFilter) {
        self.settings.update(|cfg| cfg.protocol_filter = filter);
        self.rebuild_groups();
    }

    /// Changes the grouping mode, persists it and rebuilds
    pub fn set_group_by(&mut self, group_by: GroupBy) {
        self.settings.update(|cfg| cfg.group_by = group_by);
        self.rebuild_groups();
    }

    /// Flips a group's collapsed flag
    ///
    /// Returns the new flag, or `None` if the group is not in the projection.
    pub fn toggle_group_collapse(&mut self, group_id: &str) -> Option<bool> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id && !g.profiles.is_empty())?;
        group.collapsed = self.collapse.toggle(group_id);
        Some(group.collapsed)
    }

    /// Opens the profile
    ///
    /// RDP profiles go through the external launcher; everything else is
    /// handed to the session opener. Successful launches move the profile
    /// to the front of the recency list.
    pub fn launch_profile(&mut self, profile: &Profile) -> LaunchStatus {
        let status = if profile.protocol == ProtocolType::Rdp {
            self.launcher.set_client_path(self.settings.rdp_client());
            match self.launcher.launch(profile) {
                Ok(LaunchOutcome::Spawned(_)) => LaunchStatus::Launched,
                Ok(LaunchOutcome::Suppressed) => LaunchStatus::Suppressed,
                Err(e) => {
                    self.notifier.error(&e.to_string());
                    LaunchStatus::Failed
                }
            }
        } else {
            match self.opener.open(profile) {
                Ok(()) => LaunchStatus::Launched,
                Err(message) => {
                    self.notifier.error(&message);
                    LaunchStatus::Failed
                }
            }
        };

        if status == LaunchStatus::Launched {
            if let Some(id) = profile.id.as_deref() {
                self.recent.touch(id);
            }
            if self.settings.sort_by() == SortMode::Recent {
                self.rebuild_groups();
            }
        }
        status
    }

    /// Writes the profile's shell command to the clipboard
    pub fn copy_connect_command(&mut self, profile: &Profile) -> bool {
        match self.registry.connect_command(profile) {
            Ok(command) => {
                self.clipboard.write_text(&command);
                true
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                false
            }
        }
    }

    /// Writes the RDP connection descriptor to the clipboard
    pub fn copy_rdp_descriptor(&mut self, profile: &Profile) -> bool {
        if profile.protocol != ProtocolType::Rdp {
            self.notifier
                .error(&format!("Profile '{}' is not an RDP profile", profile.name));
            return false;
        }
        let options = normalize_options(&profile.options);
        if options.host.is_empty() {
            self.notifier
                .error(&format!("Profile '{}' has no host", profile.name));
            return false;
        }
        self.clipboard.write_text(&render_descriptor(&options));
        true
    }

    /// Writes any pending configuration change immediately
    pub fn shutdown(&mut self) {
        self.settings.flush();
    }
}

impl Drop for ConnectionDirectory {
    fn drop(&mut self) {
        self.settings.flush();
    }
}
