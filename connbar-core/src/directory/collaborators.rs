//! Host services consumed by the directory
//!
//! Each trait is a seam to something the embedding application owns: the
//! recency list, confirmation dialogs, notifications, the clipboard and
//! terminal sessions. Simple in-process implementations are provided for
//! the CLI and for tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::config::ConfigManager;
use crate::models::{Profile, RecentList};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Most-recently-used profile list
pub trait RecentProfiles: Send {
    /// Profile identifiers, most recent first
    fn recent_ids(&self) -> Vec<String>;

    /// Records that the profile with `id` was just opened
    fn touch(&mut self, id: &str);
}

/// A blocking question with a set of buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    /// Main question
    pub message: String,
    /// Secondary text
    pub detail: Option<String>,
    /// Button labels, in display order
    pub buttons: Vec<String>,
    /// Button chosen when the dialog is dismissed
    pub cancel_index: usize,
}

/// Blocking confirmation dialog
pub trait Confirmation: Send {
    /// Shows the request and returns the index of the chosen button
    fn confirm(&mut self, request: &ConfirmRequest) -> usize;
}

/// Severity of a user-visible message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational
    Info,
    /// Failure
    Error,
}

/// A user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Message text
    pub message: String,
}

/// Fire-and-forget sink for user-visible messages
pub trait Notifier: Send {
    /// Shows a message
    fn notify(&self, level: NotificationLevel, message: &str);

    /// Shows an error
    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }

    /// Shows an informational message
    fn info(&self, message: &str) {
        self.notify(NotificationLevel::Info, message);
    }
}

/// Clipboard write primitive
pub trait Clipboard: Send {
    /// Replaces the clipboard contents
    fn write_text(&mut self, text: &str);
}

/// Opens terminal sessions for SSH and Telnet profiles
pub trait SessionOpener: Send {
    /// Opens a session for `profile`
    ///
    /// # Errors
    ///
    /// Returns a user-facing message if the session could not be opened.
    fn open(&mut self, profile: &Profile) -> Result<(), String>;
}

/// Recency list persisted to recent.toml
#[derive(Debug, Default)]
pub struct RecencyTracker {
    list: RecentList,
    config_manager: Option<ConfigManager>,
}

impl RecencyTracker {
    /// Creates a tracker that never touches the filesystem
    #[must_use]
    pub fn in_memory(list: RecentList) -> Self {
        Self {
            list,
            config_manager: None,
        }
    }

    /// Loads the list through `config_manager`; a broken file starts empty
    #[must_use]
    pub fn load(config_manager: ConfigManager) -> Self {
        let list = config_manager.load_recent().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load recent profiles");
            RecentList::new()
        });
        Self {
            list,
            config_manager: Some(config_manager),
        }
    }

    /// Current list
    #[must_use]
    pub fn list(&self) -> &RecentList {
        &self.list
    }
}

impl RecentProfiles for RecencyTracker {
    fn recent_ids(&self) -> Vec<String> {
        self.list.ids()
    }

    fn touch(&mut self, id: &str) {
        self.list.touch(id);
        if let Some(manager) = &self.config_manager {
            if let Err(e) = manager.save_recent(&self.list) {
                warn!(error = %e, "Failed to save recent profiles");
            }
        }
    }
}

/// Confirmation that always picks the same answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedConfirmation {
    /// Picks the first button
    Accept,
    /// Picks the cancel button
    Decline,
}

impl Confirmation for FixedConfirmation {
    fn confirm(&mut self, request: &ConfirmRequest) -> usize {
        match self {
            Self::Accept => 0,
            Self::Decline => request.cancel_index,
        }
    }
}

/// Notifier that forwards messages to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Info => info!(%message, "Notification"),
            NotificationLevel::Error => warn!(%message, "Error notification"),
        }
    }
}

/// Notifier that keeps every message; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    messages: Arc<Mutex<Vec<Notification>>>,
}

impl CollectingNotifier {
    /// Creates an empty notifier
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every collected message
    #[must_use]
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *lock(&self.messages))
    }

    /// Collected error messages
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        lock(&self.messages)
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        lock(&self.messages).push(Notification {
            level,
            message: message.to_string(),
        });
    }
}

/// Clipboard kept in memory; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        lock(&self.contents).clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) {
        *lock(&self.contents) = Some(text.to_string());
    }
}

/// Opener used when no terminal host is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTerminal;

impl SessionOpener for NoTerminal {
    fn open(&mut self, profile: &Profile) -> Result<(), String> {
        Err(format!(
            "Cannot open '{}': no terminal is available for {} sessions",
            profile.name,
            profile.protocol.label()
        ))
    }
}
