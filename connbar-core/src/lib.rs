//! `ConnBar` Core Library
//!
//! This crate provides the core of the ConnBar connection sidebar: the
//! profile store, sidebar configuration, the connection directory that
//! sorts, filters and groups profiles, and the external RDP launcher.

pub mod config;
pub mod connection;
pub mod directory;
pub mod error;
pub mod models;
pub mod protocol;
pub mod scheduler;
pub mod session;

pub use config::{
    AppSettings, ConfigManager, GroupBy, ProtocolFilter, SettingsService, SidebarConfig, SortMode,
};
pub use connection::{ProfileDraft, ProfileStore};
pub use directory::{
    Clipboard, CollectingNotifier, ConfirmRequest, Confirmation, ConnectionDirectory,
    DeleteOutcome, FixedConfirmation, LaunchStatus, MemoryClipboard, Notifier, RecencyTracker,
    RecentProfiles, SessionOpener,
};
pub use error::{
    ConfigError, ConfigResult, ConnBarError, LaunchError, LaunchResult, ProtocolError,
    StoreError, StoreResult,
};
pub use models::{
    GroupDefinition, Numeric, Profile, ProfileGroup, ProfileOptions, ProtocolType, RecentList,
};
pub use protocol::{Protocol, ProtocolRegistry, RdpLaunchOptions};
pub use scheduler::{Debouncer, ScheduledTask};
pub use session::{
    ActiveSessions, HostPlatform, LaunchKey, LaunchOutcome, ProcessSpawner, RdpLauncher,
    SessionRegistry, SystemSpawner,
};
