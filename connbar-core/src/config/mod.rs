//! Configuration management for ConnBar
//!
//! This module provides the `ConfigManager` for loading and saving
//! configuration files in TOML format, the settings model, and the
//! `SettingsService` that owns the live sidebar configuration.

mod manager;
mod service;
pub mod settings;

pub use manager::{ConfigManager, ProfilesFile};
pub use service::{SettingsService, SAVE_DEBOUNCE};
pub use settings::{
    AppSettings, GroupBy, HotkeySettings, PanelPosition, ProtocolFilter, SidebarConfig, SortMode,
    DEFAULT_RDP_CLIENT, DEFAULT_SIDEBAR_WIDTH,
};
