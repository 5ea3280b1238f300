//! Sidebar settings model
//!
//! This module defines the settings stored in config.toml: the sidebar
//! configuration group and the companion hotkey bindings.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::ProtocolType;

/// Default sidebar width in pixels
pub const DEFAULT_SIDEBAR_WIDTH: u32 = 280;

/// Default external RDP client
pub const DEFAULT_RDP_CLIENT: &str = "mstsc.exe";

/// Application-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Connection sidebar settings
    #[serde(default)]
    pub sidebar: SidebarConfig,
    /// Hotkey bindings
    #[serde(default)]
    pub hotkeys: HotkeySettings,
}

/// Hotkey bindings contributed by the sidebar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HotkeySettings {
    /// Key chords toggling the sidebar; unbound by default
    #[serde(default)]
    pub toggle_connection_sidebar: Vec<String>,
}

/// Which side of the window the sidebar is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    /// Docked left
    #[default]
    Left,
    /// Docked right
    Right,
}

/// Ordering applied to profiles before grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Display name
    #[default]
    Name,
    /// Host address
    Host,
    /// Active first, then most recently used
    Recent,
    /// Protocol precedence
    Type,
}

/// Protocol shown in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolFilter {
    /// Every supported protocol
    All,
    /// SSH profiles only
    #[default]
    Ssh,
    /// Telnet profiles only
    Telnet,
    /// RDP profiles only
    Rdp,
}

/// How profiles are partitioned into groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Custom group label
    #[default]
    Group,
    /// Protocol type
    Protocol,
}

/// Connection sidebar configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarConfig {
    /// Whether the plugin is enabled at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Docking side
    #[serde(default, deserialize_with = "lenient")]
    pub position: PanelPosition,
    /// Panel width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Show the toggle button in the toolbar
    #[serde(default = "default_true")]
    pub show_in_toolbar: bool,
    /// Whether the sidebar is currently shown
    #[serde(default = "default_true")]
    pub sidebar_visible: bool,
    /// Identifiers of profiles pinned to the favorites group
    #[serde(default)]
    pub pinned_profiles: Vec<String>,
    /// Sort mode
    #[serde(default, deserialize_with = "lenient")]
    pub sort_by: SortMode,
    /// Protocol filter
    #[serde(default, deserialize_with = "lenient")]
    pub protocol_filter: ProtocolFilter,
    /// Show the protocol badge next to each row
    #[serde(default = "default_true")]
    pub show_protocol_badge: bool,
    /// External RDP client executable
    #[serde(default = "default_rdp_client")]
    pub rdp_client_path: String,
    /// Grouping mode
    #[serde(default, deserialize_with = "lenient")]
    pub group_by: GroupBy,
}

const fn default_true() -> bool {
    true
}

const fn default_width() -> u32 {
    DEFAULT_SIDEBAR_WIDTH
}

fn default_rdp_client() -> String {
    DEFAULT_RDP_CLIENT.to_string()
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: PanelPosition::default(),
            width: DEFAULT_SIDEBAR_WIDTH,
            show_in_toolbar: true,
            sidebar_visible: true,
            pinned_profiles: Vec::new(),
            sort_by: SortMode::default(),
            protocol_filter: ProtocolFilter::default(),
            show_protocol_badge: true,
            rdp_client_path: default_rdp_client(),
            group_by: GroupBy::default(),
        }
    }
}

impl SidebarConfig {
    /// Width used for layout; a zero width falls back to the default
    #[must_use]
    pub const fn effective_width(&self) -> u32 {
        if self.width == 0 {
            DEFAULT_SIDEBAR_WIDTH
        } else {
            self.width
        }
    }

    /// Resolved RDP client path with `~` expanded
    #[must_use]
    pub fn rdp_client(&self) -> PathBuf {
        let raw = self.rdp_client_path.trim();
        if raw.is_empty() {
            return PathBuf::from(DEFAULT_RDP_CLIENT);
        }
        PathBuf::from(shellexpand::tilde(raw).into_owned())
    }

    /// Returns true if `id` is pinned
    #[must_use]
    pub fn is_pinned(&self, id: &str) -> bool {
        self.pinned_profiles.iter().any(|p| p == id)
    }

    /// Sets a single field from its textual key and value
    ///
    /// Keys use the camelCase names written to config.toml.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for unknown keys or unparsable values.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "enabled" => self.enabled = parse_field(key, value)?,
            "position" => self.position = parse_field(key, value)?,
            "width" => self.width = parse_field(key, value)?,
            "showInToolbar" => self.show_in_toolbar = parse_field(key, value)?,
            "sidebarVisible" => self.sidebar_visible = parse_field(key, value)?,
            "sortBy" => self.sort_by = parse_field(key, value)?,
            "protocolFilter" => self.protocol_filter = parse_field(key, value)?,
            "showProtocolBadge" => self.show_protocol_badge = parse_field(key, value)?,
            "rdpClientPath" => self.rdp_client_path = value.to_string(),
            "groupBy" => self.group_by = parse_field(key, value)?,
            _ => {
                return Err(ConfigError::Validation {
                    field: key.to_string(),
                    reason: "Unknown setting".to_string(),
                })
            }
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Validation {
        field: key.to_string(),
        reason: format!("Invalid value '{value}'"),
    })
}

/// Deserializes an enum from its string form, falling back to the default
/// for unknown values instead of rejecting the whole file.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        tracing::warn!(value = %raw, "Unknown setting value, using default");
        T::default()
    }))
}

macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the identifier written to config.toml
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ConfigError::Validation {
                        field: stringify!($ty).to_string(),
                        reason: format!("Unknown value '{s}'"),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(PanelPosition { Left => "left", Right => "right" });
string_enum!(SortMode { Name => "name", Host => "host", Recent => "recent", Type => "type" });
string_enum!(ProtocolFilter { All => "all", Ssh => "ssh", Telnet => "telnet", Rdp => "rdp" });
string_enum!(GroupBy { Group => "group", Protocol => "protocol" });

impl ProtocolFilter {
    /// Returns true if profiles of `protocol` pass this filter
    #[must_use]
    pub fn matches(self, protocol: &ProtocolType) -> bool {
        match self {
            Self::All => protocol.is_supported(),
            Self::Ssh => *protocol == ProtocolType::Ssh,
            Self::Telnet => *protocol == ProtocolType::Telnet,
            Self::Rdp => *protocol == ProtocolType::Rdp,
        }
    }

    /// The single protocol selected, if any
    #[must_use]
    pub const fn protocol(self) -> Option<ProtocolType> {
        match self {
            Self::All => None,
            Self::Ssh => Some(ProtocolType::Ssh),
            Self::Telnet => Some(ProtocolType::Telnet),
            Self::Rdp => Some(ProtocolType::Rdp),
        }
    }
}
