//! Protocol identifiers and the protocol-specific option bag.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Protocol type identifier
///
/// Profiles coming from the host store may carry types this crate does not
/// handle (serial, local shells, ...). Those are kept verbatim in `Other` so
/// that saving the store never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProtocolType {
    /// Secure shell
    Ssh,
    /// Telnet
    Telnet,
    /// Remote desktop, launched through an external client
    Rdp,
    /// Any other profile type known only to the host
    Other(String),
}

impl ProtocolType {
    /// Protocols shown in the directory, in type-sort precedence order
    pub const SUPPORTED: [Self; 3] = [Self::Ssh, Self::Telnet, Self::Rdp];

    /// Returns the protocol identifier as a lowercase string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ssh => "ssh",
            Self::Telnet => "telnet",
            Self::Rdp => "rdp",
            Self::Other(id) => id,
        }
    }

    /// Returns true for the protocols the directory displays
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Returns the default port for this protocol type
    #[must_use]
    pub const fn default_port(&self) -> Option<u16> {
        match self {
            Self::Ssh => Some(22),
            Self::Telnet => Some(23),
            Self::Rdp => Some(3389),
            Self::Other(_) => None,
        }
    }

    /// Short label used for badges and protocol groups
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Ssh => "SSH".to_string(),
            Self::Telnet => "Telnet".to_string(),
            Self::Rdp => "RDP".to_string(),
            Self::Other(id) => id.to_uppercase(),
        }
    }

    /// Precedence used by the type sort: ssh < telnet < rdp < anything else
    #[must_use]
    pub const fn sort_rank(&self) -> u8 {
        match self {
            Self::Ssh => 0,
            Self::Telnet => 1,
            Self::Rdp => 2,
            Self::Other(_) => 99,
        }
    }
}

impl From<String> for ProtocolType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ssh" => Self::Ssh,
            "telnet" => Self::Telnet,
            "rdp" => Self::Rdp,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ProtocolType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ProtocolType> for String {
    fn from(value: ProtocolType) -> Self {
        match value {
            ProtocolType::Other(id) => id,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// A number as it appears in a stored option bag
///
/// Profiles are edited by hand and by other tools, so ports and dimensions
/// show up as integers, floats or strings. Coercion to a usable value happens
/// in the normalization helpers, never at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Textual value, parsed on demand
    Text(String),
}

impl Numeric {
    /// Coerces the raw value to a float; unparsable text becomes NaN
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

impl From<u16> for Numeric {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Numeric {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// SSH authentication method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SshAuthMethod {
    /// Password authentication
    Password,
    /// Public key authentication
    PublicKey,
    /// Keyboard-interactive authentication
    KeyboardInteractive,
    /// SSH agent authentication
    Agent,
}

/// Protocol-specific option bag
///
/// One flat bag serves every protocol, as in the host profile format: SSH
/// reads `user`, RDP reads `username`/`domain` and the display flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOptions {
    /// Remote host address (hostname or IP)
    #[serde(default)]
    pub host: String,
    /// Remote port, as stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Numeric>,
    /// SSH login user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// RDP login user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// RDP Windows domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Stored password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// SSH authentication method (`None` lets the client decide)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<SshAuthMethod>,
    /// SSH private key files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_keys: Vec<PathBuf>,
    /// RDP full-screen session
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fullscreen: bool,
    /// RDP desktop width, as stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Numeric>,
    /// RDP desktop height, as stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Numeric>,
    /// RDP administrative (console) session
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub admin: bool,
}

impl ProfileOptions {
    /// Creates an option bag for the given host
    #[must_use]
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Raw port coerced to a float, if one is stored
    #[must_use]
    pub fn port_value(&self) -> Option<f64> {
        self.port.as_ref().map(Numeric::as_f64)
    }
}
