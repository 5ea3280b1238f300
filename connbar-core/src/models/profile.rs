//! Profile model representing one saved connection target.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::protocol::{ProfileOptions, ProtocolType};

/// A saved connection target (SSH, Telnet or RDP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Stable identifier; absent for profiles that were never persisted with one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable name
    pub name: String,
    /// Protocol type
    #[serde(rename = "type")]
    pub protocol: ProtocolType,
    /// Free-text group label (or a custom group id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Protocol-specific options
    #[serde(default)]
    pub options: ProfileOptions,
    /// Builtin profiles cannot be deleted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_builtin: bool,
    /// Templates are never shown in the directory
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_template: bool,
}

impl Profile {
    /// Creates a new profile without an identifier
    #[must_use]
    pub fn new(name: impl Into<String>, protocol: ProtocolType, host: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            protocol,
            group: None,
            options: ProfileOptions::with_host(host),
            is_builtin: false,
            is_template: false,
        }
    }

    /// Creates a new SSH profile
    #[must_use]
    pub fn new_ssh(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self::new(name, ProtocolType::Ssh, host)
    }

    /// Creates a new Telnet profile
    #[must_use]
    pub fn new_telnet(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self::new(name, ProtocolType::Telnet, host)
    }

    /// Creates a new RDP profile
    #[must_use]
    pub fn new_rdp(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self::new(name, ProtocolType::Rdp, host)
    }

    /// Sets the identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Assigns a freshly generated identifier
    #[must_use]
    pub fn with_generated_id(mut self) -> Self {
        self.id = Some(Uuid::new_v4().to_string());
        self
    }

    /// Sets the group label
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the stored port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.options.port = Some(port.into());
        self
    }

    /// Sets the login user for the profile's protocol
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        let user = Some(user.into());
        if self.protocol == ProtocolType::Rdp {
            self.options.username = user;
        } else {
            self.options.user = user;
        }
        self
    }

    /// Returns true if the profile may appear in the directory
    ///
    /// The type must be supported, the profile must not be a template and
    /// the option bag must carry a non-empty host.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.protocol.is_supported() && !self.is_template && !self.options.host.is_empty()
    }

    /// Key used for the search index and description cache
    ///
    /// Profiles without an identifier are keyed by name, type and target so
    /// same-named entries do not share a cache slot.
    #[must_use]
    pub fn cache_key(&self) -> Cow<'_, str> {
        match &self.id {
            Some(id) => Cow::Borrowed(id.as_str()),
            None => Cow::Owned(format!(
                "{}\u{1f}{}\u{1f}{}\u{1f}{}",
                self.name,
                self.protocol.as_str(),
                self.options.host,
                self.options
                    .port_value()
                    .map(|p| p.to_string())
                    .unwrap_or_default()
            )),
        }
    }

    /// Returns a detached copy suitable for appending as a new profile
    ///
    /// The copy has no identifier, is neither builtin nor a template, and is
    /// named after the original with a copy suffix.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = None;
        copy.name = format!("{} copy", self.name);
        copy.is_builtin = false;
        copy.is_template = false;
        copy
    }
}
