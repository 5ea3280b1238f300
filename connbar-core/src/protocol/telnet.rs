//! Telnet protocol handler

use crate::models::Profile;

use super::normalize::{clean_host, normalize_port};
use super::{port_suffix, Protocol};

/// Telnet protocol handler
pub struct TelnetProtocol;

impl TelnetProtocol {
    /// Creates a new Telnet protocol handler
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for TelnetProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for TelnetProtocol {
    fn protocol_id(&self) -> &'static str {
        "telnet"
    }

    fn display_name(&self) -> &'static str {
        "Telnet"
    }

    fn default_port(&self) -> u16 {
        23
    }

    fn describe(&self, profile: &Profile) -> String {
        match port_suffix(&profile.options, self.default_port()) {
            Some(port) => format!("{}:{port}", profile.options.host),
            None => profile.options.host.clone(),
        }
    }

    fn connect_command(&self, profile: &Profile) -> String {
        let host = clean_host(&profile.options.host);
        let port = normalize_port(profile.options.port_value(), self.default_port());
        if port == self.default_port() {
            format!("telnet {host}")
        } else {
            format!("telnet {host} {port}")
        }
    }
}
