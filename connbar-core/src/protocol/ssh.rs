//! SSH protocol handler

use crate::models::Profile;

use super::normalize::{clean_host, clean_text, normalize_port};
use super::{port_suffix, Protocol};

/// Login used when an SSH profile names no user
pub const DEFAULT_SSH_USER: &str = "root";

/// SSH protocol handler
pub struct SshProtocol;

impl SshProtocol {
    /// Creates a new SSH protocol handler
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn user(profile: &Profile) -> String {
        clean_text(profile.options.user.as_deref()).unwrap_or_else(|| DEFAULT_SSH_USER.to_string())
    }
}

impl Default for SshProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for SshProtocol {
    fn protocol_id(&self) -> &'static str {
        "ssh"
    }

    fn display_name(&self) -> &'static str {
        "SSH"
    }

    fn default_port(&self) -> u16 {
        22
    }

    fn describe(&self, profile: &Profile) -> String {
        let mut text = format!("{}@{}", Self::user(profile), profile.options.host);
        if let Some(port) = port_suffix(&profile.options, self.default_port()) {
            text.push(':');
            text.push_str(&port);
        }
        text
    }

    fn connect_command(&self, profile: &Profile) -> String {
        let host = clean_host(&profile.options.host);
        let port = normalize_port(profile.options.port_value(), self.default_port());
        let mut cmd = format!("ssh {}@{host}", Self::user(profile));
        if port != self.default_port() {
            cmd.push_str(&format!(" -p {port}"));
        }
        cmd
    }
}
