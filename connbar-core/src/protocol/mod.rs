//! Protocol layer for ConnBar
//!
//! This module provides the `Protocol` trait and handlers for SSH, Telnet
//! and RDP profiles. Handlers never open connections; they describe a
//! profile, validate it and produce the one-line connect command.

pub mod normalize;
mod rdp;
mod registry;
mod ssh;
mod telnet;

pub use normalize::{
    clean_host, clean_password, clean_text, normalize_dimension, normalize_port, MAX_DIMENSION,
    MIN_DIMENSION,
};
pub use rdp::{normalize_options, quick_connect, render_descriptor, RdpLaunchOptions, RdpProtocol};
pub use registry::ProtocolRegistry;
pub use ssh::SshProtocol;
pub use telnet::TelnetProtocol;

use crate::error::{ProtocolError, ProtocolResult};
use crate::models::{Profile, ProfileOptions};

/// Core trait for all connection protocols
pub trait Protocol: Send + Sync {
    /// Returns the protocol identifier (e.g., "ssh", "telnet", "rdp")
    fn protocol_id(&self) -> &'static str;

    /// Returns human-readable protocol name
    fn display_name(&self) -> &'static str;

    /// Returns default port for this protocol
    fn default_port(&self) -> u16;

    /// One-line summary shown under the profile name
    fn describe(&self, profile: &Profile) -> String;

    /// Command line a user could paste into a shell to reach the target
    fn connect_command(&self, profile: &Profile) -> String;

    /// Validates profile options for this protocol
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the profile cannot be used with this protocol.
    fn validate_profile(&self, profile: &Profile) -> ProtocolResult<()> {
        if profile.protocol.as_str() != self.protocol_id() {
            return Err(ProtocolError::InvalidConfig(format!(
                "Profile '{}' is not a {} profile",
                profile.name,
                self.display_name()
            )));
        }
        if clean_host(&profile.options.host).is_empty() {
            return Err(ProtocolError::InvalidConfig(
                "Host cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Port suffix for summaries, `None` when the stored port is the default
///
/// Summaries show the stored value as-is; a missing, zero or non-finite
/// port reads as the default.
fn port_suffix(options: &ProfileOptions, default: u16) -> Option<String> {
    let port = options
        .port_value()
        .filter(|p| p.is_finite() && *p != 0.0)
        .unwrap_or_else(|| f64::from(default));
    (port != f64::from(default)).then(|| normalize::format_number(port))
}
