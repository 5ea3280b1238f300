//! Protocol registry for looking up protocol handlers by ID

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ProtocolError, ProtocolResult};
use crate::models::{Profile, ProtocolType};

use super::{Protocol, RdpProtocol, SshProtocol, TelnetProtocol};

/// Registry for protocol handlers
///
/// Initialized with every supported protocol. Profiles of other types have
/// no handler and are not described, validated or launched.
pub struct ProtocolRegistry {
    protocols: HashMap<&'static str, Arc<dyn Protocol>>,
}

impl ProtocolRegistry {
    /// Creates a new protocol registry with all supported protocols
    #[must_use]
    pub fn new() -> Self {
        let mut protocols: HashMap<&'static str, Arc<dyn Protocol>> = HashMap::new();

        let ssh = Arc::new(SshProtocol::new());
        let telnet = Arc::new(TelnetProtocol::new());
        let rdp = Arc::new(RdpProtocol::new());

        protocols.insert(ssh.protocol_id(), ssh);
        protocols.insert(telnet.protocol_id(), telnet);
        protocols.insert(rdp.protocol_id(), rdp);

        Self { protocols }
    }

    /// Gets a protocol handler by its identifier
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn Protocol>> {
        self.protocols.get(id).cloned()
    }

    /// Gets the handler for a protocol type
    #[must_use]
    pub fn get_by_type(&self, protocol_type: &ProtocolType) -> Option<Arc<dyn Protocol>> {
        self.get(protocol_type.as_str())
    }

    /// Summary line for a profile; empty for unsupported types
    #[must_use]
    pub fn describe(&self, profile: &Profile) -> String {
        self.get_by_type(&profile.protocol)
            .map(|p| p.describe(profile))
            .unwrap_or_default()
    }

    /// Connect command for a profile
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Unsupported` for types without a handler.
    pub fn connect_command(&self, profile: &Profile) -> ProtocolResult<String> {
        Ok(self.handler(profile)?.connect_command(profile))
    }

    /// Validates a profile with the handler for its type
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if there is no handler or validation fails.
    pub fn validate(&self, profile: &Profile) -> ProtocolResult<()> {
        self.handler(profile)?.validate_profile(profile)
    }

    fn handler(&self, profile: &Profile) -> ProtocolResult<Arc<dyn Protocol>> {
        self.get_by_type(&profile.protocol)
            .ok_or_else(|| ProtocolError::Unsupported(profile.protocol.as_str().to_string()))
    }

    /// Returns all registered protocol IDs
    #[must_use]
    pub fn protocol_ids(&self) -> Vec<&'static str> {
        self.protocols.keys().copied().collect()
    }

    /// Returns the number of registered protocols
    #[must_use]
    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    /// Returns true if no protocols are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
