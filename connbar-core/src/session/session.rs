//! Session data structures
//!
//! A session records that a profile is open somewhere in the host, whether
//! in a terminal tab or through an external client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Profile, ProtocolType};

/// Where a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionType {
    /// Terminal tab provided by the host (SSH, Telnet)
    Embedded,
    /// External client window (RDP)
    External,
}

impl SessionType {
    /// Session type used for a protocol
    #[must_use]
    pub fn for_protocol(protocol: &ProtocolType) -> Self {
        if *protocol == ProtocolType::Rdp {
            Self::External
        } else {
            Self::Embedded
        }
    }
}

/// An open session bound to a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Unique identifier for this session
    pub id: Uuid,
    /// Identifier of the bound profile, if it has one
    pub profile_id: Option<String>,
    /// Name of the profile (for display)
    pub profile_name: String,
    /// Protocol in use
    pub protocol: ProtocolType,
    /// Embedded or external
    pub session_type: SessionType,
    /// Timestamp when the session was opened
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for `profile`
    #[must_use]
    pub fn new(profile: &Profile) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            protocol: profile.protocol.clone(),
            session_type: SessionType::for_protocol(&profile.protocol),
            started_at: Utc::now(),
        }
    }

    /// Returns true if this session is bound to the profile with `id`
    #[must_use]
    pub fn is_bound_to(&self, id: &str) -> bool {
        self.profile_id.as_deref() == Some(id)
    }
}
