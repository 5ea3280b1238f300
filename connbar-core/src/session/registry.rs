//! Registry of open sessions
//!
//! The directory only asks one question of the host's sessions: is a given
//! profile open right now. `SessionRegistry` is that seam; `ActiveSessions`
//! is the in-process implementation.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::Profile;

use super::session::Session;

/// Source of the currently open sessions
pub trait SessionRegistry: Send {
    /// Profile identifiers bound to open sessions
    fn open_profile_ids(&self) -> Vec<String>;

    /// Returns true if a session bound to `id` is open
    fn is_profile_open(&self, id: &str) -> bool {
        self.open_profile_ids().iter().any(|open| open == id)
    }
}

/// In-memory session registry
#[derive(Debug, Default)]
pub struct ActiveSessions {
    sessions: HashMap<Uuid, Session>,
}

impl ActiveSessions {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new session for `profile`, returning its id
    pub fn open(&mut self, profile: &Profile) -> Uuid {
        let session = Session::new(profile);
        let id = session.id;
        self.sessions.insert(id, session);
        id
    }

    /// Forgets a session
    pub fn close(&mut self, session_id: Uuid) -> Option<Session> {
        self.sessions.remove(&session_id)
    }

    /// Gets a session by id
    #[must_use]
    pub fn get(&self, session_id: Uuid) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    /// Returns all sessions bound to the profile with `id`
    #[must_use]
    pub fn sessions_for_profile(&self, id: &str) -> Vec<&Session> {
        self.sessions.values().filter(|s| s.is_bound_to(id)).collect()
    }

    /// Returns the number of open sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no session is open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionRegistry for ActiveSessions {
    fn open_profile_ids(&self) -> Vec<String> {
        self.sessions
            .values()
            .filter_map(|s| s.profile_id.clone())
            .collect()
    }

    fn is_profile_open(&self, id: &str) -> bool {
        self.sessions.values().any(|s| s.is_bound_to(id))
    }
}
