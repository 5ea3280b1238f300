//! Profile editing
//!
//! A `ProfileDraft` holds form input for a new or existing profile. Saving
//! normalizes the input, resolves which stored entry it edits and writes
//! the store.

use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Numeric, Profile, ProfileOptions, ProtocolType};
use crate::protocol::{
    clean_host, clean_password, clean_text, normalize_dimension, normalize_port, ProtocolRegistry,
};

use super::matching::same_target;
use super::store::ProfileStore;

/// Editable copy of a profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDraft {
    /// Identifier of the profile being edited, if known
    pub id: Option<String>,
    /// Snapshot the draft was opened from, used when there is no identifier
    pub original: Option<Profile>,
    /// Protocol type
    pub protocol: ProtocolType,
    /// Display name; empty selects a generated name
    pub name: String,
    /// Group label; empty means ungrouped
    pub group: String,
    /// Raw option input
    pub options: ProfileOptions,
}

impl ProfileDraft {
    /// Starts a draft for a new profile with protocol defaults filled in
    #[must_use]
    pub fn new(protocol: ProtocolType) -> Self {
        let options = ProfileOptions {
            port: protocol.default_port().map(Numeric::from),
            user: (protocol == ProtocolType::Ssh).then(|| "root".to_string()),
            ..ProfileOptions::default()
        };
        Self {
            id: None,
            original: None,
            protocol,
            name: String::new(),
            group: String::new(),
            options,
        }
    }

    /// Starts a draft editing `profile`
    #[must_use]
    pub fn edit(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            original: Some(profile.clone()),
            protocol: profile.protocol.clone(),
            name: profile.name.clone(),
            group: profile.group.clone().unwrap_or_default(),
            options: profile.options.clone(),
        }
    }

    /// Returns true if the draft edits an existing profile
    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.id.is_some() || self.original.is_some()
    }

    /// Option bag as it will be stored
    #[must_use]
    pub fn normalized_options(&self) -> ProfileOptions {
        let raw = &self.options;
        let mut options = raw.clone();
        options.host = clean_host(&raw.host);
        options.password = clean_password(raw.password.as_deref());

        let default_port = self.protocol.default_port();
        if let Some(default) = default_port {
            options.port = Some(normalize_port(raw.port_value(), default).into());
        }

        match self.protocol {
            ProtocolType::Ssh => {
                options.user = Some(
                    clean_text(raw.user.as_deref()).unwrap_or_else(|| "root".to_string()),
                );
                options.private_keys.retain(|p| !p.as_os_str().is_empty());
            }
            ProtocolType::Telnet => {
                options.user = clean_text(raw.user.as_deref());
            }
            ProtocolType::Rdp => {
                options.username = clean_text(raw.username.as_deref());
                options.domain = clean_text(raw.domain.as_deref());
                let dimension = |value: &Option<Numeric>| {
                    if raw.fullscreen {
                        None
                    } else {
                        normalize_dimension(value.as_ref().map(Numeric::as_f64)).map(Numeric::from)
                    }
                };
                options.width = dimension(&raw.width);
                options.height = dimension(&raw.height);
            }
            ProtocolType::Other(_) => {}
        }
        options
    }

    /// Name used when the draft leaves the name empty
    #[must_use]
    pub fn default_name(&self, options: &ProfileOptions) -> String {
        let port = options
            .port_value()
            .map(|p| (p as u16).to_string())
            .unwrap_or_default();
        match self.protocol {
            ProtocolType::Ssh => format!(
                "{}@{}:{port}",
                options.user.as_deref().unwrap_or("root"),
                options.host
            ),
            ProtocolType::Rdp => format!("RDP: {}", options.host),
            _ => format!("{}:{port}", options.host),
        }
    }
}

impl ProfileStore {
    /// Saves a draft and persists the store, returning the stored profile
    ///
    /// Updates the entry with the draft's identifier, else the entry
    /// structurally matching the draft's snapshot, else appends a new
    /// profile with a generated identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty, the protocol is unsupported,
    /// or the store cannot be written.
    pub fn save_draft(&mut self, draft: &ProfileDraft) -> StoreResult<Profile> {
        let options = draft.normalized_options();
        if options.host.is_empty() {
            return Err(StoreError::Invalid("Host cannot be empty".to_string()));
        }

        let name = match draft.name.trim() {
            "" => draft.default_name(&options),
            name => name.to_string(),
        };
        let group = match draft.group.trim() {
            "" => None,
            group => Some(group.to_string()),
        };

        let target = self.resolve_target(draft);
        let profile = match target {
            Some(idx) => {
                let mut existing = self.profiles()[idx].clone();
                existing.name = name;
                existing.group = group;
                existing.options = options;
                existing
            }
            None => Profile {
                id: Some(draft.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string())),
                name,
                protocol: draft.protocol.clone(),
                group,
                options,
                is_builtin: false,
                is_template: false,
            },
        };

        ProtocolRegistry::new().validate(&profile)?;
        match target {
            Some(idx) => self.replace_at(idx, profile.clone()),
            None => self.insert(profile.clone())?,
        }
        self.save()?;
        tracing::info!(name = %profile.name, updated = target.is_some(), "Profile saved");
        Ok(profile)
    }

    fn resolve_target(&self, draft: &ProfileDraft) -> Option<usize> {
        if let Some(id) = &draft.id {
            if let Some(idx) = self
                .profiles()
                .iter()
                .position(|p| p.id.as_ref() == Some(id))
            {
                return Some(idx);
            }
        }
        let original = draft.original.as_ref()?;
        self.profiles().iter().position(|p| same_target(p, original))
    }
}
