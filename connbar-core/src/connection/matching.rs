//! Structural matching for profiles without an identifier
//!
//! Profiles created through drafts always get an identifier. This fallback
//! only serves entries written by other tools, which may lack one.

use crate::models::{Profile, ProtocolType};
use crate::protocol::{clean_host, clean_text, normalize_port};

/// Returns true if `a` and `b` point at the same target
///
/// Compares type, name, group, normalized host, normalized port and the
/// login user (SSH users default to root).
#[must_use]
pub fn same_target(a: &Profile, b: &Profile) -> bool {
    a.protocol == b.protocol
        && a.name == b.name
        && a.group.as_deref().unwrap_or("") == b.group.as_deref().unwrap_or("")
        && clean_host(&a.options.host) == clean_host(&b.options.host)
        && port(a) == port(b)
        && user(a) == user(b)
}

fn port(profile: &Profile) -> Option<u16> {
    profile
        .protocol
        .default_port()
        .map(|default| normalize_port(profile.options.port_value(), default))
}

fn user(profile: &Profile) -> Option<String> {
    match profile.protocol {
        ProtocolType::Ssh => Some(
            clean_text(profile.options.user.as_deref()).unwrap_or_else(|| "root".to_string()),
        ),
        ProtocolType::Rdp => clean_text(profile.options.username.as_deref()),
        _ => clean_text(profile.options.user.as_deref()),
    }
}
