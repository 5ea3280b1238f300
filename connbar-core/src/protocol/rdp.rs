//! RDP protocol handler
//!
//! RDP sessions are never opened in-process. This module turns a profile
//! into the normalized options and the `.rdp` descriptor text consumed by
//! the external client.

use crate::models::{Numeric, Profile, ProfileOptions, ProtocolType};

use super::normalize::{clean_host, clean_text, normalize_dimension, normalize_port};
use super::{port_suffix, Protocol};

const DEFAULT_RDP_PORT: u16 = 3389;

/// Normalized options for one external RDP launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdpLaunchOptions {
    /// Target host, never containing line breaks
    pub host: String,
    /// Target port in [1, 65535]
    pub port: u16,
    /// Login user
    pub username: Option<String>,
    /// Windows domain
    pub domain: Option<String>,
    /// Full-screen session
    pub fullscreen: bool,
    /// Desktop width in [640, 8192]; always `None` in full-screen mode
    pub width: Option<u32>,
    /// Desktop height in [640, 8192]; always `None` in full-screen mode
    pub height: Option<u32>,
    /// Administrative (console) session
    pub admin: bool,
}

/// Normalizes a raw option bag for launching
///
/// Pure function: out-of-range values are replaced by their defaults or
/// dropped. An empty host is returned as-is for the caller to reject.
#[must_use]
pub fn normalize_options(options: &ProfileOptions) -> RdpLaunchOptions {
    let fullscreen = options.fullscreen;
    let dimension = |raw: &Option<Numeric>| {
        if fullscreen {
            None
        } else {
            normalize_dimension(raw.as_ref().map(Numeric::as_f64))
        }
    };

    RdpLaunchOptions {
        host: clean_host(&options.host),
        port: normalize_port(options.port_value(), DEFAULT_RDP_PORT),
        username: clean_text(options.username.as_deref()),
        domain: clean_text(options.domain.as_deref()),
        fullscreen,
        width: dimension(&options.width),
        height: dimension(&options.height),
        admin: options.admin,
    }
}

/// Renders the `.rdp` descriptor for normalized options
///
/// Lines are CRLF-terminated, including the last one.
#[must_use]
pub fn render_descriptor(options: &RdpLaunchOptions) -> String {
    let mut lines = vec![format!("full address:s:{}:{}", options.host, options.port)];

    if let Some(username) = &options.username {
        lines.push(format!("username:s:{username}"));
    }
    if let Some(domain) = &options.domain {
        lines.push(format!("domain:s:{domain}"));
    }

    if options.fullscreen {
        lines.push("screen mode id:i:2".to_string());
    } else {
        lines.push("screen mode id:i:1".to_string());
        lines.push("dynamic resolution:i:1".to_string());
        lines.push("smart sizing:i:0".to_string());
        if let (Some(width), Some(height)) = (options.width, options.height) {
            lines.push(format!("desktopwidth:i:{width}"));
            lines.push(format!("desktopheight:i:{height}"));
        }
    }

    if options.admin {
        lines.push("administrative session:i:1".to_string());
    }

    let mut payload = lines.join("\r\n");
    payload.push_str("\r\n");
    payload
}

/// Builds an unsaved RDP profile from `[rdp://][user@]host[:port]`
#[must_use]
pub fn quick_connect(query: &str) -> Profile {
    let target = query.trim();
    let target = target.strip_prefix("rdp://").unwrap_or(target);

    let (username, host_port) = match target.split_once('@') {
        Some((user, rest)) => (clean_text(Some(user)), rest),
        None => (None, target),
    };

    let (host, port) = match host_port.split_once(':') {
        Some((host, port)) => (host, leading_port(port).unwrap_or(DEFAULT_RDP_PORT)),
        None => (host_port, DEFAULT_RDP_PORT),
    };

    let mut profile = Profile::new(query.trim(), ProtocolType::Rdp, clean_host(host)).with_port(port);
    profile.options.username = username;
    profile
}

/// Parses the leading digits of a port, ignoring any trailing text
fn leading_port(raw: &str) -> Option<u16> {
    let digits: String = raw.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<u16>().ok().filter(|p| *p != 0)
}

/// RDP protocol handler
pub struct RdpProtocol;

impl RdpProtocol {
    /// Creates a new RDP protocol handler
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for RdpProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for RdpProtocol {
    fn protocol_id(&self) -> &'static str {
        "rdp"
    }

    fn display_name(&self) -> &'static str {
        "RDP"
    }

    fn default_port(&self) -> u16 {
        DEFAULT_RDP_PORT
    }

    fn describe(&self, profile: &Profile) -> String {
        let mut text = String::new();
        if let Some(user) = profile.options.username.as_deref().filter(|u| !u.is_empty()) {
            text.push_str(user);
            text.push('@');
        }
        text.push_str(&profile.options.host);
        if let Some(port) = port_suffix(&profile.options, self.default_port()) {
            text.push(':');
            text.push_str(&port);
        }
        text
    }

    fn connect_command(&self, profile: &Profile) -> String {
        let options = normalize_options(&profile.options);
        format!("mstsc /v:{}:{}", options.host, options.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rdp_options(host: &str) -> ProfileOptions {
        ProfileOptions::with_host(host)
    }

    #[test]
    fn test_normalize_options() {
        let mut raw = rdp_options(" 10.0.0.5\r\n");
        raw.port = Some(Numeric::Text("99999".to_string()));
        raw.username = Some("  ".to_string());
        raw.domain = Some(" CORP\n".to_string());
        raw.width = Some(Numeric::Int(1920));
        raw.height = Some(Numeric::Int(100));

        let opts = normalize_options(&raw);
        assert_eq!(opts.host, "10.0.0.5");
        assert_eq!(opts.port, 3389);
        assert_eq!(opts.username, None);
        assert_eq!(opts.domain.as_deref(), Some("CORP"));
        assert_eq!(opts.width, Some(1920));
        assert_eq!(opts.height, None);
    }

    #[test]
    fn test_fullscreen_drops_dimensions() {
        let mut raw = rdp_options("h");
        raw.fullscreen = true;
        raw.width = Some(Numeric::Int(1920));
        raw.height = Some(Numeric::Int(1080));
        let opts = normalize_options(&raw);
        assert_eq!((opts.width, opts.height), (None, None));

        let text = render_descriptor(&opts);
        assert!(text.contains("screen mode id:i:2\r\n"));
        assert!(!text.contains("desktopwidth"));
        assert!(!text.contains("dynamic resolution"));
    }

    #[test]
    fn test_render_descriptor_windowed() {
        let opts = RdpLaunchOptions {
            host: "10.0.0.5".to_string(),
            port: 3389,
            username: Some("alice".to_string()),
            domain: None,
            fullscreen: false,
            width: Some(1920),
            height: Some(1080),
            admin: true,
        };
        assert_eq!(
            render_descriptor(&opts),
            "full address:s:10.0.0.5:3389\r\n\
             username:s:alice\r\n\
             screen mode id:i:1\r\n\
             dynamic resolution:i:1\r\n\
             smart sizing:i:0\r\n\
             desktopwidth:i:1920\r\n\
             desktopheight:i:1080\r\n\
             administrative session:i:1\r\n"
        );
    }

    #[test]
    fn test_dimensions_need_both_sides() {
        let opts = RdpLaunchOptions {
            host: "h".to_string(),
            port: 3390,
            username: None,
            domain: Some("CORP".to_string()),
            fullscreen: false,
            width: Some(1920),
            height: None,
            admin: false,
        };
        let text = render_descriptor(&opts);
        assert!(text.starts_with("full address:s:h:3390\r\ndomain:s:CORP\r\n"));
        assert!(!text.contains("desktopwidth"));
        assert!(text.ends_with("smart sizing:i:0\r\n"));
    }

    #[test]
    fn test_quick_connect() {
        let profile = quick_connect("rdp://alice@desk.local:3390");
        assert_eq!(profile.protocol, ProtocolType::Rdp);
        assert_eq!(profile.name, "rdp://alice@desk.local:3390");
        assert_eq!(profile.options.host, "desk.local");
        assert_eq!(profile.options.port_value(), Some(3390.0));
        assert_eq!(profile.options.username.as_deref(), Some("alice"));

        let bare = quick_connect("10.0.0.9");
        assert_eq!(bare.options.host, "10.0.0.9");
        assert_eq!(bare.options.port_value(), Some(3389.0));
        assert_eq!(bare.options.username, None);

        assert_eq!(quick_connect("h:abc").options.port_value(), Some(3389.0));
        assert_eq!(quick_connect("h:3391x").options.port_value(), Some(3391.0));
    }

    #[test]
    fn test_describe_and_command() {
        let protocol = RdpProtocol::new();
        let profile = Profile::new_rdp("d", "10.0.0.5").with_user("alice");
        assert_eq!(protocol.describe(&profile), "alice@10.0.0.5");
        let profile = Profile::new_rdp("d", "10.0.0.5").with_port(3390);
        assert_eq!(protocol.describe(&profile), "10.0.0.5:3390");
        assert_eq!(protocol.connect_command(&profile), "mstsc /v:10.0.0.5:3390");
        assert_eq!(
            protocol.connect_command(&Profile::new_rdp("d", "h")),
            "mstsc /v:h:3389"
        );
    }
}
