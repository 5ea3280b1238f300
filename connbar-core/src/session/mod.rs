//! Session tracking and the external RDP launcher
//!
//! This module provides the open-session registry consulted by the
//! directory, host platform detection, and the launcher that hands RDP
//! profiles to an external client.

mod launcher;
mod platform;
mod registry;
mod session;

pub use launcher::{
    LaunchKey, LaunchOutcome, RdpLauncher, ACTIVE_WINDOW, CLEANUP_DELAY, LAUNCH_DEBOUNCE,
};
pub use platform::{HostPlatform, ProcessSpawner, SystemSpawner};
pub use registry::{ActiveSessions, SessionRegistry};
pub use session::{Session, SessionType};
