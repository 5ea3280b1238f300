//! Host platform detection and detached process spawning

use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Operating system family of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    /// Microsoft Windows
    Windows,
    /// Apple macOS
    MacOs,
    /// Linux
    Linux,
    /// Anything else
    Other,
}

impl HostPlatform {
    /// Platform this binary was built for
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Returns true where the external RDP client (mstsc.exe) runs
    #[must_use]
    pub const fn supports_external_rdp(self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::Other => "other",
        })
    }
}

/// Starts external programs without waiting for them
pub trait ProcessSpawner: Send + Sync {
    /// Spawns `program` with `args`, detached from the caller
    ///
    /// Returning `Ok` only means the process started. Failures after that
    /// point are reported through logging, never to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be started.
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> std::io::Result<()>;
}

/// Spawner backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(windows))]
fn detach(_command: &mut Command) {}

impl ProcessSpawner for SystemSpawner {
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> std::io::Result<()> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut command);

        let mut child = command.spawn()?;
        let program = program.display().to_string();
        debug!(program = %program, pid = child.id(), "External client started");

        // Reap the child so it never lingers as a zombie
        std::thread::spawn(move || match child.wait() {
            Ok(status) if status.success() => debug!(program = %program, "External client exited"),
            Ok(status) => warn!(program = %program, %status, "External client exited with failure"),
            Err(e) => warn!(program = %program, error = %e, "Failed to wait for external client"),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_windows_supports_external_rdp() {
        assert!(HostPlatform::Windows.supports_external_rdp());
        assert!(!HostPlatform::Linux.supports_external_rdp());
        assert!(!HostPlatform::MacOs.supports_external_rdp());
        assert_eq!(HostPlatform::MacOs.to_string(), "macos");
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let result = SystemSpawner.spawn_detached(
            Path::new("/nonexistent/connbar-test-client"),
            &[OsString::from("file.rdp")],
        );
        assert!(result.is_err());
    }
}
