//! External RDP launcher
//!
//! Launching writes a `.rdp` descriptor to the temp directory, starts the
//! external client with the descriptor as its only argument and schedules
//! the file for deletion. Repeated launches of the same target within a
//! short window are dropped.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{LaunchError, LaunchResult};
use crate::models::{Profile, ProtocolType};
use crate::protocol::{normalize_options, render_descriptor, RdpLaunchOptions};
use crate::scheduler::ScheduledTask;

use super::platform::{HostPlatform, ProcessSpawner, SystemSpawner};

/// Repeat launches of one target inside this window are suppressed
pub const LAUNCH_DEBOUNCE: Duration = Duration::from_millis(1500);

/// A target launched within this window is reported active
pub const ACTIVE_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Descriptor files are deleted this long after launch
pub const CLEANUP_DELAY: Duration = Duration::from_secs(120);

const DESCRIPTOR_PREFIX: &str = "connbar-rdp-";
const DESCRIPTOR_EXTENSION: &str = "rdp";

/// Identity of one launch target: normalized host and port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaunchKey {
    /// Normalized host
    pub host: String,
    /// Normalized port
    pub port: u16,
}

impl From<&RdpLaunchOptions> for LaunchKey {
    fn from(options: &RdpLaunchOptions) -> Self {
        Self {
            host: options.host.clone(),
            port: options.port,
        }
    }
}

impl std::fmt::Display for LaunchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// What a successful call to [`RdpLauncher::launch`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The client was started with this descriptor file
    Spawned(PathBuf),
    /// The same target was launched moments ago; nothing happened
    Suppressed,
}

/// Launches RDP profiles through an external client
pub struct RdpLauncher {
    platform: HostPlatform,
    spawner: Arc<dyn ProcessSpawner>,
    temp_dir: PathBuf,
    client_path: PathBuf,
    launches: Mutex<HashMap<LaunchKey, Instant>>,
    cleanups: Mutex<Vec<ScheduledTask>>,
}

impl std::fmt::Debug for RdpLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdpLauncher")
            .field("platform", &self.platform)
            .field("temp_dir", &self.temp_dir)
            .field("client_path", &self.client_path)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RdpLauncher {
    /// Creates a launcher for the host platform using the system temp directory
    #[must_use]
    pub fn new(client_path: impl Into<PathBuf>) -> Self {
        Self {
            platform: HostPlatform::current(),
            spawner: Arc::new(SystemSpawner),
            temp_dir: std::env::temp_dir(),
            client_path: client_path.into(),
            launches: Mutex::new(HashMap::new()),
            cleanups: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the detected platform
    #[must_use]
    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Overrides how processes are started
    #[must_use]
    pub fn with_spawner(mut self, spawner: Arc<dyn ProcessSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Overrides where descriptor files are written
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Client executable used for launches
    #[must_use]
    pub fn client_path(&self) -> &Path {
        &self.client_path
    }

    /// Changes the client executable for later launches
    pub fn set_client_path(&mut self, client_path: impl Into<PathBuf>) {
        self.client_path = client_path.into();
    }

    /// Launches an RDP profile
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is not RDP, the host platform has no
    /// external client, the host is empty, or the descriptor cannot be
    /// written or the client cannot be started.
    pub fn launch(&self, profile: &Profile) -> LaunchResult<LaunchOutcome> {
        if profile.protocol != ProtocolType::Rdp {
            return Err(LaunchError::NotRdp(profile.name.clone()));
        }
        if !self.platform.supports_external_rdp() {
            return Err(LaunchError::UnsupportedPlatform(self.platform));
        }

        let options = normalize_options(&profile.options);
        if options.host.is_empty() {
            return Err(LaunchError::InvalidHost);
        }

        let key = LaunchKey::from(&options);
        if self.is_debounced(&key) {
            debug!(address = %key, "Suppressed repeated RDP launch");
            return Ok(LaunchOutcome::Suppressed);
        }

        let path = self.write_descriptor(&render_descriptor(&options))?;
        if let Err(e) = self
            .spawner
            .spawn_detached(&self.client_path, &[OsString::from(path.as_os_str())])
        {
            remove_descriptor(&path);
            return Err(LaunchError::SpawnFailed(format!(
                "{}: {e}",
                self.client_path.display()
            )));
        }

        self.record_launch(key.clone());
        info!(address = %key, file = %path.display(), "RDP client launched");
        self.schedule_cleanup(path.clone());
        Ok(LaunchOutcome::Spawned(path))
    }

    /// Returns true if the profile's target was launched within the last hour
    ///
    /// Time-based approximation only: the external process is not tracked,
    /// so a client closed a minute after launch still reads as active.
    #[must_use]
    pub fn is_active(&self, profile: &Profile) -> bool {
        if profile.protocol != ProtocolType::Rdp {
            return false;
        }
        let key = LaunchKey::from(&normalize_options(&profile.options));
        lock(&self.launches)
            .get(&key)
            .is_some_and(|at| at.elapsed() < ACTIVE_WINDOW)
    }

    /// Number of descriptor deletions still scheduled
    #[must_use]
    pub fn pending_cleanups(&self) -> usize {
        let mut cleanups = lock(&self.cleanups);
        cleanups.retain(|task| !task.is_finished());
        cleanups.len()
    }

    /// Deletes descriptor files older than the cleanup delay
    ///
    /// Covers files whose deletion never ran because the process exited
    /// first. Returns the number of files removed.
    pub fn sweep_stale_descriptors(&self) -> usize {
        self.sweep_descriptors_older_than(CLEANUP_DELAY)
    }

    /// Deletes descriptor files last modified more than `age` ago
    pub fn sweep_descriptors_older_than(&self, age: Duration) -> usize {
        let Ok(entries) = fs::read_dir(&self.temp_dir) else {
            return 0;
        };
        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_descriptor_file(&path) {
                continue;
            }
            let stale = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|elapsed| elapsed >= age);
            if stale && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "Removed stale RDP descriptors");
        }
        removed
    }

    /// Returns true if `key` was launched inside the debounce window
    fn is_debounced(&self, key: &LaunchKey) -> bool {
        lock(&self.launches)
            .get(key)
            .is_some_and(|at| at.elapsed() < LAUNCH_DEBOUNCE)
    }

    /// Only successful spawns are recorded
    fn record_launch(&self, key: LaunchKey) {
        let now = Instant::now();
        let mut launches = lock(&self.launches);
        launches.retain(|_, at| now.duration_since(*at) < ACTIVE_WINDOW);
        launches.insert(key, now);
    }

    fn write_descriptor(&self, payload: &str) -> LaunchResult<PathBuf> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        let file_name = format!(
            "{DESCRIPTOR_PREFIX}{stamp}-{}.{DESCRIPTOR_EXTENSION}",
            &suffix[..8]
        );
        let path = self.temp_dir.join(file_name);
        fs::write(&path, payload)
            .map_err(|e| LaunchError::DescriptorWrite(format!("{}: {e}", path.display())))?;
        Ok(path)
    }

    fn schedule_cleanup(&self, path: PathBuf) {
        let task = ScheduledTask::spawn(CLEANUP_DELAY, move || remove_descriptor(&path));
        // Without a runtime the file is left for the next sweep
        if let Some(task) = task {
            let mut cleanups = lock(&self.cleanups);
            cleanups.retain(|t| !t.is_finished());
            cleanups.push(task);
        }
    }
}

impl Drop for RdpLauncher {
    fn drop(&mut self) {
        for task in lock(&self.cleanups).drain(..) {
            task.cancel();
        }
    }
}

fn remove_descriptor(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!(file = %path.display(), error = %e, "Failed to remove RDP descriptor");
    }
}

fn is_descriptor_file(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(DESCRIPTOR_PREFIX));
    name_matches
        && path
            .extension()
            .is_some_and(|ext| ext == DESCRIPTOR_EXTENSION)
}
