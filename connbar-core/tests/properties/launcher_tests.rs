//! Property-based tests for the external RDP launcher
//!
//! A second launch of the same target is suppressed exactly when it comes
//! inside the debounce window, and every spawned client gets a descriptor
//! whose contents match the rendered options.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use connbar_core::models::Profile;
use connbar_core::protocol::{normalize_options, render_descriptor};
use connbar_core::session::{
    HostPlatform, LaunchOutcome, ProcessSpawner, RdpLauncher, CLEANUP_DELAY, LAUNCH_DEBOUNCE,
};
use proptest::prelude::*;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSpawner {
    calls: Mutex<Vec<(PathBuf, Vec<OsString>)>>,
}

impl RecordingSpawner {
    fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> io::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_path_buf(), args.to_vec()));
        Ok(())
    }
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn launcher(spawner: &Arc<RecordingSpawner>, temp: &TempDir) -> RdpLauncher {
    RdpLauncher::new("mstsc.exe")
        .with_platform(HostPlatform::Windows)
        .with_spawner(Arc::clone(spawner) as Arc<dyn ProcessSpawner>)
        .with_temp_dir(temp.path())
}

fn arb_rdp_profile() -> impl Strategy<Value = Profile> {
    (
        "[a-z][a-z0-9-]{0,12}",
        prop::option::of(1u16..),
        prop::option::of("[a-z]{1,8}"),
        any::<bool>(),
        prop::option::of((600u32..9000, 600u32..9000)),
    )
        .prop_map(|(host, port, user, fullscreen, size)| {
            let mut profile = Profile::new_rdp("desk", host);
            if let Some(port) = port {
                profile = profile.with_port(port);
            }
            if let Some(user) = user {
                profile = profile.with_user(user);
            }
            profile.options.fullscreen = fullscreen;
            if let Some((width, height)) = size {
                profile.options.width = Some(width.into());
                profile.options.height = Some(height.into());
            }
            profile
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn repeat_launch_is_suppressed_only_inside_window(gap_ms in 0u64..4000) {
        let runtime = paused_runtime();
        let temp = TempDir::new().unwrap();
        let spawner = Arc::new(RecordingSpawner::default());

        let (first, second) = runtime.block_on(async {
            let launcher = launcher(&spawner, &temp);
            let profile = Profile::new_rdp("desk", "10.0.0.5");
            let first = launcher.launch(&profile).unwrap();
            tokio::time::advance(Duration::from_millis(gap_ms)).await;
            let second = launcher.launch(&profile).unwrap();
            (first, second)
        });

        prop_assert!(matches!(first, LaunchOutcome::Spawned(_)));
        let suppressed = second == LaunchOutcome::Suppressed;
        prop_assert_eq!(suppressed, Duration::from_millis(gap_ms) < LAUNCH_DEBOUNCE);
        prop_assert_eq!(spawner.count(), if suppressed { 1 } else { 2 });
    }

    #[test]
    fn descriptor_file_matches_rendered_options(profile in arb_rdp_profile()) {
        let runtime = paused_runtime();
        let temp = TempDir::new().unwrap();
        let spawner = Arc::new(RecordingSpawner::default());

        let outcome = runtime.block_on(async {
            let launcher = launcher(&spawner, &temp);
            launcher.launch(&profile).unwrap()
        });

        let LaunchOutcome::Spawned(path) = outcome else {
            return Err(TestCaseError::fail("expected a spawn"));
        };
        let expected = render_descriptor(&normalize_options(&profile.options));
        prop_assert_eq!(fs::read_to_string(&path).unwrap(), expected);

        let calls = spawner.calls.lock().unwrap();
        prop_assert_eq!(calls.len(), 1);
        prop_assert_eq!(&calls[0].0, &PathBuf::from("mstsc.exe"));
        prop_assert_eq!(&calls[0].1, &vec![OsString::from(path.as_os_str())]);
    }
}

#[test]
fn different_targets_are_debounced_independently() {
    let runtime = paused_runtime();
    let temp = TempDir::new().unwrap();
    let spawner = Arc::new(RecordingSpawner::default());
    runtime.block_on(async {
        let launcher = launcher(&spawner, &temp);
        let a = Profile::new_rdp("a", "10.0.0.5");
        let b = Profile::new_rdp("b", "10.0.0.5").with_port(3390);
        assert!(matches!(launcher.launch(&a), Ok(LaunchOutcome::Spawned(_))));
        assert!(matches!(launcher.launch(&b), Ok(LaunchOutcome::Spawned(_))));
        assert_eq!(launcher.launch(&a).unwrap(), LaunchOutcome::Suppressed);
    });
    assert_eq!(spawner.count(), 2);
}

#[test]
fn descriptor_is_removed_after_cleanup_delay() {
    let runtime = paused_runtime();
    let temp = TempDir::new().unwrap();
    let spawner = Arc::new(RecordingSpawner::default());
    runtime.block_on(async {
        let launcher = launcher(&spawner, &temp);
        let LaunchOutcome::Spawned(path) = launcher
            .launch(&Profile::new_rdp("desk", "10.0.0.5"))
            .unwrap()
        else {
            panic!("expected a spawn");
        };
        assert!(path.exists());
        assert_eq!(launcher.pending_cleanups(), 1);

        tokio::time::sleep(CLEANUP_DELAY + Duration::from_secs(1)).await;
        assert!(!path.exists());
        assert_eq!(launcher.pending_cleanups(), 0);
    });
}
