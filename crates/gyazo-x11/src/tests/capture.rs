use crate::{
    AppError, CaptureMode, SessionOrchestrator, capture::record_region, config::RecordingConfig,
};

use gyazo_x11_core::{
    CaptureError, CaptureTarget, CoreResult, HotkeyToggleSource, OverlayFactory, Rect,
    RecordingGuard, RectangleFrame, RecordingOptions, RecordingSession, StopSignal, VideoBackend,
};

use std::{
    cell::Cell,
    panic::Location,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tempfile::TempDir;

/// Encoder stand-in that leaves a marker file once it runs.
#[derive(Debug, Clone)]
struct MarkerBackend {
    marker: PathBuf,
}

impl VideoBackend for MarkerBackend {
    fn program(&self) -> &str {
        "sh"
    }

    fn command(&self, _target: &CaptureTarget) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg("touch \"$0\"; cat > /dev/null")
            .arg(&self.marker)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

/// No display to draw the recording frame on.
#[derive(Debug, Clone)]
struct Headless;

impl OverlayFactory for Headless {
    type Overlay = RectangleFrame;

    #[track_caller]
    fn open(&self) -> CoreResult<Self::Overlay> {
        Err(CaptureError::Display {
            reason: "headless test".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Stop flag that is already raised the moment it is armed.
#[derive(Debug, Clone, Default)]
struct StopOnArm {
    raised: Arc<AtomicBool>,
}

impl StopSignal for StopOnArm {
    fn reset(&self) {
        self.raised.store(false, Ordering::SeqCst);
    }

    fn arm(&self) -> CoreResult<()> {
        self.raised.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

fn recorder(dir: &TempDir) -> (RecordingSession<MarkerBackend, Headless>, PathBuf) {
    let marker = dir.path().join("backend-started");
    let session = RecordingSession::new(
        MarkerBackend {
            marker: marker.clone(),
        },
        Headless,
        ":99",
        dir.path().join("out.mp4"),
        RecordingOptions {
            blink_interval: Duration::from_millis(20),
            stop_timeout: Duration::from_secs(5),
        },
    );
    (session, marker)
}

fn guard() -> RecordingGuard<HotkeyToggleSource, StopOnArm> {
    RecordingGuard::new(None, StopOnArm::default()).with_poll_interval(Duration::from_millis(10))
}

fn assert_absent(marker: &Path) {
    assert!(!marker.exists(), "backend ran: {}", marker.display());
}

fn orchestrator(still_command: &str) -> SessionOrchestrator {
    SessionOrchestrator::new(RecordingConfig {
        still_command: still_command.to_string(),
        ..RecordingConfig::default()
    })
}

/// WHAT: Still capture leaves a png temp file that is removed afterwards
/// WHY: Captures must not pile up in the temp directory
#[test]
#[allow(clippy::unwrap_used)]
fn given_still_mode_when_capturing_then_png_temp_file_cleaned_on_drop() {
    // Given: A still backend that just creates the file
    let orchestrator = orchestrator("touch");

    // When: Capturing
    let capture = orchestrator.capture(CaptureMode::Gyazo).unwrap();
    let path = capture.to_path_buf();

    // Then: File exists with the png suffix until dropped
    assert!(path.exists());
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    drop(capture);
    assert!(!path.exists());
}

/// WHAT: A failing still backend aborts the capture
/// WHY: There is no usable image to upload
#[test]
fn given_failing_still_backend_when_capturing_then_child_exit_failure() {
    // Given: A backend that exits non-zero
    let orchestrator = orchestrator("false");

    // When: Capturing
    let result = orchestrator.capture(CaptureMode::Gyazo);

    // Then: Capture error carrying the exit failure
    assert!(matches!(
        result,
        Err(AppError::Capture {
            source: CaptureError::ChildExitFailure { .. },
            ..
        })
    ));
}

/// WHAT: A missing still backend is a spawn failure
/// WHY: The user needs to know the capture tool is not installed
#[test]
fn given_missing_still_backend_when_capturing_then_spawn_failure() {
    // Given: A backend that does not exist
    let orchestrator = orchestrator("/nonexistent/import");

    // When: Capturing
    let result = orchestrator.capture(CaptureMode::Gyazo);

    // Then: SpawnFailure
    assert!(matches!(
        result,
        Err(AppError::Capture {
            source: CaptureError::SpawnFailure { .. },
            ..
        })
    ));
}

/// WHAT: A zero-area selection aborts before the toggle key or backend is touched
/// WHY: There is nothing to record, and no encoder may be left behind
#[test]
#[allow(clippy::unwrap_used)]
fn given_zero_area_selection_when_recording_then_aborted_before_backend_spawns() {
    // Given: A selection with no width
    let dir = tempfile::tempdir().unwrap();
    let (session, marker) = recorder(&dir);
    let guard_built = Cell::new(false);
    let detached = Cell::new(false);

    // When: Recording the selection
    let result = record_region(
        || Ok(Rect::new(10, 10, 0, 40)),
        || {
            guard_built.set(true);
            Ok(guard())
        },
        session,
        None,
        || {
            detached.set(true);
            Ok(())
        },
    );

    // Then: DegenerateSelection, and nothing after selection ran
    assert!(matches!(
        result,
        Err(AppError::Capture {
            source: CaptureError::DegenerateSelection { .. },
            ..
        })
    ));
    assert!(!guard_built.get());
    assert!(!detached.get());
    assert_absent(&marker);
}

/// WHAT: A denied pointer grab aborts the recording
/// WHY: Without the pointer there is no region to record
#[test]
#[allow(clippy::unwrap_used)]
fn given_pointer_grab_denied_when_recording_then_grab_error_and_no_backend() {
    // Given: Another client holds the pointer
    let dir = tempfile::tempdir().unwrap();
    let (session, marker) = recorder(&dir);

    // When: Recording
    let result = record_region(
        || {
            Err(CaptureError::GrabDenied {
                target: "pointer",
                reason: "AlreadyGrabbed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
        },
        || Ok(guard()),
        session,
        None,
        || Ok(()),
    );

    // Then: GrabDenied, backend never spawned
    assert!(matches!(
        result,
        Err(AppError::Capture {
            source: CaptureError::GrabDenied {
                target: "pointer",
                ..
            },
            ..
        })
    ));
    assert_absent(&marker);
}

/// WHAT: A usable selection runs the backend until the stop flag and then returns
/// WHY: Interrupts must be detached before the backend starts, and stop must finish it
#[test]
#[allow(clippy::unwrap_used)]
fn given_selection_when_recording_then_backend_runs_until_stopped() {
    // Given: A region and a stop flag raised as soon as recording waits
    let dir = tempfile::tempdir().unwrap();
    let (session, marker) = recorder(&dir);
    let detached = Cell::new(false);

    // When: Recording
    record_region(
        || Ok(Rect::new(100, 120, 320, 240)),
        || Ok(guard()),
        session,
        None,
        || {
            assert_absent(&marker);
            detached.set(true);
            Ok(())
        },
    )
    .unwrap();

    // Then: Interrupts were detached first and the backend ran to completion
    assert!(detached.get());
    assert!(marker.exists());
}
