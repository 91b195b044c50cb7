use crate::{
    CaptureError, CoreResult, Rect,
    overlay::{Overlay, OverlayFactory},
    recording::{CaptureTarget, VideoBackend},
};

use std::{
    io::{self, Write},
    panic::Location,
    path::PathBuf,
    process::{Child, ChildStdin, ExitStatus, Stdio},
    sync::mpsc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How often `stop` checks whether the worker has finished.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Timing knobs for a [`RecordingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingOptions {
    /// Time between frame toggles while recording.
    pub blink_interval: Duration,
    /// How long `stop` waits for the backend before killing it.
    pub stop_timeout: Duration,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            blink_interval: Duration::from_millis(300),
            stop_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of [`RecordingSession::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new backend process was launched.
    Started {
        /// Log correlation id for this recording.
        session_id: Uuid,
        /// Process id of the backend.
        pid: u32,
    },
    /// A recording was already running; nothing was launched.
    AlreadyRecording,
}

struct SessionHandle {
    session_id: Uuid,
    pid: u32,
    control: ChildStdin,
    worker: WorkerHandle,
    started_at: Instant,
}

/// Idle/Recording state machine around one video backend process.
///
/// While recording, a worker thread owns the backend process and blinks a
/// frame around the recorded region on its own display connection. The
/// backend's stdin is the control pipe used to stop it.
pub struct RecordingSession<B: VideoBackend, F: OverlayFactory> {
    backend: B,
    overlays: F,
    display: String,
    output: PathBuf,
    options: RecordingOptions,
    handle: Option<SessionHandle>,
}

impl<B: VideoBackend, F: OverlayFactory> RecordingSession<B, F> {
    /// An idle session that will record `display` into `output`.
    pub fn new(
        backend: B,
        overlays: F,
        display: impl Into<String>,
        output: impl Into<PathBuf>,
        options: RecordingOptions,
    ) -> Self {
        Self {
            backend,
            overlays,
            display: display.into(),
            output: output.into(),
            options,
            handle: None,
        }
    }

    /// True between a successful `start` and the matching `stop`.
    pub fn is_recording(&self) -> bool {
        self.handle.is_some()
    }

    /// Launch the backend on `rect` and start the recording frame.
    ///
    /// # Errors
    ///
    /// Returns `SpawnFailure` if the backend cannot be launched.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self, rect: Rect) -> CoreResult<StartOutcome> {
        if let Some(handle) = &self.handle {
            debug!(session_id = %handle.session_id, "Recording already running");
            return Ok(StartOutcome::AlreadyRecording);
        }

        let target = CaptureTarget {
            display: self.display.clone(),
            rect,
            output: self.output.clone(),
        };

        let mut command = self.backend.command(&target);
        command.stdin(Stdio::piped());

        let mut child = command.spawn().map_err(|source| CaptureError::SpawnFailure {
            program: self.backend.program().to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;
        let pid = child.id();

        let Some(control) = child.stdin.take() else {
            reap_backend(child);
            return Err(CaptureError::Io {
                source: io::Error::other("backend stdin was not piped"),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let session_id = Uuid::new_v4();
        let overlays = self.overlays.clone();
        let frame = rect.padded_outline();
        let interval = self.options.blink_interval;

        let worker = hand_off_backend(child, |child_slot| {
            thread::Builder::new()
                .name("recording-frame".to_string())
                .spawn(move || match child_slot.recv() {
                    Ok(child) => watch_backend(child, overlays, frame, interval, session_id),
                    Err(_) => Err(CaptureError::Worker {
                        reason: "backend handoff dropped".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    }),
                })
        })?;

        self.handle = Some(SessionHandle {
            session_id,
            pid,
            control,
            worker,
            started_at: Instant::now(),
        });

        info!(
            session_id = %session_id,
            pid,
            program = self.backend.program(),
            output = ?self.output,
            "Recording started"
        );

        Ok(StartOutcome::Started { session_id, pid })
    }

    /// Ask the backend to finish and wait for it.
    ///
    /// Returns `None` when idle. If the backend already exited on its own, its
    /// status is still returned. A backend that ignores the stop token for
    /// longer than the stop timeout is killed.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Option<ExitStatus>> {
        let Some(handle) = self.handle.take() else {
            debug!("Nothing to stop");
            return Ok(None);
        };

        let SessionHandle {
            session_id,
            pid,
            mut control,
            worker,
            started_at,
        } = handle;

        let token = self.backend.stop_token();
        if let Err(e) = control.write_all(token).and_then(|()| control.flush()) {
            // The backend closed its stdin, most likely because it already exited.
            debug!(session_id = %session_id, error = ?e, "Stop token not delivered");
        }
        drop(control);

        let deadline = Instant::now() + self.options.stop_timeout;
        while !worker.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    session_id = %session_id,
                    pid,
                    timeout_ms = self.options.stop_timeout.as_millis(),
                    "Backend ignored stop token, killing it"
                );
                kill_backend(pid);
                break;
            }
            thread::sleep(STOP_POLL_INTERVAL);
        }

        let status = worker.join().map_err(|_| CaptureError::Worker {
            reason: "recording worker panicked".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })??;

        info!(
            session_id = %session_id,
            status = %status,
            duration_ms = started_at.elapsed().as_millis(),
            "Recording stopped"
        );

        Ok(Some(status))
    }
}

impl<B: VideoBackend, F: OverlayFactory> Drop for RecordingSession<B, F> {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }

        if let Err(e) = self.stop() {
            warn!(error = ?e, "Failed to stop recording on drop");
        }
    }
}

pub(crate) type WorkerHandle = JoinHandle<CoreResult<ExitStatus>>;

/// Start a worker with `spawn`, then pass it `child` through a channel.
///
/// The child stays with the caller until the worker exists, so on failure it
/// is killed and reaped here instead of leaking.
#[track_caller]
pub(crate) fn hand_off_backend<S>(child: Child, spawn: S) -> CoreResult<WorkerHandle>
where
    S: FnOnce(mpsc::Receiver<Child>) -> io::Result<WorkerHandle>,
{
    let (handoff, child_slot) = mpsc::channel();

    let worker = match spawn(child_slot) {
        Ok(worker) => worker,
        Err(source) => {
            reap_backend(child);
            return Err(CaptureError::Io {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    if let Err(mpsc::SendError(child)) = handoff.send(child) {
        reap_backend(child);
        if worker.join().is_err() {
            warn!("Recording worker panicked before taking the backend");
        }
        return Err(CaptureError::Worker {
            reason: "recording worker exited before taking the backend".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(worker)
}

/// Worker body: blink the frame until the backend exits, then hide it.
fn watch_backend<F: OverlayFactory>(
    mut child: Child,
    overlays: F,
    frame: Rect,
    interval: Duration,
    session_id: Uuid,
) -> CoreResult<ExitStatus> {
    let mut overlay = match overlays.open() {
        Ok(overlay) => Some(overlay),
        Err(e) => {
            warn!(session_id = %session_id, error = ?e, "Recording frame unavailable");
            None
        }
    };

    let mut shown = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }

        if let Some(frame_overlay) = overlay.as_mut() {
            match frame_overlay.draw(frame) {
                Ok(()) => shown = !shown,
                Err(e) => {
                    warn!(session_id = %session_id, error = ?e, "Recording frame lost");
                    overlay = None;
                }
            }
        }

        thread::sleep(interval);
    };

    if let Some(mut frame_overlay) = overlay {
        if shown {
            if let Err(e) = frame_overlay.draw(frame) {
                warn!(session_id = %session_id, error = ?e, "Failed to hide recording frame");
            }
        }
        if let Err(e) = frame_overlay.destroy() {
            warn!(session_id = %session_id, error = ?e, "Failed to destroy recording frame");
        }
    }

    debug!(session_id = %session_id, status = %status, "Backend exited");

    Ok(status)
}

/// Kill and wait for a backend that never got a worker.
fn reap_backend(mut child: Child) {
    let pid = child.id();
    if let Err(e) = child.kill() {
        warn!(pid, error = %e, "Failed to kill backend");
    }
    match child.wait() {
        Ok(status) => debug!(pid, status = %status, "Orphaned backend reaped"),
        Err(e) => warn!(pid, error = %e, "Failed to reap backend"),
    }
}

fn kill_backend(pid: u32) {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return;
    };

    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(pid, libc::SIGKILL) };
    if rc != 0 {
        warn!(pid, error = %std::io::Error::last_os_error(), "Failed to kill backend");
    }
}
