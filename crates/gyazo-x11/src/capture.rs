//! Running one capture from selection to finished file.

use crate::{AppResult, CaptureMode, config::RecordingConfig};

use gyazo_x11_core::{
    CoreResult, FfmpegBackend, HotkeyToggleSource, InterruptSignal, OverlayFactory, Rect,
    RecordingGuard, RecordingSession, StillBackend, StopSignal, ToggleKeySource, VideoBackend,
    X11OverlayFactory, display_target, ignore_interrupts, select_region,
};

use std::path::Path;

use tempfile::TempPath;
use tracing::{info, instrument, warn};

/// Drives the still or video capture for a mode.
#[derive(Debug, Clone)]
pub struct SessionOrchestrator {
    config: RecordingConfig,
}

impl SessionOrchestrator {
    /// Orchestrator using the given recording settings.
    pub fn new(config: RecordingConfig) -> Self {
        Self { config }
    }

    /// Capture into a new temporary file; it is removed when the path drops.
    #[instrument(skip(self))]
    pub fn capture(&self, mode: CaptureMode) -> AppResult<TempPath> {
        let output = tempfile::Builder::new()
            .prefix("gyazo-x11-")
            .suffix(mode.file_suffix())
            .tempfile()?
            .into_temp_path();

        if mode.is_video() {
            self.capture_video(&output)?;
        } else {
            self.capture_still(&output)?;
        }

        Ok(output)
    }

    /// Let the still backend frame and grab an image into `output`.
    pub fn capture_still(&self, output: &Path) -> AppResult<()> {
        StillBackend::new(self.config.still_command.as_str()).capture(output)?;
        Ok(())
    }

    /// Select a region and record it into `output` until told to stop.
    ///
    /// A denied grab or an empty selection aborts before anything is recorded.
    #[instrument(skip(self))]
    pub fn capture_video(&self, output: &Path) -> AppResult<()> {
        let toggle_key = self.config.toggle_key()?;
        let hint_key = toggle_key.as_ref().map(|key| key.name().to_string());

        let display = display_target();
        let backend = FfmpegBackend::new(
            self.config.video_command.as_str(),
            self.config.framerate,
            self.config.show_backend_output,
        );
        let session = RecordingSession::new(
            backend,
            X11OverlayFactory::new(display.as_str()),
            display.as_str(),
            output,
            self.config.options(),
        );

        record_region(
            || select_region(&display),
            || {
                let keys = toggle_key.map(HotkeyToggleSource::new).transpose()?;
                Ok(RecordingGuard::new(keys, InterruptSignal))
            },
            session,
            hint_key.as_deref(),
            ignore_interrupts,
        )
    }
}

/// Select a rectangle, then record it between the user's start and stop.
///
/// `guard` is built only once a usable rectangle was selected, so a failed
/// selection never registers the toggle key or spawns the backend.
/// `detach_interrupts` runs right before the backend starts.
pub(crate) fn record_region<K, S, B, F>(
    select: impl FnOnce() -> CoreResult<Rect>,
    guard: impl FnOnce() -> AppResult<RecordingGuard<K, S>>,
    mut session: RecordingSession<B, F>,
    hint_key: Option<&str>,
    detach_interrupts: impl FnOnce() -> CoreResult<()>,
) -> AppResult<()>
where
    K: ToggleKeySource,
    S: StopSignal,
    B: VideoBackend,
    F: OverlayFactory,
{
    let rect = select()?.ensure_area()?;
    let mut guard = guard()?;

    if let Some(key) = hint_key {
        eprintln!("Press {} to start recording", key);
    }
    guard.wait_start()?;

    // The backend inherits the ignored disposition; wait_finish re-arms it.
    detach_interrupts()?;
    session.start(rect)?;

    match hint_key {
        Some(key) => eprintln!("Press {} or Ctrl-C to stop recording", key),
        None => eprintln!("Ctrl-C to stop recording"),
    }

    guard.wait_finish()?;

    if let Some(status) = session.stop()? {
        if status.success() {
            info!(?rect, "Recording finished");
        } else {
            // The file may still hold a usable partial recording.
            warn!(%status, "Video backend exited unsuccessfully");
        }
    }

    Ok(())
}
