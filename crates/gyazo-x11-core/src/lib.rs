//! gyazo-x11 core library
//!
//! Interactive region selection and screen recording on X11: a pointer-grab
//! drag selector, an inverting root-window overlay, and a recording session
//! whose start and stop are driven by a toggle key or an interrupt.
//!
//! # Example
//!
//! ```no_run
//! use gyazo_x11_core::{
//!     CoreResult, FfmpegBackend, HotkeyToggleSource, InterruptSignal, RecordingGuard,
//!     RecordingOptions, RecordingSession, X11OverlayFactory, display_target, select_region,
//! };
//!
//! fn main() -> CoreResult<()> {
//!     let display = display_target();
//!     let rect = select_region(&display)?.ensure_area()?;
//!
//!     let mut guard = RecordingGuard::<HotkeyToggleSource, _>::new(None, InterruptSignal);
//!     let mut session = RecordingSession::new(
//!         FfmpegBackend::default(),
//!         X11OverlayFactory::new(display.clone()),
//!         display,
//!         "/tmp/capture.mp4",
//!         RecordingOptions::default(),
//!     );
//!
//!     guard.wait_start()?;
//!     session.start(rect)?;
//!     guard.wait_finish()?;
//!     session.stop()?;
//!     Ok(())
//! }
//! ```

mod display;
mod error;
mod geometry;
mod guard;
mod input;
mod overlay;
mod recording;
mod selector;
mod still;

pub use {
    display::{DEFAULT_DISPLAY, X11Display, display_target},
    error::{CaptureError, Result as CoreResult},
    geometry::{Point, Rect},
    guard::{
        DEFAULT_POLL_INTERVAL, HotkeyToggleSource, InterruptSignal, KeyEvent, RecordingGuard,
        StopSignal, ToggleKey, ToggleKeySource, ToggleTracker, ignore_interrupts,
    },
    input::{EventQueue, EventSource, PointerDevice, PointerEvent, X11Pointer},
    overlay::{Overlay, OverlayFactory, RectangleFrame, X11OverlayFactory},
    recording::{
        CaptureTarget, FfmpegBackend, RecordingOptions, RecordingSession, StartOutcome,
        VideoBackend,
    },
    selector::{RegionSelector, SelectionState, select_region},
    still::StillBackend,
};

#[cfg(test)]
mod tests;
