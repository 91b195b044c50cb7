//! Video recording sessions with a blinking boundary frame.

mod backend;
mod session;

pub use {
    backend::{CaptureTarget, FfmpegBackend, VideoBackend},
    session::{RecordingOptions, RecordingSession, StartOutcome},
};

#[cfg(test)]
pub(crate) use session::hand_off_backend;
