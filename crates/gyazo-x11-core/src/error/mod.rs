use crate::Rect;

use std::{panic::Location, process::ExitStatus};

use error_location::ErrorLocation;
use thiserror::Error;

/// Capture errors with source location tracking.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// A pointer or key grab is already held by another client.
    #[error("Grab denied for {target}: {reason} {location}")]
    GrabDenied {
        /// What was being grabbed ("pointer" or "toggle key").
        target: &'static str,
        /// Description of why the grab failed.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture backend could not be launched.
    #[error("Failed to spawn {program}: {source} {location}")]
    SpawnFailure {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The selection resolved to a zero-area rectangle.
    #[error("Selection has no area: {rect:?} {location}")]
    DegenerateSelection {
        /// The rejected rectangle.
        rect: Rect,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture backend exited unsuccessfully.
    #[error("{program} exited with {status} {location}")]
    ChildExitFailure {
        /// Program that failed.
        program: String,
        /// Exit status reported by the backend.
        status: ExitStatus,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// X server connection or protocol failure.
    #[error("Display error: {reason} {location}")]
    Display {
        /// Description of the display failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Toggle key registration or event delivery failed.
    #[error("Hotkey error: {reason} {location}")]
    Hotkey {
        /// Description of the hotkey failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recording worker thread panicked.
    #[error("Recording worker failed: {reason} {location}")]
    Worker {
        /// Description of the worker failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error talking to a backend process.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CaptureError {
    /// Build a [`CaptureError::Display`] from anything printable.
    #[track_caller]
    pub(crate) fn display(reason: impl std::fmt::Display) -> Self {
        CaptureError::Display {
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether the caller may retry the operation later.
    ///
    /// Only a toggle key grab qualifies: another guard on the same display
    /// may still be releasing it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CaptureError::GrabDenied {
                target: "toggle key",
                ..
            }
        )
    }
}

impl From<std::io::Error> for CaptureError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CaptureError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CaptureError`].
pub type Result<T> = std::result::Result<T, CaptureError>;
