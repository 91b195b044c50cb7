use crate::{
    AppError, AppResult,
    config::{
        default_blink_interval_ms, default_framerate, default_still_command,
        default_stop_timeout_secs, default_toggle_key, default_video_command,
    },
};

use gyazo_x11_core::{RecordingOptions, ToggleKey};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Capture backends, timing and the toggle key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Video encoder program, invoked with x11grab arguments.
    #[serde(default = "default_video_command")]
    pub video_command: String,
    /// Still capture program, invoked with the output path.
    #[serde(default = "default_still_command")]
    pub still_command: String,
    /// Recording frames per second.
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// Recording frame blink interval.
    #[serde(default = "default_blink_interval_ms")]
    pub blink_interval_ms: u64,
    /// How long to wait for the encoder to finish before killing it.
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
    /// Key combination toggling the recording; empty disables it.
    #[serde(default = "default_toggle_key")]
    pub toggle_key: String,
    /// Pass the encoder's stderr through.
    #[serde(default)]
    pub show_backend_output: bool,
}

impl RecordingConfig {
    /// The configured toggle key, or `None` when disabled.
    #[track_caller]
    pub fn toggle_key(&self) -> AppResult<Option<ToggleKey>> {
        let key = self.toggle_key.trim();
        if key.is_empty() {
            return Ok(None);
        }

        key.parse::<ToggleKey>()
            .map(Some)
            .map_err(|e| AppError::ConfigError {
                reason: format!("Invalid recording.toggle_key: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Session timing derived from this section.
    pub fn options(&self) -> RecordingOptions {
        RecordingOptions {
            blink_interval: Duration::from_millis(self.blink_interval_ms),
            stop_timeout: Duration::from_secs(self.stop_timeout_secs),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            video_command: default_video_command(),
            still_command: default_still_command(),
            framerate: default_framerate(),
            blink_interval_ms: default_blink_interval_ms(),
            stop_timeout_secs: default_stop_timeout_secs(),
            toggle_key: default_toggle_key(),
            show_backend_output: false,
        }
    }
}
