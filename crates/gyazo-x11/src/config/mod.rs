#[allow(clippy::module_inception)]
mod config;
mod output_config;
mod recording_config;
mod upload_config;

pub(crate) use {
    config::Config, output_config::OutputConfig, recording_config::RecordingConfig,
    upload_config::UploadConfig,
};

pub(crate) const DEFAULT_VIDEO_COMMAND: &str = "ffmpeg";
pub(crate) const DEFAULT_STILL_COMMAND: &str = "import";
pub(crate) const DEFAULT_FRAMERATE: u32 = 25;
pub(crate) const DEFAULT_BLINK_INTERVAL_MS: u64 = 300;
pub(crate) const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_CLIPBOARD_COMMAND: &str = "xclip";
pub(crate) const DEFAULT_OPEN_BROWSER: bool = true;
pub(crate) const DEFAULT_MODE: &str = "gyazo";
pub(crate) const GYAZO_ID_FILENAME: &str = ".gyazo.id";

pub(crate) fn default_video_command() -> String {
    DEFAULT_VIDEO_COMMAND.to_string()
}

pub(crate) fn default_still_command() -> String {
    DEFAULT_STILL_COMMAND.to_string()
}

pub(crate) fn default_framerate() -> u32 {
    DEFAULT_FRAMERATE
}

pub(crate) fn default_blink_interval_ms() -> u64 {
    DEFAULT_BLINK_INTERVAL_MS
}

pub(crate) fn default_stop_timeout_secs() -> u64 {
    DEFAULT_STOP_TIMEOUT_SECS
}

pub(crate) fn default_toggle_key() -> String {
    gyazo_x11_core::ToggleKey::DEFAULT.to_string()
}

pub(crate) fn default_clipboard_command() -> String {
    DEFAULT_CLIPBOARD_COMMAND.to_string()
}

pub(crate) fn default_open_browser() -> bool {
    DEFAULT_OPEN_BROWSER
}

pub(crate) fn default_mode() -> String {
    DEFAULT_MODE.to_string()
}
