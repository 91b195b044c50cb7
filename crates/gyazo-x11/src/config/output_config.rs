use crate::config::{default_clipboard_command, default_open_browser};

use serde::{Deserialize, Serialize};

/// Where the resulting URL goes besides stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Command receiving the URL on stdin; empty disables it.
    #[serde(default = "default_clipboard_command")]
    pub clipboard_command: String,
    /// Whether to open the URL in a browser.
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
    /// Browser to use instead of the system default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_command: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            clipboard_command: default_clipboard_command(),
            open_browser: default_open_browser(),
            browser_command: None,
        }
    }
}
