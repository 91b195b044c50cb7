use crate::config::{GYAZO_ID_FILENAME, default_mode};

use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

/// Upload destination settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Mode used when the program name does not select one.
    #[serde(default = "default_mode")]
    pub default_mode: String,
    /// Persisted Gyazo user ID; defaults to `~/.gyazo.id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_file: Option<PathBuf>,
    /// Upload URL replacing the mode's endpoint, e.g. a self-hosted server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl UploadConfig {
    /// Location of the Gyazo ID file, if one can be determined.
    pub fn id_file_path(&self) -> Option<PathBuf> {
        self.id_file
            .clone()
            .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().join(GYAZO_ID_FILENAME)))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            id_file: None,
            endpoint: None,
        }
    }
}
