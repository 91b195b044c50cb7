//! Capture modes and their upload parameters.
//!
//! The binary is installed under several names (`gyazo`, `gyazogif`, `gifzo`)
//! and picks its mode from the name it was invoked as.

use std::{fmt, path::Path, str::FromStr};

use tracing::debug;

/// Mode used when neither the program name nor the config names a known one.
pub const FALLBACK_MODE: CaptureMode = CaptureMode::Gyazo;

/// What to capture and where to upload it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Still image uploaded to gyazo.com.
    Gyazo,
    /// Screen recording uploaded to gif.gyazo.com.
    GyazoGif,
    /// Screen recording uploaded to gifzo.net.
    Gifzo,
}

impl CaptureMode {
    /// Mode named by the basename of `argv0`, else `default`, else [`FALLBACK_MODE`].
    pub fn detect(argv0: Option<&str>, default: &str) -> Self {
        let invoked_as = argv0
            .map(Path::new)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str());

        if let Some(mode) = invoked_as.and_then(|name| name.parse().ok()) {
            return mode;
        }

        debug!(?invoked_as, default, "Program name is not a mode, using default");
        default.parse().unwrap_or(FALLBACK_MODE)
    }

    /// Mode name, also the program name that selects it.
    pub fn name(self) -> &'static str {
        match self {
            CaptureMode::Gyazo => "gyazo",
            CaptureMode::GyazoGif => "gyazogif",
            CaptureMode::Gifzo => "gifzo",
        }
    }

    /// Default upload endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            CaptureMode::Gyazo => "http://gyazo.com/upload.cgi",
            CaptureMode::GyazoGif => "http://gif.gyazo.com/",
            CaptureMode::Gifzo => "http://gifzo.net/",
        }
    }

    /// Multipart field carrying the capture.
    pub fn field_name(self) -> &'static str {
        match self {
            CaptureMode::Gyazo => "imagedata",
            CaptureMode::GyazoGif | CaptureMode::Gifzo => "data",
        }
    }

    /// Filename sent with the capture part.
    pub fn upload_filename(self) -> &'static str {
        match self {
            CaptureMode::Gyazo => "gyazo.com",
            CaptureMode::GyazoGif => "gyazo.mp4",
            CaptureMode::Gifzo => "gifzo.mp4",
        }
    }

    /// User-Agent header for uploads.
    pub fn user_agent(self) -> String {
        let product = match self {
            CaptureMode::Gyazo => "Gyazo2.0Linux",
            CaptureMode::GyazoGif => "Gyazo-GIFLinux",
            CaptureMode::Gifzo => "GifzoLinux",
        };
        format!("{}/{}", product, env!("CARGO_PKG_VERSION"))
    }

    /// True for the screen recording modes.
    pub fn is_video(self) -> bool {
        !matches!(self, CaptureMode::Gyazo)
    }

    /// True when uploads carry the persisted Gyazo user ID.
    pub fn uses_gyazo_id(self) -> bool {
        matches!(self, CaptureMode::Gyazo | CaptureMode::GyazoGif)
    }

    /// Suffix of the temporary capture file.
    pub fn file_suffix(self) -> &'static str {
        if self.is_video() { ".mp4" } else { ".png" }
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gyazo" => Ok(CaptureMode::Gyazo),
            "gyazogif" => Ok(CaptureMode::GyazoGif),
            "gifzo" => Ok(CaptureMode::Gifzo),
            other => Err(format!("unknown capture mode: {}", other)),
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
