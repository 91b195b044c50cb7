use crate::Rect;

use std::{
    path::PathBuf,
    process::{Command, Stdio},
};

/// Where and what a video backend records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    /// X display name, e.g. `:0.0`.
    pub display: String,
    /// Screen region to record.
    pub rect: Rect,
    /// File the backend writes.
    pub output: PathBuf,
}

/// An external video encoder controlled through its stdin.
pub trait VideoBackend: Send {
    /// Executable name, for error messages.
    fn program(&self) -> &str;

    /// Build the command that records `target`.
    ///
    /// The session attaches stdin to its control pipe after this returns.
    fn command(&self, target: &CaptureTarget) -> Command;

    /// Bytes that ask the backend to finish the file and exit.
    fn stop_token(&self) -> &[u8] {
        b"q"
    }
}

/// ffmpeg recording through the `x11grab` input device.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    program: String,
    framerate: u32,
    show_output: bool,
}

impl FfmpegBackend {
    /// Frame rate used when none is configured.
    pub const DEFAULT_FRAMERATE: u32 = 25;

    /// Backend running `program` at `framerate` frames per second.
    ///
    /// With `show_output` the encoder's stderr is passed through, otherwise
    /// it is discarded.
    pub fn new(program: impl Into<String>, framerate: u32, show_output: bool) -> Self {
        Self {
            program: program.into(),
            framerate,
            show_output,
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg", Self::DEFAULT_FRAMERATE, false)
    }
}

impl VideoBackend for FfmpegBackend {
    fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, target: &CaptureTarget) -> Command {
        let rect = target.rect;
        let mut command = Command::new(&self.program);

        command
            .args(["-y", "-f", "x11grab", "-framerate"])
            .arg(self.framerate.to_string())
            .arg("-video_size")
            .arg(format!("{}x{}", rect.width, rect.height))
            .arg("-i")
            .arg(format!("{}+{},{}", target.display, rect.x, rect.y))
            .arg(&target.output)
            .stdout(Stdio::null())
            .stderr(if self.show_output {
                Stdio::inherit()
            } else {
                Stdio::null()
            });

        command
    }
}
