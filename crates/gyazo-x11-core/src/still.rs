use crate::{CaptureError, CoreResult};

use std::{panic::Location, path::Path, process::Command};

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// A still-image grabber that frames the region itself.
///
/// The default is ImageMagick's `import`, which lets the user click a window
/// or drag a region before writing the file.
#[derive(Debug, Clone)]
pub struct StillBackend {
    program: String,
}

impl StillBackend {
    /// Grabber running `program <output>`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the grabber and wait until it has written `output`.
    ///
    /// # Errors
    ///
    /// `SpawnFailure` if the program cannot start, `ChildExitFailure` if it
    /// exits unsuccessfully.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn capture(&self, output: &Path) -> CoreResult<()> {
        let status = Command::new(&self.program)
            .arg(output)
            .status()
            .map_err(|source| CaptureError::SpawnFailure {
                program: self.program.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        if !status.success() {
            return Err(CaptureError::ChildExitFailure {
                program: self.program.clone(),
                status,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(program = %self.program, output = ?output, "Still image captured");

        Ok(())
    }
}

impl Default for StillBackend {
    fn default() -> Self {
        Self::new("import")
    }
}
