//! Delivering the uploaded URL to the user.
//!
//! The URL always goes to stdout. Copying it to the clipboard and opening it
//! in a browser are best effort: failures are reported, never fatal.

use crate::config::OutputConfig;

use std::{
    io::{self, Write},
    process::{Command, Stdio},
};

use tracing::{debug, info, instrument, warn};

/// Output handler for stdout, clipboard and browser.
#[derive(Debug, Clone)]
pub struct OutputHandler {
    config: OutputConfig,
    program: String,
}

impl OutputHandler {
    /// Handler prefixing warnings with `program`.
    pub fn new(config: OutputConfig, program: impl Into<String>) -> Self {
        Self {
            config,
            program: program.into(),
        }
    }

    /// Print `url`, copy it to the clipboard and open it, as configured.
    #[instrument(skip(self))]
    pub fn output_url(&self, url: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", url)?;
        stdout.flush()?;

        if let Err(e) = self.copy_to_clipboard(url) {
            warn!(error = %e, command = %self.config.clipboard_command, "Clipboard copy failed");
            eprintln!(
                "{}: Can't exec {}: {}. Set output.clipboard_command to \"\" \
                 if you don't need to copy the url to the clipboard",
                self.program, self.config.clipboard_command, e
            );
        }

        if let Err(e) = self.open_in_browser(url) {
            warn!(error = %e, "Opening browser failed");
            eprintln!(
                "{}: Can't open {}: {}. Set output.open_browser to false \
                 if you don't need to open the url",
                self.program, url, e
            );
        }

        info!(url, "Result delivered");

        Ok(())
    }

    /// Pipe `text` into the clipboard command and wait for it.
    ///
    /// Does nothing when the command is empty.
    pub fn copy_to_clipboard(&self, text: &str) -> io::Result<()> {
        let mut words = self.config.clipboard_command.split_whitespace();
        let Some(program) = words.next() else {
            debug!("Clipboard copy disabled");
            return Ok(());
        };

        let mut clipper = Command::new(program)
            .args(words)
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = clipper.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let status = clipper.wait()?;
        if !status.success() {
            return Err(io::Error::other(format!("{} exited with {}", program, status)));
        }

        debug!(program, "URL copied to clipboard");

        Ok(())
    }

    /// Open `url` with the configured browser or the system default.
    pub fn open_in_browser(&self, url: &str) -> io::Result<()> {
        if !self.config.open_browser {
            debug!("Browser disabled");
            return Ok(());
        }

        match self.config.browser_command.as_deref() {
            Some(browser) => open::with(url, browser)?,
            None => open::that(url)?,
        }

        debug!(url, "URL opened in browser");

        Ok(())
    }
}
