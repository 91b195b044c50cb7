//! gyazo-x11: capture a screenshot or screen recording on X11 and upload it.

mod capture;
mod config;
mod error;
mod mode;
mod output_handler;
#[cfg(test)]
mod tests;
mod upload;

pub(crate) use {
    capture::SessionOrchestrator,
    error::{AppError, Result as AppResult},
    mode::CaptureMode,
    output_handler::OutputHandler,
    upload::{GyazoIdStore, UploadClient, UploadReceipt},
};

use crate::config::Config;

use std::{panic::Location, process::ExitCode};

use error_location::ErrorLocation;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "gyazo_x11=info,gyazo_x11_core=info";

/// Program name used in messages when argv[0] is unavailable.
const FALLBACK_PROGRAM: &str = "gyazo";

/// Application entry point.
#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries only the resulting URL.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let program = std::env::args()
        .next()
        .unwrap_or_else(|| FALLBACK_PROGRAM.to_string());

    match run(&program).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Capture aborted");
            eprintln!("{}: {}", program, e);
            ExitCode::FAILURE
        }
    }
}

async fn run(program: &str) -> AppResult<()> {
    let config = Config::load()?;
    let mode = CaptureMode::detect(Some(program), &config.upload.default_mode);

    info!(%mode, "Starting capture");

    let orchestrator = SessionOrchestrator::new(config.recording.clone());
    let capture = tokio::task::spawn_blocking(move || orchestrator.capture(mode))
        .await
        .map_err(|e| AppError::Runtime {
            reason: format!("Capture task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })??;

    let id_store = if mode.uses_gyazo_id() {
        config.upload.id_file_path().map(GyazoIdStore::new)
    } else {
        None
    };
    let stored_id = match &id_store {
        Some(store) => store.load().unwrap_or_else(|e| {
            warn!(error = ?e, "Ignoring unreadable Gyazo ID file");
            None
        }),
        None => None,
    };

    let client = UploadClient::new(config.upload.endpoint.clone());
    let UploadReceipt { url, gyazo_id } = client
        .upload(&capture, mode, stored_id.as_deref())
        .await?;

    OutputHandler::new(config.output.clone(), program).output_url(&url)?;

    // Only a first upload gets a new ID worth keeping.
    if let (None, Some(store), Some(id)) = (&stored_id, &id_store, &gyazo_id) {
        if let Err(e) = store.store(id) {
            warn!(error = ?e, "Failed to save Gyazo ID");
        }
    }

    Ok(())
}
