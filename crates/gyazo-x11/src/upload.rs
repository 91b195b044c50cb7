//! Uploading captures and persisting the Gyazo user ID.

use crate::{AppError, AppResult, CaptureMode};

use std::{
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use reqwest::{
    Client,
    header::USER_AGENT,
    multipart::{Form, Part},
};
use tracing::{debug, info, instrument};

/// Response header carrying the ID assigned to a new Gyazo user.
pub const GYAZO_ID_HEADER: &str = "X-Gyazo-Id";

/// What the server returned for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// URL of the uploaded capture.
    pub url: String,
    /// User ID assigned by the server, if any.
    pub gyazo_id: Option<String>,
}

/// Multipart uploader for the capture services.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: Client,
    endpoint: Option<String>,
}

impl UploadClient {
    /// Client posting to each mode's own endpoint, or to `endpoint` if given.
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    /// Endpoint used for `mode`.
    pub fn endpoint(&self, mode: CaptureMode) -> &str {
        self.endpoint.as_deref().unwrap_or(mode.endpoint())
    }

    /// Upload the capture at `path` and return the resulting URL.
    ///
    /// # Errors
    ///
    /// `UploadFailed` on transport errors or a non-success status,
    /// `IoError` if the capture cannot be read.
    #[instrument(skip(self, id))]
    pub async fn upload(
        &self,
        path: &Path,
        mode: CaptureMode,
        id: Option<&str>,
    ) -> AppResult<UploadReceipt> {
        let endpoint = self.endpoint(mode).to_string();
        let failed = |reason: String| AppError::UploadFailed {
            endpoint: endpoint.clone(),
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        let data = tokio::fs::read(path).await?;
        let size = data.len();

        let part = Part::bytes(data)
            .file_name(mode.upload_filename())
            .mime_str("application/octet-stream")
            .map_err(|e| failed(e.to_string()))?;

        let mut form = Form::new().part(mode.field_name(), part);
        if let Some(id) = id {
            form = form.text("id", id.to_string());
        }

        let response = self
            .http
            .post(&endpoint)
            .header(USER_AGENT, mode.user_agent())
            .multipart(form)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("server responded {}", status)));
        }

        let gyazo_id = response
            .headers()
            .get(GYAZO_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        let url = body.trim_end().to_string();

        info!(%mode, endpoint = %endpoint, size, url = %url, "Capture uploaded");

        Ok(UploadReceipt { url, gyazo_id })
    }
}

/// The persisted Gyazo user ID file.
#[derive(Debug, Clone)]
pub struct GyazoIdStore {
    path: PathBuf,
}

impl GyazoIdStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The stored ID; a missing or blank file is no ID.
    #[track_caller]
    pub fn load(&self) -> AppResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim_end();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AppError::IoError {
                source,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Persist `id`, replacing any previous one.
    #[track_caller]
    pub fn store(&self, id: &str) -> AppResult<()> {
        std::fs::write(&self.path, id)?;
        debug!(path = ?self.path, "Gyazo ID saved");
        Ok(())
    }
}
