// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Drive v3 backend over reqwest.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use paddy_core::traits::{DriveBackend, PluginAdapter};
use paddy_core::types::{AdapterType, HealthStatus, RemoteFile};
use paddy_core::PaddyError;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::AccessTokenProvider;

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const FILE_FIELDS: &str = "id,webViewLink";

/// Endpoints of the Drive API. Overridable for tests.
#[derive(Debug, Clone)]
pub struct DriveEndpoints {
    pub api_base: String,
    pub upload_base: String,
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base: "https://www.googleapis.com/upload/drive/v3".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    id: String,
    #[serde(default)]
    web_view_link: Option<String>,
}

impl From<FileEntry> for RemoteFile {
    fn from(entry: FileEntry) -> Self {
        RemoteFile {
            id: entry.id,
            web_link: entry.web_view_link,
        }
    }
}

/// Drive backend that talks to the Google Drive REST API.
///
/// Every method performs a single HTTP request (plus a token refresh when
/// needed). Shared-drive flags are always set so the root folder may live
/// in a shared drive.
pub struct GoogleDriveBackend {
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    endpoints: DriveEndpoints,
}

impl GoogleDriveBackend {
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
        endpoints: DriveEndpoints,
    ) -> Self {
        Self {
            http,
            tokens,
            endpoints,
        }
    }

    /// Builds the HTTP client used for Drive and token requests.
    pub fn http_client(request_timeout: Duration) -> Result<reqwest::Client, PaddyError> {
        reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| PaddyError::Config(format!("failed to build HTTP client: {e}")))
    }

    fn url(&self, base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, PaddyError> {
        Url::parse_with_params(&format!("{base}{path}"), params)
            .map_err(|e| PaddyError::Config(format!("invalid drive url {base}{path}: {e}")))
    }

    async fn find_by_name(
        &self,
        name: &str,
        parent_id: &str,
        folders_only: bool,
    ) -> Result<Option<String>, PaddyError> {
        let mime_clause = if folders_only {
            format!("mimeType = '{FOLDER_MIME}'")
        } else {
            format!("mimeType != '{FOLDER_MIME}'")
        };
        let query = format!(
            "name = '{}' and '{}' in parents and {mime_clause} and trashed = false",
            escape_query(name),
            escape_query(parent_id)
        );
        let url = self.url(
            &self.endpoints.api_base,
            "/files",
            &[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ],
        )?;

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(request_error)?;
        let list: FileList = parse_json(check_status(response, "files.list").await?).await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }
}

#[async_trait]
impl PluginAdapter for GoogleDriveBackend {
    fn name(&self) -> &str {
        "google-drive"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PaddyError> {
        match self.tokens.access_token().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), PaddyError> {
        Ok(())
    }
}

#[async_trait]
impl DriveBackend for GoogleDriveBackend {
    async fn find_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<String>, PaddyError> {
        self.find_by_name(name, parent_id, true).await
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, PaddyError> {
        let url = self.url(
            &self.endpoints.api_base,
            "/files",
            &[("fields", "id"), ("supportsAllDrives", "true")],
        )?;
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent_id],
        });

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&metadata)
            .send()
            .await
            .map_err(request_error)?;
        let entry: FileEntry = parse_json(check_status(response, "files.create").await?).await?;
        debug!(folder = name, id = %entry.id, "drive folder created");
        Ok(entry.id)
    }

    async fn find_file(&self, name: &str, parent_id: &str) -> Result<Option<String>, PaddyError> {
        self.find_by_name(name, parent_id, false).await
    }

    async fn create_file(
        &self,
        local: &Path,
        name: &str,
        parent_id: &str,
        mime_type: &str,
    ) -> Result<RemoteFile, PaddyError> {
        let content = tokio::fs::read(local)
            .await
            .map_err(|e| PaddyError::io(local, e))?;
        let url = self.url(
            &self.endpoints.upload_base,
            "/files",
            &[
                ("uploadType", "multipart"),
                ("fields", FILE_FIELDS),
                ("supportsAllDrives", "true"),
            ],
        )?;
        let metadata = serde_json::json!({ "name": name, "parents": [parent_id] });
        let boundary = format!("paddy-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, mime_type, &content);

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(
                "content-type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(request_error)?;
        let entry: FileEntry = parse_json(check_status(response, "files.create").await?).await?;
        Ok(entry.into())
    }

    async fn update_file(
        &self,
        file_id: &str,
        local: &Path,
        mime_type: &str,
    ) -> Result<RemoteFile, PaddyError> {
        let content = tokio::fs::read(local)
            .await
            .map_err(|e| PaddyError::io(local, e))?;
        let url = self.url(
            &self.endpoints.upload_base,
            &format!("/files/{file_id}"),
            &[
                ("uploadType", "media"),
                ("fields", FILE_FIELDS),
                ("supportsAllDrives", "true"),
            ],
        )?;

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .patch(url)
            .bearer_auth(token)
            .header("content-type", mime_type)
            .body(content)
            .send()
            .await
            .map_err(request_error)?;
        let entry: FileEntry = parse_json(check_status(response, "files.update").await?).await?;
        Ok(entry.into())
    }
}

/// Escapes a value for use inside a single-quoted Drive query string.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    content: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\ncontent-type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\ncontent-type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Whether an HTTP failure from Drive is worth retrying.
///
/// Rate limiting shows up as 429, or as 403 with a rate-limit reason.
pub fn is_transient_status(status: StatusCode, body: &str) -> bool {
    match status.as_u16() {
        408 | 429 | 500 | 502 | 503 | 504 => true,
        403 => body.contains("rateLimitExceeded") || body.contains("userRateLimitExceeded"),
        _ => false,
    }
}

async fn check_status(response: Response, operation: &str) -> Result<Response, PaddyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let transient = is_transient_status(status, &body);
    warn!(operation, %status, transient, "drive request failed");
    Err(PaddyError::Drive {
        message: format!("{operation} failed with {status}: {body}"),
        transient,
        source: None,
    })
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, PaddyError> {
    response.json().await.map_err(|e| PaddyError::Drive {
        message: format!("malformed drive response: {e}"),
        transient: false,
        source: Some(Box::new(e)),
    })
}

/// Maps a transport-level reqwest failure. Timeouts and connection
/// failures are transient.
pub(crate) fn request_error(err: reqwest::Error) -> PaddyError {
    let transient = err.is_timeout() || err.is_connect() || err.is_request();
    PaddyError::Drive {
        message: format!("drive request failed: {err}"),
        transient,
        source: Some(Box::new(err)),
    }
}
