// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folder-path resolution and file upload on top of a [`DriveBackend`].
//!
//! Destinations are `/`-separated folder paths resolved segment by segment
//! from a configured root folder. Every `(parent_id, name) -> folder_id`
//! resolution is memoized for the lifetime of the gateway; a cache miss
//! looks for an existing non-trashed folder before creating one. All backend
//! calls run under the gateway's [`RetryPolicy`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use paddy_core::traits::DriveBackend;
use paddy_core::types::RemoteFile;
use paddy_core::PaddyError;
use paddy_resilience::{RetryPolicy, retry_async};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Why an upload did not produce a remote file.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The local file to upload does not exist.
    #[error("local file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// The drive rejected the request, or transient failures outlasted the retries.
    #[error("drive backend error: {message}")]
    Backend { message: String, transient: bool },

    /// Anything else (local read failures, internal errors).
    #[error("unexpected upload failure: {message}")]
    Unexpected { message: String },
}

impl From<PaddyError> for UploadError {
    fn from(err: PaddyError) -> Self {
        match err {
            PaddyError::Drive { message, transient, .. } => Self::Backend { message, transient },
            PaddyError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::MissingFile { path }
            }
            other => Self::Unexpected {
                message: other.to_string(),
            },
        }
    }
}

/// Remote storage gateway: one backend connection and one folder cache.
pub struct DriveGateway {
    backend: Arc<dyn DriveBackend>,
    root_id: String,
    retry: RetryPolicy,
    folders: Mutex<HashMap<(String, String), String>>,
}

impl DriveGateway {
    pub fn new(backend: Arc<dyn DriveBackend>, root_id: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            backend,
            root_id: root_id.into(),
            retry,
            folders: Mutex::new(HashMap::new()),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn backend(&self) -> &Arc<dyn DriveBackend> {
        &self.backend
    }

    /// Resolves `path` to a folder id, creating missing folders.
    ///
    /// Empty segments are ignored, so `""` and `"/"` resolve to the root.
    pub async fn resolve_folder_path(&self, path: &str) -> Result<String, PaddyError> {
        let mut parent = self.root_id.clone();
        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            parent = self.find_or_create_folder(segment, &parent).await?;
        }
        Ok(parent)
    }

    /// Returns the id of folder `name` under `parent_id`, creating it if absent.
    pub async fn find_or_create_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<String, PaddyError> {
        let key = (parent_id.to_string(), name.to_string());
        if let Some(id) = self.folders.lock().await.get(&key) {
            debug!(folder = name, id = %id, "folder cache hit");
            return Ok(id.clone());
        }

        let backend = &self.backend;
        let lookup = || async move {
            if let Some(existing) = backend.find_folder(name, parent_id).await? {
                return Ok(existing);
            }
            let created = backend.create_folder(name, parent_id).await?;
            info!(folder = name, parent = parent_id, id = %created, "created drive folder");
            Ok::<_, PaddyError>(created)
        };
        let id = retry_async(&self.retry, "find_or_create_folder", PaddyError::is_transient, lookup)
            .await?;

        // Another caller may have resolved the same key meanwhile; both
        // got the same id from the backend's find-before-create, so the
        // first cached value wins.
        let mut folders = self.folders.lock().await;
        Ok(folders.entry(key).or_insert(id).clone())
    }

    /// Uploads `local` as a new file in the folder at `folder_path`.
    pub async fn upload_file(&self, local: &Path, folder_path: &str) -> Result<RemoteFile, UploadError> {
        let name = file_name(local)?;
        ensure_local_file(local).await?;

        let folder_id = self.resolve_folder_path(folder_path).await?;
        let mime = mime_for(local);
        let (backend, remote_name, parent) = (&self.backend, name.as_str(), folder_id.as_str());
        let create = || async move { backend.create_file(local, remote_name, parent, mime).await };
        let file = retry_async(&self.retry, "upload_file", PaddyError::is_transient, create).await?;

        info!(
            file = %name,
            folder = folder_path,
            id = %file.id,
            "uploaded file to drive"
        );
        Ok(file)
    }

    /// Uploads `local` into the top-level folder `folder_name`, replacing the
    /// content of an existing file with the same name instead of adding a copy.
    pub async fn upload_or_replace_named_file(
        &self,
        local: &Path,
        folder_name: &str,
    ) -> Result<RemoteFile, UploadError> {
        let name = file_name(local)?;
        ensure_local_file(local).await?;

        let folder_id = self.resolve_folder_path(folder_name).await?;
        let mime = mime_for(local);
        let (backend, remote_name, parent) = (&self.backend, name.as_str(), folder_id.as_str());
        let sync = || async move {
            match backend.find_file(remote_name, parent).await? {
                Some(existing) => backend.update_file(&existing, local, mime).await,
                None => backend.create_file(local, remote_name, parent, mime).await,
            }
        };
        let file = retry_async(&self.retry, "upload_or_replace", PaddyError::is_transient, sync).await?;

        info!(file = %name, folder = folder_name, id = %file.id, "synced named file to drive");
        Ok(file)
    }

    /// Drops every memoized folder id.
    pub async fn clear_folder_cache(&self) {
        let mut folders = self.folders.lock().await;
        let dropped = folders.len();
        folders.clear();
        debug!(dropped, "cleared folder cache");
    }

    /// Number of memoized folder ids.
    pub async fn cached_folder_count(&self) -> usize {
        self.folders.lock().await.len()
    }
}

fn file_name(local: &Path) -> Result<String, UploadError> {
    local
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| UploadError::Unexpected {
            message: format!("path has no usable file name: {}", local.display()),
        })
}

async fn ensure_local_file(local: &Path) -> Result<(), UploadError> {
    match tokio::fs::metadata(local).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(UploadError::MissingFile {
            path: local.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %local.display(), "upload source missing");
            Err(UploadError::MissingFile {
                path: local.to_path_buf(),
            })
        }
        Err(e) => Err(UploadError::Unexpected {
            message: PaddyError::io(local, e).to_string(),
        }),
    }
}

/// MIME type guessed from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
