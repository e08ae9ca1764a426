// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote drive backend trait.

use std::path::Path;

use async_trait::async_trait;

use crate::error::PaddyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::RemoteFile;

/// Primitive folder and file operations against a remote drive.
///
/// Implementations perform exactly one remote call per method and never
/// retry; retry and caching are layered on top by the gateway. Failures
/// should be reported as [`PaddyError::Drive`] with `transient` set
/// according to whether a retry could succeed.
#[async_trait]
pub trait DriveBackend: PluginAdapter {
    /// Looks up a non-trashed folder named `name` directly under `parent_id`.
    async fn find_folder(&self, name: &str, parent_id: &str)
    -> Result<Option<String>, PaddyError>;

    /// Creates a folder named `name` under `parent_id` and returns its id.
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, PaddyError>;

    /// Looks up a non-trashed file named `name` directly under `parent_id`.
    async fn find_file(&self, name: &str, parent_id: &str) -> Result<Option<String>, PaddyError>;

    /// Uploads `local` as a new file named `name` under `parent_id`.
    async fn create_file(
        &self,
        local: &Path,
        name: &str,
        parent_id: &str,
        mime_type: &str,
    ) -> Result<RemoteFile, PaddyError>;

    /// Replaces the content of an existing file.
    async fn update_file(
        &self,
        file_id: &str,
        local: &Path,
        mime_type: &str,
    ) -> Result<RemoteFile, PaddyError>;
}
