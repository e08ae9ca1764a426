// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote storage for the Paddy survey bot.
//!
//! [`DriveGateway`] resolves region-first folder paths and uploads files
//! with retry; [`GoogleDriveBackend`] implements the primitive Drive calls
//! it builds on, authenticated through a service account that impersonates
//! a workspace user.

pub mod auth;
pub mod gateway;
pub mod google;

use std::sync::Arc;
use std::time::Duration;

use paddy_config::model::{DriveConfig, RetryConfig};
use paddy_core::PaddyError;
use paddy_resilience::RetryPolicy;

pub use auth::{AccessTokenProvider, ServiceAccountKey, ServiceAccountTokenSource, StaticToken};
pub use gateway::{DriveGateway, UploadError, mime_for};
pub use google::{DriveEndpoints, GoogleDriveBackend};

/// Retry policy derived from the `[retry]` config section.
pub fn retry_policy(config: &RetryConfig) -> RetryPolicy {
    RetryPolicy::new(config.max_attempts, config.backoff_base)
}

/// Builds a gateway backed by Google Drive from validated configuration.
pub async fn gateway_from_config(
    drive: &DriveConfig,
    retry: &RetryConfig,
) -> Result<DriveGateway, PaddyError> {
    let key_path = drive
        .service_account_file
        .as_deref()
        .ok_or_else(|| PaddyError::Config("drive.service_account_file is not set".into()))?;
    let subject = drive
        .impersonated_user
        .as_deref()
        .ok_or_else(|| PaddyError::Config("drive.impersonated_user is not set".into()))?;
    let root = drive
        .root_folder_id
        .as_deref()
        .ok_or_else(|| PaddyError::Config("drive.root_folder_id is not set".into()))?;

    let http = GoogleDriveBackend::http_client(Duration::from_secs(drive.request_timeout_secs))?;
    let key = ServiceAccountKey::from_file(key_path).await?;
    let tokens = ServiceAccountTokenSource::new(http.clone(), key, subject, drive.token_uri.clone())?;
    let backend = GoogleDriveBackend::new(
        http,
        Arc::new(tokens),
        DriveEndpoints {
            api_base: drive.api_base_url.trim_end_matches('/').to_string(),
            upload_base: drive.upload_base_url.trim_end_matches('/').to_string(),
        },
    );

    Ok(DriveGateway::new(Arc::new(backend), root, retry_policy(retry)))
}
