// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Photo download from Telegram servers.

use std::path::Path;

use paddy_core::PaddyError;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Downloads the file `file_id` into `dest`, creating parent directories.
///
/// Resolves the server-side path with `getFile`, then streams the content
/// to disk. Returns the number of bytes written.
pub async fn download_to(bot: &Bot, file_id: &str, dest: &Path) -> Result<u64, PaddyError> {
    let file = bot
        .get_file(FileId(file_id.to_string()))
        .await
        .map_err(|e| PaddyError::Channel {
            message: format!("failed to get file info: {e}"),
            source: Some(Box::new(e)),
        })?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PaddyError::io(parent, e))?;
    }
    let mut out = tokio::fs::File::create(dest)
        .await
        .map_err(|e| PaddyError::io(dest, e))?;
    bot.download_file(&file.path, &mut out)
        .await
        .map_err(|e| PaddyError::Channel {
            message: format!("failed to download file: {e}"),
            source: Some(Box::new(e)),
        })?;
    out.flush().await.map_err(|e| PaddyError::io(dest, e))?;

    let size = tokio::fs::metadata(dest)
        .await
        .map_err(|e| PaddyError::io(dest, e))?
        .len();
    debug!(file_id, size, path = %dest.display(), "downloaded photo from Telegram");
    Ok(size)
}
