// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-worker photo upload queue.
//!
//! Every accepted photo becomes one [`UploadTask`] on an unbounded FIFO.
//! Exactly one worker drains it, so folder find-or-create calls for a new
//! destination never run concurrently and the gateway sees uploads in
//! enqueue order across all conversations. A failed task is reported via
//! the [`UploadNotifier`] and never blocks the tasks behind it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use paddy_core::traits::PhotoSource;
use paddy_core::types::RemoteFile;
use paddy_core::PaddyError;
use paddy_drive::{DriveGateway, UploadError};
use paddy_survey::PhotoUpload;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::notify::UploadNotifier;

/// One accepted photo and where it is staged locally.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTask {
    pub upload: PhotoUpload,
    pub staged: PathBuf,
}

impl UploadTask {
    /// Stages the photo under `staging_dir` using its final file name.
    pub fn new(upload: PhotoUpload, staging_dir: &Path) -> Self {
        let staged = staging_dir.join(&upload.file_name);
        Self { upload, staged }
    }
}

/// Why a task did not end up in the drive.
#[derive(Debug, Error)]
pub enum UploadFailure {
    /// The photo could not be retrieved from the messaging platform.
    #[error("photo download failed: {0}")]
    Fetch(#[source] PaddyError),

    /// The download finished but left nothing usable on disk.
    #[error("downloaded photo is empty: {}", path.display())]
    EmptyFile { path: PathBuf },

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl UploadFailure {
    /// Translation key of the notice sent to the user.
    ///
    /// Failures the drive reported get the plain "failed" notice; anything
    /// unexpected gets the "error" notice.
    pub fn notice_key(&self) -> &'static str {
        match self {
            Self::EmptyFile { .. }
            | Self::Upload(UploadError::MissingFile { .. })
            | Self::Upload(UploadError::Backend { .. }) => "photo_upload_failed",
            Self::Fetch(_) | Self::Upload(UploadError::Unexpected { .. }) => "photo_upload_error",
        }
    }
}

enum QueueItem {
    Upload(Box<UploadTask>),
    Shutdown,
}

struct Worker {
    gateway: Arc<DriveGateway>,
    photos: Arc<dyn PhotoSource>,
    notifier: Arc<dyn UploadNotifier>,
    depth: AtomicUsize,
}

#[derive(Default)]
struct Lifecycle {
    sender: Option<mpsc::UnboundedSender<QueueItem>>,
    handle: Option<JoinHandle<()>>,
    stopped: bool,
}

/// The process-wide upload queue. Construct once and share by `Arc`.
pub struct UploadQueue {
    worker: Arc<Worker>,
    staging_dir: PathBuf,
    lifecycle: Mutex<Lifecycle>,
}

impl UploadQueue {
    pub fn new(
        gateway: Arc<DriveGateway>,
        photos: Arc<dyn PhotoSource>,
        notifier: Arc<dyn UploadNotifier>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            worker: Arc::new(Worker {
                gateway,
                photos,
                notifier,
                depth: AtomicUsize::new(0),
            }),
            staging_dir: staging_dir.into(),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Tasks waiting behind the one in progress.
    pub fn depth(&self) -> usize {
        self.worker.depth.load(Ordering::Relaxed)
    }

    /// Appends a photo to the queue, starting the worker on first use.
    ///
    /// Returns as soon as the task is queued. Fails only after [`stop`](Self::stop).
    pub async fn enqueue(&self, upload: PhotoUpload) -> Result<(), PaddyError> {
        let task = UploadTask::new(upload, &self.staging_dir);
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.stopped {
            warn!(file = %task.upload.file_name, "upload queue stopped, task dropped");
            return Err(PaddyError::Queue("upload queue is stopped".into()));
        }

        let sender = match &lifecycle.sender {
            Some(sender) => sender.clone(),
            None => {
                let (sender, receiver) = mpsc::unbounded_channel();
                let worker = Arc::clone(&self.worker);
                lifecycle.handle = Some(tokio::spawn(worker.run(receiver)));
                lifecycle.sender = Some(sender.clone());
                info!("upload worker started");
                sender
            }
        };

        let photo = task.upload.sequence;
        let folder = task.upload.folder_path.clone();
        self.worker.depth.fetch_add(1, Ordering::Relaxed);
        sender
            .send(QueueItem::Upload(Box::new(task)))
            .map_err(|_| {
                self.worker.depth.fetch_sub(1, Ordering::Relaxed);
                PaddyError::Queue("upload worker is gone".into())
            })?;
        debug!(photo, folder = %folder, queue_depth = self.depth(), "photo queued");
        Ok(())
    }

    /// Drains every task queued so far, then stops the worker.
    ///
    /// Later calls to [`enqueue`](Self::enqueue) are rejected.
    pub async fn stop(&self) {
        let (sender, handle) = {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.stopped = true;
            (lifecycle.sender.take(), lifecycle.handle.take())
        };
        let Some(sender) = sender else {
            debug!("upload worker never started");
            return;
        };

        info!(queue_depth = self.depth(), "stopping upload worker");
        if sender.send(QueueItem::Shutdown).is_err() {
            warn!("upload worker already exited");
        }
        drop(sender);
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "upload worker ended abnormally");
        }
        info!("upload worker stopped");
    }
}

impl Worker {
    async fn run(self: Arc<Self>, mut receiver: mpsc::UnboundedReceiver<QueueItem>) {
        while let Some(item) = receiver.recv().await {
            match item {
                QueueItem::Upload(task) => {
                    self.depth.fetch_sub(1, Ordering::Relaxed);
                    self.process(&task).await;
                }
                QueueItem::Shutdown => {
                    debug!("upload worker reached shutdown marker");
                    break;
                }
            }
        }
    }

    async fn process(&self, task: &UploadTask) {
        let upload = &task.upload;
        match self.transfer(task).await {
            Ok(file) => info!(
                conversation = %upload.conversation,
                photo = upload.sequence,
                folder = %upload.folder_path,
                id = %file.id,
                "photo uploaded"
            ),
            Err(failure) => {
                warn!(
                    conversation = %upload.conversation,
                    photo = upload.sequence,
                    folder = %upload.folder_path,
                    error = %failure,
                    "photo upload failed"
                );
                self.notifier.upload_failed(upload, &failure).await;
            }
        }
        remove_staged(&task.staged).await;
    }

    async fn transfer(&self, task: &UploadTask) -> Result<RemoteFile, UploadFailure> {
        let bytes = self
            .photos
            .fetch_photo(&task.upload.photo, &task.staged)
            .await
            .map_err(UploadFailure::Fetch)?;
        debug!(file = %task.upload.file_name, bytes, "photo downloaded");

        match tokio::fs::metadata(&task.staged).await {
            Ok(meta) if meta.len() > 0 => {}
            Ok(_) => {
                return Err(UploadFailure::EmptyFile {
                    path: task.staged.clone(),
                });
            }
            Err(_) => {
                return Err(UploadError::MissingFile {
                    path: task.staged.clone(),
                }
                .into());
            }
        }

        Ok(self
            .gateway
            .upload_file(&task.staged, &task.upload.folder_path)
            .await?)
    }
}

async fn remove_staged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed staged photo"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove staged photo"),
    }
}
