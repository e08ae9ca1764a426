// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory drive backend for deterministic testing.
//!
//! Folders and files live in a map keyed by generated ids under a single
//! root (`"root"`). Every call is recorded in a journal, and failures can be
//! scripted with [`MockDriveBackend::fail_next`].

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::Mutex;

use paddy_core::traits::{DriveBackend, PluginAdapter};
use paddy_core::types::{AdapterType, HealthStatus, RemoteFile};
use paddy_core::PaddyError;

/// Id of the root folder every path hangs from.
pub const ROOT_ID: &str = "root";

/// One backend call, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveCall {
    FindFolder { name: String, parent: String },
    CreateFolder { name: String, parent: String },
    FindFile { name: String, parent: String },
    CreateFile { name: String, parent: String },
    UpdateFile { id: String },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: String,
    folder: bool,
    content: Vec<u8>,
}

#[derive(Default)]
struct State {
    nodes: HashMap<String, Node>,
    next_id: u32,
    calls: Vec<DriveCall>,
    failures: VecDeque<bool>,
    uploads: Vec<String>,
}

impl State {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn find(&self, name: &str, parent: &str, folder: bool) -> Option<String> {
        let mut matches: Vec<&String> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.name == name && n.parent == parent && n.folder == folder)
            .map(|(id, _)| id)
            .collect();
        matches.sort();
        matches.first().map(|id| id.to_string())
    }

    fn path_of(&self, id: &str) -> Option<String> {
        let mut segments = Vec::new();
        let mut cursor = id;
        while cursor != ROOT_ID {
            let node = self.nodes.get(cursor)?;
            segments.push(node.name.as_str());
            cursor = &node.parent;
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Records `call` and pops the next scripted failure, if any.
    fn begin(&mut self, call: DriveCall) -> Result<(), PaddyError> {
        self.calls.push(call);
        match self.failures.pop_front() {
            Some(transient) => Err(PaddyError::Drive {
                message: if transient {
                    "503 backend unavailable".to_string()
                } else {
                    "403 insufficient permissions".to_string()
                },
                transient,
                source: None,
            }),
            None => Ok(()),
        }
    }
}

/// An in-memory drive.
#[derive(Default)]
pub struct MockDriveBackend {
    state: Mutex<State>,
}

impl MockDriveBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls fail, transiently or permanently.
    pub async fn fail_next(&self, count: usize, transient: bool) {
        let mut state = self.state.lock().await;
        state.failures.extend(std::iter::repeat_n(transient, count));
    }

    /// Every call made so far.
    pub async fn calls(&self) -> Vec<DriveCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of folder creations so far.
    pub async fn folders_created(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| matches!(c, DriveCall::CreateFolder { .. }))
            .count()
    }

    /// Full paths (`Region/Farm/Date/file.jpg`) of created files, in upload order.
    pub async fn uploads(&self) -> Vec<String> {
        self.state.lock().await.uploads.clone()
    }

    /// Full paths of every existing folder, sorted.
    pub async fn folder_paths(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut paths: Vec<String> = state
            .nodes
            .iter()
            .filter(|(_, n)| n.folder)
            .filter_map(|(id, _)| state.path_of(id))
            .collect();
        paths.sort();
        paths
    }

    /// Number of files (not folders) stored.
    pub async fn file_count(&self) -> usize {
        self.state
            .lock()
            .await
            .nodes
            .values()
            .filter(|n| !n.folder)
            .count()
    }

    /// Content of the file at `path`, relative to the root.
    pub async fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().await;
        state
            .nodes
            .iter()
            .find(|(id, n)| !n.folder && state.path_of(id).as_deref() == Some(path))
            .map(|(_, n)| n.content.clone())
    }

    /// Adds a folder directly, bypassing the journal.
    pub async fn seed_folder(&self, name: &str, parent: &str) -> String {
        let mut state = self.state.lock().await;
        let id = state.allocate("folder");
        state.nodes.insert(
            id.clone(),
            Node {
                name: name.to_string(),
                parent: parent.to_string(),
                folder: true,
                content: Vec::new(),
            },
        );
        id
    }
}

#[async_trait]
impl PluginAdapter for MockDriveBackend {
    fn name(&self) -> &str {
        "mock-drive"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PaddyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PaddyError> {
        Ok(())
    }
}

#[async_trait]
impl DriveBackend for MockDriveBackend {
    async fn find_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<String>, PaddyError> {
        let mut state = self.state.lock().await;
        state.begin(DriveCall::FindFolder {
            name: name.to_string(),
            parent: parent_id.to_string(),
        })?;
        Ok(state.find(name, parent_id, true))
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, PaddyError> {
        let mut state = self.state.lock().await;
        state.begin(DriveCall::CreateFolder {
            name: name.to_string(),
            parent: parent_id.to_string(),
        })?;
        let id = state.allocate("folder");
        state.nodes.insert(
            id.clone(),
            Node {
                name: name.to_string(),
                parent: parent_id.to_string(),
                folder: true,
                content: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn find_file(&self, name: &str, parent_id: &str) -> Result<Option<String>, PaddyError> {
        let mut state = self.state.lock().await;
        state.begin(DriveCall::FindFile {
            name: name.to_string(),
            parent: parent_id.to_string(),
        })?;
        Ok(state.find(name, parent_id, false))
    }

    async fn create_file(
        &self,
        local: &Path,
        name: &str,
        parent_id: &str,
        _mime_type: &str,
    ) -> Result<RemoteFile, PaddyError> {
        {
            let mut state = self.state.lock().await;
            state.begin(DriveCall::CreateFile {
                name: name.to_string(),
                parent: parent_id.to_string(),
            })?;
        }
        let content = tokio::fs::read(local)
            .await
            .map_err(|e| PaddyError::io(local, e))?;

        let mut state = self.state.lock().await;
        let id = state.allocate("file");
        state.nodes.insert(
            id.clone(),
            Node {
                name: name.to_string(),
                parent: parent_id.to_string(),
                folder: false,
                content,
            },
        );
        if let Some(path) = state.path_of(&id) {
            state.uploads.push(path);
        }
        Ok(RemoteFile {
            web_link: Some(format!("https://drive.test/{id}")),
            id,
        })
    }

    async fn update_file(
        &self,
        file_id: &str,
        local: &Path,
        _mime_type: &str,
    ) -> Result<RemoteFile, PaddyError> {
        {
            let mut state = self.state.lock().await;
            state.begin(DriveCall::UpdateFile {
                id: file_id.to_string(),
            })?;
        }
        let content = tokio::fs::read(local)
            .await
            .map_err(|e| PaddyError::io(local, e))?;

        let mut state = self.state.lock().await;
        let node = state.nodes.get_mut(file_id).ok_or_else(|| PaddyError::Drive {
            message: format!("404 file {file_id} not found"),
            transient: false,
            source: None,
        })?;
        node.content = content;
        Ok(RemoteFile {
            id: file_id.to_string(),
            web_link: Some(format!("https://drive.test/{file_id}")),
        })
    }
}
