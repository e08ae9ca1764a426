// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound messages, and `PhotoSource` with canned photo bytes.
//! Clones share state, so a test can keep a handle while the bot owns another.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use paddy_core::traits::{ChannelAdapter, PhotoSource, PluginAdapter};
use paddy_core::types::{
    AdapterType, HealthStatus, InboundEvent, MessageId, OutboundContent, OutboundMessage,
    PhotoHandle,
};
use paddy_core::PaddyError;

/// A mock messaging channel for testing.
#[derive(Clone)]
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    acks: Arc<Mutex<Vec<String>>>,
    photos: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    inbound_ready: Arc<Notify>,
    sent_changed: Arc<Notify>,
    next_id: Arc<AtomicI32>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            acks: Arc::new(Mutex::new(Vec::new())),
            photos: Arc::new(Mutex::new(HashMap::new())),
            inbound_ready: Arc::new(Notify::new()),
            sent_changed: Arc::new(Notify::new()),
            next_id: Arc::new(AtomicI32::new(100)),
        }
    }

    /// Inject an inbound event. The next call to `receive()` returns it.
    pub async fn inject(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.inbound_ready.notify_one();
    }

    /// Make `fetch_photo` return `bytes` for `file_id`.
    pub async fn register_photo(&self, file_id: &str, bytes: &[u8]) {
        self.photos
            .lock()
            .await
            .insert(file_id.to_string(), bytes.to_vec());
    }

    /// All messages passed to `send()`, in order.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Text of every sent message that carries text, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| m.body_text().map(str::to_string))
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Callback ids acknowledged so far.
    pub async fn acknowledged(&self) -> Vec<String> {
        self.acks.lock().await.clone()
    }

    /// Waits until at least `count` messages have been sent.
    ///
    /// Wrap in `tokio::time::timeout` to bound the wait.
    pub async fn wait_for_sent(&self, count: usize) -> Vec<OutboundMessage> {
        loop {
            let changed = self.sent_changed.notified();
            {
                let sent = self.sent.lock().await;
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            changed.await;
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PaddyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PaddyError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), PaddyError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<Option<MessageId>, PaddyError> {
        let id = match &msg.content {
            OutboundContent::Text(_) | OutboundContent::Photo { .. } => Some(MessageId(
                self.next_id.fetch_add(1, Ordering::Relaxed),
            )),
            OutboundContent::EditText { message_id, .. }
            | OutboundContent::EditKeyboard { message_id } => Some(*message_id),
            OutboundContent::Delete { .. } => None,
        };
        self.sent.lock().await.push(msg);
        self.sent_changed.notify_waiters();
        Ok(id)
    }

    async fn receive(&self) -> Result<InboundEvent, PaddyError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.inbound_ready.notified().await;
        }
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), PaddyError> {
        self.acks.lock().await.push(callback_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl PhotoSource for MockChannel {
    async fn fetch_photo(&self, photo: &PhotoHandle, dest: &Path) -> Result<u64, PaddyError> {
        let bytes = self
            .photos
            .lock()
            .await
            .get(&photo.file_id)
            .cloned()
            .ok_or_else(|| PaddyError::Channel {
                message: format!("unknown photo {}", photo.file_id),
                source: None,
            })?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PaddyError::io(parent, e))?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| PaddyError::io(dest, e))?;
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;
    use paddy_core::types::{ConversationId, EventKind};

    #[tokio::test]
    async fn receive_returns_injected_events_in_order() {
        let channel = MockChannel::new();
        let alice = events::user(1, "alice");
        channel.inject(events::text(10, &alice, "first")).await;
        channel.inject(events::text(10, &alice, "second")).await;

        let first = channel.receive().await.unwrap();
        assert_eq!(first.kind, EventKind::Text("first".into()));
        let second = channel.receive().await.unwrap();
        assert_eq!(second.kind, EventKind::Text("second".into()));
    }

    #[tokio::test]
    async fn send_assigns_ids_to_new_messages_only() {
        let channel = MockChannel::new();
        let conv = ConversationId(10);
        let first = channel.send(OutboundMessage::text(conv, "a")).await.unwrap();
        let second = channel.send(OutboundMessage::text(conv, "b")).await.unwrap();
        assert_ne!(first, second);

        let deleted = channel
            .send(OutboundMessage {
                conversation: conv,
                content: OutboundContent::Delete {
                    message_id: MessageId(1),
                },
                keyboard: None,
            })
            .await
            .unwrap();
        assert!(deleted.is_none());
        assert_eq!(channel.sent_texts().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let channel = MockChannel::new();
        let handle = channel.clone();
        channel
            .send(OutboundMessage::text(ConversationId(1), "hi"))
            .await
            .unwrap();
        assert_eq!(handle.sent_count().await, 1);
    }

    #[tokio::test]
    async fn fetch_photo_writes_registered_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let channel = MockChannel::new();
        channel.register_photo("ph-1", b"JPEG").await;
        let dest = dir.path().join("nested/out.jpg");
        let handle = PhotoHandle {
            file_id: "ph-1".into(),
            file_size: None,
        };

        let written = channel.fetch_photo(&handle, &dest).await.unwrap();
        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&dest).unwrap(), b"JPEG");
    }

    #[tokio::test]
    async fn fetch_unknown_photo_fails() {
        let dir = tempfile::tempdir().unwrap();
        let channel = MockChannel::new();
        let handle = PhotoHandle {
            file_id: "missing".into(),
            file_size: None,
        };
        let result = channel.fetch_photo(&handle, &dir.path().join("x.jpg")).await;
        assert!(matches!(result, Err(PaddyError::Channel { .. })));
    }

    #[tokio::test]
    async fn wait_for_sent_returns_once_count_reached() {
        let channel = MockChannel::new();
        let sender = channel.clone();
        tokio::spawn(async move {
            sender
                .send(OutboundMessage::text(ConversationId(1), "late"))
                .await
                .unwrap();
        });
        let sent = tokio::time::timeout(std::time::Duration::from_secs(5), channel.wait_for_sent(1))
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
    }
}
