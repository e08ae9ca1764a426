// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the messaging platform.

use std::path::Path;

use async_trait::async_trait;

use crate::error::PaddyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, MessageId, OutboundMessage, PhotoHandle};

/// Adapter for a bidirectional, turn-based messaging channel.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Starts receiving updates from the platform.
    async fn connect(&mut self) -> Result<(), PaddyError>;

    /// Delivers a message. Returns the id of the sent or edited message.
    async fn send(&self, msg: OutboundMessage) -> Result<Option<MessageId>, PaddyError>;

    /// Receives the next inbound event.
    async fn receive(&self) -> Result<InboundEvent, PaddyError>;

    /// Acknowledges a button press so the client stops its progress indicator.
    async fn acknowledge(&self, callback_id: &str) -> Result<(), PaddyError>;
}

/// Something that can fetch a previously received photo to local disk.
#[async_trait]
pub trait PhotoSource: Send + Sync + 'static {
    /// Downloads `photo` into `dest`, returning the number of bytes written.
    async fn fetch_photo(&self, photo: &PhotoHandle, dest: &Path) -> Result<u64, PaddyError>;
}
