// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure notices for uploads that did not make it.

use std::sync::Arc;

use async_trait::async_trait;
use paddy_core::traits::ChannelAdapter;
use paddy_core::types::OutboundMessage;
use paddy_i18n::Translations;
use paddy_survey::PhotoUpload;
use tracing::warn;

use crate::queue::UploadFailure;

/// Told about every upload task that ends in failure.
#[async_trait]
pub trait UploadNotifier: Send + Sync + 'static {
    async fn upload_failed(&self, upload: &PhotoUpload, failure: &UploadFailure);
}

/// Sends a localized notice to the conversation the photo came from.
pub struct ChannelNotifier {
    channel: Arc<dyn ChannelAdapter>,
    translations: Arc<Translations>,
}

impl ChannelNotifier {
    pub fn new(channel: Arc<dyn ChannelAdapter>, translations: Arc<Translations>) -> Self {
        Self {
            channel,
            translations,
        }
    }
}

#[async_trait]
impl UploadNotifier for ChannelNotifier {
    async fn upload_failed(&self, upload: &PhotoUpload, failure: &UploadFailure) {
        let text = self.translations.get(upload.language, failure.notice_key());
        let notice = OutboundMessage::text(upload.conversation, text);
        if let Err(e) = self.channel.send(notice).await {
            warn!(
                conversation = %upload.conversation,
                error = %e,
                "could not deliver upload failure notice"
            );
        }
    }
}
