// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Paddy survey bot.
//!
//! Implements [`ChannelAdapter`] and [`PhotoSource`] for the Telegram Bot
//! API via teloxide: long polling for messages and button presses, inline
//! and reply keyboards, in-place edits, and photo downloads.

pub mod handler;
pub mod media;
pub mod render;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use paddy_config::model::TelegramConfig;
use paddy_core::PaddyError;
use paddy_core::traits::{ChannelAdapter, PhotoSource, PluginAdapter};
use paddy_core::types::{
    AdapterType, HealthStatus, InboundEvent, Keyboard, MessageId, OutboundContent,
    OutboundMessage, PhotoHandle,
};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

const INBOUND_CAPACITY: usize = 100;

/// Telegram channel adapter.
///
/// Button presses are held until [`acknowledge`](ChannelAdapter::acknowledge)
/// answers them, so the client's progress indicator stops only once the bot
/// has actually seen the press.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    pending_callbacks: PendingCallbacks,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: TelegramConfig) -> Result<Self, PaddyError> {
        let token = config
            .bot_token
            .as_deref()
            .ok_or_else(|| PaddyError::Config("telegram.bot_token is required".into()))?;
        if token.is_empty() {
            return Err(PaddyError::Config("telegram.bot_token cannot be empty".into()));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        Ok(Self {
            bot,
            config,
            inbound_rx: Mutex::new(inbound_rx),
            inbound_tx,
            pending_callbacks: Arc::new(Mutex::new(HashMap::new())),
            polling_handle: None,
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    async fn send_text(
        &self,
        chat: ChatId,
        text: String,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PaddyError> {
        let mut request = self.bot.send_message(chat, text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(render::reply_markup(keyboard));
        }
        let sent = request
            .await
            .map_err(|e| request_error("send message", e))?;
        Ok(MessageId(sent.id.0))
    }

    /// Sends an image, falling back to a text message with the same caption
    /// and keyboard when the file is missing or the upload is refused.
    async fn send_photo(
        &self,
        chat: ChatId,
        path: PathBuf,
        caption: String,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PaddyError> {
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(path = %path.display(), "image not found, sending text prompt");
            return self.send_text(chat, caption, keyboard).await;
        }

        let mut request = self
            .bot
            .send_photo(chat, InputFile::file(path.clone()))
            .caption(caption.clone());
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(render::reply_markup(keyboard));
        }
        match request.await {
            Ok(sent) => Ok(MessageId(sent.id.0)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "image send failed, sending text prompt");
                self.send_text(chat, caption, keyboard).await
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PaddyError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), PaddyError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), PaddyError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let allowed_users: Arc<Vec<String>> = Arc::new(self.config.allowed_users.clone());

        let on_message = {
            let tx = self.inbound_tx.clone();
            let allowed = allowed_users.clone();
            move |msg: Message| {
                let tx = tx.clone();
                let allowed = allowed.clone();
                async move {
                    if !msg
                        .from
                        .as_ref()
                        .is_some_and(|user| handler::is_authorized(user, &allowed))
                    {
                        debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
                        return respond(());
                    }
                    match handler::event_from_message(&msg) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => debug!(msg_id = msg.id.0, "ignoring unsupported message"),
                    }
                    respond(())
                }
            }
        };

        let on_callback = {
            let tx = self.inbound_tx.clone();
            let allowed = allowed_users;
            let pending = self.pending_callbacks.clone();
            move |bot: Bot, query: CallbackQuery| {
                let tx = tx.clone();
                let allowed = allowed.clone();
                let pending = pending.clone();
                async move {
                    let event = handler::event_from_callback(&query)
                        .filter(|_| handler::is_authorized(&query.from, &allowed));
                    let Some(event) = event else {
                        debug!(user = query.from.id.0, "dismissing unusable button press");
                        if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                            warn!(error = %e, "failed to answer button press");
                        }
                        return respond(());
                    };
                    hold_and_forward(&pending, &tx, query, event).await;
                    respond(())
                }
            }
        };

        info!("starting Telegram long polling");
        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(on_message))
                .branch(Update::filter_callback_query().endpoint(on_callback));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<Option<MessageId>, PaddyError> {
        let chat = ChatId(msg.conversation.0);
        let keyboard = msg.keyboard.as_ref();

        match msg.content {
            OutboundContent::Text(text) => self.send_text(chat, text, keyboard).await.map(Some),

            OutboundContent::Photo { path, caption } => {
                self.send_photo(chat, path, caption, keyboard).await.map(Some)
            }

            OutboundContent::EditText { message_id, text } => {
                let mut request =
                    self.bot
                        .edit_message_text(chat, teloxide::types::MessageId(message_id.0), text);
                if let Some(markup) = keyboard.and_then(render::inline_markup) {
                    request = request.reply_markup(markup);
                }
                tolerate_unmodified(request.await.map(|_| ()), "edit message")?;
                Ok(Some(message_id))
            }

            OutboundContent::EditKeyboard { message_id } => {
                let mut request = self
                    .bot
                    .edit_message_reply_markup(chat, teloxide::types::MessageId(message_id.0));
                if let Some(markup) = keyboard.and_then(render::inline_markup) {
                    request = request.reply_markup(markup);
                }
                tolerate_unmodified(request.await.map(|_| ()), "edit keyboard")?;
                Ok(Some(message_id))
            }

            OutboundContent::Delete { message_id } => {
                // Old messages cannot be deleted; the next prompt is sent anyway.
                if let Err(e) = self
                    .bot
                    .delete_message(chat, teloxide::types::MessageId(message_id.0))
                    .await
                {
                    warn!(chat_id = chat.0, message_id = message_id.0, error = %e, "delete failed");
                }
                Ok(None)
            }
        }
    }

    async fn receive(&self) -> Result<InboundEvent, PaddyError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| PaddyError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), PaddyError> {
        let query = self.pending_callbacks.lock().await.remove(callback_id);
        let Some(query) = query else {
            debug!(callback_id, "no pending button press to answer");
            return Ok(());
        };
        self.bot
            .answer_callback_query(query.id)
            .await
            .map_err(|e| request_error("answer button press", e))?;
        Ok(())
    }
}

#[async_trait]
impl PhotoSource for TelegramChannel {
    async fn fetch_photo(&self, photo: &PhotoHandle, dest: &Path) -> Result<u64, PaddyError> {
        media::download_to(&self.bot, &photo.file_id, dest).await
    }
}

type PendingCallbacks = Arc<Mutex<HashMap<String, CallbackQuery>>>;

/// Parks `query` for a later acknowledge and hands `event` to the dispatcher.
/// A press that cannot be delivered is not kept.
async fn hold_and_forward(
    pending: &PendingCallbacks,
    tx: &mpsc::Sender<InboundEvent>,
    query: CallbackQuery,
    event: InboundEvent,
) {
    let id = query.id.to_string();
    pending.lock().await.insert(id.clone(), query);
    if tx.send(event).await.is_err() {
        pending.lock().await.remove(&id);
        warn!("inbound channel closed, dropping button press");
    }
}

fn request_error(action: &str, e: teloxide::RequestError) -> PaddyError {
    error!(error = %e, "failed to {action}");
    PaddyError::Channel {
        message: format!("failed to {action}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Editing a message to its current content is not an error for us.
fn tolerate_unmodified(
    result: Result<(), teloxide::RequestError>,
    action: &str,
) -> Result<(), PaddyError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("message is not modified") => {
            debug!("{action}: message not modified");
            Ok(())
        }
        Err(e) => Err(request_error(action, e)),
    }
}
