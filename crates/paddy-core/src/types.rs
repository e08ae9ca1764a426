// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the survey engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a conversation (a Telegram chat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user on the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a sent message, as returned by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

/// The sender of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl UserRef {
    /// Name used in file and folder names: the username, else the first
    /// name, else `user_{id}`, with spaces replaced by underscores.
    pub fn display_name(&self) -> String {
        let raw = self
            .username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.first_name.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("user_{}", self.id));
        raw.replace(' ', "_")
    }
}

/// Conversation language, chosen once at survey entry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Language {
    #[default]
    #[strum(serialize = "en")]
    #[serde(rename = "en")]
    English,
    #[strum(serialize = "km")]
    #[serde(rename = "km")]
    Khmer,
}

impl Language {
    /// Two-letter code used in callback data and translation tables.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Khmer => "km",
        }
    }
}

/// Where a mid-survey "add new farm" restart re-enters the survey.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RestartAt {
    /// Clear everything and ask for the language again.
    #[default]
    Language,
    /// Keep language and location, ask for the next farm number.
    FarmNumber,
}

/// A retrievable handle to a photo attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoHandle {
    pub file_id: String,
    pub file_size: Option<u32>,
}

/// Slash commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Start,
    Cancel,
    Help,
}

/// What the user did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Command(Command),
    /// An inline button press; `data` is the raw `{category}_{option}` tag.
    Callback {
        callback_id: String,
        data: String,
        message_id: Option<MessageId>,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Text(String),
    Photo(PhotoHandle),
}

/// One inbound user action, already stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub conversation: ConversationId,
    pub user: UserRef,
    pub kind: EventKind,
}

/// A single inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Keyboard attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Inline buttons, row by row.
    Inline(Vec<Vec<Button>>),
    /// One-time reply keyboard with a single "share location" button.
    RequestLocation(String),
    /// Persistent reply keyboard of plain text buttons.
    Reply(Vec<Vec<String>>),
    /// Remove any reply keyboard currently shown.
    Remove,
}

/// Body of an outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundContent {
    /// Send a new text message.
    Text(String),
    /// Replace the text (and keyboard) of a message the bot sent earlier.
    EditText { message_id: MessageId, text: String },
    /// Replace only the inline keyboard of an earlier message.
    EditKeyboard { message_id: MessageId },
    /// Send an image with a caption. Channels fall back to a text message
    /// carrying the caption and keyboard when the image cannot be sent.
    Photo { path: PathBuf, caption: String },
    /// Delete an earlier message.
    Delete { message_id: MessageId },
}

/// A message to deliver to one conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub conversation: ConversationId,
    pub content: OutboundContent,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation,
            content: OutboundContent::Text(text.into()),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Returns the plain text carried by this message, if any.
    pub fn body_text(&self) -> Option<&str> {
        match &self.content {
            OutboundContent::Text(t) => Some(t),
            OutboundContent::EditText { text, .. } => Some(text),
            OutboundContent::Photo { caption, .. } => Some(caption),
            OutboundContent::EditKeyboard { .. } | OutboundContent::Delete { .. } => None,
        }
    }
}

/// A file stored in the remote drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    pub web_link: Option<String>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}
