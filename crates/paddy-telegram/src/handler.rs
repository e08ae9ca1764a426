// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization filtering and update decoding.
//!
//! Turns Telegram messages and callback queries into channel-agnostic
//! [`InboundEvent`]s. Anything the survey does not understand (stickers,
//! voice notes, unknown commands) decodes to `None` and is dropped.

use paddy_core::types::{
    Command, ConversationId, EventKind, InboundEvent, MessageId, PhotoHandle, UserId, UserRef,
};
use teloxide::prelude::*;
use teloxide::types::User;

/// Checks whether `user` may use the bot.
///
/// An empty `allowed_users` list admits everyone. Otherwise the user's
/// numeric id or username (with or without `@`, case-insensitive) must be
/// listed.
pub fn is_authorized(user: &User, allowed_users: &[String]) -> bool {
    if allowed_users.is_empty() {
        return true;
    }

    let user_id = user.id.0.to_string();
    allowed_users.iter().any(|allowed| {
        if *allowed == user_id {
            return true;
        }
        let wanted = allowed.strip_prefix('@').unwrap_or(allowed);
        user.username
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
    })
}

/// Parses `/start`, `/cancel` and `/help`, with or without a `@botname`
/// suffix and trailing arguments.
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.split_whitespace().next()?.strip_prefix('/')?;
    let name = word.split('@').next()?;
    name.to_ascii_lowercase().parse().ok()
}

pub fn user_ref(user: &User) -> UserRef {
    UserRef {
        id: UserId(user.id.0),
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()).filter(|n| !n.is_empty()),
    }
}

/// Decodes a chat message. Returns `None` for unsupported content.
pub fn event_from_message(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;

    let kind = if let Some(text) = msg.text() {
        if text.starts_with('/') {
            EventKind::Command(parse_command(text)?)
        } else {
            EventKind::Text(text.to_string())
        }
    } else if let Some(location) = msg.location() {
        EventKind::Location {
            latitude: location.latitude,
            longitude: location.longitude,
        }
    } else if let Some(photos) = msg.photo() {
        // Sizes are ordered smallest first.
        let largest = photos.last()?;
        EventKind::Photo(PhotoHandle {
            file_id: largest.file.id.0.clone(),
            file_size: Some(largest.file.size),
        })
    } else {
        return None;
    };

    Some(InboundEvent {
        conversation: ConversationId(msg.chat.id.0),
        user: user_ref(user),
        kind,
    })
}

/// Decodes an inline button press. Returns `None` when it carries no data.
pub fn event_from_callback(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.clone()?;
    let message = query.message.as_ref();
    let conversation = message
        .map(|m| m.chat().id.0)
        .unwrap_or(query.from.id.0 as i64);

    Some(InboundEvent {
        conversation: ConversationId(conversation),
        user: user_ref(&query.from),
        kind: EventKind::Callback {
            callback_id: query.id.to_string(),
            data,
            message_id: message.map(|m| MessageId(m.id().0)),
        },
    })
}
