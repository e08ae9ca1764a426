// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for [`InboundEvent`]s.

use paddy_core::types::{
    Command, ConversationId, EventKind, InboundEvent, MessageId, PhotoHandle, UserId, UserRef,
};

/// A user with the given id and username.
pub fn user(id: u64, username: &str) -> UserRef {
    UserRef {
        id: UserId(id),
        username: Some(username.to_string()),
        first_name: None,
    }
}

fn event(conversation: i64, user: &UserRef, kind: EventKind) -> InboundEvent {
    InboundEvent {
        conversation: ConversationId(conversation),
        user: user.clone(),
        kind,
    }
}

pub fn command(conversation: i64, user: &UserRef, command: Command) -> InboundEvent {
    event(conversation, user, EventKind::Command(command))
}

/// A button press on message `message_id` carrying `data`.
pub fn callback(conversation: i64, user: &UserRef, data: &str, message_id: i32) -> InboundEvent {
    event(
        conversation,
        user,
        EventKind::Callback {
            callback_id: format!("cb-{data}"),
            data: data.to_string(),
            message_id: Some(MessageId(message_id)),
        },
    )
}

pub fn location(conversation: i64, user: &UserRef, latitude: f64, longitude: f64) -> InboundEvent {
    event(
        conversation,
        user,
        EventKind::Location {
            latitude,
            longitude,
        },
    )
}

pub fn text(conversation: i64, user: &UserRef, text: &str) -> InboundEvent {
    event(conversation, user, EventKind::Text(text.to_string()))
}

pub fn photo(conversation: i64, user: &UserRef, file_id: &str) -> InboundEvent {
    event(
        conversation,
        user,
        EventKind::Photo(PhotoHandle {
            file_id: file_id.to_string(),
            file_size: None,
        }),
    )
}
