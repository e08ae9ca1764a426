// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyboard conversion to Bot API markup.

use paddy_core::types::{Button, Keyboard};
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    KeyboardRemove, ReplyMarkup,
};

pub fn reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Inline(rows) => ReplyMarkup::InlineKeyboard(inline_rows(rows)),
        Keyboard::RequestLocation(label) => ReplyMarkup::Keyboard(
            KeyboardMarkup::new(vec![vec![
                KeyboardButton::new(label.clone()).request(ButtonRequest::Location),
            ]])
            .resize_keyboard()
            .one_time_keyboard(),
        ),
        Keyboard::Reply(rows) => ReplyMarkup::Keyboard(
            KeyboardMarkup::new(
                rows.iter()
                    .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect())
                    .collect::<Vec<Vec<_>>>(),
            )
            .resize_keyboard(),
        ),
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

/// Inline markup for edits, which only accept inline keyboards.
pub fn inline_markup(keyboard: &Keyboard) -> Option<InlineKeyboardMarkup> {
    match keyboard {
        Keyboard::Inline(rows) => Some(inline_rows(rows)),
        _ => None,
    }
}

fn inline_rows(rows: &[Vec<Button>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
            .collect::<Vec<_>>()
    }))
}
