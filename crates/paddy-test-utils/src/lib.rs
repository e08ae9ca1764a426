// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Paddy integration tests.
//!
//! Provides mock adapters for fast, deterministic tests without Telegram
//! or Google Drive.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock messaging channel with event injection, message
//!   capture, and canned photo downloads
//! - [`MockDriveBackend`] - In-memory drive with scripted failures and a call journal
//! - [`events`] - Builders for inbound events

pub mod events;
pub mod mock_channel;
pub mod mock_drive;

pub use mock_channel::MockChannel;
pub use mock_drive::{DriveCall, MockDriveBackend};
