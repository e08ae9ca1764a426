// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.

pub mod adapter;
pub mod channel;
pub mod drive;

pub use adapter::PluginAdapter;
pub use channel::{ChannelAdapter, PhotoSource};
pub use drive::DriveBackend;
