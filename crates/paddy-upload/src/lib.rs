// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background persistence for the Paddy survey bot.
//!
//! [`UploadQueue`] files accepted photos in the drive one at a time, in
//! arrival order. [`SurveyLogSink`] appends completed surveys to the CSV log
//! and keeps a single remote copy of it up to date.

pub mod notify;
pub mod queue;
pub mod sink;

pub use notify::{ChannelNotifier, UploadNotifier};
pub use queue::{UploadFailure, UploadQueue, UploadTask};
pub use sink::{SinkError, SurveyLogRow, SurveyLogSink};
