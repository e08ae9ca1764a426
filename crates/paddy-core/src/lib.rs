// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Paddy field-survey bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Paddy workspace. The messaging channel
//! and the remote drive backend both implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PaddyError;
pub use types::{AdapterType, ConversationId, HealthStatus, Language, MessageId, UserId};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, DriveBackend, PhotoSource, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paddy_error_has_all_variants() {
        let _config = PaddyError::Config("test".into());
        let _channel = PaddyError::Channel {
            message: "test".into(),
            source: None,
        };
        let _drive = PaddyError::Drive {
            message: "test".into(),
            transient: true,
            source: None,
        };
        let _io = PaddyError::Io {
            path: "/tmp/x".into(),
            source: std::io::Error::other("test"),
        };
        let _storage = PaddyError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _decode = PaddyError::Decode("test".into());
        let _queue = PaddyError::Queue("test".into());
        let _timeout = PaddyError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = PaddyError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_drive_backend<T: DriveBackend>() {}
        fn _assert_photo_source<T: PhotoSource>() {}
    }
}
