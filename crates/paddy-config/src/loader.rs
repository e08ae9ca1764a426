// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./paddy.toml` > `~/.config/paddy/paddy.toml` > `/etc/paddy/paddy.toml`
//! with environment variable overrides via `PADDY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use tracing::debug;

use crate::model::PaddyConfig;

/// Top-level sections that environment variables may target.
const SECTIONS: &[&str] = &[
    "agent", "telegram", "drive", "retry", "survey", "geo", "storage",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/paddy/paddy.toml` (system-wide)
/// 3. `~/.config/paddy/paddy.toml` (user XDG config)
/// 4. `./paddy.toml` (local directory)
/// 5. `PADDY_*` environment variables
pub fn load_config() -> Result<PaddyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PaddyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PaddyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PaddyConfig, figment::Error> {
    debug!(path = %path.display(), "loading config from explicit path");
    Figment::new()
        .merge(Serialized::defaults(PaddyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    let user_config = dirs::config_dir()
        .map(|d| d.join("paddy/paddy.toml"))
        .unwrap_or_default();
    debug!(user_config = %user_config.display(), "resolving config hierarchy");
    Figment::new()
        .merge(Serialized::defaults(PaddyConfig::default()))
        .merge(Toml::file("/etc/paddy/paddy.toml"))
        .merge(Toml::file(user_config))
        .merge(Toml::file("paddy.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `PADDY_SECTION_KEY` to `section.key`.
///
/// Only the leading section name is split off, so keys that contain
/// underscores survive: `PADDY_DRIVE_ROOT_FOLDER_ID` maps to
/// `drive.root_folder_id`.
fn env_provider() -> Env {
    Env::prefixed("PADDY_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_only_the_section_prefix() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_env_key("drive_root_folder_id"), "drive.root_folder_id");
        assert_eq!(
            map_env_key("storage_survey_log_path"),
            "storage.survey_log_path"
        );
        assert_eq!(map_env_key("survey_restart_at"), "survey.restart_at");
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(map_env_key("mystery_key"), "mystery_key");
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "paddy.toml",
                r#"
                [telegram]
                bot_token = "from-file"
                "#,
            )?;
            jail.set_env("PADDY_TELEGRAM_BOT_TOKEN", "from-env");
            jail.set_env("PADDY_RETRY_MAX_ATTEMPTS", "5");

            let config = load_config_from_path(Path::new("paddy.toml"))?;
            assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
            assert_eq!(config.retry.max_attempts, 5);
            Ok(())
        });
    }
}
