// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Paddy survey bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use paddy_core::types::RestartAt;
use serde::{Deserialize, Serialize};

/// Top-level Paddy configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section has defaults, but a handful of keys (bot token, drive root,
/// impersonated account, credential and boundary paths) must be supplied
/// before validation passes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaddyConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Remote drive settings.
    #[serde(default)]
    pub drive: DriveConfig,

    /// Retry policy for remote drive calls.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Survey flow options.
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Province boundary data.
    #[serde(default)]
    pub geo: GeoConfig,

    /// Local files.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process identity and lifecycle settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds to wait for background jobs at shutdown.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

fn default_agent_name() -> String {
    "paddy".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_drain_timeout_secs() -> u64 {
    30
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Telegram user IDs or usernames allowed to use the bot.
    /// Empty means anyone may run a survey.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// Remote drive (Google Drive v3) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DriveConfig {
    /// Id of the shared folder every destination path is resolved under. Required.
    #[serde(default)]
    pub root_folder_id: Option<String>,

    /// Account the service account acts on behalf of. Required.
    #[serde(default)]
    pub impersonated_user: Option<String>,

    /// Path to the service-account JSON key. Required.
    #[serde(default)]
    pub service_account_file: Option<PathBuf>,

    /// Top-level folder holding the survey log.
    #[serde(default = "default_survey_folder")]
    pub survey_folder: String,

    /// Drive metadata API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Drive upload API base URL.
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,

    /// OAuth token endpoint override. Defaults to the key file's `token_uri`.
    #[serde(default)]
    pub token_uri: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            root_folder_id: None,
            impersonated_user: None,
            service_account_file: None,
            survey_folder: default_survey_folder(),
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            token_uri: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_survey_folder() -> String {
    "Surveys".to_string()
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Retry policy for remote drive calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff, in seconds.
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    2.0
}

/// Survey flow options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyConfig {
    /// Where "add new farm" re-enters a survey in progress.
    #[serde(default)]
    pub restart_at: RestartAt,

    /// Reference picture sent with the growth stage question.
    #[serde(default = "default_growth_stage_image")]
    pub growth_stage_image: PathBuf,

    /// Highest farm number offered.
    #[serde(default = "default_farm_number_max")]
    pub farm_number_max: u8,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            restart_at: RestartAt::default(),
            growth_stage_image: default_growth_stage_image(),
            farm_number_max: default_farm_number_max(),
        }
    }
}

fn default_growth_stage_image() -> PathBuf {
    PathBuf::from("survey_images/rice_growth_stage.jpg")
}

fn default_farm_number_max() -> u8 {
    20
}

/// Province boundary data.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeoConfig {
    /// GeoJSON `FeatureCollection` of province polygons. Required.
    #[serde(default)]
    pub boundaries_path: Option<PathBuf>,

    /// Feature property holding the province name.
    #[serde(default = "default_name_property")]
    pub name_property: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            boundaries_path: None,
            name_property: default_name_property(),
        }
    }
}

fn default_name_property() -> String {
    "ADM1_EN".to_string()
}

/// Local file locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory photos are staged in before upload.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Append-only CSV survey log.
    #[serde(default = "default_survey_log_path")]
    pub survey_log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            survey_log_path: default_survey_log_path(),
        }
    }
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_survey_log_path() -> PathBuf {
    PathBuf::from("farm_surveys.csv")
}
