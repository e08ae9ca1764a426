// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks that required credentials and paths are present, referenced files
//! exist, and numeric settings are in range. All problems are collected
//! so the operator can fix them in one pass.

use std::path::Path;

use crate::diagnostic::ConfigError;
use crate::model::PaddyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PaddyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    require_text(&mut errors, "telegram.bot_token", config.telegram.bot_token.as_deref());
    require_text(
        &mut errors,
        "drive.root_folder_id",
        config.drive.root_folder_id.as_deref(),
    );
    require_text(
        &mut errors,
        "drive.impersonated_user",
        config.drive.impersonated_user.as_deref(),
    );
    require_file(
        &mut errors,
        "drive.service_account_file",
        config.drive.service_account_file.as_deref(),
    );
    require_file(
        &mut errors,
        "geo.boundaries_path",
        config.geo.boundaries_path.as_deref(),
    );

    if let Some(user) = config.drive.impersonated_user.as_deref()
        && !user.trim().is_empty()
        && !user.contains('@')
    {
        errors.push(ConfigError::Validation {
            message: format!("drive.impersonated_user `{user}` is not an email address"),
        });
    }

    if config.drive.survey_folder.trim().is_empty() || config.drive.survey_folder.contains('/') {
        errors.push(ConfigError::Validation {
            message: "drive.survey_folder must be a single non-empty folder name".to_string(),
        });
    }

    if config.retry.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "retry.max_attempts must be at least 1".to_string(),
        });
    }

    if !config.retry.backoff_base.is_finite() || config.retry.backoff_base <= 1.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "retry.backoff_base must be a number > 1.0, got {}",
                config.retry.backoff_base
            ),
        });
    }

    if !(1..=99).contains(&config.survey.farm_number_max) {
        errors.push(ConfigError::Validation {
            message: format!(
                "survey.farm_number_max must be between 1 and 99, got {}",
                config.survey.farm_number_max
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` must be one of: {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.survey_log_path.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.survey_log_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn require_text(errors: &mut Vec<ConfigError>, key: &str, value: Option<&str>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        errors.push(ConfigError::MissingKey {
            key: key.to_string(),
        });
    }
}

fn require_file(errors: &mut Vec<ConfigError>, key: &str, value: Option<&Path>) {
    match value {
        None => errors.push(ConfigError::MissingKey {
            key: key.to_string(),
        }),
        Some(path) if path.as_os_str().is_empty() => errors.push(ConfigError::MissingKey {
            key: key.to_string(),
        }),
        Some(path) if !path.is_file() => errors.push(ConfigError::MissingFile {
            key: key.to_string(),
            path: path.to_path_buf(),
        }),
        Some(_) => {}
    }
}
