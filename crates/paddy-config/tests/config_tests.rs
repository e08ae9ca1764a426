// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Paddy configuration system.

use std::path::Path;

use paddy_config::diagnostic::ConfigError;
use paddy_config::model::PaddyConfig;
use paddy_config::{load_and_validate_str, load_config_from_str};
use paddy_core::types::RestartAt;

/// Writes the files a valid config must reference and returns TOML for them.
fn complete_toml(dir: &Path) -> String {
    let key = dir.join("service_account.json");
    let geo = dir.join("provinces.geojson");
    std::fs::write(&key, "{}").unwrap();
    std::fs::write(&geo, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();

    format!(
        r#"
[telegram]
bot_token = "123:ABC"

[drive]
root_folder_id = "root-123"
impersonated_user = "surveys@example.org"
service_account_file = "{}"

[geo]
boundaries_path = "{}"
"#,
        key.display(),
        geo.display()
    )
}

#[test]
fn full_toml_deserializes_into_paddy_config() {
    let toml = r#"
[agent]
name = "field-bot"
log_level = "debug"
drain_timeout_secs = 5

[telegram]
bot_token = "123:ABC"
allowed_users = ["alice", "42"]

[drive]
root_folder_id = "root"
impersonated_user = "a@b.c"
service_account_file = "secret/service_account.json"
survey_folder = "Logs"

[retry]
max_attempts = 5
backoff_base = 1.5

[survey]
restart_at = "farm_number"
growth_stage_image = "img/stages.jpg"
farm_number_max = 12

[geo]
boundaries_path = "data/khm_adm1.geojson"
name_property = "NAME_1"

[storage]
staging_dir = "/tmp/stage"
survey_log_path = "/tmp/log.csv"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "field-bot");
    assert_eq!(config.agent.drain_timeout_secs, 5);
    assert_eq!(config.telegram.allowed_users, vec!["alice", "42"]);
    assert_eq!(config.drive.survey_folder, "Logs");
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.backoff_base, 1.5);
    assert_eq!(config.survey.restart_at, RestartAt::FarmNumber);
    assert_eq!(config.survey.farm_number_max, 12);
    assert_eq!(config.geo.name_property, "NAME_1");
    assert_eq!(config.storage.survey_log_path, Path::new("/tmp/log.csv"));
}

#[test]
fn defaults_match_field_deployment() {
    let config = PaddyConfig::default();
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.backoff_base, 2.0);
    assert_eq!(config.drive.survey_folder, "Surveys");
    assert_eq!(config.survey.farm_number_max, 20);
    assert_eq!(config.survey.restart_at, RestartAt::Language);
    assert_eq!(config.geo.name_property, "ADM1_EN");
    assert_eq!(config.storage.staging_dir, Path::new("downloads"));
    assert_eq!(config.storage.survey_log_path, Path::new("farm_surveys.csv"));
}

#[test]
fn unknown_key_gets_suggestion() {
    let errors = load_and_validate_str("[telegram]\nbot_tokn = \"x\"\n").unwrap_err();
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "bot_tokn" && s == "bot_token"
        )
    });
    assert!(found, "expected unknown key suggestion, got {errors:?}");
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[anthropic]\napi_key = \"x\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "anthropic"))
    );
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[retry]\nmax_attempts = \"three\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. }))
    );
}

#[test]
fn empty_config_reports_every_required_key() {
    let errors = load_and_validate_str("").unwrap_err();
    let missing: Vec<&str> = errors
        .iter()
        .filter_map(|e| match e {
            ConfigError::MissingKey { key } => Some(key.as_str()),
            _ => None,
        })
        .collect();
    for key in [
        "telegram.bot_token",
        "drive.root_folder_id",
        "drive.impersonated_user",
        "drive.service_account_file",
        "geo.boundaries_path",
    ] {
        assert!(missing.contains(&key), "{key} not reported: {missing:?}");
    }
}

#[test]
fn complete_config_validates() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_and_validate_str(&complete_toml(dir.path())).expect("should validate");
    assert_eq!(config.drive.root_folder_id.as_deref(), Some("root-123"));
}

#[test]
fn missing_credential_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let toml = complete_toml(dir.path());
    std::fs::remove_file(dir.path().join("service_account.json")).unwrap();

    let errors = load_and_validate_str(&toml).unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::MissingFile { key, .. } if key == "drive.service_account_file"
    )));
}

#[test]
fn out_of_range_values_are_collected_together() {
    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        "{}\n[retry]\nmax_attempts = 0\nbackoff_base = 0.5\n\n[agent]\nlog_level = \"loud\"\n",
        complete_toml(dir.path())
    );
    let errors = load_and_validate_str(&toml).unwrap_err();
    let validation_count = errors
        .iter()
        .filter(|e| matches!(e, ConfigError::Validation { .. }))
        .count();
    assert_eq!(validation_count, 3, "got {errors:?}");
}

#[test]
fn flat_backoff_base_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        "{}\n[retry]\nbackoff_base = 1.0\n",
        complete_toml(dir.path())
    );
    let errors = load_and_validate_str(&toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("retry.backoff_base"))
    ));
}

#[test]
fn blank_bot_token_counts_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let toml = complete_toml(dir.path()).replace("\"123:ABC\"", "\"  \"");
    let errors = load_and_validate_str(&toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::MissingKey { key } if key == "telegram.bot_token")
    ));
}
