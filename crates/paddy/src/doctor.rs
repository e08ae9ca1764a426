// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `paddy doctor` command implementation.
//!
//! Runs diagnostic checks against the local files and remote services the
//! bot depends on, so a broken deployment is caught before the first survey.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use paddy_config::model::{GeoConfig, PaddyConfig};
use paddy_core::PaddyError;
use paddy_core::traits::PluginAdapter;
use paddy_core::types::HealthStatus;
use paddy_drive::ServiceAccountKey;
use paddy_geo::RegionResolver;
use paddy_telegram::TelegramChannel;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `paddy doctor` command. With `plain`, disables colored output.
pub async fn run_doctor(config: &PaddyConfig, plain: bool) -> Result<(), PaddyError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        CheckResult::new("Configuration", CheckStatus::Pass, "valid", Instant::now()),
        check_boundaries(&config.geo).await,
        check_growth_image(&config.survey.growth_stage_image).await,
        check_staging_dir(&config.storage.staging_dir).await,
        check_service_account(config.drive.service_account_file.as_deref()).await,
        check_drive(config).await,
        check_telegram(config).await,
    ];

    println!();
    println!("  paddy doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    use colored::Colorize;
    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
}

/// Check the province boundaries parse and contain at least one region.
async fn check_boundaries(geo: &GeoConfig) -> CheckResult {
    let start = Instant::now();
    let Some(path) = geo.boundaries_path.as_deref() else {
        return CheckResult::new("Boundaries", CheckStatus::Fail, "geo.boundaries_path not set", start);
    };

    match RegionResolver::from_path(path, &geo.name_property).await {
        Ok(resolver) if resolver.is_empty() => CheckResult::new(
            "Boundaries",
            CheckStatus::Warn,
            format!("no features carry `{}`", geo.name_property),
            start,
        ),
        Ok(resolver) => CheckResult::new(
            "Boundaries",
            CheckStatus::Pass,
            format!("{} regions", resolver.len()),
            start,
        ),
        Err(e) => CheckResult::new("Boundaries", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_growth_image(path: &Path) -> CheckResult {
    let start = Instant::now();
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        CheckResult::new("Growth stage image", CheckStatus::Pass, "found", start)
    } else {
        CheckResult::new(
            "Growth stage image",
            CheckStatus::Warn,
            format!("not found: {} (text prompt will be sent)", path.display()),
            start,
        )
    }
}

async fn check_staging_dir(dir: &Path) -> CheckResult {
    let start = Instant::now();
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => CheckResult::new("Staging directory", CheckStatus::Pass, "exists", start),
        Ok(_) => CheckResult::new(
            "Staging directory",
            CheckStatus::Fail,
            format!("{} is not a directory", dir.display()),
            start,
        ),
        Err(_) => CheckResult::new(
            "Staging directory",
            CheckStatus::Warn,
            format!("not found: {} (will be created on first photo)", dir.display()),
            start,
        ),
    }
}

async fn check_service_account(path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let Some(path) = path else {
        return CheckResult::new(
            "Service account",
            CheckStatus::Fail,
            "drive.service_account_file not set",
            start,
        );
    };
    match ServiceAccountKey::from_file(path).await {
        Ok(_) => CheckResult::new("Service account", CheckStatus::Pass, "key parsed", start),
        Err(e) => CheckResult::new("Service account", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check the service account can obtain a Drive access token.
async fn check_drive(config: &PaddyConfig) -> CheckResult {
    let start = Instant::now();
    let gateway = match paddy_drive::gateway_from_config(&config.drive, &config.retry).await {
        Ok(gateway) => gateway,
        Err(e) => return CheckResult::new("Google Drive", CheckStatus::Fail, e.to_string(), start),
    };
    health_result("Google Drive", gateway.backend().health_check().await, start)
}

async fn check_telegram(config: &PaddyConfig) -> CheckResult {
    let start = Instant::now();
    let channel = match TelegramChannel::new(config.telegram.clone()) {
        Ok(channel) => channel,
        Err(e) => return CheckResult::new("Telegram", CheckStatus::Fail, e.to_string(), start),
    };
    health_result("Telegram", channel.health_check().await, start)
}

fn health_result(name: &str, health: Result<HealthStatus, PaddyError>, start: Instant) -> CheckResult {
    match health {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, "reachable", start),
        Ok(HealthStatus::Degraded(reason)) => CheckResult::new(name, CheckStatus::Warn, reason, start),
        Ok(HealthStatus::Unhealthy(reason)) => CheckResult::new(name, CheckStatus::Fail, reason, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}
