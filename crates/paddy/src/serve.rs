// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `paddy serve` command implementation.
//!
//! Builds every service from configuration, connects to Telegram and runs
//! the dispatcher until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use paddy_agent::{Services, SurveyBot, shutdown};
use paddy_config::model::PaddyConfig;
use paddy_core::PaddyError;
use paddy_core::traits::{ChannelAdapter, PluginAdapter};
use paddy_geo::LazyRegionResolver;
use paddy_i18n::Translations;
use paddy_survey::{SurveyMachine, SurveySettings};
use paddy_telegram::TelegramChannel;
use paddy_upload::{ChannelNotifier, SurveyLogSink, UploadQueue};
use tracing::{info, warn};

pub async fn run_serve(config: PaddyConfig) -> Result<(), PaddyError> {
    init_tracing(&config.agent.log_level);

    info!(agent_name = config.agent.name.as_str(), "starting paddy serve");

    let translations = Arc::new(Translations::embedded()?);

    let boundaries = config
        .geo
        .boundaries_path
        .clone()
        .ok_or_else(|| PaddyError::Config("geo.boundaries_path is not set".into()))?;
    let regions = Arc::new(LazyRegionResolver::new(
        boundaries,
        config.geo.name_property.as_str(),
    ));
    // Lookups keep retrying the load, so a bad file here is not fatal.
    match regions.get().await {
        Ok(resolver) => info!(regions = resolver.len(), "province boundaries loaded"),
        Err(e) => warn!(error = %e, "province boundaries unavailable, locations will be filed as Unknown"),
    }

    let gateway = Arc::new(paddy_drive::gateway_from_config(&config.drive, &config.retry).await?);
    info!(root = gateway.root_id(), "drive gateway ready");

    let mut telegram = TelegramChannel::new(config.telegram.clone())?;
    telegram.connect().await?;
    let telegram = Arc::new(telegram);
    let channel: Arc<dyn ChannelAdapter> = telegram.clone();

    let notifier = Arc::new(ChannelNotifier::new(channel.clone(), translations.clone()));
    let uploads = Arc::new(UploadQueue::new(
        gateway.clone(),
        telegram.clone(),
        notifier,
        config.storage.staging_dir.clone(),
    ));
    let survey_log = Arc::new(SurveyLogSink::new(
        config.storage.survey_log_path.clone(),
        config.drive.survey_folder.clone(),
        gateway,
    ));

    let machine = SurveyMachine::new(
        translations,
        SurveySettings {
            restart_at: config.survey.restart_at,
            growth_stage_image: config.survey.growth_stage_image.clone(),
            farm_number_max: config.survey.farm_number_max,
        },
    );

    let cancel = shutdown::install_signal_handler();
    let mut bot = SurveyBot::new(
        Services {
            channel,
            machine,
            regions,
            uploads,
            survey_log,
        },
        Duration::from_secs(config.agent.drain_timeout_secs),
    );
    bot.run(cancel).await?;

    telegram.shutdown().await?;
    info!("paddy serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("paddy={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
