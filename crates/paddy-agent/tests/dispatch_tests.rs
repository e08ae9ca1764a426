// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher tests against the mock channel and in-memory drive.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use paddy_agent::{Services, SurveyBot};
use paddy_core::Language;
use paddy_core::types::{Command, ConversationId, UserRef};
use paddy_drive::DriveGateway;
use paddy_geo::{LazyRegionResolver, RegionResolver};
use paddy_i18n::Translations;
use paddy_resilience::RetryPolicy;
use paddy_survey::{SurveyMachine, SurveySettings, SurveyState};
use paddy_test_utils::mock_drive::ROOT_ID;
use paddy_test_utils::{MockChannel, MockDriveBackend, events};
use paddy_upload::{ChannelNotifier, SurveyLogSink, UploadQueue};
use tokio_util::sync::CancellationToken;

const CHAT: i64 = 900;

const KANDAL: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {"ADM1_EN": "Kandal"},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[104.8, 11.5], [105.0, 11.5], [105.0, 11.7], [104.8, 11.7], [104.8, 11.5]]]
        }
    }]
}"#;

struct Harness {
    bot: SurveyBot,
    channel: MockChannel,
    drive: Arc<MockDriveBackend>,
    translations: Arc<Translations>,
    user: UserRef,
    log_path: PathBuf,
    _dir: tempfile::TempDir,
}

impl Harness {
    fn new(regions: LazyRegionResolver) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let channel = MockChannel::new();
        let drive = Arc::new(MockDriveBackend::new());
        let retry = RetryPolicy::new(3, 2.0).with_unit(Duration::from_millis(1));
        let gateway = Arc::new(DriveGateway::new(drive.clone(), ROOT_ID, retry));
        let translations = Arc::new(Translations::embedded().unwrap());

        let notifier = Arc::new(ChannelNotifier::new(
            Arc::new(channel.clone()),
            translations.clone(),
        ));
        let uploads = Arc::new(UploadQueue::new(
            gateway.clone(),
            Arc::new(channel.clone()),
            notifier,
            dir.path().join("downloads"),
        ));
        let log_path = dir.path().join("farm_surveys.csv");
        let survey_log = Arc::new(SurveyLogSink::new(log_path.clone(), "Surveys", gateway));

        let services = Services {
            channel: Arc::new(channel.clone()),
            machine: SurveyMachine::new(translations.clone(), SurveySettings::default()),
            regions: Arc::new(regions),
            uploads,
            survey_log,
        };

        Self {
            bot: SurveyBot::new(services, Duration::from_secs(5)),
            channel,
            drive,
            translations,
            user: events::user(31, "sokha"),
            log_path,
            _dir: dir,
        }
    }

    fn with_boundaries() -> Self {
        let resolver = RegionResolver::from_geojson(KANDAL.as_bytes(), "ADM1_EN").unwrap();
        Self::new(LazyRegionResolver::preloaded(resolver))
    }

    async fn press(&mut self, data: &str) {
        let event = events::callback(CHAT, &self.user, data, 100);
        self.bot.handle_event(event).await;
    }

    async fn complete_survey(&mut self, farm: u8) {
        self.bot
            .handle_event(events::command(CHAT, &self.user, Command::Start))
            .await;
        self.press("lang_en").await;
        self.bot
            .handle_event(events::location(CHAT, &self.user, 11.56, 104.92))
            .await;
        self.press(&format!("farm_{farm}")).await;
        for data in [
            "rainfall_yes",
            "intensity_moderate",
            "soil_rough",
            "growth_flowering",
            "water_mostly_wet",
            "health_fair",
            "problem_pest_damage",
            "problem_done",
            "fertilizer_yes",
            "fert_type_urea",
            "herbicide_no",
            "pesticide_no",
            "stress_drought_event",
        ] {
            self.press(data).await;
        }
    }

    /// Stops the bot and waits for background work to finish.
    async fn drain(&mut self) {
        let cancel = CancellationToken::new();
        cancel.cancel();
        self.bot.run(cancel).await.unwrap();
    }
}

#[tokio::test]
async fn completed_survey_is_logged_and_photo_uploaded_under_region() {
    let mut h = Harness::with_boundaries();
    h.complete_survey(3).await;

    let session = h.bot.session(ConversationId(CHAT)).unwrap();
    assert_eq!(session.state, SurveyState::Complete);
    assert_eq!(session.region.as_deref(), Some("Kandal"));
    let folder = session.destination_path.clone().unwrap();
    assert!(folder.starts_with("Kandal/KDL-sokha-03/"), "got {folder}");

    h.channel.register_photo("field-1", b"jpeg bytes").await;
    h.bot
        .handle_event(events::photo(CHAT, &h.user, "field-1"))
        .await;
    h.drain().await;

    let uploads = h.drive.uploads().await;
    assert_eq!(uploads.len(), 2, "got {uploads:?}");
    let photo = uploads
        .iter()
        .find(|p| p.ends_with("_01.jpg"))
        .expect("photo upload");
    assert!(photo.starts_with(&format!("{folder}/KDL-sokha-03_")));

    let log = std::fs::read_to_string(&h.log_path).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.contains(",Kandal,"));
    let remote = h.drive.file_content("Surveys/farm_surveys.csv").await.unwrap();
    assert_eq!(remote, log.into_bytes());
}

#[tokio::test]
async fn button_presses_are_acknowledged() {
    let mut h = Harness::with_boundaries();
    h.bot
        .handle_event(events::command(CHAT, &h.user, Command::Start))
        .await;
    h.press("lang_km").await;
    h.press("farm_2").await;

    assert_eq!(h.channel.acknowledged().await, vec!["cb-lang_km", "cb-farm_2"]);
    let session = h.bot.session(ConversationId(CHAT)).unwrap();
    assert_eq!(session.language, Language::Khmer);
    assert_eq!(session.state, SurveyState::Location);
}

#[tokio::test]
async fn cancel_forgets_the_conversation() {
    let mut h = Harness::with_boundaries();
    h.bot
        .handle_event(events::command(CHAT, &h.user, Command::Start))
        .await;
    assert_eq!(h.bot.active_sessions(), 1);

    h.bot
        .handle_event(events::command(CHAT, &h.user, Command::Cancel))
        .await;
    assert_eq!(h.bot.active_sessions(), 0);
    let texts = h.channel.sent_texts().await;
    assert_eq!(
        texts.last().map(String::as_str),
        Some(h.translations.get(Language::English, "cancel_msg"))
    );
}

#[tokio::test]
async fn photo_without_survey_is_refused() {
    let mut h = Harness::with_boundaries();
    h.bot
        .handle_event(events::photo(CHAT, &h.user, "stray"))
        .await;

    assert_eq!(h.bot.active_sessions(), 0);
    assert_eq!(
        h.channel.sent_texts().await,
        vec![h.translations.get(Language::English, "complete_survey_first")]
    );
    h.drain().await;
    assert!(h.drive.uploads().await.is_empty());
}

#[tokio::test]
async fn missing_boundaries_fall_back_to_unknown_region() {
    let mut h = Harness::new(LazyRegionResolver::new(
        "/nonexistent/provinces.geojson",
        "ADM1_EN",
    ));
    h.complete_survey(7).await;

    let session = h.bot.session(ConversationId(CHAT)).unwrap();
    assert_eq!(session.region.as_deref(), Some("Unknown"));
    assert!(
        session
            .destination_path
            .as_deref()
            .unwrap()
            .starts_with("Unknown/UNK-sokha-07/")
    );
    h.drain().await;
}

#[tokio::test]
async fn run_loop_handles_injected_events_until_cancelled() {
    let h = Harness::with_boundaries();
    let Harness {
        mut bot,
        channel,
        user,
        _dir,
        ..
    } = h;

    let cancel = CancellationToken::new();
    let runner = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            bot.run(cancel).await.unwrap();
            bot
        })
    };

    channel
        .inject(events::command(CHAT, &user, Command::Start))
        .await;
    tokio::time::timeout(Duration::from_secs(5), channel.wait_for_sent(1))
        .await
        .expect("welcome prompt");

    cancel.cancel();
    let bot = tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("bot stops")
        .unwrap();
    assert_eq!(
        bot.session(ConversationId(CHAT)).map(|s| s.state),
        Some(SurveyState::Language)
    );
}
