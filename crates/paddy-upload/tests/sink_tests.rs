// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Survey log sink against a temp directory and the in-memory drive.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use paddy_core::types::{Command, ConversationId, UserId};
use paddy_drive::DriveGateway;
use paddy_i18n::Translations;
use paddy_resilience::RetryPolicy;
use paddy_survey::options::{
    Answer, Applied, GrowthStage, OverallHealth, Problem, SoilRoughness, StressEvent,
    WaterStatus, YesNo,
};
use paddy_survey::{
    CompletedAnswers, Effect, EventContext, GeoPoint, Outcome, Session, SurveyMachine,
    SurveyRecord, SurveySettings,
};
use paddy_test_utils::mock_drive::ROOT_ID;
use paddy_test_utils::{DriveCall, MockDriveBackend, events};
use paddy_upload::{SinkError, SurveyLogRow, SurveyLogSink};

fn record(user: u64, farm: u8) -> SurveyRecord {
    let day = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
    SurveyRecord {
        completed_at: day.and_hms_opt(10, 0, 0).unwrap(),
        survey_date: day,
        user_id: UserId(user),
        username: format!("user{user}"),
        location: GeoPoint {
            latitude: 11.56,
            longitude: 104.92,
        },
        region: "R1".into(),
        answers: CompletedAnswers {
            farm_number: farm,
            rainfall: YesNo::No,
            rainfall_intensity: Answer::NotApplicable,
            soil_roughness: SoilRoughness::Medium,
            growth_stage: GrowthStage::Tillering,
            water_status: WaterStatus::Flooded,
            overall_health: OverallHealth::Good,
            visible_problems: vec![Problem::Yellowing],
            fertilizer: Applied::No,
            fertilizer_type: Answer::NotApplicable,
            herbicide: Applied::No,
            pesticide: Applied::No,
            stress_events: StressEvent::None,
        },
    }
}

fn gateway(drive: &Arc<MockDriveBackend>) -> Arc<DriveGateway> {
    let retry = RetryPolicy::new(3, 2.0).with_unit(Duration::from_millis(1));
    Arc::new(DriveGateway::new(drive.clone(), ROOT_ID, retry))
}

#[tokio::test]
async fn header_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let sink = SurveyLogSink::new(dir.path().join("farm_surveys.csv"), "Surveys", gateway(&drive));

    sink.append(&record(1, 3)).await.unwrap();
    sink.append(&record(2, 4)).await.unwrap();

    let text = std::fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("timestamp,date,user_id"));
    assert_eq!(text.matches("timestamp").count(), 1);
    assert!(lines[1].contains(",user1,3,"));
    assert!(lines[1].contains(",N/A,"));
    assert!(lines[2].contains(",user2,4,"));
}

#[tokio::test]
async fn concurrent_appends_keep_rows_whole() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let sink = Arc::new(SurveyLogSink::new(
        dir.path().join("logs/farm_surveys.csv"),
        "Surveys",
        gateway(&drive),
    ));

    let mut handles = Vec::new();
    for user in 0..8 {
        let sink = sink.clone();
        handles.push(tokio::spawn(async move { sink.append(&record(user, 1)).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut reader = csv::Reader::from_path(sink.path()).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|r| r.len() == 20));
}

#[tokio::test]
async fn record_keeps_one_remote_copy_in_surveys_folder() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let sink = SurveyLogSink::new(dir.path().join("farm_surveys.csv"), "Surveys", gateway(&drive));

    let first = sink.record(&record(1, 3)).await.unwrap();
    let second = sink.record(&record(2, 5)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(drive.file_count().await, 1);
    assert_eq!(drive.folder_paths().await, vec!["Surveys"]);
    let remote = drive.file_content("Surveys/farm_surveys.csv").await.unwrap();
    assert_eq!(String::from_utf8(remote).unwrap().lines().count(), 3);
    assert!(
        drive
            .calls()
            .await
            .iter()
            .any(|c| matches!(c, DriveCall::UpdateFile { .. }))
    );
}

#[tokio::test]
async fn sync_failure_keeps_local_row() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let sink = SurveyLogSink::new(dir.path().join("farm_surveys.csv"), "Surveys", gateway(&drive));
    drive.fail_next(1, false).await;

    let err = sink.record(&record(1, 3)).await.unwrap_err();
    assert!(matches!(err, SinkError::Sync(_)), "got: {err:?}");
    let text = std::fs::read_to_string(sink.path()).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[tokio::test]
async fn finished_conversation_yields_expected_log_row() {
    let translations = Arc::new(Translations::embedded().unwrap());
    let machine = SurveyMachine::new(translations, SurveySettings::default());
    let mut session = Session::new(ConversationId(501));
    let user = events::user(9, "sokha");
    let now = NaiveDate::from_ymd_opt(2026, 3, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let ctx = EventContext::at(now);

    machine.handle(&mut session, &events::command(501, &user, Command::Start), &ctx);
    machine.handle(&mut session, &events::callback(501, &user, "lang_en", 1), &ctx);
    machine.handle(
        &mut session,
        &events::location(501, &user, 11.56, 104.92),
        &EventContext::at(now).with_region(Some("R1".into())),
    );

    let mut last = None;
    for data in [
        "farm_3",
        "rainfall_no",
        "soil_medium",
        "growth_tillering",
        "water_flooded",
        "health_good",
        "problem_yellowing",
        "problem_done",
        "fertilizer_no",
        "herbicide_no",
        "pesticide_no",
        "stress_none",
    ] {
        let t = machine.handle(&mut session, &events::callback(501, &user, data, 1), &ctx);
        assert!(!matches!(t.outcome, Outcome::Rejected(_)), "{data} rejected");
        last = Some(t);
    }

    let done = last.unwrap();
    assert_eq!(done.outcome, Outcome::Completed);
    assert_eq!(
        session.destination_path.as_deref(),
        Some("R1/UNK-sokha-03/20260315")
    );
    let record = done
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::PersistSurvey(r) => Some(r),
            _ => None,
        })
        .unwrap();

    let row = SurveyLogRow::from(record);
    assert_eq!(row.region, "R1");
    assert_eq!(row.farm_number, 3);
    assert_eq!(row.rainfall, "no");
    assert_eq!(row.rainfall_intensity, "N/A");
    assert_eq!(row.soil_roughness, "medium");
    assert_eq!(row.visible_problems, "yellowing");
    assert_eq!(row.fertilizer_type, "N/A");
    assert_eq!(row.pesticide, "no");
    assert_eq!(row.stress_events, "none");

    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let sink = SurveyLogSink::new(dir.path().join("survey_log.csv"), "Surveys", gateway(&drive));
    sink.record(record).await.unwrap();
    let written = std::fs::read_to_string(sink.path()).unwrap();
    let line = written.lines().nth(1).unwrap();
    assert!(line.contains(",R1,no,N/A,medium,tillering,flooded,good,yellowing,no,N/A,no,no,none"), "{line}");
}
