// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only CSV survey log, mirrored to one well-known drive folder.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use paddy_core::types::RemoteFile;
use paddy_core::PaddyError;
use paddy_drive::{DriveGateway, UploadError};
use paddy_survey::options::OptionValue;
use paddy_survey::SurveyRecord;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// One line of the survey log. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyLogRow {
    pub timestamp: String,
    pub date: String,
    pub user_id: u64,
    pub username: String,
    pub farm_number: u8,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "province")]
    pub region: String,
    pub rainfall: &'static str,
    pub rainfall_intensity: &'static str,
    pub soil_roughness: &'static str,
    pub growth_stage: &'static str,
    pub water_status: &'static str,
    pub overall_health: &'static str,
    pub visible_problems: String,
    pub fertilizer: &'static str,
    pub fertilizer_type: &'static str,
    pub herbicide: &'static str,
    pub pesticide: &'static str,
    pub stress_events: &'static str,
}

impl From<&SurveyRecord> for SurveyLogRow {
    fn from(record: &SurveyRecord) -> Self {
        let a = &record.answers;
        Self {
            timestamp: record.completed_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            date: record.survey_date.format("%Y-%m-%d").to_string(),
            user_id: record.user_id.0,
            username: record.username.clone(),
            farm_number: a.farm_number,
            latitude: record.location.latitude,
            longitude: record.location.longitude,
            region: record.region.clone(),
            rainfall: a.rainfall.code(),
            rainfall_intensity: a.rainfall_intensity.code(),
            soil_roughness: a.soil_roughness.code(),
            growth_stage: a.growth_stage.code(),
            water_status: a.water_status.code(),
            overall_health: a.overall_health.code(),
            visible_problems: a
                .visible_problems
                .iter()
                .map(|p| p.code())
                .collect::<Vec<_>>()
                .join(", "),
            fertilizer: a.fertilizer.code(),
            fertilizer_type: a.fertilizer_type.code(),
            herbicide: a.herbicide.code(),
            pesticide: a.pesticide.code(),
            stress_events: a.stress_events.code(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    /// The row could not be written locally.
    #[error("could not append survey row: {0}")]
    Append(#[from] PaddyError),

    /// The row was written but the remote copy was not updated.
    #[error("could not sync survey log: {0}")]
    Sync(#[from] UploadError),
}

/// Writes completed surveys to the local log and syncs it to the drive.
pub struct SurveyLogSink {
    path: PathBuf,
    folder: String,
    gateway: Arc<DriveGateway>,
    write_lock: Mutex<()>,
}

impl SurveyLogSink {
    pub fn new(path: impl Into<PathBuf>, folder: impl Into<String>, gateway: Arc<DriveGateway>) -> Self {
        Self {
            path: path.into(),
            folder: folder.into(),
            gateway,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record`, then replaces the remote copy of the log.
    pub async fn record(&self, record: &SurveyRecord) -> Result<RemoteFile, SinkError> {
        self.append(record).await?;
        let file = self
            .gateway
            .upload_or_replace_named_file(&self.path, &self.folder)
            .await?;
        info!(
            user = %record.user_id,
            farm = record.answers.farm_number,
            folder = %self.folder,
            id = %file.id,
            "survey log synced"
        );
        Ok(file)
    }

    /// Appends one row; writes the header first when the log is new.
    pub async fn append(&self, record: &SurveyRecord) -> Result<(), PaddyError> {
        let _guard = self.write_lock.lock().await;

        let is_new = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(PaddyError::io(&self.path, e)),
        };
        if is_new
            && let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PaddyError::io(parent, e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(Vec::new());
        writer
            .serialize(SurveyLogRow::from(record))
            .map_err(|e| PaddyError::Storage { source: Box::new(e) })?;
        let bytes = writer.into_inner().map_err(|e| PaddyError::Storage {
            source: Box::new(e.into_error()),
        })?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PaddyError::io(&self.path, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| PaddyError::io(&self.path, e))?;
        file.flush().await.map_err(|e| PaddyError::io(&self.path, e))?;

        debug!(path = %self.path.display(), header = is_new, "survey row appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use paddy_core::types::UserId;
    use paddy_survey::options::{
        Answer, Applied, GrowthStage, OverallHealth, Problem, RainfallIntensity, SoilRoughness,
        StressEvent, WaterStatus, YesNo,
    };
    use paddy_survey::{CompletedAnswers, GeoPoint};

    fn record() -> SurveyRecord {
        let day = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        SurveyRecord {
            completed_at: day.and_hms_opt(9, 30, 5).unwrap(),
            survey_date: day,
            user_id: UserId(9),
            username: "sokha".into(),
            location: GeoPoint {
                latitude: 11.56,
                longitude: 104.92,
            },
            region: "Kandal".into(),
            answers: CompletedAnswers {
                farm_number: 3,
                rainfall: YesNo::Yes,
                rainfall_intensity: Answer::Given(RainfallIntensity::Moderate),
                soil_roughness: SoilRoughness::Medium,
                growth_stage: GrowthStage::Tillering,
                water_status: WaterStatus::MostlyWet,
                overall_health: OverallHealth::Fair,
                visible_problems: vec![Problem::Yellowing, Problem::PestDamage],
                fertilizer: Applied::DontRemember,
                fertilizer_type: Answer::NotApplicable,
                herbicide: Applied::No,
                pesticide: Applied::Yes,
                stress_events: StressEvent::DroughtEvent,
            },
        }
    }

    #[test]
    fn row_uses_option_codes() {
        let row = SurveyLogRow::from(&record());
        assert_eq!(row.timestamp, "2026-03-15T09:30:05");
        assert_eq!(row.date, "2026-03-15");
        assert_eq!(row.rainfall_intensity, "moderate");
        assert_eq!(row.water_status, "mostly_wet");
        assert_eq!(row.visible_problems, "yellowing, pest_damage");
        assert_eq!(row.fertilizer, "dont_remember");
        assert_eq!(row.fertilizer_type, "N/A");
        assert_eq!(row.stress_events, "drought_event");
    }

    #[test]
    fn header_matches_column_order() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(SurveyLogRow::from(&record())).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let header = out.lines().next().unwrap();
        assert_eq!(
            header,
            "timestamp,date,user_id,username,farm_number,latitude,longitude,province,\
             rainfall,rainfall_intensity,soil_roughness,growth_stage,water_status,\
             overall_health,visible_problems,fertilizer,fertilizer_type,herbicide,\
             pesticide,stress_events"
        );
    }
}
