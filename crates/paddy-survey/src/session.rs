// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation survey state.

use chrono::{NaiveDate, NaiveDateTime};
use paddy_core::types::{ConversationId, UserId, UserRef};
use paddy_core::Language;

use crate::options::{
    Answer, Applied, FertilizerType, GrowthStage, OverallHealth, Problem, RainfallIntensity,
    SoilRoughness, StressEvent, WaterStatus, YesNo,
};

/// Where a conversation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SurveyState {
    /// No survey running.
    Idle,
    Language,
    Location,
    FarmNumber,
    Rainfall,
    RainfallIntensity,
    SoilRoughness,
    GrowthStage,
    WaterStatus,
    OverallHealth,
    VisibleProblems,
    Fertilizer,
    FertilizerType,
    Herbicide,
    Pesticide,
    StressEvents,
    /// Survey finished; photos are accepted.
    Complete,
}

/// A shared location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Answers collected so far. Each field is set when its question is answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyAnswers {
    pub farm_number: Option<u8>,
    pub rainfall: Option<YesNo>,
    pub rainfall_intensity: Option<Answer<RainfallIntensity>>,
    pub soil_roughness: Option<SoilRoughness>,
    pub growth_stage: Option<GrowthStage>,
    pub water_status: Option<WaterStatus>,
    pub overall_health: Option<OverallHealth>,
    /// Selected problems in selection order, without duplicates.
    pub visible_problems: Vec<Problem>,
    pub fertilizer: Option<Applied>,
    pub fertilizer_type: Option<Answer<FertilizerType>>,
    pub herbicide: Option<Applied>,
    pub pesticide: Option<Applied>,
    pub stress_events: Option<StressEvent>,
}

impl SurveyAnswers {
    /// Applies a visible-problems toggle.
    ///
    /// `NoneObserved` replaces the whole selection. Any other problem first
    /// drops `NoneObserved`, then flips its own membership.
    pub fn toggle_problem(&mut self, problem: Problem) {
        if problem == Problem::NoneObserved {
            self.visible_problems = vec![Problem::NoneObserved];
            return;
        }
        self.visible_problems.retain(|p| *p != Problem::NoneObserved);
        if let Some(pos) = self.visible_problems.iter().position(|p| *p == problem) {
            self.visible_problems.remove(pos);
        } else {
            self.visible_problems.push(problem);
        }
    }

    /// Returns the completed answer set, or `None` while any answer is missing.
    pub fn complete(&self) -> Option<CompletedAnswers> {
        Some(CompletedAnswers {
            farm_number: self.farm_number?,
            rainfall: self.rainfall?,
            rainfall_intensity: self.rainfall_intensity?,
            soil_roughness: self.soil_roughness?,
            growth_stage: self.growth_stage?,
            water_status: self.water_status?,
            overall_health: self.overall_health?,
            visible_problems: self.visible_problems.clone(),
            fertilizer: self.fertilizer?,
            fertilizer_type: self.fertilizer_type?,
            herbicide: self.herbicide?,
            pesticide: self.pesticide?,
            stress_events: self.stress_events?,
        })
    }
}

/// Every answer of a finished survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedAnswers {
    pub farm_number: u8,
    pub rainfall: YesNo,
    pub rainfall_intensity: Answer<RainfallIntensity>,
    pub soil_roughness: SoilRoughness,
    pub growth_stage: GrowthStage,
    pub water_status: WaterStatus,
    pub overall_health: OverallHealth,
    pub visible_problems: Vec<Problem>,
    pub fertilizer: Applied,
    pub fertilizer_type: Answer<FertilizerType>,
    pub herbicide: Applied,
    pub pesticide: Applied,
    pub stress_events: StressEvent,
}

/// A finished survey, ready to be logged.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub completed_at: NaiveDateTime,
    pub survey_date: NaiveDate,
    pub user_id: UserId,
    /// Username, else first name; empty when the user has neither.
    pub username: String,
    pub location: GeoPoint,
    pub region: String,
    pub answers: CompletedAnswers,
}

/// State of one conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub conversation: ConversationId,
    pub state: SurveyState,
    pub language: Language,
    pub answers: SurveyAnswers,
    pub location: Option<GeoPoint>,
    pub region: Option<String>,
    pub survey_date: Option<NaiveDate>,
    /// `{region}/{code}-{user}-{farm:02}/{YYYYMMDD}` once farm and location are known.
    pub destination_path: Option<String>,
    pub photo_count: u32,
    pub survey_owner: Option<UserId>,
    /// Display name used in the destination path and photo file names.
    pub surveyor: Option<String>,
}

impl Session {
    pub fn new(conversation: ConversationId) -> Self {
        Self {
            conversation,
            state: SurveyState::Idle,
            language: Language::default(),
            answers: SurveyAnswers::default(),
            location: None,
            region: None,
            survey_date: None,
            destination_path: None,
            photo_count: 0,
            survey_owner: None,
            surveyor: None,
        }
    }

    /// Forgets everything except the conversation id.
    pub fn reset(&mut self) {
        *self = Self::new(self.conversation);
    }

    /// Whether the next location event should carry a resolved region.
    pub fn awaiting_location(&self) -> bool {
        self.state == SurveyState::Location
    }
}

/// Username for the survey log: username, else first name, else empty.
pub fn log_username(user: &UserRef) -> String {
    user.username
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(user.first_name.as_deref())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_observed_after_others_is_sole_selection() {
        let mut answers = SurveyAnswers::default();
        answers.toggle_problem(Problem::Yellowing);
        answers.toggle_problem(Problem::Wilting);
        answers.toggle_problem(Problem::NoneObserved);
        assert_eq!(answers.visible_problems, vec![Problem::NoneObserved]);
    }

    #[test]
    fn other_problem_clears_none_observed() {
        let mut answers = SurveyAnswers::default();
        answers.toggle_problem(Problem::NoneObserved);
        answers.toggle_problem(Problem::Lodging);
        assert_eq!(answers.visible_problems, vec![Problem::Lodging]);
    }

    #[test]
    fn double_toggle_restores_selection() {
        let mut answers = SurveyAnswers::default();
        answers.toggle_problem(Problem::Yellowing);
        let before = answers.visible_problems.clone();
        answers.toggle_problem(Problem::PestDamage);
        answers.toggle_problem(Problem::PestDamage);
        assert_eq!(answers.visible_problems, before);
    }

    #[test]
    fn selection_keeps_insertion_order() {
        let mut answers = SurveyAnswers::default();
        for p in [Problem::Wilting, Problem::Yellowing, Problem::BrownSpots] {
            answers.toggle_problem(p);
        }
        assert_eq!(
            answers.visible_problems,
            vec![Problem::Wilting, Problem::Yellowing, Problem::BrownSpots]
        );
    }

    #[test]
    fn incomplete_answers_do_not_complete() {
        let answers = SurveyAnswers {
            farm_number: Some(3),
            ..Default::default()
        };
        assert!(answers.complete().is_none());
    }

    #[test]
    fn reset_keeps_conversation() {
        let mut session = Session::new(ConversationId(7));
        session.state = SurveyState::Rainfall;
        session.photo_count = 4;
        session.reset();
        assert_eq!(session.conversation, ConversationId(7));
        assert_eq!(session.state, SurveyState::Idle);
        assert_eq!(session.photo_count, 0);
    }

    #[test]
    fn log_username_prefers_username_then_first_name() {
        let mut user = UserRef {
            id: UserId(1),
            username: None,
            first_name: Some("Sok Ha".into()),
        };
        assert_eq!(log_username(&user), "Sok Ha");
        user.username = Some("sokha".into());
        assert_eq!(log_username(&user), "sokha");
        user.username = None;
        user.first_name = None;
        assert_eq!(log_username(&user), "");
    }
}
