// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The survey state machine.
//!
//! [`SurveyMachine`] is pure: it mutates a [`Session`] in response to one
//! [`InboundEvent`] and returns a [`Transition`] describing what to send and
//! which side effects to run. It never performs I/O, so the dispatcher owns
//! delivery, region lookup and background jobs.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;
use paddy_core::types::{
    Command, ConversationId, EventKind, InboundEvent, Keyboard, MessageId, OutboundContent,
    OutboundMessage, PhotoHandle, RestartAt, UserId, UserRef,
};
use paddy_core::Language;
use paddy_geo::UNKNOWN_REGION;
use paddy_i18n::Translations;
use tracing::{debug, info, warn};

use crate::naming::{destination_path, photo_file_name};
use crate::options::{Answer, Applied, Callback, YesNo};
use crate::prompts::Prompts;
use crate::session::{GeoPoint, Session, SurveyRecord, SurveyState, log_username};

/// Translation key of the restart button text.
pub const RESTART_PHRASE_KEY: &str = "add_new_farm";

/// Tunables of the survey flow.
#[derive(Debug, Clone)]
pub struct SurveySettings {
    pub restart_at: RestartAt,
    pub growth_stage_image: PathBuf,
    pub farm_number_max: u8,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            restart_at: RestartAt::default(),
            growth_stage_image: PathBuf::from("survey_images/rice_growth_stage.jpg"),
            farm_number_max: 20,
        }
    }
}

/// Facts about the outside world an event is handled against.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// Local wall-clock time.
    pub now: NaiveDateTime,
    /// Region containing the shared location, for location events.
    pub region: Option<String>,
}

impl EventContext {
    pub fn now() -> Self {
        Self::at(chrono::Local::now().naive_local())
    }

    pub fn at(now: NaiveDateTime) -> Self {
        Self { now, region: None }
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }
}

/// Why an event did not advance the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Undecodable callback data, or a button from an earlier question.
    Stale,
    /// A farm number beyond the configured maximum.
    OutOfRange,
    /// The event kind does not fit the current question.
    WrongInput,
    /// A photo from someone other than the survey owner.
    NotOwner,
    /// A photo before any survey was completed.
    NoSurvey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Advanced,
    Stayed,
    /// The last question was answered.
    Completed,
    Rejected(RejectReason),
    /// The conversation was cancelled; the session should be dropped.
    Ended,
}

/// A photo accepted for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub conversation: ConversationId,
    pub user_id: UserId,
    pub language: Language,
    pub photo: PhotoHandle,
    pub file_name: String,
    pub folder_path: String,
    pub sequence: u32,
}

/// Work to run outside the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append the survey to the log and sync the log remotely.
    PersistSurvey(SurveyRecord),
    /// Queue a photo for upload.
    EnqueueUpload(PhotoUpload),
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub prompts: Vec<OutboundMessage>,
    pub effects: Vec<Effect>,
    pub outcome: Outcome,
}

impl Transition {
    fn new(outcome: Outcome, prompts: Vec<OutboundMessage>) -> Self {
        Self {
            prompts,
            effects: Vec::new(),
            outcome,
        }
    }

    fn advanced(prompts: Vec<OutboundMessage>) -> Self {
        Self::new(Outcome::Advanced, prompts)
    }

    fn rejected(reason: RejectReason, prompts: Vec<OutboundMessage>) -> Self {
        Self::new(Outcome::Rejected(reason), prompts)
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Drives sessions through the survey.
pub struct SurveyMachine {
    translations: Arc<Translations>,
    settings: SurveySettings,
}

impl SurveyMachine {
    pub fn new(translations: Arc<Translations>, settings: SurveySettings) -> Self {
        Self {
            translations,
            settings,
        }
    }

    pub fn settings(&self) -> &SurveySettings {
        &self.settings
    }

    fn prompts(&self, lang: Language) -> Prompts<'_> {
        Prompts::new(&self.translations, lang)
    }

    /// Clears the session and asks for the language.
    pub fn start(&self, session: &mut Session) -> Transition {
        session.reset();
        session.state = SurveyState::Language;
        let welcome = self.prompts(Language::English).text("welcome");
        Transition::advanced(vec![
            OutboundMessage::text(session.conversation, welcome)
                .with_keyboard(Prompts::language_keyboard()),
        ])
    }

    /// Handles one inbound event.
    pub fn handle(&self, session: &mut Session, event: &InboundEvent, ctx: &EventContext) -> Transition {
        let transition = match &event.kind {
            EventKind::Command(Command::Start) => self.start(session),
            EventKind::Command(Command::Cancel) => self.cancel(session),
            EventKind::Command(Command::Help) => self.help(session),
            EventKind::Text(text) => self.on_text(session, &event.user, text, ctx),
            EventKind::Location {
                latitude,
                longitude,
            } => self.on_location(
                session,
                &event.user,
                GeoPoint {
                    latitude: *latitude,
                    longitude: *longitude,
                },
                ctx,
            ),
            EventKind::Photo(photo) => self.accept_photo(session, &event.user, photo),
            EventKind::Callback {
                data, message_id, ..
            } => match Callback::decode(data) {
                Ok(callback) => self.on_callback(session, &event.user, callback, *message_id, ctx),
                Err(e) => {
                    debug!(conversation = %session.conversation, error = %e, "undecodable callback");
                    Transition::rejected(RejectReason::Stale, Vec::new())
                }
            },
        };
        debug!(
            conversation = %session.conversation,
            state = %session.state,
            outcome = ?transition.outcome,
            "event handled"
        );
        transition
    }

    fn cancel(&self, session: &mut Session) -> Transition {
        let text = self.prompts(session.language).text("cancel_msg");
        info!(conversation = %session.conversation, state = %session.state, "survey cancelled");
        session.reset();
        Transition::new(
            Outcome::Ended,
            vec![OutboundMessage::text(session.conversation, text).with_keyboard(Keyboard::Remove)],
        )
    }

    fn help(&self, session: &Session) -> Transition {
        let text = self.prompts(session.language).help_text();
        Transition::new(
            Outcome::Stayed,
            vec![OutboundMessage::text(session.conversation, text)],
        )
    }

    fn on_text(
        &self,
        session: &mut Session,
        user: &UserRef,
        text: &str,
        ctx: &EventContext,
    ) -> Transition {
        if self.translations.matches_any_language(RESTART_PHRASE_KEY, text)
            && session.state != SurveyState::Language
        {
            return self.restart(session, user, ctx);
        }
        match session.state {
            SurveyState::Location => {
                let hint = self.prompts(session.language).text("use_button");
                Transition::rejected(
                    RejectReason::WrongInput,
                    vec![OutboundMessage::text(session.conversation, hint)],
                )
            }
            SurveyState::Idle | SurveyState::Complete => Transition::new(Outcome::Stayed, Vec::new()),
            _ => Transition::rejected(RejectReason::WrongInput, Vec::new()),
        }
    }

    /// Starts another survey from the "add new farm" button.
    fn restart(&self, session: &mut Session, user: &UserRef, ctx: &EventContext) -> Transition {
        let keep_location = self.settings.restart_at == RestartAt::FarmNumber
            && session.location.is_some()
            && session.state != SurveyState::Idle;
        if !keep_location {
            info!(conversation = %session.conversation, "restarting survey from language choice");
            let language = (session.state != SurveyState::Idle).then_some(session.language);
            let transition = self.start(session);
            if let Some(language) = language {
                session.language = language;
            }
            return transition;
        }

        info!(conversation = %session.conversation, "restarting survey at farm number");
        session.answers = Default::default();
        session.destination_path = None;
        session.photo_count = 0;
        session.survey_date = Some(ctx.now.date());
        session.survey_owner = Some(user.id);
        session.state = SurveyState::FarmNumber;

        let p = self.prompts(session.language);
        Transition::advanced(vec![
            OutboundMessage::text(session.conversation, p.text("new_farm_started"))
                .with_keyboard(Keyboard::Remove),
            OutboundMessage::text(session.conversation, p.text("select_farm"))
                .with_keyboard(Prompts::farm_keyboard(self.settings.farm_number_max)),
        ])
    }

    fn on_location(
        &self,
        session: &mut Session,
        user: &UserRef,
        point: GeoPoint,
        ctx: &EventContext,
    ) -> Transition {
        if session.state != SurveyState::Location {
            return Transition::rejected(RejectReason::WrongInput, Vec::new());
        }

        let region = ctx
            .region
            .clone()
            .unwrap_or_else(|| UNKNOWN_REGION.to_string());
        info!(
            conversation = %session.conversation,
            region = %region,
            latitude = point.latitude,
            longitude = point.longitude,
            "location received"
        );
        session.location = Some(point);
        session.region = Some(region);
        session.survey_date = Some(ctx.now.date());
        session.survey_owner = Some(user.id);
        session.state = SurveyState::FarmNumber;

        let p = self.prompts(session.language);
        Transition::advanced(vec![
            OutboundMessage::text(session.conversation, p.text("farm_number_prompt"))
                .with_keyboard(Keyboard::Remove),
            OutboundMessage::text(session.conversation, p.text("select_farm"))
                .with_keyboard(Prompts::farm_keyboard(self.settings.farm_number_max)),
        ])
    }

    fn on_callback(
        &self,
        session: &mut Session,
        user: &UserRef,
        callback: Callback,
        message_id: Option<MessageId>,
        ctx: &EventContext,
    ) -> Transition {
        let conv = session.conversation;
        let reply = |session: &Session, key: &str, keyboard: Keyboard| {
            let text = self.prompts(session.language).text(key);
            edit_or_send(conv, message_id, text, Some(keyboard))
        };

        match (session.state, callback) {
            (SurveyState::Language, Callback::Language(lang)) => {
                session.language = lang;
                session.state = SurveyState::Location;
                let p = self.prompts(lang);
                Transition::advanced(vec![
                    edit_or_send(conv, message_id, p.text("language_selected"), None),
                    OutboundMessage::text(conv, p.text("share_location"))
                        .with_keyboard(p.location_keyboard()),
                ])
            }

            (SurveyState::FarmNumber, Callback::Farm(n)) => {
                if n == 0 || n > self.settings.farm_number_max {
                    return Transition::rejected(RejectReason::OutOfRange, Vec::new());
                }
                session.answers.farm_number = Some(n);
                session.surveyor = Some(user.display_name());
                session.destination_path = self.destination_for(session, ctx);
                session.state = SurveyState::Rainfall;

                let p = self.prompts(session.language);
                let farm = n.to_string();
                let text = format!(
                    "{}\n{}",
                    p.format("farm_selected", &[("farm_number", farm.as_str())]),
                    p.text("rainfall_question")
                );
                Transition::advanced(vec![edit_or_send(
                    conv,
                    message_id,
                    text,
                    Some(p.rainfall_keyboard()),
                )])
            }

            (SurveyState::Rainfall, Callback::Rainfall(answer)) => {
                session.answers.rainfall = Some(answer);
                let p = self.prompts(session.language);
                if answer == YesNo::Yes {
                    session.state = SurveyState::RainfallIntensity;
                    Transition::advanced(vec![reply(session, "rainfall_intensity", p.intensity_keyboard())])
                } else {
                    session.answers.rainfall_intensity = Some(Answer::NotApplicable);
                    session.state = SurveyState::SoilRoughness;
                    Transition::advanced(vec![reply(session, "soil_roughness", p.soil_keyboard())])
                }
            }

            (SurveyState::RainfallIntensity, Callback::Intensity(intensity)) => {
                session.answers.rainfall_intensity = Some(Answer::Given(intensity));
                session.state = SurveyState::SoilRoughness;
                let keyboard = self.prompts(session.language).soil_keyboard();
                Transition::advanced(vec![reply(session, "soil_roughness", keyboard)])
            }

            (SurveyState::SoilRoughness, Callback::Soil(soil)) => {
                session.answers.soil_roughness = Some(soil);
                session.state = SurveyState::GrowthStage;
                let p = self.prompts(session.language);
                let mut prompts = delete_prompt(conv, message_id);
                prompts.push(
                    OutboundMessage {
                        conversation: conv,
                        content: OutboundContent::Photo {
                            path: self.settings.growth_stage_image.clone(),
                            caption: p.text("growth_stage"),
                        },
                        keyboard: None,
                    }
                    .with_keyboard(p.growth_keyboard()),
                );
                Transition::advanced(prompts)
            }

            (SurveyState::GrowthStage, Callback::Growth(stage)) => {
                session.answers.growth_stage = Some(stage);
                session.state = SurveyState::WaterStatus;
                let p = self.prompts(session.language);
                let mut prompts = delete_prompt(conv, message_id);
                prompts.push(
                    OutboundMessage::text(conv, p.text("water_status"))
                        .with_keyboard(p.water_keyboard()),
                );
                Transition::advanced(prompts)
            }

            (SurveyState::WaterStatus, Callback::Water(water)) => {
                session.answers.water_status = Some(water);
                session.state = SurveyState::OverallHealth;
                let keyboard = self.prompts(session.language).health_keyboard();
                Transition::advanced(vec![reply(session, "overall_health", keyboard)])
            }

            (SurveyState::OverallHealth, Callback::Health(health)) => {
                session.answers.overall_health = Some(health);
                session.answers.visible_problems.clear();
                session.state = SurveyState::VisibleProblems;
                let keyboard = self.prompts(session.language).problems_keyboard(&[]);
                Transition::advanced(vec![reply(session, "visible_problems", keyboard)])
            }

            (SurveyState::VisibleProblems, Callback::Problem(problem)) => {
                session.answers.toggle_problem(problem);
                let keyboard = self
                    .prompts(session.language)
                    .problems_keyboard(&session.answers.visible_problems);
                let prompt = match message_id {
                    Some(message_id) => OutboundMessage {
                        conversation: conv,
                        content: OutboundContent::EditKeyboard { message_id },
                        keyboard: Some(keyboard),
                    },
                    None => reply(session, "visible_problems", keyboard),
                };
                Transition::new(Outcome::Stayed, vec![prompt])
            }

            (SurveyState::VisibleProblems, Callback::ProblemDone) => {
                session.state = SurveyState::Fertilizer;
                let keyboard = self.prompts(session.language).fertilizer_keyboard();
                Transition::advanced(vec![reply(session, "fertilizer", keyboard)])
            }

            (SurveyState::Fertilizer, Callback::Fertilizer(applied)) => {
                session.answers.fertilizer = Some(applied);
                let p = self.prompts(session.language);
                if applied == Applied::Yes {
                    session.state = SurveyState::FertilizerType;
                    Transition::advanced(vec![reply(session, "fertilizer_type", p.fertilizer_type_keyboard())])
                } else {
                    session.answers.fertilizer_type = Some(Answer::NotApplicable);
                    session.state = SurveyState::Herbicide;
                    Transition::advanced(vec![reply(session, "herbicide", p.herbicide_keyboard())])
                }
            }

            (SurveyState::FertilizerType, Callback::FertilizerType(kind)) => {
                session.answers.fertilizer_type = Some(Answer::Given(kind));
                session.state = SurveyState::Herbicide;
                let keyboard = self.prompts(session.language).herbicide_keyboard();
                Transition::advanced(vec![reply(session, "herbicide", keyboard)])
            }

            (SurveyState::Herbicide, Callback::Herbicide(applied)) => {
                session.answers.herbicide = Some(applied);
                session.state = SurveyState::Pesticide;
                let keyboard = self.prompts(session.language).pesticide_keyboard();
                Transition::advanced(vec![reply(session, "pesticide", keyboard)])
            }

            (SurveyState::Pesticide, Callback::Pesticide(applied)) => {
                session.answers.pesticide = Some(applied);
                session.state = SurveyState::StressEvents;
                let keyboard = self.prompts(session.language).stress_keyboard();
                Transition::advanced(vec![reply(session, "stress_events", keyboard)])
            }

            (SurveyState::StressEvents, Callback::Stress(stress)) => {
                session.answers.stress_events = Some(stress);
                self.complete(session, user, message_id, ctx)
            }

            (state, callback) => {
                debug!(conversation = %conv, %state, ?callback, "callback does not match question");
                Transition::rejected(RejectReason::Stale, Vec::new())
            }
        }
    }

    fn complete(
        &self,
        session: &mut Session,
        user: &UserRef,
        message_id: Option<MessageId>,
        ctx: &EventContext,
    ) -> Transition {
        let Some(answers) = session.answers.complete() else {
            warn!(conversation = %session.conversation, "survey finished with missing answers");
            return Transition::rejected(RejectReason::Stale, Vec::new());
        };

        if session.destination_path.is_none() {
            session.destination_path = self.destination_for(session, ctx);
        }
        let region = session
            .region
            .clone()
            .unwrap_or_else(|| UNKNOWN_REGION.to_string());
        let record = SurveyRecord {
            completed_at: ctx.now,
            survey_date: session.survey_date.unwrap_or_else(|| ctx.now.date()),
            user_id: user.id,
            username: log_username(user),
            location: session.location.unwrap_or(GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
            }),
            region,
            answers,
        };
        info!(
            conversation = %session.conversation,
            user = %user.id,
            farm = record.answers.farm_number,
            region = %record.region,
            "survey completed"
        );

        session.photo_count = 0;
        session.survey_owner = Some(user.id);
        session.state = SurveyState::Complete;

        let text = self.prompts(session.language).text("photo_upload_instruction");
        Transition::new(
            Outcome::Completed,
            vec![edit_or_send(session.conversation, message_id, text, None)],
        )
        .with_effect(Effect::PersistSurvey(record))
    }

    fn destination_for(&self, session: &Session, ctx: &EventContext) -> Option<String> {
        let farm = session.answers.farm_number?;
        let surveyor = session.surveyor.as_deref()?;
        let region = session.region.as_deref().unwrap_or(UNKNOWN_REGION);
        let date = session.survey_date.unwrap_or_else(|| ctx.now.date());
        Some(destination_path(region, surveyor, farm, date))
    }

    /// Accepts a photo for the completed survey of this conversation.
    ///
    /// Photos from anyone but the survey owner are refused without touching
    /// the session. The first accepted photo also offers the restart button.
    pub fn accept_photo(&self, session: &mut Session, user: &UserRef, photo: &PhotoHandle) -> Transition {
        let conv = session.conversation;
        let p = self.prompts(session.language);

        if let Some(owner) = session.survey_owner
            && owner != user.id
        {
            warn!(conversation = %conv, user = %user.id, owner = %owner, "photo from non-owner");
            return Transition::rejected(
                RejectReason::NotOwner,
                vec![OutboundMessage::text(conv, p.text("photo_own_survey_only"))],
            );
        }

        let naming = (
            session.state,
            session.destination_path.clone(),
            session.answers.farm_number,
            session.surveyor.clone(),
            session.survey_date,
        );
        let (SurveyState::Complete, Some(folder_path), Some(farm), Some(surveyor), Some(date)) = naming
        else {
            return Transition::rejected(
                RejectReason::NoSurvey,
                vec![OutboundMessage::text(conv, p.text("complete_survey_first"))],
            );
        };

        session.photo_count += 1;
        let sequence = session.photo_count;
        let region = session.region.as_deref().unwrap_or(UNKNOWN_REGION);
        let file_name = photo_file_name(region, &surveyor, farm, date, sequence);
        info!(conversation = %conv, photo = sequence, file = %file_name, "photo accepted");

        let mut prompts = Vec::new();
        if sequence == 1 {
            prompts.push(
                OutboundMessage::text(conv, p.text("continue_or_new"))
                    .with_keyboard(p.new_farm_keyboard()),
            );
        }
        Transition::new(Outcome::Stayed, prompts).with_effect(Effect::EnqueueUpload(PhotoUpload {
            conversation: conv,
            user_id: user.id,
            language: session.language,
            photo: photo.clone(),
            file_name,
            folder_path,
            sequence,
        }))
    }
}

/// Replaces the pressed message when its id is known, else sends a new one.
fn edit_or_send(
    conversation: ConversationId,
    message_id: Option<MessageId>,
    text: String,
    keyboard: Option<Keyboard>,
) -> OutboundMessage {
    let content = match message_id {
        Some(message_id) => OutboundContent::EditText { message_id, text },
        None => OutboundContent::Text(text),
    };
    OutboundMessage {
        conversation,
        content,
        keyboard,
    }
}

fn delete_prompt(conversation: ConversationId, message_id: Option<MessageId>) -> Vec<OutboundMessage> {
    message_id
        .map(|message_id| OutboundMessage {
            conversation,
            content: OutboundContent::Delete { message_id },
            keyboard: None,
        })
        .into_iter()
        .collect()
}
