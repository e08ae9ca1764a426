// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Farm survey conversation flow.
//!
//! A survey walks one conversation through language, location, farm number
//! and a fixed list of questions. Each question has a closed option set
//! ([`options`]); answers accumulate in a [`Session`]; [`SurveyMachine`]
//! turns inbound events into prompts and effects. After completion the
//! session accepts photos, which are filed under a region-first path
//! ([`naming`]).

pub mod machine;
pub mod naming;
pub mod options;
pub mod prompts;
pub mod session;

pub use machine::{
    Effect, EventContext, Outcome, PhotoUpload, RejectReason, SurveyMachine, SurveySettings,
    Transition,
};
pub use options::{Callback, DecodeError, NOT_APPLICABLE};
pub use session::{CompletedAnswers, GeoPoint, Session, SurveyAnswers, SurveyRecord, SurveyState};
