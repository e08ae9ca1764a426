// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closed option sets for every survey question, and the decoding of
//! button callback data (`"{category}_{option}"`) into them.

use std::fmt;
use std::str::FromStr;

use paddy_core::Language;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

/// Recorded in place of an answer to a question that was skipped.
pub const NOT_APPLICABLE: &str = "N/A";

/// A closed set of answers to one question.
///
/// The wire code doubles as the translation key of the button label.
pub trait OptionValue:
    Copy + Eq + IntoEnumIterator + Into<&'static str> + FromStr + fmt::Debug
{
    fn code(self) -> &'static str {
        self.into()
    }
}

macro_rules! option_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
        )]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl OptionValue for $name {}
    };
}

option_set!(
    /// Answer to the rainfall question.
    YesNo { Yes, No }
);
option_set!(RainfallIntensity { Heavy, Moderate, Low });
option_set!(SoilRoughness { Smooth, Medium, Rough });
option_set!(GrowthStage {
    LandPrep,
    Transplanted,
    Tillering,
    Flowering,
    Ripening,
    Harvest,
    Fallow,
});
option_set!(WaterStatus { Flooded, MostlyWet, FrequentlyDry, Drought });
option_set!(OverallHealth { Excellent, Good, Fair, Poor });
option_set!(
    /// Problems visible in the field. Multi-select.
    Problem {
        NoneObserved,
        Yellowing,
        BrownSpots,
        Wilting,
        Lodging,
        PestDamage,
        WeedInfestation,
        UnevenGrowth,
        OtherProblem,
    }
);
option_set!(
    /// Whether fertilizer, herbicide or pesticide was applied.
    Applied { Yes, No, DontRemember }
);
option_set!(FertilizerType { Urea, Npk, Organic, Other });
option_set!(StressEvent { Flood, DroughtEvent, None, OtherStress });

impl GrowthStage {
    /// Number badge shown in front of the button label.
    pub fn badge(self) -> &'static str {
        match self {
            Self::LandPrep => "1️⃣",
            Self::Transplanted => "2️⃣",
            Self::Tillering => "3️⃣",
            Self::Flowering => "4️⃣",
            Self::Ripening => "5️⃣",
            Self::Harvest => "6️⃣",
            Self::Fallow => "7️⃣",
        }
    }
}

/// Callback category prefixes.
pub mod category {
    pub const LANGUAGE: &str = "lang";
    pub const FARM: &str = "farm";
    pub const RAINFALL: &str = "rainfall";
    pub const INTENSITY: &str = "intensity";
    pub const SOIL: &str = "soil";
    pub const GROWTH: &str = "growth";
    pub const WATER: &str = "water";
    pub const HEALTH: &str = "health";
    pub const PROBLEM: &str = "problem";
    pub const FERTILIZER: &str = "fertilizer";
    pub const FERTILIZER_TYPE: &str = "fert_type";
    pub const HERBICIDE: &str = "herbicide";
    pub const PESTICIDE: &str = "pesticide";
    pub const STRESS: &str = "stress";

    pub(crate) const ALL: &[&str] = &[
        LANGUAGE,
        FARM,
        RAINFALL,
        INTENSITY,
        SOIL,
        GROWTH,
        WATER,
        HEALTH,
        PROBLEM,
        FERTILIZER,
        FERTILIZER_TYPE,
        HERBICIDE,
        PESTICIDE,
        STRESS,
    ];
}

/// Option code that finishes the visible-problems multi-select.
pub const PROBLEM_DONE: &str = "done";

/// Callback data that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown callback category in `{0}`")]
    UnknownCategory(String),

    #[error("unknown option `{option}` for category `{category}`")]
    UnknownOption {
        category: &'static str,
        option: String,
    },
}

/// A decoded button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Language(Language),
    Farm(u8),
    Rainfall(YesNo),
    Intensity(RainfallIntensity),
    Soil(SoilRoughness),
    Growth(GrowthStage),
    Water(WaterStatus),
    Health(OverallHealth),
    Problem(Problem),
    ProblemDone,
    Fertilizer(Applied),
    FertilizerType(FertilizerType),
    Herbicide(Applied),
    Pesticide(Applied),
    Stress(StressEvent),
}

impl Callback {
    /// Decodes raw callback data.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        let (category, option) = split_category(data)?;
        let unknown = || DecodeError::UnknownOption {
            category,
            option: option.to_string(),
        };

        let decoded = match category {
            category::LANGUAGE => Self::Language(option.parse().map_err(|_| unknown())?),
            category::FARM => {
                // Canonical decimal only, so "03" or "+3" are stale.
                let n: u8 = option.parse().map_err(|_| unknown())?;
                if n.to_string() != option {
                    return Err(unknown());
                }
                Self::Farm(n)
            }
            category::RAINFALL => Self::Rainfall(parse(option).ok_or_else(unknown)?),
            category::INTENSITY => Self::Intensity(parse(option).ok_or_else(unknown)?),
            category::SOIL => Self::Soil(parse(option).ok_or_else(unknown)?),
            category::GROWTH => Self::Growth(parse(option).ok_or_else(unknown)?),
            category::WATER => Self::Water(parse(option).ok_or_else(unknown)?),
            category::HEALTH => Self::Health(parse(option).ok_or_else(unknown)?),
            category::PROBLEM if option == PROBLEM_DONE => Self::ProblemDone,
            category::PROBLEM => Self::Problem(parse(option).ok_or_else(unknown)?),
            category::FERTILIZER => Self::Fertilizer(parse(option).ok_or_else(unknown)?),
            category::FERTILIZER_TYPE => Self::FertilizerType(parse(option).ok_or_else(unknown)?),
            category::HERBICIDE => Self::Herbicide(parse(option).ok_or_else(unknown)?),
            category::PESTICIDE => Self::Pesticide(parse(option).ok_or_else(unknown)?),
            category::STRESS => Self::Stress(parse(option).ok_or_else(unknown)?),
            _ => return Err(DecodeError::UnknownCategory(data.to_string())),
        };
        Ok(decoded)
    }

    /// Encodes back to callback data.
    pub fn encode(self) -> String {
        let (category, option): (&str, String) = match self {
            Self::Language(lang) => (category::LANGUAGE, lang.code().to_string()),
            Self::Farm(n) => (category::FARM, n.to_string()),
            Self::Rainfall(v) => (category::RAINFALL, v.code().to_string()),
            Self::Intensity(v) => (category::INTENSITY, v.code().to_string()),
            Self::Soil(v) => (category::SOIL, v.code().to_string()),
            Self::Growth(v) => (category::GROWTH, v.code().to_string()),
            Self::Water(v) => (category::WATER, v.code().to_string()),
            Self::Health(v) => (category::HEALTH, v.code().to_string()),
            Self::Problem(v) => (category::PROBLEM, v.code().to_string()),
            Self::ProblemDone => (category::PROBLEM, PROBLEM_DONE.to_string()),
            Self::Fertilizer(v) => (category::FERTILIZER, v.code().to_string()),
            Self::FertilizerType(v) => (category::FERTILIZER_TYPE, v.code().to_string()),
            Self::Herbicide(v) => (category::HERBICIDE, v.code().to_string()),
            Self::Pesticide(v) => (category::PESTICIDE, v.code().to_string()),
            Self::Stress(v) => (category::STRESS, v.code().to_string()),
        };
        format!("{category}_{option}")
    }
}

/// Callback data for `value` under `category`.
pub fn callback_data<T: OptionValue>(category: &str, value: T) -> String {
    format!("{category}_{}", value.code())
}

fn parse<T: OptionValue>(option: &str) -> Option<T> {
    option.parse().ok()
}

fn split_category(data: &str) -> Result<(&'static str, &str), DecodeError> {
    category::ALL
        .iter()
        .find_map(|cat| {
            data.strip_prefix(cat)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|option| (*cat, option))
        })
        .ok_or_else(|| DecodeError::UnknownCategory(data.to_string()))
}

/// An answer that may have been skipped by a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer<T> {
    Given(T),
    NotApplicable,
}

impl<T: OptionValue> Answer<T> {
    /// The option code, or `"N/A"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Given(v) => v.code(),
            Self::NotApplicable => NOT_APPLICABLE,
        }
    }
}
