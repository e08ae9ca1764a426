// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyboards and message text for each question.

use paddy_core::types::{Button, Keyboard};
use paddy_core::Language;
use paddy_i18n::Translations;
use strum::IntoEnumIterator;

use crate::options::{
    Applied, FertilizerType, GrowthStage, OptionValue, OverallHealth, PROBLEM_DONE, Problem,
    RainfallIntensity, SoilRoughness, StressEvent, WaterStatus, YesNo, callback_data, category,
};

const FARM_BUTTONS_PER_ROW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// All buttons in one row.
    Row,
    /// One button per row.
    Column,
}

/// Builds keyboards and texts in a conversation's language.
pub struct Prompts<'a> {
    translations: &'a Translations,
    lang: Language,
}

impl<'a> Prompts<'a> {
    pub fn new(translations: &'a Translations, lang: Language) -> Self {
        Self { translations, lang }
    }

    pub fn text(&self, key: &str) -> String {
        self.translations.get(self.lang, key).to_string()
    }

    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.translations.format(self.lang, key, args)
    }

    fn options<T: OptionValue>(&self, category: &str, label_prefix: &str, layout: Layout) -> Keyboard {
        let buttons: Vec<Button> = T::iter()
            .map(|value| {
                let key = format!("{label_prefix}{}", value.code());
                Button::new(self.text(&key), callback_data(category, value))
            })
            .collect();
        inline(buttons, layout)
    }

    /// Language choice; labels are the same in every language.
    pub fn language_keyboard() -> Keyboard {
        Keyboard::Inline(vec![vec![
            Button::new("English 🇬🇧", "lang_en"),
            Button::new("ខ្មែរ 🇰🇭", "lang_km"),
        ]])
    }

    pub fn location_keyboard(&self) -> Keyboard {
        Keyboard::RequestLocation(self.text("share_location_btn"))
    }

    /// Farm numbers `1..=max`, four per row.
    pub fn farm_keyboard(max: u8) -> Keyboard {
        let numbers: Vec<u8> = (1..=max).collect();
        Keyboard::Inline(
            numbers
                .chunks(FARM_BUTTONS_PER_ROW)
                .map(|row| {
                    row.iter()
                        .map(|n| Button::new(n.to_string(), format!("{}_{n}", category::FARM)))
                        .collect()
                })
                .collect(),
        )
    }

    pub fn rainfall_keyboard(&self) -> Keyboard {
        self.options::<YesNo>(category::RAINFALL, "", Layout::Row)
    }

    pub fn intensity_keyboard(&self) -> Keyboard {
        self.options::<RainfallIntensity>(category::INTENSITY, "", Layout::Row)
    }

    pub fn soil_keyboard(&self) -> Keyboard {
        self.options::<SoilRoughness>(category::SOIL, "", Layout::Row)
    }

    pub fn growth_keyboard(&self) -> Keyboard {
        Keyboard::Inline(
            GrowthStage::iter()
                .map(|stage| {
                    vec![Button::new(
                        format!("{} {}", stage.badge(), self.text(stage.code())),
                        callback_data(category::GROWTH, stage),
                    )]
                })
                .collect(),
        )
    }

    pub fn water_keyboard(&self) -> Keyboard {
        self.options::<WaterStatus>(category::WATER, "", Layout::Column)
    }

    pub fn health_keyboard(&self) -> Keyboard {
        self.options::<OverallHealth>(category::HEALTH, "", Layout::Column)
    }

    /// Problem checklist reflecting `selected`, with a trailing done button.
    pub fn problems_keyboard(&self, selected: &[Problem]) -> Keyboard {
        let mut rows: Vec<Vec<Button>> = Problem::iter()
            .map(|problem| {
                let mark = if selected.contains(&problem) { "☑️" } else { "◻️" };
                vec![Button::new(
                    format!("{mark} {}", self.text(problem.code())),
                    callback_data(category::PROBLEM, problem),
                )]
            })
            .collect();
        rows.push(vec![Button::new(
            format!("✅ {}", self.text("done_selecting")),
            format!("{}_{PROBLEM_DONE}", category::PROBLEM),
        )]);
        Keyboard::Inline(rows)
    }

    pub fn fertilizer_keyboard(&self) -> Keyboard {
        self.options::<Applied>(category::FERTILIZER, "fertilizer_", Layout::Column)
    }

    pub fn fertilizer_type_keyboard(&self) -> Keyboard {
        self.options::<FertilizerType>(category::FERTILIZER_TYPE, "", Layout::Column)
    }

    pub fn herbicide_keyboard(&self) -> Keyboard {
        self.options::<Applied>(category::HERBICIDE, "herbicide_", Layout::Column)
    }

    pub fn pesticide_keyboard(&self) -> Keyboard {
        self.options::<Applied>(category::PESTICIDE, "pesticide_", Layout::Column)
    }

    pub fn stress_keyboard(&self) -> Keyboard {
        self.options::<StressEvent>(category::STRESS, "", Layout::Column)
    }

    /// Persistent reply keyboard with the "add new farm" button.
    pub fn new_farm_keyboard(&self) -> Keyboard {
        Keyboard::Reply(vec![vec![self.text("add_new_farm")]])
    }

    pub fn help_text(&self) -> String {
        let t = |key: &str| self.text(key);
        [
            t("help_title"),
            String::new(),
            t("help_commands"),
            format!("• {}", t("help_start")),
            format!("• {}", t("help_cancel")),
            format!("• {}", t("help_help")),
            String::new(),
            t("help_tips"),
            t("help_tip_1"),
            t("help_tip_2"),
            t("help_tip_3"),
        ]
        .join("\n")
    }
}

fn inline(buttons: Vec<Button>, layout: Layout) -> Keyboard {
    match layout {
        Layout::Row => Keyboard::Inline(vec![buttons]),
        Layout::Column => Keyboard::Inline(buttons.into_iter().map(|b| vec![b]).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(keyboard: Keyboard) -> Vec<Vec<Button>> {
        match keyboard {
            Keyboard::Inline(rows) => rows,
            other => panic!("expected inline keyboard, got {other:?}"),
        }
    }

    #[test]
    fn farm_keyboard_has_four_per_row() {
        let rows = rows(Prompts::farm_keyboard(20));
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert_eq!(rows[0][0].data, "farm_1");
        assert_eq!(rows[4][3].data, "farm_20");

        let short = super::tests::rows(Prompts::farm_keyboard(6));
        assert_eq!(short[1].len(), 2);
    }

    #[test]
    fn rainfall_is_one_row_of_yes_no() {
        let t = Translations::embedded().unwrap();
        let rows = rows(Prompts::new(&t, Language::English).rainfall_keyboard());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].label, "Yes");
        assert_eq!(rows[0][0].data, "rainfall_yes");
        assert_eq!(rows[0][1].data, "rainfall_no");
    }

    #[test]
    fn herbicide_labels_use_prefixed_keys() {
        let t = Translations::embedded().unwrap();
        let rows = rows(Prompts::new(&t, Language::English).herbicide_keyboard());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0].label, "Don't remember");
        assert_eq!(rows[2][0].data, "herbicide_dont_remember");
    }

    #[test]
    fn growth_labels_carry_badges() {
        let t = Translations::embedded().unwrap();
        let rows = rows(Prompts::new(&t, Language::English).growth_keyboard());
        assert_eq!(rows.len(), 7);
        assert!(rows[0][0].label.starts_with("1️⃣ "));
        assert_eq!(rows[6][0].data, "growth_fallow");
    }

    #[test]
    fn problem_checklist_marks_selection() {
        let t = Translations::embedded().unwrap();
        let rows = rows(Prompts::new(&t, Language::English).problems_keyboard(&[Problem::Yellowing]));
        assert_eq!(rows.len(), 10);
        assert!(rows[0][0].label.starts_with("◻️"));
        assert!(rows[1][0].label.starts_with("☑️"));
        assert_eq!(rows[9][0].data, "problem_done");
    }

    #[test]
    fn help_text_lists_commands_and_tips() {
        let t = Translations::embedded().unwrap();
        let help = Prompts::new(&t, Language::English).help_text();
        let lines: Vec<&str> = help.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "");
        assert!(lines[3].starts_with("• /start"));
        assert_eq!(lines[6], "");
    }
}
