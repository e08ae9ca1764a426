// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display text lookup for the survey bot.
//!
//! Message tables are TOML files compiled into the binary and parsed once
//! into [`Translations`]. Lookups fall back from Khmer to English, and a key
//! missing from both tables is returned verbatim so a typo shows up in the
//! chat instead of crashing a handler.

use std::collections::HashMap;

use paddy_core::{Language, PaddyError};
use tracing::warn;

const EN_TABLE: &str = include_str!("../locales/en.toml");
const KM_TABLE: &str = include_str!("../locales/km.toml");

/// Parsed message tables for every supported language.
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<Language, HashMap<String, String>>,
}

impl Translations {
    /// Loads the tables embedded in the binary.
    pub fn embedded() -> Result<Self, PaddyError> {
        Self::from_sources(EN_TABLE, KM_TABLE)
    }

    /// Parses English and Khmer tables from TOML text.
    pub fn from_sources(en: &str, km: &str) -> Result<Self, PaddyError> {
        let mut tables = HashMap::new();
        tables.insert(Language::English, parse_table("en", en)?);
        tables.insert(Language::Khmer, parse_table("km", km)?);
        Ok(Self { tables })
    }

    /// Returns the text for `key`, falling back to English and then to the key.
    pub fn get<'a>(&'a self, lang: Language, key: &'a str) -> &'a str {
        if let Some(text) = self.lookup(lang, key) {
            return text;
        }
        if lang != Language::English
            && let Some(text) = self.lookup(Language::English, key)
        {
            return text;
        }
        warn!(key, lang = %lang, "missing translation");
        key
    }

    /// Like [`get`](Self::get), then substitutes `{name}` placeholders.
    pub fn format(&self, lang: Language, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.get(lang, key).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    /// Whether `text` contains the text of `key` in any supported language.
    pub fn matches_any_language(&self, key: &str, text: &str) -> bool {
        self.tables
            .values()
            .filter_map(|table| table.get(key))
            .any(|phrase| !phrase.is_empty() && text.contains(phrase.as_str()))
    }

    fn lookup(&self, lang: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&lang)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

fn parse_table(code: &str, source: &str) -> Result<HashMap<String, String>, PaddyError> {
    toml::from_str(source)
        .map_err(|e| PaddyError::Config(format!("invalid {code} translation table: {e}")))
}
