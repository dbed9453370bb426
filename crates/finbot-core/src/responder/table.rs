//! Ordered response tables.
//!
//! Every table is a `Vec` of entry structs so that "first match wins" follows
//! declaration order. Keys are lowercase; an underscore inside a key also
//! matches a space in free text (`birthday_money` matches "birthday money").

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{FinbotError, Result};

/// Returns true if `text` (already lower-cased) mentions `key`.
pub(crate) fn key_matches(text: &str, key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    if text.contains(key) {
        return true;
    }
    key.contains('_') && text.contains(&key.replace('_', " "))
}

/// A glossary term and its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

impl GlossaryEntry {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }

    /// Term as shown to the user: underscores become spaces, upper-cased.
    pub fn display_term(&self) -> String {
        self.term.replace('_', " ").to_uppercase()
    }

    /// The definition reply, `"<TERM>: <definition>"`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.display_term(), self.definition)
    }
}

/// A personalized scenario with one fixed piece of advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub scenario: String,
    pub advice: String,
}

impl ScenarioEntry {
    pub fn new(scenario: impl Into<String>, advice: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            advice: advice.into(),
        }
    }
}

/// A general keyword with its candidate replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub candidates: Vec<String>,
}

impl KeywordEntry {
    pub fn new<I, S>(keyword: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keyword: keyword.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

/// Glossary lookups, matched only together with an explain-intent phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlossaryTable(pub Vec<GlossaryEntry>);

impl GlossaryTable {
    /// First entry, in declaration order, whose term appears in `text`.
    pub fn find_in(&self, text: &str) -> Option<&GlossaryEntry> {
        self.0.iter().find(|e| key_matches(text, &e.term))
    }

    /// Dictionary search: every entry whose term contains `query`.
    ///
    /// An empty (or whitespace-only) query returns the whole table.
    pub fn search(&self, query: &str) -> Vec<&GlossaryEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.0.iter().collect();
        }
        let spaced = query.replace(' ', "_");
        self.0
            .iter()
            .filter(|e| e.term.contains(&query) || e.term.contains(&spaced))
            .collect()
    }

    pub fn get(&self, term: &str) -> Option<&GlossaryEntry> {
        self.0.iter().find(|e| e.term == term)
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.0
    }
}

/// Scenario lookups, matched by substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioTable(pub Vec<ScenarioEntry>);

impl ScenarioTable {
    pub fn find_in(&self, text: &str) -> Option<&ScenarioEntry> {
        self.0.iter().find(|e| key_matches(text, &e.scenario))
    }

    pub fn entries(&self) -> &[ScenarioEntry] {
        &self.0
    }
}

/// General keyword lookups, matched by substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable(pub Vec<KeywordEntry>);

impl KeywordTable {
    pub fn find_in(&self, text: &str) -> Option<&KeywordEntry> {
        self.0.iter().find(|e| key_matches(text, &e.keyword))
    }

    pub fn get(&self, keyword: &str) -> Option<&KeywordEntry> {
        self.0.iter().find(|e| e.keyword == keyword)
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.0
    }
}

/// Fixed replies for the non-table tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedReplies {
    pub greeting: String,
    pub clarification: String,
    pub decision: String,
    pub fallback: String,
}

/// Every table the resolver consults, built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTableSet {
    #[serde(default)]
    pub glossary: GlossaryTable,
    #[serde(default)]
    pub scenarios: ScenarioTable,
    #[serde(default)]
    pub keywords: KeywordTable,
    #[serde(default = "super::builtin::builtin_replies")]
    pub replies: FixedReplies,
}

impl ResponseTableSet {
    /// The FinBot tables shipped with the application.
    pub fn builtin() -> Self {
        super::builtin::builtin_tables().clone()
    }

    /// Parses a table set from TOML and validates it.
    ///
    /// Missing `replies` fall back to the builtin strings; missing tables are empty.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let tables: Self = toml::from_str(content)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Checks the structural rules every table must satisfy.
    ///
    /// Keys must be non-empty, trimmed and lowercase, keys must be unique within
    /// a table, and every reply (including each keyword candidate) non-empty.
    pub fn validate(&self) -> Result<()> {
        check_keys("glossary", self.glossary.0.iter().map(|e| e.term.as_str()))?;
        check_keys("scenarios", self.scenarios.0.iter().map(|e| e.scenario.as_str()))?;
        check_keys("keywords", self.keywords.0.iter().map(|e| e.keyword.as_str()))?;

        if let Some(e) = self.glossary.0.iter().find(|e| e.definition.trim().is_empty()) {
            return Err(FinbotError::validation(format!(
                "glossary term '{}' has an empty definition",
                e.term
            )));
        }
        if let Some(e) = self.scenarios.0.iter().find(|e| e.advice.trim().is_empty()) {
            return Err(FinbotError::validation(format!(
                "scenario '{}' has empty advice",
                e.scenario
            )));
        }
        for entry in &self.keywords.0 {
            if entry.candidates.is_empty() {
                return Err(FinbotError::validation(format!(
                    "keyword '{}' has no candidate replies",
                    entry.keyword
                )));
            }
            if entry.candidates.iter().any(|c| c.trim().is_empty()) {
                return Err(FinbotError::validation(format!(
                    "keyword '{}' has an empty candidate reply",
                    entry.keyword
                )));
            }
        }

        let replies = [
            ("greeting", &self.replies.greeting),
            ("clarification", &self.replies.clarification),
            ("decision", &self.replies.decision),
            ("fallback", &self.replies.fallback),
        ];
        if let Some((name, _)) = replies.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(FinbotError::validation(format!("{} reply is empty", name)));
        }

        Ok(())
    }
}

fn check_keys<'a>(table: &str, keys: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if key.is_empty() || key.trim() != key {
            return Err(FinbotError::validation(format!(
                "{}: key '{}' is empty or padded with whitespace",
                table, key
            )));
        }
        if key.to_lowercase() != key {
            return Err(FinbotError::validation(format!(
                "{}: key '{}' must be lowercase",
                table, key
            )));
        }
        if !seen.insert(key) {
            return Err(FinbotError::validation(format!(
                "{}: duplicate key '{}'",
                table, key
            )));
        }
    }
    Ok(())
}
