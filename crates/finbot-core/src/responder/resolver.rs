use regex::Regex;
use std::sync::{Arc, OnceLock};

use super::choice::{ChoiceSource, ThreadRngChoice};
use super::table::{GlossaryEntry, KeywordEntry, ResponseTableSet, ScenarioEntry};

/// Phrases that turn a glossary term mention into a definition request.
pub const EXPLAIN_TRIGGERS: &[&str] = &["what is", "explain", "define", "mean"];

static GREETING_PATTERN: OnceLock<Regex> = OnceLock::new();
static AMOUNT_PATTERN: OnceLock<Regex> = OnceLock::new();
static PURCHASE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn greeting_pattern() -> &'static Regex {
    GREETING_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(hi|hello|hey|greetings)").expect("static regex is valid")
    })
}

fn amount_pattern() -> &'static Regex {
    AMOUNT_PATTERN
        .get_or_init(|| Regex::new(r"(?i)how (much|many|often|long)").expect("static regex is valid"))
}

fn purchase_pattern() -> &'static Regex {
    PURCHASE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)should i (buy|get|purchase|spend)").expect("static regex is valid")
    })
}

/// Which tier of the resolver matched an input, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent<'a> {
    /// Explain phrase plus a glossary term.
    Definition(&'a GlossaryEntry),
    /// A personalized scenario key.
    Scenario(&'a ScenarioEntry),
    /// A general keyword; the reply is one of its candidates.
    Keyword(&'a KeywordEntry),
    /// Greeting word at the start of the input.
    Greeting,
    /// "how much / many / often / long" phrasing.
    Clarification,
    /// "should I buy / get / purchase / spend" phrasing.
    Decision,
    /// Nothing matched.
    Fallback,
}

impl Intent<'_> {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Definition(_) => "definition",
            Intent::Scenario(_) => "scenario",
            Intent::Keyword(_) => "keyword",
            Intent::Greeting => "greeting",
            Intent::Clarification => "clarification",
            Intent::Decision => "decision",
            Intent::Fallback => "fallback",
        }
    }
}

/// Maps one free-text utterance to exactly one reply.
///
/// Stateless across calls: the tables are shared read-only and the only
/// varying input is the [`ChoiceSource`] used for keyword replies.
#[derive(Debug, Clone)]
pub struct Resolver {
    tables: Arc<ResponseTableSet>,
    choice: Arc<dyn ChoiceSource>,
}

impl Resolver {
    pub fn new(tables: Arc<ResponseTableSet>, choice: Arc<dyn ChoiceSource>) -> Self {
        Self { tables, choice }
    }

    /// Resolver over the builtin tables with unseeded randomness.
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(ResponseTableSet::builtin()),
            Arc::new(ThreadRngChoice),
        )
    }

    pub fn tables(&self) -> &Arc<ResponseTableSet> {
        &self.tables
    }

    /// Determines which tier answers `text`.
    pub fn classify<'a>(&'a self, text: &str) -> Intent<'a> {
        let lower = text.to_lowercase();
        let tables = self.tables.as_ref();

        if EXPLAIN_TRIGGERS.iter().any(|t| lower.contains(t)) {
            if let Some(entry) = tables.glossary.find_in(&lower) {
                return Intent::Definition(entry);
            }
        }

        if let Some(entry) = tables.scenarios.find_in(&lower) {
            return Intent::Scenario(entry);
        }

        if let Some(entry) = tables.keywords.find_in(&lower) {
            return Intent::Keyword(entry);
        }

        if greeting_pattern().is_match(&lower) {
            return Intent::Greeting;
        }

        if amount_pattern().is_match(&lower) {
            return Intent::Clarification;
        }

        if purchase_pattern().is_match(&lower) {
            return Intent::Decision;
        }

        Intent::Fallback
    }

    /// Returns the reply for `text`. Never fails and never returns an empty string.
    pub fn resolve(&self, text: &str) -> String {
        let intent = self.classify(text);
        tracing::debug!(intent = intent.label(), "resolved input");

        let replies = &self.tables.replies;
        match intent {
            Intent::Definition(entry) => entry.render(),
            Intent::Scenario(entry) => entry.advice.clone(),
            Intent::Keyword(entry) => {
                let index = self.choice.choose(entry.candidates.len());
                match entry.candidates.get(index) {
                    Some(reply) => reply.clone(),
                    None => replies.fallback.clone(),
                }
            }
            Intent::Greeting => replies.greeting.clone(),
            Intent::Clarification => replies.clarification.clone(),
            Intent::Decision => replies.decision.clone(),
            Intent::Fallback => replies.fallback.clone(),
        }
    }
}
