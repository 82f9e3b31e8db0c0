//! Autocomplete for date phrases typed after a trigger (`@next fri`).

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix marking a suggestion that inserts a time rather than a date.
pub const TIME_PREFIX: &str = "time:";

const TIME_OFFSETS: [&str; 5] = ["now", "+15 minutes", "+1 hour", "-15 minutes", "-1 hour"];

const RELATIVE_UNITS: [&str; 10] = [
    "week",
    "month",
    "year",
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
}

impl Suggestion {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// The time phrase of a `time:` suggestion.
    #[must_use]
    pub fn time_phrase(&self) -> Option<&str> {
        self.label.strip_prefix(TIME_PREFIX)
    }
}

fn relative_reference() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(next|last|this)").unwrap())
}

fn relative_count() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^(?:in )?([+-]?\d+)").unwrap())
}

/// Suggestions for `query`, never empty.
///
/// When nothing matches, the query itself is offered so it can still be
/// accepted and parsed as typed.
#[must_use]
pub fn suggest(query: &str) -> Vec<Suggestion> {
    let suggestions = date_suggestions(query);
    if suggestions.is_empty() {
        return vec![Suggestion::new(query)];
    }
    suggestions
}

/// Suggestions matching `query`, possibly none.
///
/// Candidates are chosen by the shape of the query and kept only when they
/// start with it, ignoring case.
#[must_use]
pub fn date_suggestions(query: &str) -> Vec<Suggestion> {
    let candidates: Vec<String> = if query.starts_with("time") {
        TIME_OFFSETS
            .iter()
            .map(|offset| format!("{TIME_PREFIX}{offset}"))
            .collect()
    } else if let Some(caps) = relative_reference().captures(query) {
        let reference = &caps[1];
        RELATIVE_UNITS
            .iter()
            .map(|unit| format!("{reference} {unit}"))
            .collect()
    } else if let Some(caps) = relative_count().captures(query) {
        let delta = &caps[1];
        vec![
            format!("in {delta} minutes"),
            format!("in {delta} hours"),
            format!("in {delta} days"),
            format!("in {delta} weeks"),
            format!("in {delta} months"),
            format!("{delta} days ago"),
            format!("{delta} weeks ago"),
            format!("{delta} months ago"),
        ]
    } else {
        vec!["Today".into(), "Yesterday".into(), "Tomorrow".into()]
    };

    let prefix = query.to_lowercase();
    candidates
        .into_iter()
        .filter(|label| label.to_lowercase().starts_with(&prefix))
        .map(Suggestion::new)
        .collect()
}

/// An active trigger in a line of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMatch {
    /// Byte offset of the trigger phrase.
    pub start: usize,
    /// Byte offset of the cursor.
    pub end: usize,
    /// Text between the trigger phrase and the cursor.
    pub query: String,
}

/// Find the trigger phrase before `cursor` (a byte offset into `line`).
///
/// A trigger glued to a preceding letter, digit or backtick is ignored so
/// that e-mail addresses and inline code don't open suggestions.
#[must_use]
pub fn detect_trigger(line: &str, cursor: usize, trigger: &str) -> Option<TriggerMatch> {
    if trigger.is_empty() {
        return None;
    }
    let before = line.get(..cursor)?;
    let start = before.rfind(trigger)?;

    let glued = before[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c == '`' || c.is_ascii_alphanumeric());
    if glued {
        return None;
    }

    Some(TriggerMatch {
        start,
        end: cursor,
        query: before[start + trigger.len()..].to_string(),
    })
}

/// Rendered suggestion labels, kept for the lifetime of a suggest session.
#[derive(Debug, Default, Clone)]
pub struct SuggestionMemo {
    rendered: HashMap<String, String>,
}

impl SuggestionMemo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.rendered.get(label).map(String::as_str)
    }

    pub fn insert(&mut self, label: impl Into<String>, rendered: impl Into<String>) {
        self.rendered.insert(label.into(), rendered.into());
    }

    pub fn clear(&mut self) {
        self.rendered.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}
