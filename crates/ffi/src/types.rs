//! FFI-safe types for UniFFI export.
//!
//! These mirror the core types in UniFFI-compatible form: dates cross the
//! boundary as ISO 8601 strings and options as plain fields.

use nldates_core::{DateAction, NldError, ParseMode, ParseResult, Suggestion, TriggerMatch};

/// ISO 8601 without offset, e.g. `2024-05-24T00:00:00`.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(uniffi::Record, Debug, Clone, PartialEq, Eq)]
pub struct FfiParseResult {
    pub formatted_string: String,
    /// `None` when the phrase could not be parsed.
    pub date: Option<String>,
}

impl From<ParseResult> for FfiParseResult {
    fn from(r: ParseResult) -> Self {
        Self {
            date: r.date.map(|d| d.format(DATE_FORMAT).to_string()),
            formatted_string: r.formatted_string,
        }
    }
}

#[derive(uniffi::Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiParseMode {
    Replace,
    Link,
    Clean,
    Time,
}

impl From<FfiParseMode> for ParseMode {
    fn from(m: FfiParseMode) -> Self {
        match m {
            FfiParseMode::Replace => Self::Replace,
            FfiParseMode::Link => Self::Link,
            FfiParseMode::Clean => Self::Clean,
            FfiParseMode::Time => Self::Time,
        }
    }
}

/// A suggestion and the text accepting it inserts.
#[derive(uniffi::Record, Debug, Clone, PartialEq, Eq)]
pub struct FfiSuggestion {
    pub label: String,
    pub insert: String,
}

impl FfiSuggestion {
    pub(crate) fn new(suggestion: Suggestion, insert: String) -> Self {
        Self {
            label: suggestion.label,
            insert,
        }
    }
}

/// Trigger phrase location, as byte offsets into the line.
#[derive(uniffi::Record, Debug, Clone, PartialEq, Eq)]
pub struct FfiTriggerMatch {
    pub start: u32,
    pub end: u32,
    pub query: String,
}

impl From<TriggerMatch> for FfiTriggerMatch {
    fn from(m: TriggerMatch) -> Self {
        Self {
            start: u32::try_from(m.start).unwrap_or(u32::MAX),
            end: u32::try_from(m.end).unwrap_or(u32::MAX),
            query: m.query,
        }
    }
}

/// A resolved `nldates?day=...` request.
#[derive(uniffi::Record, Debug, Clone, PartialEq, Eq)]
pub struct FfiDateAction {
    pub day: String,
    pub new_pane: bool,
    pub result: FfiParseResult,
}

impl FfiDateAction {
    pub(crate) fn new(action: DateAction, result: ParseResult) -> Self {
        Self {
            day: action.day,
            new_pane: action.new_pane,
            result: result.into(),
        }
    }
}

#[derive(uniffi::Error, thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FfiError {
    #[error("invalid settings: {message}")]
    InvalidSettings { message: String },

    #[error("invalid date action: {message}")]
    InvalidAction { message: String },
}

impl From<NldError> for FfiError {
    fn from(e: NldError) -> Self {
        match e {
            NldError::InvalidAction(message) => Self::InvalidAction { message },
            other => Self::InvalidSettings {
                message: other.to_string(),
            },
        }
    }
}
