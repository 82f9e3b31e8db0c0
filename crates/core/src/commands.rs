//! Editor commands and the `nldates` URI action.
//!
//! These are the host-facing operations built on top of
//! [`NaturalLanguageDates`]: replacing a selection with its parsed date and
//! opening the daily note for a phrase passed in a URI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NldError, Result};
use crate::types::ParseResult;
use crate::NaturalLanguageDates;

/// Longest `day` value a URI action accepts.
pub const MAX_ACTION_DAY_LEN: usize = 200;

/// How a parsed selection is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// `[[2024-05-15]]`
    #[default]
    Replace,
    /// `[next friday](2024-05-15)`
    Link,
    /// `2024-05-15`
    Clean,
    /// The time, in the time format: `15:00`
    Time,
}

impl ParseMode {
    pub const ALL: [ParseMode; 4] = [Self::Replace, Self::Link, Self::Clean, Self::Time];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Link => "link",
            Self::Clean => "clean",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = NldError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NldError::InvalidParseMode(s.to_string()))
    }
}

/// The replacement text for `selection` in `mode`.
///
/// `None` for a blank selection or one that doesn't parse; the host leaves
/// the text untouched.
pub fn render_command(
    dates: &mut NaturalLanguageDates,
    selection: &str,
    mode: ParseMode,
) -> Option<String> {
    if selection.trim().is_empty() {
        return None;
    }

    let date = dates.parse_date(selection);
    if !date.is_valid() {
        tracing::debug!(selection, "could not parse date");
        return None;
    }

    let rendered = match mode {
        ParseMode::Replace => format!("[[{}]]", date.formatted_string),
        ParseMode::Link => format!("[{selection}]({})", date.formatted_string),
        ParseMode::Clean => date.formatted_string,
        ParseMode::Time => {
            let time = dates.parse_time(selection);
            if !time.is_valid() {
                return None;
            }
            time.formatted_string
        }
    };
    Some(rendered)
}

/// A request to open the daily note for a phrase, e.g.
/// `obsidian://nldates?day=next%20friday&newPane=no`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateAction {
    pub day: String,
    pub new_pane: bool,
}

impl DateAction {
    /// Build an action from decoded query parameters.
    ///
    /// `day` is required and limited to [`MAX_ACTION_DAY_LEN`] characters;
    /// `newPane` defaults to yes.
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut day = None;
        let mut new_pane = None;
        for (key, value) in params {
            match key.as_ref() {
                "day" => day = Some(value.as_ref().to_string()),
                "newPane" => new_pane = Some(parse_truthy(value.as_ref())),
                _ => {}
            }
        }

        let day = day
            .filter(|day| !day.is_empty() && day.chars().count() <= MAX_ACTION_DAY_LEN)
            .ok_or_else(|| NldError::InvalidAction("invalid date provided to nldates".into()))?;
        Ok(Self {
            day,
            new_pane: new_pane.unwrap_or(true),
        })
    }

    /// The parsed date for this action, or an error naming the phrase.
    pub fn resolve(&self, dates: &mut NaturalLanguageDates) -> Result<ParseResult> {
        let date = dates.parse_date(&self.day);
        if date.is_valid() {
            Ok(date)
        } else {
            Err(NldError::InvalidAction(format!(
                "could not parse date: {}",
                self.day
            )))
        }
    }
}

impl FromStr for DateAction {
    type Err = NldError;

    /// Accepts a full URI (`obsidian://nldates?day=...`) or just its query.
    fn from_str(s: &str) -> Result<Self> {
        let query = match url::Url::parse(s) {
            Ok(uri) => uri.query().unwrap_or_default().to_string(),
            Err(_) => s.split_once('?').map_or(s, |(_, query)| query).to_string(),
        };
        Self::from_params(url::form_urlencoded::parse(query.as_bytes()))
    }
}

/// `y`, `yes`, `1`, `t` and `true` (any case) are true; everything else is false.
#[must_use]
pub fn parse_truthy(flag: &str) -> bool {
    ["y", "yes", "1", "t", "true"]
        .iter()
        .any(|truthy| truthy.eq_ignore_ascii_case(flag))
}
