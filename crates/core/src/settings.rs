//! User settings.
//!
//! Field names and defaults match the JSON a note-taking host stores for
//! the plugin, so an existing `data.json` can be loaded as-is. Missing
//! fields take their defaults; unknown fields are ignored.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::weekday::WeekStart;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Moment pattern for dates.
    pub format: String,
    /// Moment pattern for times.
    pub time_format: String,
    /// Placed between date and time when inserting "now".
    pub separator: String,
    pub week_start: WeekStart,

    pub autocomplete_trigger_phrase: String,
    pub is_autosuggest_enabled: bool,
    /// Turn accepted suggestions into links.
    pub autosuggest_toggle_link: bool,

    pub modal_toggle_time: bool,
    pub modal_toggle_link: bool,
    pub modal_moment_format: String,

    /// Render `[text](path)` links instead of `[[path]]`.
    pub use_markdown_links: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: "YYYY-MM-DD".to_string(),
            time_format: "HH:mm".to_string(),
            separator: " ".to_string(),
            week_start: WeekStart::LocaleDefault,
            autocomplete_trigger_phrase: "@".to_string(),
            is_autosuggest_enabled: true,
            autosuggest_toggle_link: true,
            modal_toggle_time: false,
            modal_toggle_link: false,
            modal_moment_format: "HH:mm".to_string(),
            use_markdown_links: false,
        }
    }
}

impl Settings {
    /// Load settings from host JSON, filling in defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Pattern for "now": date, separator, time.
    #[must_use]
    pub fn now_format(&self) -> String {
        format!("{}{}{}", self.format, self.separator, self.time_format)
    }
}
