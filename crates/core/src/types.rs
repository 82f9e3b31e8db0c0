//! Core types for nldates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::format::{format_date, INVALID_DATE};

/// The outcome of parsing one phrase with one display pattern.
///
/// `date` is `None` when the phrase could not be understood; the formatted
/// string is then [`INVALID_DATE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub formatted_string: String,
    pub date: Option<NaiveDateTime>,
}

impl ParseResult {
    /// Format `date` with a moment-style `pattern`.
    #[must_use]
    pub fn new(date: Option<NaiveDateTime>, pattern: &str) -> Self {
        Self {
            formatted_string: format_date(date, pattern),
            date,
        }
    }

    #[must_use]
    pub fn invalid() -> Self {
        Self {
            formatted_string: INVALID_DATE.to_string(),
            date: None,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_valid_result() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let result = ParseResult::new(Some(date), "YYYY-MM-DD");
        assert!(result.is_valid());
        assert_eq!(result.formatted_string, "2024-02-29");
    }

    #[test]
    fn test_invalid_result() {
        let result = ParseResult::new(None, "YYYY-MM-DD");
        assert!(!result.is_valid());
        assert_eq!(result, ParseResult::invalid());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(ParseResult::invalid()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "formattedString": "Invalid date", "date": null })
        );
    }
}
