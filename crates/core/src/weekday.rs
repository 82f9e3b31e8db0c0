//! Week-start preference.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::NldError;
use crate::locale;

/// Weekdays in index order, Sunday first.
pub const DAYS_OF_WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// The day a week starts on, either explicit or taken from the locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeekStart {
    #[default]
    LocaleDefault,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekStart {
    /// The settings name, e.g. `monday` or `locale-default`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocaleDefault => "locale-default",
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }

    /// The explicit weekday, or `None` for [`WeekStart::LocaleDefault`].
    #[must_use]
    pub fn weekday(self) -> Option<Weekday> {
        match self {
            Self::LocaleDefault => None,
            Self::Sunday => Some(Weekday::Sun),
            Self::Monday => Some(Weekday::Mon),
            Self::Tuesday => Some(Weekday::Tue),
            Self::Wednesday => Some(Weekday::Wed),
            Self::Thursday => Some(Weekday::Thu),
            Self::Friday => Some(Weekday::Fri),
            Self::Saturday => Some(Weekday::Sat),
        }
    }

    /// Resolve to a concrete weekday, consulting `locale` only for
    /// [`WeekStart::LocaleDefault`].
    #[must_use]
    pub fn resolve(self, locale: &str) -> Weekday {
        self.weekday()
            .unwrap_or_else(|| locale::first_weekday(locale))
    }
}

impl From<Weekday> for WeekStart {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekStart {
    type Err = NldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower == "locale-default" || lower == "locale" {
            return Ok(Self::LocaleDefault);
        }
        weekday_from_name(&lower)
            .map(Self::from)
            .ok_or_else(|| NldError::InvalidWeekStart(s.to_string()))
    }
}

/// Index of `day` in [`DAYS_OF_WEEK`] (sunday = 0 ... saturday = 6).
#[must_use]
pub fn week_number(day: Weekday) -> u32 {
    day.num_days_from_sunday()
}

/// Lowercase English name, as used when building phrases like `next monday`.
#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "sunday",
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
    }
}

/// Parse a full or abbreviated weekday name (lowercase).
pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_number_maps_names_to_indices() {
        let expected = [
            ("sunday", 0),
            ("monday", 1),
            ("tuesday", 2),
            ("wednesday", 3),
            ("thursday", 4),
            ("friday", 5),
            ("saturday", 6),
        ];
        for (name, index) in expected {
            let day = weekday_from_name(name).unwrap();
            assert_eq!(week_number(day), index, "{}", name);
            assert_eq!(DAYS_OF_WEEK[index as usize], day);
        }
    }

    #[test]
    fn test_parse_week_start() {
        assert_eq!("Monday".parse::<WeekStart>().unwrap(), WeekStart::Monday);
        assert_eq!(
            "locale-default".parse::<WeekStart>().unwrap(),
            WeekStart::LocaleDefault
        );
        assert!("someday".parse::<WeekStart>().is_err());
    }

    #[test]
    fn test_explicit_overrides_locale() {
        assert_eq!(WeekStart::Saturday.resolve("en-us"), Weekday::Sat);
        assert_eq!(WeekStart::LocaleDefault.resolve("en-us"), Weekday::Sun);
        assert_eq!(WeekStart::LocaleDefault.resolve("en-gb"), Weekday::Mon);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&WeekStart::LocaleDefault).unwrap();
        assert_eq!(json, "\"locale-default\"");
        let parsed: WeekStart = serde_json::from_str("\"wednesday\"").unwrap();
        assert_eq!(parsed, WeekStart::Wednesday);
    }
}
