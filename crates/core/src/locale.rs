//! Locale lookup for week-start and numeric date order.
//!
//! Locale tags are normalized to lowercase with `-` separators, so
//! `en_GB.UTF-8` becomes `en-gb`.

use chrono::Weekday;

/// Default tag when nothing is configured.
pub const DEFAULT_LOCALE: &str = "en-us";

/// Regions whose weeks start on Sunday.
const SUNDAY_REGIONS: &[&str] = &[
    "us", "ca", "mx", "br", "jp", "kr", "il", "in", "ph", "tw", "hk", "za", "sa", "pe", "co",
    "ve", "gt", "pr", "th", "id",
];

/// Regions whose weeks start on Saturday.
const SATURDAY_REGIONS: &[&str] = &[
    "ae", "af", "bh", "dj", "dz", "eg", "iq", "ir", "jo", "kw", "ly", "om", "qa", "sd", "sy",
];

/// Where the active locale tag comes from.
///
/// Consulted on every resolution, so a host whose locale changes at runtime
/// is picked up without rebuilding anything.
pub trait LocaleSource: Send + Sync {
    fn locale(&self) -> String;
}

/// Reads `NLD_LOCALE`, then the POSIX `LC_ALL`, `LC_TIME` and `LANG`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvLocale;

impl LocaleSource for EnvLocale {
    fn locale(&self) -> String {
        ["NLD_LOCALE", "LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| normalize(&value))
            .find(|tag| !tag.is_empty() && tag != "c" && tag != "posix")
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
    }
}

/// A locale fixed by the host.
#[derive(Debug, Clone)]
pub struct FixedLocale(pub String);

impl LocaleSource for FixedLocale {
    fn locale(&self) -> String {
        normalize(&self.0)
    }
}

/// Normalize a POSIX or BCP 47 tag: drop encoding and modifier, lowercase,
/// use `-` as separator.
#[must_use]
pub fn normalize(tag: &str) -> String {
    let base = tag.split(['.', '@']).next().unwrap_or_default();
    base.trim().replace('_', "-").to_lowercase()
}

/// The first day of the week for a locale tag.
#[must_use]
pub fn first_weekday(locale: &str) -> Weekday {
    let tag = normalize(locale);
    let mut parts = tag.split('-');
    let language = parts.next().unwrap_or_default();
    let region = parts.find(|part| part.len() == 2);

    if let Some(region) = region {
        if SUNDAY_REGIONS.contains(&region) {
            return Weekday::Sun;
        }
        if SATURDAY_REGIONS.contains(&region) {
            return Weekday::Sat;
        }
        return Weekday::Mon;
    }

    match language {
        "en" | "ja" | "ko" | "he" => Weekday::Sun,
        "ar" | "fa" => Weekday::Sat,
        _ => Weekday::Mon,
    }
}

/// Whether numeric dates read day-first (`03/04` = 3 April).
#[must_use]
pub fn is_little_endian(locale: &str) -> bool {
    normalize(locale) == "en-gb"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("en_GB.UTF-8"), "en-gb");
        assert_eq!(normalize("de_DE@euro"), "de-de");
        assert_eq!(normalize("fr"), "fr");
    }

    #[test]
    fn test_first_weekday() {
        assert_eq!(first_weekday("en-US"), Weekday::Sun);
        assert_eq!(first_weekday("en_GB.UTF-8"), Weekday::Mon);
        assert_eq!(first_weekday("ar-EG"), Weekday::Sat);
        assert_eq!(first_weekday("sv-SE"), Weekday::Mon);
        assert_eq!(first_weekday("en"), Weekday::Sun);
        assert_eq!(first_weekday("de"), Weekday::Mon);
    }

    #[test]
    fn test_little_endian_only_for_british_english() {
        assert!(is_little_endian("en_GB"));
        assert!(!is_little_endian("en-us"));
    }

    #[test]
    fn test_fixed_locale() {
        assert_eq!(FixedLocale("en_GB.UTF-8".into()).locale(), "en-gb");
    }
}
