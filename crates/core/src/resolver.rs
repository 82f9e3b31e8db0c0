//! Natural language date resolution.
//!
//! The [`Resolver`] runs a short, ordered list of [`Rule`]s over the input
//! before handing it to a general [`DateRecognizer`]. The rules cover
//! phrases where note-taking users expect something more specific than a
//! casual recognizer gives them: `christmas` is always this year's,
//! `21st` is a day of the current month, `next week` is the start of next
//! week, `end of february` is the last day of that month and `mid june` is
//! the 15th.

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;

use crate::clock::{Clock, SystemClock};
use crate::locale::{self, EnvLocale, LocaleSource};
use crate::ordinal::{parse_ordinal, standalone_ordinal};
use crate::recognizer::{CasualRecognizer, DateRecognizer, ParseOptions};
use crate::weekday::{weekday_name, WeekStart};

/// How long a cached reference instant stays in use.
pub const REFERENCE_REFRESH_SECS: i64 = 60;

/// Inputs that pin down a single resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverContext {
    pub week_start: WeekStart,
    pub reference: NaiveDateTime,
}

/// Special-case rules tried before the general recognizer, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `christmas` anywhere in the text: December 25 of the reference year.
    Holiday,
    /// The whole text is an ordinal: that day of the reference month.
    OrdinalDay,
    /// `this week`: the first day of the current week.
    ThisWeek,
    /// `next week|month|year`.
    NextUnit,
    /// `last day of <X>` / `end of <X>`: the last day of X's month.
    LastDayOf,
    /// `mid <month>`: the 15th of that month.
    MidUnit,
}

impl Rule {
    /// Every rule, highest priority first.
    pub const ORDERED: [Rule; 6] = [
        Rule::Holiday,
        Rule::OrdinalDay,
        Rule::ThisWeek,
        Rule::NextUnit,
        Rule::LastDayOf,
        Rule::MidUnit,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Rule::Holiday => "holiday",
            Rule::OrdinalDay => "ordinal-day",
            Rule::ThisWeek => "this-week",
            Rule::NextUnit => "next-unit",
            Rule::LastDayOf => "last-day-of",
            Rule::MidUnit => "mid-unit",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a rule made of the input.
enum Outcome {
    /// The rule owns this input; its answer is final, even if it is no date.
    Resolved(Option<NaiveDateTime>),
    /// Not this rule's input; try the next one.
    Skip,
}

fn patterns() -> &'static RulePatterns {
    static PATTERNS: OnceLock<RulePatterns> = OnceLock::new();
    PATTERNS.get_or_init(RulePatterns::new)
}

struct RulePatterns {
    christmas: Regex,
    this_unit: Regex,
    next_unit: Regex,
    last_day_of: Regex,
    mid_unit: Regex,
}

impl RulePatterns {
    fn new() -> Self {
        Self {
            christmas: Regex::new(r"(?i)\bchristmas\b").unwrap(),
            this_unit: Regex::new(r"(?i)this\s(\w+)").unwrap(),
            next_unit: Regex::new(r"(?i)next\s(\w+)").unwrap(),
            last_day_of: Regex::new(r"(?i)(last day of|end of)\s*([^\n\r]*)").unwrap(),
            mid_unit: Regex::new(r"(?i)mid\s(\w+)").unwrap(),
        }
    }
}

/// Per-call state shared by the rules.
struct Scope {
    reference: NaiveDateTime,
    week_start: Weekday,
    options: ParseOptions,
}

impl Scope {
    fn forward(&self) -> ParseOptions {
        ParseOptions {
            forward_date: true,
            ..self.options
        }
    }
}

/// Resolves natural language text to a date.
///
/// Holds the reference instant relative phrases are measured from. It is
/// read from the clock at construction and refreshed only once it is more
/// than [`REFERENCE_REFRESH_SECS`] stale.
pub struct Resolver {
    recognizer: Box<dyn DateRecognizer>,
    clock: Arc<dyn Clock>,
    locale: Box<dyn LocaleSource>,
    reference: NaiveDateTime,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("reference", &self.reference)
            .field("locale", &self.locale.locale())
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// A resolver using the built-in recognizer, system clock and
    /// environment locale.
    #[must_use]
    pub fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            recognizer: Box::new(CasualRecognizer),
            reference: clock.now(),
            clock,
            locale: Box::new(EnvLocale),
        }
    }

    /// Replace the general recognizer used for everything the rules don't
    /// handle.
    #[must_use]
    pub fn with_recognizer(mut self, recognizer: impl DateRecognizer + 'static) -> Self {
        self.recognizer = Box::new(recognizer);
        self
    }

    /// Read time from `clock`. The reference instant is reset to its current time.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.reference = clock.now();
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl LocaleSource + 'static) -> Self {
        self.locale = Box::new(locale);
        self
    }

    /// The active locale tag.
    #[must_use]
    pub fn locale(&self) -> String {
        self.locale.locale()
    }

    /// The reference instant as last refreshed.
    #[must_use]
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Re-read the clock if the reference instant has gone stale.
    pub fn refresh_reference(&mut self) -> NaiveDateTime {
        let now = self.clock.now();
        if now - self.reference > Duration::seconds(REFERENCE_REFRESH_SECS) {
            tracing::trace!(old = %self.reference, new = %now, "reference instant refreshed");
            self.reference = now;
        }
        self.reference
    }

    /// Context for a resolution right now.
    pub fn context(&mut self, week_start: WeekStart) -> ResolverContext {
        ResolverContext {
            week_start,
            reference: self.refresh_reference(),
        }
    }

    /// Resolve `text` against the (possibly refreshed) reference instant.
    ///
    /// Returns `None` when nothing in the text reads as a date.
    pub fn resolve(&mut self, text: &str, week_start: WeekStart) -> Option<NaiveDateTime> {
        let context = self.context(week_start);
        self.resolve_with(text, &context)
    }

    /// Resolve `text` against an explicit context.
    #[must_use]
    pub fn resolve_with(&self, text: &str, context: &ResolverContext) -> Option<NaiveDateTime> {
        let locale = self.locale.locale();
        let week_start = context.week_start.resolve(&locale);
        let scope = Scope {
            reference: context.reference,
            week_start,
            options: ParseOptions {
                forward_date: false,
                week_start: Some(week_start),
                little_endian: locale::is_little_endian(&locale),
            },
        };

        for rule in Rule::ORDERED {
            if let Outcome::Resolved(date) = self.apply(rule, text, &scope) {
                tracing::trace!(%rule, text, ?date, "rule matched");
                return date;
            }
        }

        tracing::trace!(text, week_start = weekday_name(week_start), "falling back to recognizer");
        self.recognizer
            .parse_date(text, scope.reference, &scope.options)
    }

    fn apply(&self, rule: Rule, text: &str, scope: &Scope) -> Outcome {
        match rule {
            Rule::Holiday => self.holiday(text, scope),
            Rule::OrdinalDay => Self::ordinal_day(text, scope),
            Rule::ThisWeek => self.this_week(text, scope),
            Rule::NextUnit => self.next_unit(text, scope),
            Rule::LastDayOf => self.last_day_of(text, scope),
            Rule::MidUnit => self.mid_unit(text, scope),
        }
    }

    fn holiday(&self, text: &str, scope: &Scope) -> Outcome {
        if !patterns().christmas.is_match(text) {
            return Outcome::Skip;
        }
        let date = NaiveDate::from_ymd_opt(scope.reference.year(), 12, 25)
            .and_then(|date| date.and_hms_opt(0, 0, 0));
        Outcome::Resolved(date)
    }

    fn ordinal_day(text: &str, scope: &Scope) -> Outcome {
        let Some(caps) = standalone_ordinal().captures(text) else {
            return Outcome::Skip;
        };
        let date = parse_ordinal(&caps[1])
            .and_then(|day| scope.reference.date().with_day(day))
            .and_then(|date| date.and_hms_opt(0, 0, 0));
        Outcome::Resolved(date)
    }

    fn this_week(&self, text: &str, scope: &Scope) -> Outcome {
        match patterns().this_unit.captures(text) {
            Some(caps) if caps[1].eq_ignore_ascii_case("week") => {
                let phrase = format!("this {}", weekday_name(scope.week_start));
                Outcome::Resolved(self.recognizer.parse_date(
                    &phrase,
                    scope.reference,
                    &scope.options,
                ))
            }
            _ => Outcome::Skip,
        }
    }

    fn next_unit(&self, text: &str, scope: &Scope) -> Outcome {
        let Some(caps) = patterns().next_unit.captures(text) else {
            return Outcome::Skip;
        };
        let forward = scope.forward();
        let anchor_phrase = match caps[1].to_lowercase().as_str() {
            "week" => {
                let phrase = format!("next {}", weekday_name(scope.week_start));
                return Outcome::Resolved(self.recognizer.parse_date(
                    &phrase,
                    scope.reference,
                    &forward,
                ));
            }
            "month" => "this month",
            "year" => "this year",
            _ => return Outcome::Skip,
        };

        // The whole input is resolved again, relative to the anchor
        match self
            .recognizer
            .parse_date(anchor_phrase, scope.reference, &forward)
        {
            Some(anchor) => Outcome::Resolved(self.recognizer.parse_date(text, anchor, &forward)),
            None => Outcome::Skip,
        }
    }

    fn last_day_of(&self, text: &str, scope: &Scope) -> Outcome {
        let Some(caps) = patterns().last_day_of.captures(text) else {
            return Outcome::Skip;
        };
        let target = caps[2].trim();
        let Some(within) = self
            .recognizer
            .parse_date(target, scope.reference, &scope.options)
        else {
            return Outcome::Skip;
        };

        let (year, month) = (within.year(), within.month());
        let Some(last_day) = last_day_of_month(year, month) else {
            return Outcome::Skip;
        };
        let literal = format!("{year}-{month}-{last_day}");
        Outcome::Resolved(
            self.recognizer
                .parse_date(&literal, scope.reference, &scope.forward()),
        )
    }

    fn mid_unit(&self, text: &str, scope: &Scope) -> Outcome {
        let Some(caps) = patterns().mid_unit.captures(text) else {
            return Outcome::Skip;
        };
        let phrase = format!("{} 15th", &caps[1]);
        Outcome::Resolved(
            self.recognizer
                .parse_date(&phrase, scope.reference, &scope.forward()),
        )
    }
}

/// Number of days in `month` of `year` (leap-aware).
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((next - Duration::days(1)).day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::locale::FixedLocale;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        at(y, m, d, 0, 0)
    }

    fn resolver(now: NaiveDateTime) -> (Resolver, ManualClock) {
        let clock = ManualClock::new(now);
        let resolver = Resolver::new()
            .with_clock(Arc::new(clock.clone()))
            .with_locale(FixedLocale("en-US".into()));
        (resolver, clock)
    }

    /// Counts calls and never recognizes anything.
    #[derive(Clone, Default)]
    struct CountingRecognizer(Arc<AtomicUsize>);

    impl DateRecognizer for CountingRecognizer {
        fn parse_date(&self, _: &str, _: NaiveDateTime, _: &ParseOptions) -> Option<NaiveDateTime> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    #[test]
    fn test_christmas_is_reference_year() {
        let (mut resolver, _) = resolver(at(2024, 12, 30, 9, 0));
        assert_eq!(
            resolver.resolve("Christmas", WeekStart::LocaleDefault),
            Some(date(2024, 12, 25))
        );
        assert_eq!(
            resolver.resolve("the day after christmas party", WeekStart::Monday),
            Some(date(2024, 12, 25))
        );
    }

    #[test]
    fn test_christmas_bypasses_recognizer() {
        let calls = CountingRecognizer::default();
        let (resolver, _) = resolver(at(2024, 3, 1, 9, 0));
        let mut resolver = resolver.with_recognizer(calls.clone());

        assert_eq!(
            resolver.resolve("christmas", WeekStart::Sunday),
            Some(date(2024, 12, 25))
        );
        assert_eq!(calls.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_christmas_needs_word_boundary() {
        let calls = CountingRecognizer::default();
        let (resolver, _) = resolver(at(2024, 3, 1, 9, 0));
        let mut resolver = resolver.with_recognizer(calls.clone());

        assert_eq!(resolver.resolve("christmastime", WeekStart::Sunday), None);
        assert_eq!(calls.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ordinal_day_of_reference_month() {
        let (mut resolver, _) = resolver(at(2024, 4, 10, 9, 0));
        assert_eq!(resolver.resolve("first", WeekStart::Sunday), Some(date(2024, 4, 1)));
        assert_eq!(
            resolver.resolve("twenty-first", WeekStart::Sunday),
            Some(date(2024, 4, 21))
        );
        assert_eq!(resolver.resolve("15", WeekStart::Sunday), Some(date(2024, 4, 15)));
        assert_eq!(resolver.resolve("30th", WeekStart::Sunday), Some(date(2024, 4, 30)));
    }

    #[test]
    fn test_ordinal_beyond_month_end_is_no_date() {
        let (mut resolver, _) = resolver(at(2024, 4, 10, 9, 0));
        assert_eq!(resolver.resolve("31st", WeekStart::Sunday), None);
    }

    #[test]
    fn test_this_week_is_week_start() {
        // Thursday
        let (mut resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        assert_eq!(
            resolver.resolve("this week", WeekStart::Monday),
            Some(date(2024, 5, 13))
        );
        assert_eq!(
            resolver.resolve("This Week", WeekStart::Sunday),
            Some(date(2024, 5, 12))
        );
    }

    #[test]
    fn test_this_other_unit_falls_through() {
        let (mut resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        assert_eq!(
            resolver.resolve("this friday", WeekStart::Monday),
            Some(date(2024, 5, 17))
        );
    }

    #[test]
    fn test_next_week_uses_week_start() {
        let (mut resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        assert_eq!(
            resolver.resolve("next week", WeekStart::Monday),
            Some(date(2024, 5, 20))
        );
        assert_eq!(
            resolver.resolve("next week", WeekStart::Saturday),
            Some(date(2024, 5, 18))
        );
    }

    #[test]
    fn test_next_week_locale_default() {
        let (resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        let mut british = resolver.with_locale(FixedLocale("en_GB.UTF-8".into()));
        assert_eq!(
            british.resolve("next week", WeekStart::LocaleDefault),
            Some(date(2024, 5, 20))
        );

        let mut american = british.with_locale(FixedLocale("en_US".into()));
        assert_eq!(
            american.resolve("next week", WeekStart::LocaleDefault),
            Some(date(2024, 5, 19))
        );
    }

    #[test]
    fn test_next_month_and_year() {
        let (mut resolver, _) = resolver(at(2024, 1, 31, 9, 0));
        assert_eq!(
            resolver.resolve("next month", WeekStart::Sunday),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            resolver.resolve("next year", WeekStart::Sunday),
            Some(date(2025, 1, 31))
        );
    }

    #[test]
    fn test_next_month_composes_with_rest_of_phrase() {
        let (mut resolver, _) = resolver(at(2024, 5, 3, 9, 0));
        assert_eq!(
            resolver.resolve("next month 15th", WeekStart::Sunday),
            Some(date(2024, 6, 15))
        );
        assert_eq!(
            resolver.resolve("15th next month", WeekStart::Sunday),
            Some(date(2024, 6, 15))
        );
        assert_eq!(
            resolver.resolve("end of next month", WeekStart::Sunday),
            Some(date(2024, 6, 30))
        );
        assert_eq!(
            resolver.resolve("last day of next month", WeekStart::Sunday),
            Some(date(2024, 6, 30))
        );
        assert_eq!(
            resolver.resolve("june next year", WeekStart::Sunday),
            Some(date(2025, 6, 1))
        );
        assert_eq!(
            resolver.resolve("review next month", WeekStart::Sunday),
            Some(date(2024, 6, 3))
        );
    }

    #[test]
    fn test_next_weekday_falls_through() {
        let (mut resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        assert_eq!(
            resolver.resolve("next friday", WeekStart::Sunday),
            Some(date(2024, 5, 24))
        );
    }

    #[test]
    fn test_last_day_of_month() {
        let (mut resolver, _) = resolver(at(2024, 1, 10, 9, 0));
        assert_eq!(
            resolver.resolve("last day of February", WeekStart::Sunday),
            Some(date(2024, 2, 29))
        );

        let (mut resolver, _) = self::resolver(at(2023, 1, 10, 9, 0));
        assert_eq!(
            resolver.resolve("end of february", WeekStart::Sunday),
            Some(date(2023, 2, 28))
        );
    }

    #[test]
    fn test_end_of_unparseable_falls_back() {
        let (mut resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        // "month" alone is not a date, the recognizer handles the whole phrase
        assert_eq!(
            resolver.resolve("end of month", WeekStart::Sunday),
            Some(date(2024, 5, 31))
        );
        assert_eq!(resolver.resolve("end of nothing", WeekStart::Sunday), None);
    }

    #[test]
    fn test_mid_month() {
        let (mut resolver, _) = resolver(at(2024, 3, 1, 9, 0));
        assert_eq!(
            resolver.resolve("mid June", WeekStart::Sunday),
            Some(date(2024, 6, 15))
        );
        // Already past: forward to next year
        assert_eq!(
            resolver.resolve("mid january", WeekStart::Sunday),
            Some(date(2025, 1, 15))
        );
    }

    #[test]
    fn test_mid_unit_answer_is_final() {
        let calls = CountingRecognizer::default();
        let (resolver, _) = resolver(at(2024, 3, 1, 9, 0));
        let mut resolver = resolver.with_recognizer(calls.clone());

        // "june 15th" is not recognized, and the general fallback never runs
        assert_eq!(resolver.resolve("mid june", WeekStart::Sunday), None);
        assert_eq!(calls.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fallback_finds_date_inside_text() {
        let (mut resolver, _) = resolver(at(2024, 5, 15, 10, 30));
        assert_eq!(
            resolver.resolve("meeting next friday", WeekStart::Sunday),
            Some(date(2024, 5, 24))
        );
    }

    #[test]
    fn test_fallback_and_unparseable() {
        let (mut resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        assert_eq!(
            resolver.resolve("in 2 days", WeekStart::Sunday),
            Some(at(2024, 5, 18, 9, 0))
        );
        assert_eq!(resolver.resolve("banana", WeekStart::Sunday), None);
        assert_eq!(resolver.resolve("", WeekStart::Sunday), None);
    }

    #[test]
    fn test_reference_refreshes_only_when_stale() {
        let start = at(2024, 5, 16, 9, 0);
        let (mut resolver, clock) = resolver(start);

        clock.advance(Duration::seconds(60));
        assert_eq!(resolver.refresh_reference(), start);
        assert_eq!(resolver.resolve("now", WeekStart::Sunday), Some(start));

        clock.advance(Duration::seconds(1));
        assert_eq!(resolver.refresh_reference(), start + Duration::seconds(61));
    }

    #[test]
    fn test_explicit_context() {
        let (resolver, _) = resolver(at(2024, 5, 16, 9, 0));
        let context = ResolverContext {
            week_start: WeekStart::Sunday,
            reference: at(2020, 2, 3, 12, 0),
        };
        assert_eq!(resolver.resolve_with("tomorrow", &context), Some(date(2020, 2, 4)));
        assert_eq!(
            resolver.resolve_with("last day of february", &context),
            Some(date(2020, 2, 29))
        );
    }

    #[test]
    fn test_last_day_of_month_helper() {
        assert_eq!(last_day_of_month(2024, 2), Some(29));
        assert_eq!(last_day_of_month(2100, 2), Some(28));
        assert_eq!(last_day_of_month(2024, 12), Some(31));
        assert_eq!(last_day_of_month(2024, 13), None);
    }
}
