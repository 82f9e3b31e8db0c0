//! nldates Core
//!
//! Natural language dates for note-taking: turn phrases like `next friday`,
//! `in 3 days` or `mid june` into dates and formatted strings, and offer
//! autocomplete while typing.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use nldates_core::{ManualClock, NaturalLanguageDates};
//!
//! let now = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap().and_hms_opt(10, 30, 0).unwrap();
//! let mut dates = NaturalLanguageDates::new().with_clock(Arc::new(ManualClock::new(now)));
//!
//! let result = dates.parse_date("christmas");
//! assert!(result.is_valid());
//! assert_eq!(result.formatted_string, "2024-12-25");
//!
//! // Custom moment-style pattern
//! let result = dates.parse("in 3 days", "dddd, MMMM Do");
//! assert_eq!(result.formatted_string, "Saturday, May 18th");
//! ```
//!
//! # Resolution Only
//!
//! The [`Resolver`] can be used on its own, without the cache or settings:
//!
//! ```
//! use chrono::NaiveDate;
//! use nldates_core::{Resolver, ResolverContext, WeekStart};
//!
//! let resolver = Resolver::new();
//! let context = ResolverContext {
//!     week_start: WeekStart::Monday,
//!     reference: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(9, 0, 0).unwrap(),
//! };
//! let date = resolver.resolve_with("last day of february", &context).unwrap();
//! assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
//! ```

pub mod cache;
pub mod clock;
pub mod commands;
pub mod error;
pub mod format;
pub mod link;
pub mod locale;
pub mod ordinal;
pub mod recognizer;
pub mod resolver;
pub mod settings;
pub mod suggest;
pub mod types;
pub mod weekday;

use std::sync::Arc;

use chrono::Duration;

pub use cache::ExpiringLruCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{parse_truthy, render_command, DateAction, ParseMode};
pub use error::{NldError, Result};
pub use format::{format_date, INVALID_DATE};
pub use link::{generate_link, LinkStyle};
pub use locale::{EnvLocale, FixedLocale, LocaleSource};
pub use recognizer::{CasualRecognizer, DateRecognizer, ParseOptions};
pub use resolver::{Resolver, ResolverContext, Rule};
pub use settings::Settings;
pub use suggest::{detect_trigger, suggest, Suggestion, SuggestionMemo, TriggerMatch};
pub use types::ParseResult;
pub use weekday::WeekStart;

/// Format of the calendar day in cache keys.
const CACHE_KEY_DAY_FORMAT: &str = "%a %b %d %Y";

/// Main entry point: settings, resolver and parse cache together.
pub struct NaturalLanguageDates {
    settings: Settings,
    resolver: Resolver,
    cache: ExpiringLruCache<ParseResult>,
    suggestions: SuggestionMemo,
    clock: Arc<dyn Clock>,
}

impl Default for NaturalLanguageDates {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NaturalLanguageDates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaturalLanguageDates")
            .field("settings", &self.settings)
            .field("resolver", &self.resolver)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl NaturalLanguageDates {
    /// Create an instance with default settings, the system clock and the
    /// environment locale.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            resolver: Resolver::new(),
            cache: ExpiringLruCache::default(),
            suggestions: SuggestionMemo::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Read time from `clock` everywhere: reference instant, cache ages and
    /// cache-key days. Clears the cache.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.resolver = self.resolver.with_clock(Arc::clone(&clock));
        self.cache = ExpiringLruCache::with_clock(
            cache::DEFAULT_CAPACITY,
            Duration::milliseconds(cache::DEFAULT_MAX_AGE_MS),
            Arc::clone(&clock),
        );
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl LocaleSource + 'static) -> Self {
        self.resolver = self.resolver.with_locale(locale);
        self.clear_cache();
        self
    }

    #[must_use]
    pub fn with_recognizer(mut self, recognizer: impl DateRecognizer + 'static) -> Self {
        self.resolver = self.resolver.with_recognizer(recognizer);
        self.clear_cache();
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Cached results are dropped since they may have
    /// been produced with another week start.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.clear_cache();
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Cache key for `text` rendered with `format` today.
    ///
    /// The calendar day is part of the key, so results never outlive a date
    /// change. The day is read from the clock, while the resolver reference
    /// can lag it by up to a minute: just after midnight, a phrase resolved
    /// against the previous day may be cached under the new day's key.
    #[must_use]
    pub fn cache_key(&self, text: &str, format: &str) -> String {
        let today = self.clock.now().format(CACHE_KEY_DAY_FORMAT);
        format!("{text}:{format}:{}:{today}", self.settings.week_start)
    }

    /// Parse `text` and render it with a moment-style `format`.
    pub fn parse(&mut self, text: &str, format: &str) -> ParseResult {
        let key = self.cache_key(text, format);
        if let Some(cached) = self.cache.get(&key) {
            tracing::trace!(key = %key, "parse cache hit");
            return cached.clone();
        }

        let date = self.resolver.resolve(text, self.settings.week_start);
        let result = ParseResult::new(date, format);
        if !result.is_valid() {
            tracing::debug!(input = text, "input date can't be parsed");
        }

        self.cache.set(key, result.clone());
        result
    }

    /// Parse with the configured date format.
    pub fn parse_date(&mut self, text: &str) -> ParseResult {
        let format = self.settings.format.clone();
        self.parse(text, &format)
    }

    /// Parse with the configured time format.
    pub fn parse_time(&mut self, text: &str) -> ParseResult {
        let format = self.settings.time_format.clone();
        self.parse(text, &format)
    }

    /// Drop all cached parse results and rendered suggestions.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.suggestions.clear();
    }

    /// Number of cached parse results.
    #[must_use]
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Current date and time: date format, separator, time format.
    #[must_use]
    pub fn now_string(&self) -> String {
        format::format_moment(&self.clock.now(), &self.settings.now_format())
    }

    #[must_use]
    pub fn today_string(&self) -> String {
        format::format_moment(&self.clock.now(), &self.settings.format)
    }

    #[must_use]
    pub fn current_time_string(&self) -> String {
        format::format_moment(&self.clock.now(), &self.settings.time_format)
    }

    /// Link to a note in the configured link style.
    #[must_use]
    pub fn link(&self, subpath: &str, alias: Option<&str>) -> String {
        generate_link(
            subpath,
            alias,
            LinkStyle::from_markdown_flag(self.settings.use_markdown_links),
        )
    }

    /// Open suggestions at `cursor` in `line`, if autosuggest is enabled and
    /// the trigger phrase is there.
    #[must_use]
    pub fn trigger(&self, line: &str, cursor: usize) -> Option<TriggerMatch> {
        if !self.settings.is_autosuggest_enabled {
            return None;
        }
        detect_trigger(line, cursor, &self.settings.autocomplete_trigger_phrase)
    }

    /// Suggestions for a query typed after the trigger.
    #[must_use]
    pub fn suggestions(&self, query: &str) -> Vec<Suggestion> {
        suggest(query)
    }

    /// The text inserted when `suggestion` is accepted.
    ///
    /// Time suggestions render with the time format and are never linked.
    /// Date suggestions become links when autosuggest linking is on, using
    /// the label as alias if `keep_alias` is set.
    pub fn select_suggestion(&mut self, suggestion: &Suggestion, keep_alias: bool) -> String {
        let (rendered, linkable) = match suggestion.time_phrase() {
            Some(phrase) => (self.render_suggestion(phrase, ParseMode::Time), false),
            None => (
                self.render_suggestion(&suggestion.label, ParseMode::Clean),
                self.settings.autosuggest_toggle_link,
            ),
        };

        if linkable {
            let alias = keep_alias.then_some(suggestion.label.as_str());
            self.link(&rendered, alias)
        } else {
            rendered
        }
    }

    fn render_suggestion(&mut self, phrase: &str, mode: ParseMode) -> String {
        if let Some(rendered) = self.suggestions.get(phrase) {
            return rendered.to_string();
        }
        let result = match mode {
            ParseMode::Time => self.parse_time(phrase),
            _ => self.parse_date(phrase),
        };
        self.suggestions.insert(phrase, result.formatted_string.clone());
        result.formatted_string
    }
}
