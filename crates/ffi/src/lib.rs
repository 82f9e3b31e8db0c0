//! UniFFI bindings for nldates.
//!
//! This crate exposes natural-language date parsing via UniFFI for
//! integration with Swift, Kotlin, Python, and other languages.
//!
//! One shared [`NaturalLanguageDates`] instance backs every call, so the
//! parse cache and settings persist across calls from the host. Access is
//! serialized with a mutex.

mod types;

pub use types::*;

use nldates_core::{
    render_command as render, DateAction, FixedLocale, NaturalLanguageDates, Settings,
};
use std::sync::{Mutex, OnceLock, PoisonError};

uniffi::setup_scaffolding!();

static INSTANCE: OnceLock<Mutex<NaturalLanguageDates>> = OnceLock::new();

/// Run `f` with exclusive access to the shared instance.
fn with_instance<T>(f: impl FnOnce(&mut NaturalLanguageDates) -> T) -> T {
    let instance = INSTANCE.get_or_init(|| Mutex::new(NaturalLanguageDates::new()));
    let mut guard = instance.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

// =============================================================================
// Exported Functions
// =============================================================================

/// Get the library version string.
#[uniffi::export]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Parse `text` and render it with a moment-style `format`.
#[uniffi::export]
pub fn parse(text: String, format: String) -> FfiParseResult {
    with_instance(|dates| dates.parse(&text, &format)).into()
}

/// Parse with the configured date format.
#[uniffi::export]
pub fn parse_date(text: String) -> FfiParseResult {
    with_instance(|dates| dates.parse_date(&text)).into()
}

/// Parse with the configured time format.
#[uniffi::export]
pub fn parse_time(text: String) -> FfiParseResult {
    with_instance(|dates| dates.parse_time(&text)).into()
}

/// Replacement text for a selection, or `None` to leave it untouched.
#[uniffi::export]
pub fn render_command(selection: String, mode: FfiParseMode) -> Option<String> {
    with_instance(|dates| render(dates, &selection, mode.into()))
}

/// Suggestions for a query typed after the trigger phrase, with the text
/// each one inserts.
#[uniffi::export]
pub fn suggest(query: String, keep_alias: bool) -> Vec<FfiSuggestion> {
    with_instance(|dates| {
        dates
            .suggestions(&query)
            .into_iter()
            .map(|suggestion| {
                let insert = dates.select_suggestion(&suggestion, keep_alias);
                FfiSuggestion::new(suggestion, insert)
            })
            .collect()
    })
}

/// Find the trigger phrase before `cursor` (a byte offset into `line`).
///
/// Returns `None` when autosuggest is disabled.
#[uniffi::export]
pub fn detect_trigger(line: String, cursor: u32) -> Option<FfiTriggerMatch> {
    let cursor = usize::try_from(cursor).ok()?;
    with_instance(|dates| dates.trigger(&line, cursor)).map(Into::into)
}

/// Handle an `nldates?day=...&newPane=...` URI or query string.
#[uniffi::export]
pub fn handle_action(uri: String) -> Result<FfiDateAction, FfiError> {
    let action: DateAction = uri.parse()?;
    let result = with_instance(|dates| action.resolve(dates))?;
    Ok(FfiDateAction::new(action, result))
}

#[uniffi::export]
pub fn now_string() -> String {
    with_instance(|dates| dates.now_string())
}

#[uniffi::export]
pub fn today_string() -> String {
    with_instance(|dates| dates.today_string())
}

#[uniffi::export]
pub fn current_time_string() -> String {
    with_instance(|dates| dates.current_time_string())
}

/// Replace the settings from the host's JSON. Clears the cache.
#[uniffi::export]
pub fn set_settings_json(json: String) -> Result<(), FfiError> {
    let settings = Settings::from_json(&json)?;
    with_instance(|dates| dates.set_settings(settings));
    Ok(())
}

/// Current settings as JSON.
#[uniffi::export]
pub fn settings_json() -> Result<String, FfiError> {
    Ok(with_instance(|dates| dates.settings().to_json())?)
}

/// Use the host's locale tag (e.g. `en-GB`) instead of the environment.
#[uniffi::export]
pub fn set_locale(tag: String) {
    with_instance(|dates| {
        let current = std::mem::take(dates);
        *dates = current.with_locale(FixedLocale(tag));
    });
}

/// Drop all cached results.
#[uniffi::export]
pub fn clear_cache() {
    with_instance(NaturalLanguageDates::clear_cache);
}
