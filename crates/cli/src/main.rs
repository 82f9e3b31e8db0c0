mod config;
mod pretty;

use config::Config;

use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use colored::{control::set_override, Colorize};
use nldates_core::{
    render_command, DateAction, FixedLocale, ManualClock, NaturalLanguageDates, ParseMode,
    ParseResult, Settings, Suggestion, WeekStart,
};
use serde_json::json;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::pretty::PrettyConfig;

const LONG_ABOUT: &str = r##"
nld turns natural-language phrases into dates.

Type the date the way you would say it and get it back formatted with a
moment-style pattern, as a note link, or as a time.

UNDERSTOOD PHRASES:
  Relative:     today, tomorrow, yesterday, now, in 3 days, 2 weeks ago
  Weekdays:     friday, next friday, last monday
  Periods:      this week, next week, next month, next year
  Days:         first, twenty-first, 31st, 15
  Calendar:     dec 15, 15 march 2023, 2024-02-29, 5/20
  Boundaries:   last day of february, end of month, mid june
  Holidays:     christmas, halloween, new year's day
  With time:    tomorrow at 9am, next friday 14:30

EXAMPLES:
  nld next friday                Date in the configured format
  nld -f "dddd, MMMM Do" xmas    Custom moment pattern
  nld -m replace tomorrow        [[2024-05-16]]
  nld -m link "next week"        [next week](2024-05-19)
  nld -t in 2 hours              Time in the configured time format
  nld --suggest next             Autocomplete suggestions
  nld --complete "call @tom"     Suggestions for the trigger in a line
  nld --now                      Current date and time

PIPED INPUT:
  Each line of piped input is parsed on its own:
    cat phrases.txt | nld
    cat phrases.txt | nld -m link   Unparsed lines pass through unchanged

CONFIGURATION:
  Settings can be configured via CLI flags, environment variables, or config file.
  Precedence: CLI args > Environment vars > Config file > Defaults

  Setting        | CLI flag           | Env var          | Default
  ---------------|--------------------|------------------|---------------
  format         | -f, --format       | NLD_FORMAT       | YYYY-MM-DD
  time_format    | --time-format      | NLD_TIME_FORMAT  | HH:mm
  separator      | --separator        |                  | " "
  week_start     | -w, --week-start   | NLD_WEEK_START   | locale-default
  locale         | --locale           | NLD_LOCALE       | from LANG
  markdown_links | --markdown         |                  | false
  no_color       | -C, --no-color     | NLD_NO_COLOR     | false

  Config file location: nld --config-path
  Generate default config: nld --config-init

  Note: NO_COLOR env var is also respected (https://no-color.org/)"##;

#[derive(Parser)]
#[command(name = "nld")]
#[command(version)]
#[command(about = "Turn natural-language phrases into dates")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// The phrase to parse, e.g. `next friday` (quotes optional)
    #[arg(value_name = "PHRASE")]
    phrase: Vec<String>,

    /// Moment-style pattern for dates
    #[arg(long, short = 'f', value_name = "PATTERN")]
    format: Option<String>,

    /// Moment-style pattern for times
    #[arg(long, value_name = "PATTERN")]
    time_format: Option<String>,

    /// Placed between date and time for --now
    #[arg(long, value_name = "TEXT")]
    separator: Option<String>,

    /// First day of the week (sunday..saturday, or locale-default)
    #[arg(long, short = 'w', value_name = "DAY")]
    week_start: Option<WeekStart>,

    /// Locale tag for week start and numeric date order (e.g. en-GB)
    #[arg(long, value_name = "TAG")]
    locale: Option<String>,

    /// Output mode: replace ([[date]]), link ([phrase](date)), clean, time
    #[arg(long, short = 'm', value_name = "MODE")]
    mode: Option<ParseMode>,

    /// Render the phrase with the time format instead of the date format
    #[arg(long, short = 't')]
    time: bool,

    /// Render links as [text](path) instead of [[path]]
    #[arg(long)]
    markdown: bool,

    /// Load settings from a host JSON file (e.g. the plugin's data.json)
    #[arg(long, value_name = "FILE")]
    settings: Option<String>,

    /// Resolve relative to this instant instead of now
    ///
    /// Accepts YYYY-MM-DD, YYYY-MM-DDTHH:MM or YYYY-MM-DD HH:MM[:SS].
    #[arg(long, value_name = "DATETIME", value_parser = parse_reference)]
    at: Option<NaiveDateTime>,

    /// Show autocomplete suggestions for a query
    #[arg(long, value_name = "QUERY", conflicts_with = "complete")]
    suggest: Option<String>,

    /// Show suggestions for the trigger phrase at the end of a line
    #[arg(long, value_name = "LINE")]
    complete: Option<String>,

    /// Keep the suggestion label as link alias
    #[arg(long)]
    alias: bool,

    /// Insert accepted suggestions as plain text, not links
    #[arg(long)]
    no_link: bool,

    /// Print the current date and time
    #[arg(long, conflicts_with_all = ["today", "current_time"])]
    now: bool,

    /// Print today's date
    #[arg(long)]
    today: bool,

    /// Print the current time
    #[arg(long)]
    current_time: bool,

    /// Handle a date URI, e.g. "obsidian://nldates?day=tomorrow&newPane=no"
    #[arg(long, value_name = "URI")]
    action: Option<String>,

    /// Output results as JSON (for scripting/piping)
    #[arg(long, short = 'j')]
    json: bool,

    /// Compact JSON output (single line)
    #[arg(long, short = 'c')]
    compact: bool,

    /// Disable colored output
    #[arg(long, short = 'C')]
    no_color: bool,

    /// Enable verbose logging (use multiple times for more detail)
    ///
    /// -v shows debug messages, -vv shows trace messages.
    /// Useful for understanding why a phrase did or didn't resolve.
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Show config file path
    #[arg(long)]
    config_path: bool,

    /// Generate default config file (see --config-path for location)
    #[arg(long)]
    config_init: bool,
}

/// Parse `--at` values.
fn parse_reference(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, pattern) {
            return Ok(datetime);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("expected YYYY-MM-DD[THH:MM[:SS]], got '{s}'"))
}

fn exit_with_error(message: impl Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(1);
}

/// Merge CLI args, environment, config file and an optional host settings
/// file into core settings.
fn build_settings(cli: &Cli, file_config: &Config) -> Settings {
    let mut settings = match &cli.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .unwrap_or_else(|e| exit_with_error(format!("Failed to read {path}: {e}")));
            let settings = Settings::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(format!("{path}: {e}")));
            tracing::debug!("Loaded settings from: {}", path);
            settings
        }
        None => Settings {
            format: file_config.format(),
            time_format: file_config.time_format(),
            separator: file_config.separator(),
            week_start: file_config.week_start(),
            use_markdown_links: file_config.markdown_links(),
            ..Settings::default()
        },
    };

    if let Some(format) = &cli.format {
        tracing::debug!("format = {} (from CLI)", format);
        settings.format = format.clone();
    } else {
        let source = if std::env::var("NLD_FORMAT").is_ok() {
            "env NLD_FORMAT"
        } else if file_config.format.is_some() {
            "config file"
        } else {
            "default"
        };
        tracing::debug!("format = {} (from {})", settings.format, source);
    }

    if let Some(time_format) = &cli.time_format {
        tracing::debug!("time_format = {} (from CLI)", time_format);
        settings.time_format = time_format.clone();
    } else {
        let source = if std::env::var("NLD_TIME_FORMAT").is_ok() {
            "env NLD_TIME_FORMAT"
        } else if file_config.time_format.is_some() {
            "config file"
        } else {
            "default"
        };
        tracing::debug!("time_format = {} (from {})", settings.time_format, source);
    }

    if let Some(separator) = &cli.separator {
        settings.separator = separator.clone();
    }

    if let Some(week_start) = cli.week_start {
        tracing::debug!("week_start = {} (from CLI)", week_start);
        settings.week_start = week_start;
    } else {
        let source = if std::env::var("NLD_WEEK_START").is_ok() {
            "env NLD_WEEK_START"
        } else if file_config.week_start.is_some() {
            "config file"
        } else {
            "default"
        };
        tracing::debug!("week_start = {} (from {})", settings.week_start, source);
    }

    if cli.markdown {
        tracing::debug!("markdown links (from CLI)");
        settings.use_markdown_links = true;
    }
    if cli.no_link {
        settings.autosuggest_toggle_link = false;
    }

    settings
}

fn main() {
    let cli = Cli::parse();

    // Handle --config-path
    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => exit_with_error("Cannot determine config directory"),
        }
        return;
    }

    // Handle --config-init
    if cli.config_init {
        match config::init_config() {
            Ok(path) => println!("Created config file: {}", path.display()),
            Err(e) => exit_with_error(e),
        }
        return;
    }

    // Initialize tracing based on verbosity level (before config loading for logging)
    let level = match cli.verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if level != LevelFilter::OFF {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config file and merge with CLI args
    // Precedence: CLI args > Environment vars > Config file > Defaults
    let file_config = Config::load();

    if let Some(path) = Config::path() {
        if path.exists() {
            tracing::debug!("Loaded config from: {}", path.display());
        } else {
            tracing::trace!("No config file at: {}", path.display());
        }
    }

    let settings = build_settings(&cli, &file_config);

    let no_color = if cli.no_color {
        tracing::debug!("no_color = true (from CLI)");
        true
    } else {
        file_config.no_color()
    };
    if no_color {
        set_override(false);
    }

    let pretty_config = PrettyConfig {
        color: !no_color,
        compact: cli.compact,
        ..PrettyConfig::default()
    };

    let mut dates = NaturalLanguageDates::with_settings(settings);
    if let Some(locale) = cli.locale.clone().or_else(|| file_config.locale()) {
        tracing::debug!("locale = {}", locale);
        dates = dates.with_locale(FixedLocale(locale));
    }
    if let Some(at) = cli.at {
        tracing::debug!("reference = {} (from CLI)", at);
        dates = dates.with_clock(Arc::new(ManualClock::new(at)));
    }

    let output = Output {
        json: cli.json,
        pretty: pretty_config,
    };

    if let Some(uri) = &cli.action {
        run_action(&mut dates, uri, &output);
        return;
    }

    if cli.now || cli.today || cli.current_time {
        let text = if cli.now {
            dates.now_string()
        } else if cli.today {
            dates.today_string()
        } else {
            dates.current_time_string()
        };
        if output.json {
            output.print_json(&json!(text));
        } else {
            println!("{text}");
        }
        return;
    }

    if let Some(query) = &cli.suggest {
        run_suggest(&mut dates, query, cli.alias, &output);
        return;
    }

    if let Some(line) = &cli.complete {
        let Some(found) = dates.trigger(line, line.len()) else {
            exit_with_error(format!(
                "no '{}' trigger at the end of the line",
                dates.settings().autocomplete_trigger_phrase
            ));
        };
        tracing::debug!(query = %found.query, start = found.start, "trigger found");
        run_suggest(&mut dates, &found.query, cli.alias, &output);
        return;
    }

    let phrase = cli.phrase.join(" ");
    let render = Render {
        mode: cli.mode,
        time: cli.time,
    };

    if phrase.trim().is_empty() {
        if io::stdin().is_terminal() {
            print_usage();
            std::process::exit(1);
        }
        if let Err(e) = run_lines(&mut dates, &render, &output) {
            exit_with_error(format!("Failed to read stdin: {e}"));
        }
        return;
    }

    let (result, rendered) = render.phrase(&mut dates, &phrase);
    if output.json {
        output.print_json(&render.json(&phrase, &result, rendered.as_deref()));
    } else if let Some(text) = &rendered {
        println!("{text}");
    }
    if rendered.is_none() {
        if !output.json {
            exit_with_error(format!("could not parse date: {phrase}"));
        }
        std::process::exit(1);
    }
}

/// Where and how results are printed.
struct Output {
    json: bool,
    pretty: PrettyConfig,
}

impl Output {
    fn print_json(&self, value: &serde_json::Value) {
        println!("{}", pretty::pretty_json(value, &self.pretty));
    }
}

/// How a phrase is turned into output text.
struct Render {
    mode: Option<ParseMode>,
    time: bool,
}

impl Render {
    /// The parse result and the text to print, `None` when the phrase
    /// doesn't resolve.
    fn phrase(&self, dates: &mut NaturalLanguageDates, phrase: &str) -> (ParseResult, Option<String>) {
        let use_time = self.time || self.mode == Some(ParseMode::Time);
        let result = if use_time {
            dates.parse_time(phrase)
        } else {
            dates.parse_date(phrase)
        };

        let rendered = match self.mode {
            Some(mode) => render_command(dates, phrase, mode),
            None => result.is_valid().then(|| result.formatted_string.clone()),
        };
        (result, rendered)
    }

    fn json(&self, phrase: &str, result: &ParseResult, rendered: Option<&str>) -> serde_json::Value {
        let mut value = pretty::result_json(phrase, result);
        if let Some(mode) = self.mode {
            value["mode"] = json!(mode.as_str());
            value["output"] = json!(rendered);
        }
        value
    }
}

/// Parse each line of stdin on its own.
///
/// With a mode, unparsed lines are echoed unchanged; otherwise they print
/// as invalid dates.
fn run_lines(dates: &mut NaturalLanguageDates, render: &Render, output: &Output) -> io::Result<()> {
    let line_config = PrettyConfig {
        compact: true,
        ..output.pretty
    };

    for line in io::stdin().lock().lines() {
        let line = line?;
        let phrase = line.trim();
        if phrase.is_empty() {
            println!();
            continue;
        }

        let (result, rendered) = render.phrase(dates, phrase);
        if output.json {
            let value = render.json(phrase, &result, rendered.as_deref());
            println!("{}", pretty::pretty_json(&value, &line_config));
        } else if render.mode.is_some() {
            println!("{}", rendered.unwrap_or(line));
        } else {
            println!("{}", pretty::result_line(&result, &output.pretty));
        }
    }
    Ok(())
}

fn run_suggest(dates: &mut NaturalLanguageDates, query: &str, alias: bool, output: &Output) {
    let rows: Vec<(Suggestion, String)> = dates
        .suggestions(query)
        .into_iter()
        .map(|suggestion| {
            let inserted = dates.select_suggestion(&suggestion, alias);
            (suggestion, inserted)
        })
        .collect();

    if output.json {
        output.print_json(&pretty::suggestions_json(&rows));
    } else {
        for line in pretty::suggestion_lines(&rows, &output.pretty) {
            println!("{line}");
        }
    }
}

fn run_action(dates: &mut NaturalLanguageDates, uri: &str, output: &Output) {
    let action: DateAction = uri.parse().unwrap_or_else(|e| exit_with_error(e));
    let result = action.resolve(dates).unwrap_or_else(|e| exit_with_error(e));
    tracing::debug!(day = %action.day, new_pane = action.new_pane, "date action");

    if output.json {
        let mut value = pretty::result_json(&action.day, &result);
        value["newPane"] = json!(action.new_pane);
        output.print_json(&value);
    } else {
        println!("{}", result.formatted_string);
    }
}

fn print_usage() {
    eprintln!("{}: No input provided", "error".red().bold());
    eprintln!();
    eprintln!("Usage: {} <PHRASE>", "nld".bold());
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  nld tomorrow               Tomorrow's date");
    eprintln!("  nld next friday at 9am     Date and time");
    eprintln!("  nld -m link mid june       [mid june](2024-06-15)");
    eprintln!();
    eprintln!("Pipe input:");
    eprintln!("  cat phrases.txt | nld      One date per line");
    eprintln!();
    eprintln!("Run {} for more information.", "nld --help".bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reference() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_reference("2024-05-15T10:30"), Ok(expected));
        assert_eq!(parse_reference("2024-05-15 10:30:00"), Ok(expected));
        assert_eq!(
            parse_reference("2024-05-15"),
            Ok(expected.date().and_hms_opt(0, 0, 0).unwrap())
        );
        assert!(parse_reference("tomorrow").is_err());
    }

    #[test]
    fn test_phrase_words_are_joined() {
        let cli = Cli::parse_from(["nld", "-m", "link", "next", "friday"]);
        assert_eq!(cli.phrase.join(" "), "next friday");
        assert_eq!(cli.mode, Some(ParseMode::Link));
    }

    #[test]
    fn test_render_modes() {
        let at = parse_reference("2024-05-15T10:30").unwrap();
        let mut dates = NaturalLanguageDates::new()
            .with_clock(Arc::new(ManualClock::new(at)))
            .with_locale(FixedLocale("en-US".into()));

        let render = Render {
            mode: Some(ParseMode::Link),
            time: false,
        };
        let (result, rendered) = render.phrase(&mut dates, "tomorrow");
        assert!(result.is_valid());
        assert_eq!(rendered.as_deref(), Some("[tomorrow](2024-05-16)"));

        let render = Render {
            mode: None,
            time: true,
        };
        let (_, rendered) = render.phrase(&mut dates, "in 2 hours");
        assert_eq!(rendered.as_deref(), Some("12:30"));

        let (result, rendered) = render.phrase(&mut dates, "banana");
        assert!(!result.is_valid());
        assert_eq!(rendered, None);
    }
}
