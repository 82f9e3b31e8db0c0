//! Terminal rendering for parse results, suggestions and JSON.
//!
//! JSON colors follow jq conventions: strings green, numbers cyan,
//! booleans yellow, null dimmed, keys blue.

use colored::{Color, Colorize};
use nldates_core::{ParseResult, Suggestion};
use serde_json::{json, Value};

/// Configuration for pretty printing.
#[derive(Debug, Clone, Copy)]
pub struct PrettyConfig {
    /// Enable colored output.
    pub color: bool,
    /// Indent string (usually 2 spaces).
    pub indent: &'static str,
    /// Compact mode (single line, no extra whitespace).
    pub compact: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            color: true,
            indent: "  ",
            compact: false,
        }
    }
}

/// One line of plain output for a parsed phrase.
pub fn result_line(result: &ParseResult, config: &PrettyConfig) -> String {
    if result.is_valid() {
        colorize(&result.formatted_string, Color::Green, config.color)
    } else {
        colorize(&result.formatted_string, Color::BrightBlack, config.color)
    }
}

/// `label  →  inserted text`, labels padded to a common width.
pub fn suggestion_lines(rows: &[(Suggestion, String)], config: &PrettyConfig) -> Vec<String> {
    let width = rows
        .iter()
        .map(|(suggestion, _)| suggestion.label.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(suggestion, inserted)| {
            let label = format!("{:width$}", suggestion.label);
            format!(
                "{}  {}  {}",
                colorize(&label, Color::Blue, config.color),
                colorize("→", Color::BrightBlack, config.color),
                inserted
            )
        })
        .collect()
}

/// JSON object for one parsed phrase.
pub fn result_json(input: &str, result: &ParseResult) -> Value {
    json!({
        "input": input,
        "formattedString": result.formatted_string,
        "date": result.date,
        "valid": result.is_valid(),
    })
}

/// JSON array of suggestions with the text each one inserts.
pub fn suggestions_json(rows: &[(Suggestion, String)]) -> Value {
    rows.iter()
        .map(|(suggestion, inserted)| json!({ "label": suggestion.label, "insert": inserted }))
        .collect()
}

/// Pretty-print a JSON value with colors.
pub fn pretty_json(value: &Value, config: &PrettyConfig) -> String {
    let mut output = String::new();
    write_value(value, config, 0, &mut output);
    output
}

fn write_value(value: &Value, config: &PrettyConfig, depth: usize, output: &mut String) {
    match value {
        Value::Null => output.push_str(&colorize("null", Color::BrightBlack, config.color)),
        Value::Bool(b) => output.push_str(&colorize(&b.to_string(), Color::Yellow, config.color)),
        Value::Number(n) => output.push_str(&colorize(&n.to_string(), Color::Cyan, config.color)),
        Value::String(_) => output.push_str(&colorize(&value.to_string(), Color::Green, config.color)),
        Value::Array(items) => {
            let entries = items.iter().map(|item| (None, item));
            write_container(entries, items.len(), ('[', ']'), config, depth, output);
        }
        Value::Object(map) => {
            let entries = map.iter().map(|(key, item)| (Some(key), item));
            write_container(entries, map.len(), ('{', '}'), config, depth, output);
        }
    }
}

fn write_container<'a>(
    entries: impl Iterator<Item = (Option<&'a String>, &'a Value)>,
    len: usize,
    (open, close): (char, char),
    config: &PrettyConfig,
    depth: usize,
    output: &mut String,
) {
    output.push(open);
    if len == 0 {
        output.push(close);
        return;
    }

    for (i, (key, item)) in entries.enumerate() {
        if config.compact {
            if i > 0 {
                output.push_str(", ");
            }
        } else {
            if i > 0 {
                output.push(',');
            }
            output.push('\n');
            output.push_str(&config.indent.repeat(depth + 1));
        }
        if let Some(key) = key {
            let quoted = Value::String(key.clone()).to_string();
            output.push_str(&colorize(&quoted, Color::Blue, config.color));
            output.push_str(": ");
        }
        write_value(item, config, depth + 1, output);
    }

    if !config.compact {
        output.push('\n');
        output.push_str(&config.indent.repeat(depth));
    }
    output.push(close);
}

fn colorize(s: &str, color: Color, enabled: bool) -> String {
    if enabled {
        s.color(color).to_string()
    } else {
        s.to_string()
    }
}
