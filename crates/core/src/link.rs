//! Note links for resolved dates.

use serde::{Deserialize, Serialize};

/// How links to daily notes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[[path]]` or `[[path|alias]]`
    #[default]
    Wiki,
    /// `[text](path)`
    Markdown,
}

impl LinkStyle {
    #[must_use]
    pub fn from_markdown_flag(use_markdown_links: bool) -> Self {
        if use_markdown_links {
            Self::Markdown
        } else {
            Self::Wiki
        }
    }
}

/// Link to the note at `subpath`, optionally shown as `alias`.
///
/// Markdown links escape square brackets in the text, and spaces and
/// parentheses in the target.
#[must_use]
pub fn generate_link(subpath: &str, alias: Option<&str>, style: LinkStyle) -> String {
    let path = normalize_path(subpath);
    match (style, alias) {
        (LinkStyle::Markdown, Some(alias)) => {
            format!("[{}]({})", escape_text(alias), escape_url(&path))
        }
        (LinkStyle::Markdown, None) => {
            format!("[{}]({})", escape_text(subpath), escape_url(&path))
        }
        (LinkStyle::Wiki, Some(alias)) => format!("[[{path}|{alias}]]"),
        (LinkStyle::Wiki, None) => format!("[[{path}]]"),
    }
}

/// Vault-style path: forward slashes, no empty segments, no leading or
/// trailing slash.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_links() {
        assert_eq!(generate_link("2024-05-15", None, LinkStyle::Wiki), "[[2024-05-15]]");
        assert_eq!(
            generate_link("2024-05-15", Some("next friday"), LinkStyle::Wiki),
            "[[2024-05-15|next friday]]"
        );
    }

    #[test]
    fn test_markdown_links_escape() {
        assert_eq!(
            generate_link("Daily/May 15 (Wed)", None, LinkStyle::Markdown),
            r"[Daily/May 15 (Wed)](Daily/May%2015%20\(Wed\))"
        );
        assert_eq!(
            generate_link("2024-05-15", Some("[soon]"), LinkStyle::Markdown),
            r"[\[soon\]](2024-05-15)"
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/daily//2024\\05/"), "daily/2024/05");
        assert_eq!(normalize_path("2024-05-15"), "2024-05-15");
    }

    #[test]
    fn test_style_from_flag() {
        assert_eq!(LinkStyle::from_markdown_flag(true), LinkStyle::Markdown);
        assert_eq!(LinkStyle::from_markdown_flag(false), LinkStyle::Wiki);
    }
}
