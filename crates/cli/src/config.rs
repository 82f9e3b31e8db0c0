//! Configuration file loading and environment variable handling.
//!
//! Precedence: CLI args > Environment vars > Config file > Defaults

use nldates_core::{Settings, WeekStart};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# nld configuration
# See: nld --help for all options

# Moment-style pattern for dates
format = "YYYY-MM-DD"

# Moment-style pattern for times
time_format = "HH:mm"

# Placed between date and time for --now
separator = " "

# First day of the week: sunday..saturday, or locale-default
week_start = "locale-default"

# Locale tag used for week start and numeric date order (e.g. "en-GB").
# Taken from LC_ALL / LC_TIME / LANG when unset.
# locale = "en-US"

# Render [text](path) links instead of [[path]]
markdown_links = false

# Disable colored output
no_color = false
"#;

/// Configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: Option<String>,
    pub time_format: Option<String>,
    pub separator: Option<String>,
    pub week_start: Option<WeekStart>,
    pub locale: Option<String>,
    pub markdown_links: Option<bool>,
    pub no_color: Option<bool>,
}

impl Config {
    /// Get the config file path.
    ///
    /// - Linux/macOS: `~/.config/nld/config.toml`
    /// - Windows: `%APPDATA%\nld\config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nld").join("config.toml"))
    }

    /// Load config from file. Returns default if file doesn't exist.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };

        toml::from_str(&contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Read value from environment variable.
    fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok()?.parse().ok()
    }

    /// Get format with precedence: env > config > default.
    pub fn format(&self) -> String {
        Self::env_var("NLD_FORMAT")
            .or_else(|| self.format.clone())
            .unwrap_or_else(|| Settings::default().format)
    }

    /// Get time_format with precedence: env > config > default.
    pub fn time_format(&self) -> String {
        Self::env_var("NLD_TIME_FORMAT")
            .or_else(|| self.time_format.clone())
            .unwrap_or_else(|| Settings::default().time_format)
    }

    pub fn separator(&self) -> String {
        self.separator
            .clone()
            .unwrap_or_else(|| Settings::default().separator)
    }

    /// Get week_start with precedence: env > config > default.
    ///
    /// An unknown name in `NLD_WEEK_START` is ignored.
    pub fn week_start(&self) -> WeekStart {
        Self::env_var("NLD_WEEK_START")
            .or(self.week_start)
            .unwrap_or_default()
    }

    /// Get locale with precedence: env > config.
    ///
    /// `None` leaves locale detection to the POSIX variables.
    pub fn locale(&self) -> Option<String> {
        Self::env_var("NLD_LOCALE").or_else(|| self.locale.clone())
    }

    pub fn markdown_links(&self) -> bool {
        self.markdown_links.unwrap_or(false)
    }

    /// Get no_color with precedence: env > config > default.
    ///
    /// Respects the `NO_COLOR` standard (https://no-color.org/).
    pub fn no_color(&self) -> bool {
        if std::env::var("NO_COLOR").is_ok() {
            return true;
        }
        if std::env::var("NLD_NO_COLOR").is_ok() {
            return true;
        }
        self.no_color.unwrap_or(false)
    }
}

/// Create a default config file at the standard location.
pub fn init_config() -> Result<PathBuf, String> {
    let path = Config::path().ok_or("Cannot determine config directory")?;

    if path.exists() {
        return Err(format!("Config file already exists: {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    fs::write(&path, DEFAULT_CONFIG).map_err(|e| format!("Failed to write config: {}", e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_toml() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("DEFAULT_CONFIG should parse");
        assert_eq!(config.format.as_deref(), Some("YYYY-MM-DD"));
        assert_eq!(config.time_format.as_deref(), Some("HH:mm"));
        assert_eq!(config.separator.as_deref(), Some(" "));
        assert_eq!(config.week_start, Some(WeekStart::LocaleDefault));
        assert_eq!(config.locale, None);
        assert_eq!(config.markdown_links, Some(false));
        assert_eq!(config.no_color, Some(false));
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
week_start = "monday"
markdown_links = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.week_start, Some(WeekStart::Monday));
        assert_eq!(config.format, None);
        assert!(config.markdown_links());
        assert_eq!(config.separator(), " ");
    }

    #[test]
    fn test_unknown_week_start_is_rejected() {
        let result: Result<Config, _> = toml::from_str(r#"week_start = "someday""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.separator(), " ");
        assert!(!config.markdown_links());
    }
}
