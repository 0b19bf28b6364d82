//! Harness configuration.
//!
//! Values come from `Configuration::default()`, optionally a TOML file, and
//! finally `HARNESS_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Configuration {
    /// Root of the diagnostic tree written on failures.
    pub screenshot_directory: PathBuf,
    pub capture_screenshot_on_failure: bool,
    pub capture_browser_logs_on_failure: bool,
    /// Seconds allowed for page-level comparisons (url, title).
    pub page_timeout: u64,
    /// Seconds allowed for locating and acting on elements.
    pub element_timeout: u64,
    /// Seconds allowed for value/attribute/state assertions.
    pub compare_timeout: u64,
    /// Fail with `Ambiguous` when a single-element lookup matches several.
    pub throw_if_more_than_one_element: bool,
    /// Skip clearing a field before writing into it.
    pub optimize_by_disabling_clear_before_write: bool,
    /// Let `write` on a `<select>` match option values as well as texts.
    pub write_to_select_with_option_value: bool,
    /// Pause after click/check/uncheck so CSS transitions can settle.
    pub animation_wait_time_ms: u64,
    /// Type text one character at a time.
    pub single_character_entry: bool,
    pub run_chrome_headless: bool,
    /// Chrome executable; discovered on the system when unset.
    pub chrome_binary: Option<PathBuf>,
    /// Extra command-line switches passed to Chrome.
    pub chrome_args: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            screenshot_directory: std::env::temp_dir().join("ui-harness").join("feature-tests"),
            capture_screenshot_on_failure: true,
            capture_browser_logs_on_failure: true,
            page_timeout: 30,
            element_timeout: 30,
            compare_timeout: 30,
            throw_if_more_than_one_element: false,
            optimize_by_disabling_clear_before_write: false,
            write_to_select_with_option_value: true,
            animation_wait_time_ms: 300,
            single_character_entry: true,
            run_chrome_headless: true,
            chrome_binary: None,
            chrome_args: Vec::new(),
        }
    }
}

impl Configuration {
    /// Load a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load `path` when given (defaults otherwise), then apply env overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `HARNESS_*` overrides read through `lookup`. Unparseable values
    /// are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        if let Some(headless) = parsed::<bool>(&lookup, "HARNESS_HEADLESS") {
            self.run_chrome_headless = headless;
            tracing::debug!("Override run_chrome_headless from env: {}", headless);
        }
        if let Some(secs) = parsed::<u64>(&lookup, "HARNESS_PAGE_TIMEOUT") {
            self.page_timeout = secs;
        }
        if let Some(secs) = parsed::<u64>(&lookup, "HARNESS_ELEMENT_TIMEOUT") {
            self.element_timeout = secs;
        }
        if let Some(secs) = parsed::<u64>(&lookup, "HARNESS_COMPARE_TIMEOUT") {
            self.compare_timeout = secs;
        }
        if let Some(strict) = parsed::<bool>(&lookup, "HARNESS_STRICT") {
            self.throw_if_more_than_one_element = strict;
        }
        if let Some(chrome) = lookup("HARNESS_CHROME").filter(|c| !c.trim().is_empty()) {
            self.chrome_binary = Some(PathBuf::from(chrome));
        }
        if let Some(dir) = lookup("HARNESS_SCREENSHOT_DIR").filter(|d| !d.trim().is_empty()) {
            self.screenshot_directory = PathBuf::from(dir);
        }
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout)
    }

    pub fn compare_timeout(&self) -> Duration {
        Duration::from_secs(self.compare_timeout)
    }

    pub fn animation_wait(&self) -> Duration {
        Duration::from_millis(self.animation_wait_time_ms)
    }
}
