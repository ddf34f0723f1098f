//! Background configuration

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tab_data::Thresholds;

pub const PLACEHOLDER_ICON: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/e/e1/Google_Chrome_icon_%28February_2022%29.svg/1920px-Google_Chrome_icon_%28February_2022%29.svg.png";

/// Settings passed in by the service worker; every field is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Shrink a "minute" to one second and log at debug level
    pub debug: bool,

    /// Thresholds written on startup/install
    pub initial_thresholds: Thresholds,

    pub alarm_name: String,

    pub alarm_period_minutes: u32,

    pub retry: RetryPolicy,

    /// An active tab left sooner than this keeps its old deactivation time
    pub skip_threshold_ms: i64,

    /// Favicons returned per bucket in a preview
    pub preview_limit: usize,

    pub placeholder_icon: String,

    /// URL patterns exempt from grouping
    pub whitelist: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 100,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            initial_thresholds: Thresholds::default(),
            alarm_name: "tab_timer".to_string(),
            alarm_period_minutes: 1,
            retry: RetryPolicy::default(),
            skip_threshold_ms: 2000,
            preview_limit: 9,
            placeholder_icon: PLACEHOLDER_ICON.to_string(),
            whitelist: Vec::new(),
        }
    }
}

impl Settings {
    /// Length of a threshold minute in milliseconds
    pub fn minute_ms(&self) -> i64 {
        if self.debug { 1000 } else { 60 * 1000 }
    }

    pub fn log_level(&self) -> log::Level {
        if self.debug {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }
}

/// Compiled white-list patterns
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    patterns: Vec<Regex>,
}

impl Whitelist {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring invalid whitelist pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();
        Whitelist { patterns }
    }

    pub fn matches(&self, url: &str) -> bool {
        !url.is_empty() && self.patterns.iter().any(|re| re.is_match(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.initial_thresholds, Thresholds::new(15, 60));
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.delay_ms, 100);
        assert_eq!(settings.alarm_period_minutes, 1);
        assert_eq!(settings.minute_ms(), 60_000);
    }

    #[test]
    fn test_partial_object_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"debug": true, "retry": {"maxAttempts": 2}}"#).unwrap();

        assert!(settings.debug);
        assert_eq!(settings.minute_ms(), 1000);
        assert_eq!(settings.retry.max_attempts, 2);
        assert_eq!(settings.retry.delay_ms, 100);
        assert_eq!(settings.preview_limit, 9);
    }

    #[test]
    fn test_whitelist_matches() {
        let whitelist = Whitelist::new(&[
            r"^https://mail\.google\.com/".to_string(),
            "([".to_string(), // invalid, skipped
        ]);

        assert!(whitelist.matches("https://mail.google.com/mail/u/0"));
        assert!(!whitelist.matches("https://www.google.com/"));
        assert!(!whitelist.matches(""));
    }
}
