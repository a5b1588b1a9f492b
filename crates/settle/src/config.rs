//! Wait configuration.
//!
//! Timeouts, pacing and polling intervals are caller-supplied constants.
//! [`WaitConfig`] bundles them with builder-style setters and can be loaded
//! from a YAML or JSON file; missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::network::{default_denylist, UrlPattern};
use crate::result::{SettleError, SettleResult};

/// Global timeout for blocking waits (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Polling interval for condition checks (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Interval between the two samples of an idle cycle (250ms)
pub const DEFAULT_IDLE_POLL_INTERVAL_MS: u64 = 250;

/// Secondary confirmation window after a click (500ms)
pub const DEFAULT_CONFIRM_WINDOW_MS: u64 = 500;

/// Floor applied to both polling intervals (1ms)
pub const MIN_POLL_INTERVAL_MS: u64 = 1;

/// Default click-until attempts
pub const DEFAULT_MAX_RETRIES: u32 = 30;

/// Default pause before each click-until attempt (1ms)
pub const DEFAULT_PACING_MS: u64 = 1;

/// Bound for click-until retries.
///
/// One unit is consumed per attempt and never replenished within a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryBudget {
    /// Number of attempts
    pub max_retries: u32,
    /// Pause before each attempt in milliseconds
    pub pacing_ms: u64,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            pacing_ms: DEFAULT_PACING_MS,
        }
    }
}

impl RetryBudget {
    /// Create a budget
    #[must_use]
    pub const fn new(max_retries: u32, pacing_ms: u64) -> Self {
        Self {
            max_retries,
            pacing_ms,
        }
    }

    /// Pacing as Duration
    #[must_use]
    pub const fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Global timeout for blocking waits in milliseconds
    pub default_timeout_ms: u64,
    /// Condition polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Gap between idle samples in milliseconds
    pub idle_poll_interval_ms: u64,
    /// Delay before a plain click in milliseconds
    pub click_delay_ms: u64,
    /// Secondary confirmation window in milliseconds
    pub confirm_window_ms: u64,
    /// Default click-until budget
    pub retry: RetryBudget,
    /// Where exhaustion screenshots are written
    pub diagnostics_dir: PathBuf,
    /// Requests ignored by network idle detection
    pub network_denylist: Vec<UrlPattern>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            idle_poll_interval_ms: DEFAULT_IDLE_POLL_INTERVAL_MS,
            click_delay_ms: 0,
            confirm_window_ms: DEFAULT_CONFIRM_WINDOW_MS,
            retry: RetryBudget::default(),
            diagnostics_dir: PathBuf::from("target/settle/diagnostics"),
            network_denylist: default_denylist(),
        }
    }
}

impl WaitConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Set the condition polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the idle sampling gap
    #[must_use]
    pub const fn with_idle_poll_interval(mut self, interval_ms: u64) -> Self {
        self.idle_poll_interval_ms = interval_ms;
        self
    }

    /// Set the plain click delay
    #[must_use]
    pub const fn with_click_delay(mut self, delay_ms: u64) -> Self {
        self.click_delay_ms = delay_ms;
        self
    }

    /// Set the secondary confirmation window
    #[must_use]
    pub const fn with_confirm_window(mut self, window_ms: u64) -> Self {
        self.confirm_window_ms = window_ms;
        self
    }

    /// Set the default click-until budget
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryBudget) -> Self {
        self.retry = retry;
        self
    }

    /// Set the diagnostics directory
    #[must_use]
    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = dir.into();
        self
    }

    /// Replace the network denylist
    #[must_use]
    pub fn with_denylist(mut self, denylist: Vec<UrlPattern>) -> Self {
        self.network_denylist = denylist;
        self
    }

    /// Global timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Poll interval as Duration, never below [`MIN_POLL_INTERVAL_MS`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(floor_interval(self.poll_interval_ms))
    }

    /// Idle sampling gap as Duration, never below [`MIN_POLL_INTERVAL_MS`]
    #[must_use]
    pub const fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(floor_interval(self.idle_poll_interval_ms))
    }

    /// Click delay as Duration
    #[must_use]
    pub const fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    /// Confirmation window as Duration
    #[must_use]
    pub const fn confirm_window(&self) -> Duration {
        Duration::from_millis(self.confirm_window_ms)
    }

    /// Reject settings the polling loops cannot run with
    pub fn validate(&self) -> SettleResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(SettleError::config("poll_interval_ms must be greater than 0"));
        }
        if self.idle_poll_interval_ms == 0 {
            return Err(SettleError::config(
                "idle_poll_interval_ms must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> SettleResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> SettleResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> SettleResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(SettleError::config(format!(
                "unsupported config extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

const fn floor_interval(ms: u64) -> u64 {
    if ms < MIN_POLL_INTERVAL_MS {
        MIN_POLL_INTERVAL_MS
    } else {
        ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod defaults {
        use super::*;

        #[test]
        fn test_default_constants() {
            let config = WaitConfig::default();
            assert_eq!(config.timeout(), Duration::from_secs(30));
            assert_eq!(config.idle_poll_interval(), Duration::from_millis(250));
            assert_eq!(config.confirm_window(), Duration::from_millis(500));
            assert_eq!(config.retry, RetryBudget::new(30, 1));
            assert!(!config.network_denylist.is_empty());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_builders() {
            let config = WaitConfig::new()
                .with_timeout(1000)
                .with_poll_interval(10)
                .with_idle_poll_interval(20)
                .with_click_delay(5)
                .with_confirm_window(100)
                .with_retry(RetryBudget::new(3, 100))
                .with_diagnostics_dir("/tmp/d")
                .with_denylist(vec![]);
            assert_eq!(config.timeout(), Duration::from_secs(1));
            assert_eq!(config.poll_interval(), Duration::from_millis(10));
            assert_eq!(config.idle_poll_interval(), Duration::from_millis(20));
            assert_eq!(config.click_delay(), Duration::from_millis(5));
            assert_eq!(config.retry.pacing(), Duration::from_millis(100));
            assert_eq!(config.diagnostics_dir, PathBuf::from("/tmp/d"));
            assert!(config.network_denylist.is_empty());
        }

        #[test]
        fn test_zero_poll_interval_rejected() {
            assert!(WaitConfig::new().with_poll_interval(0).validate().is_err());
            assert!(WaitConfig::new()
                .with_idle_poll_interval(0)
                .validate()
                .is_err());
        }

        #[test]
        fn test_zero_intervals_floor_to_one_ms() {
            let config = WaitConfig::new()
                .with_poll_interval(0)
                .with_idle_poll_interval(0);
            assert_eq!(config.poll_interval(), Duration::from_millis(1));
            assert_eq!(config.idle_poll_interval(), Duration::from_millis(1));
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = WaitConfig::from_yaml_str(
                "default_timeout_ms: 5000\nretry:\n  max_retries: 4\n",
            )
            .unwrap();
            assert_eq!(config.default_timeout_ms, 5000);
            assert_eq!(config.retry.max_retries, 4);
            assert_eq!(config.retry.pacing_ms, DEFAULT_PACING_MS);
            assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_json_denylist() {
            let config = WaitConfig::from_json_str(
                r#"{"network_denylist":[{"contains":"/poll"},"any"]}"#,
            )
            .unwrap();
            assert_eq!(
                config.network_denylist,
                vec![UrlPattern::Contains("/poll".into()), UrlPattern::Any]
            );
        }

        #[test]
        fn test_invalid_yaml_is_error() {
            assert!(matches!(
                WaitConfig::from_yaml_str("poll_interval_ms: 0"),
                Err(SettleError::Config { .. })
            ));
            assert!(matches!(
                WaitConfig::from_yaml_str("retry: [1, 2"),
                Err(SettleError::Yaml(_))
            ));
        }

        #[test]
        fn test_load_by_extension() {
            let dir = tempfile::tempdir().unwrap();
            let yaml = dir.path().join("settle.yaml");
            std::fs::write(&yaml, "click_delay_ms: 40\n").unwrap();
            assert_eq!(WaitConfig::load(&yaml).unwrap().click_delay_ms, 40);

            let json = dir.path().join("settle.json");
            std::fs::write(&json, r#"{"confirm_window_ms": 10}"#).unwrap();
            assert_eq!(WaitConfig::load(&json).unwrap().confirm_window_ms, 10);

            let toml = dir.path().join("settle.toml");
            std::fs::write(&toml, "").unwrap();
            assert!(matches!(
                WaitConfig::load(&toml),
                Err(SettleError::Config { .. })
            ));
        }
    }
}
