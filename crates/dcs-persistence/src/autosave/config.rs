//! Auto-save configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoSaveConfig {
    /// Whether auto-save is enabled.
    pub enabled: bool,

    /// Quiet period after the last chart change before saving.
    ///
    /// Every further change restarts the wait.
    pub debounce_ms: u64,

    /// Maximum delay before forcing a save.
    ///
    /// If changes keep coming, save after this many milliseconds
    /// since the first unsaved change.
    pub max_delay_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 2000,
            max_delay_ms: 30_000,
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Check if auto-save should trigger given the time since the last change
    /// and since the first unsaved change.
    pub fn should_save(&self, since_last_change: Duration, since_first_unsaved: Duration) -> bool {
        if !self.enabled {
            return false;
        }
        since_last_change >= self.debounce() || since_first_unsaved >= self.max_delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_default_config() {
        let config = AutoSaveConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce_ms, 2000);
        assert_eq!(config.max_delay_ms, 30_000);
    }

    #[test]
    fn test_should_save_disabled() {
        let config = AutoSaveConfig::disabled();
        assert!(!config.should_save(ms(10_000), ms(60_000)));
    }

    #[test]
    fn test_should_save_debounce() {
        let config = AutoSaveConfig::default();
        assert!(!config.should_save(ms(1000), ms(1000)));
        assert!(config.should_save(ms(2500), ms(2500)));
    }

    #[test]
    fn test_should_save_max_delay() {
        let config = AutoSaveConfig::default();
        // Rapid changes keep resetting the debounce
        assert!(!config.should_save(ms(500), ms(25_000)));
        assert!(config.should_save(ms(500), ms(35_000)));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AutoSaveConfig = serde_json::from_str(r#"{"debounceMs": 500}"#).unwrap();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.max_delay_ms, 30_000);
        assert!(config.enabled);
    }
}
