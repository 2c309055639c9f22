//! Charting engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_LIMIT;

/// How a loaded chart that disagrees with its layout is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Regenerate the layout and overlay only matching teeth and surfaces.
    #[default]
    Repair,
    /// Fail the load and keep the current chart.
    Reject,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Maximum retained history entries.
    pub history_limit: usize,

    pub load_policy: LoadPolicy,

    /// Quiet period before dictated text is sent for parsing.
    pub dictation_debounce_ms: u64,

    /// Quiet period before a suggestion request is sent.
    pub suggestion_debounce_ms: u64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            load_policy: LoadPolicy::Repair,
            dictation_debounce_ms: 1500,
            suggestion_debounce_ms: 700,
        }
    }
}

impl ChartConfig {
    pub fn dictation_delay(&self) -> Duration {
        Duration::from_millis(self.dictation_debounce_ms)
    }

    pub fn suggestion_delay(&self) -> Duration {
        Duration::from_millis(self.suggestion_debounce_ms)
    }
}
