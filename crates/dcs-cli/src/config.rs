//! CLI configuration file.
//!
//! ```json
//! {
//!   "chart": { "historyLimit": 100, "loadPolicy": "reject" },
//!   "autoSave": { "debounceMs": 1000 }
//! }
//! ```
//!
//! Every field is optional. Command-line flags override the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use dcs_core::ChartConfig;
use dcs_persistence::AutoSaveConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliConfig {
    pub chart: ChartConfig,
    pub auto_save: AutoSaveConfig,
}

impl CliConfig {
    /// Read `path`, or return the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcs_core::LoadPolicy;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: CliConfig =
            serde_json::from_str(r#"{"chart": {"loadPolicy": "reject"}}"#).unwrap();
        assert_eq!(config.chart.load_policy, LoadPolicy::Reject);
        assert_eq!(config.chart.history_limit, ChartConfig::default().history_limit);
        assert_eq!(config.auto_save, AutoSaveConfig::default());
    }

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }
}
