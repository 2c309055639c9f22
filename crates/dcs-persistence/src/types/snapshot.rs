//! Named chart snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dcs_core::{DmftScore, PerioChart, PerioComparison};
use dcs_model::ChartState;

/// A chart frozen under a name, e.g. "Initial exam" or "6 month recall".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    pub name: String,

    /// RFC 3339 timestamp.
    pub timestamp: String,

    pub chart: ChartState,

    pub perio: PerioChart,

    #[serde(default)]
    pub dmft: DmftScore,
}

impl ChartSnapshot {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Periodontal changes from this snapshot to `later`.
    pub fn compare_to(&self, later: &PerioChart) -> PerioComparison {
        later.compare_with(&self.perio)
    }
}
