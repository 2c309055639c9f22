//! Root patient record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use dcs_core::PerioChart;
use dcs_model::ChartState;

use super::{CURRENT_SCHEMA_VERSION, ChartSnapshot};

/// Everything stored for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Schema version (for future migrations).
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,

    /// Filled from the store key when a legacy record lacks it.
    #[serde(default)]
    pub patient_id: String,

    /// When the record was created.
    #[serde(default)]
    pub created_at: String,

    /// When the record was last saved.
    #[serde(default)]
    pub last_saved_at: String,

    /// Records created before any charting store `null` here.
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_chart: ChartState,

    #[serde(default)]
    pub perio: Option<PerioChart>,

    /// Named snapshots, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub snapshots: Vec<ChartSnapshot>,

    /// Sibling data owned by other tools, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn legacy_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PatientRecord {
    /// An empty record for `patient_id`.
    pub fn new(patient_id: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            patient_id: patient_id.into(),
            created_at: now.clone(),
            last_saved_at: now,
            current_chart: ChartState::default(),
            perio: None,
            snapshots: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Update the last saved timestamp.
    pub fn touch(&mut self) {
        self.last_saved_at = Utc::now().to_rfc3339();
        if self.created_at.is_empty() {
            self.created_at.clone_from(&self.last_saved_at);
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.last_saved_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn snapshot(&self, name: &str) -> Option<&ChartSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.name == name)
    }

    /// Store `snapshot`, replacing any existing one with the same name.
    pub fn upsert_snapshot(&mut self, snapshot: ChartSnapshot) {
        match self
            .snapshots
            .iter_mut()
            .find(|existing| existing.name == snapshot.name)
        {
            Some(existing) => *existing = snapshot,
            None => self.snapshots.push(snapshot),
        }
    }
}
