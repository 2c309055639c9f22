//! Moving charts between the engine and patient records.

use chrono::Utc;
use tracing::debug;

use dcs_core::{ChartConfig, DentalChart, LoadReport};

use crate::error::{PersistenceError, Result};
use crate::types::{ChartSnapshot, PatientRecord};

impl PatientRecord {
    /// Copy the engine's current chart and periodontal chart into the record.
    pub fn capture(&mut self, chart: &DentalChart) {
        self.current_chart = chart.snapshot();
        self.perio = Some(chart.perio().clone());
    }

    /// Open the stored chart in a fresh engine. History starts at the loaded
    /// chart.
    pub fn open(&self, config: ChartConfig) -> Result<(DentalChart, LoadReport)> {
        let mut chart = DentalChart::with_config(config);
        let report = chart
            .restore(&self.current_chart)
            .map_err(|source| PersistenceError::Restore { source })?;
        if let Some(perio) = &self.perio {
            chart.restore_perio(perio.clone());
        }
        debug!(patient = %self.patient_id, teeth = report.teeth_loaded, "patient chart opened");
        Ok((chart, report))
    }

    /// Freeze the engine's chart under `name`.
    pub fn save_snapshot(&mut self, name: &str, chart: &DentalChart) {
        self.upsert_snapshot(ChartSnapshot::capture(name, chart));
    }
}

impl ChartSnapshot {
    pub fn capture(name: &str, chart: &DentalChart) -> Self {
        Self {
            name: name.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            chart: chart.snapshot(),
            perio: chart.perio().clone(),
            dmft: chart.dmft(),
        }
    }
}
