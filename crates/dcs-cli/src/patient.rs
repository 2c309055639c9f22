//! An open patient chart backed by the file store.

use std::time::Instant;

use anyhow::{Result, anyhow, bail};
use tracing::{info, warn};

use dcs_core::{DentalChart, LoadReport};
use dcs_persistence::{
    AutoSaveConfig, DirtyTracker, FileStore, PatientRecord, PersistenceError, last_patient_id,
    load_record, save_record, validate_patient_id,
};

use crate::config::CliConfig;

/// Wrap a persistence error with its user-facing message and hint.
pub fn describe(error: PersistenceError) -> anyhow::Error {
    let message = match error.suggestion() {
        Some(hint) => format!("{} {hint}", error.user_message()),
        None => error.user_message(),
    };
    anyhow::Error::new(error).context(message)
}

/// Pick the explicit patient id, or fall back to the last saved one.
pub fn resolve_patient_id(store: &FileStore, explicit: Option<&str>) -> Result<String> {
    if let Some(id) = explicit {
        validate_patient_id(id).map_err(describe)?;
        return Ok(id.to_string());
    }
    match last_patient_id(store).map_err(describe)? {
        Some(id) => Ok(id),
        None => bail!("no patient selected; pass --patient <ID>"),
    }
}

/// A patient's record and the engine holding its chart.
pub struct PatientSession {
    store: FileStore,
    record: PatientRecord,
    chart: DentalChart,
    tracker: DirtyTracker,
    auto_save: AutoSaveConfig,
    saves: usize,
    /// The record changed outside the chart (new patient, new snapshot).
    record_changed: bool,
    load_report: Option<LoadReport>,
}

impl PatientSession {
    /// Open the stored chart for `patient_id`, or start an empty one.
    pub fn open(store: FileStore, patient_id: &str, config: &CliConfig) -> Result<Self> {
        let (record, chart, load_report) = match load_record(&store, patient_id) {
            Ok(record) => {
                let (chart, report) = record.open(config.chart.clone()).map_err(describe)?;
                report_repairs(patient_id, &report);
                (record, chart, Some(report))
            }
            Err(PersistenceError::NotFound { .. }) => {
                info!(patient = %patient_id, "starting a new chart");
                (
                    PatientRecord::new(patient_id),
                    DentalChart::with_config(config.chart.clone()),
                    None,
                )
            }
            Err(error) => return Err(describe(error)),
        };
        let tracker = DirtyTracker::new(chart.revision());
        Ok(Self {
            store,
            record,
            chart,
            tracker,
            auto_save: config.auto_save.clone(),
            saves: 0,
            record_changed: load_report.is_none(),
            load_report,
        })
    }

    /// Open an existing record; a missing one is an error.
    pub fn open_existing(store: FileStore, patient_id: &str, config: &CliConfig) -> Result<Self> {
        let session = Self::open(store, patient_id, config)?;
        if session.load_report.is_none() {
            return Err(anyhow!("no saved chart for patient {patient_id}"));
        }
        Ok(session)
    }

    pub fn patient_id(&self) -> &str {
        &self.record.patient_id
    }

    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    /// What was repaired when the stored chart was opened. `None` for a new
    /// patient.
    pub fn load_report(&self) -> Option<&LoadReport> {
        self.load_report.as_ref()
    }

    pub fn chart(&self) -> &DentalChart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut DentalChart {
        &mut self.chart
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty() || self.record_changed
    }

    /// Number of successful saves since the session was opened.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Note the chart's revision and auto-save when the quiet period has
    /// passed. Returns true when a save happened.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        self.tracker.observe(self.chart.revision(), now);
        if !self.tracker.should_auto_save(&self.auto_save, now) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Freeze the current chart under `name` in the record.
    pub fn save_snapshot(&mut self, name: &str) {
        self.record.save_snapshot(name, &self.chart);
        self.record_changed = true;
    }

    /// Write the record now.
    pub fn save(&mut self) -> Result<()> {
        self.tracker.start_save();
        self.record.capture(&self.chart);
        match save_record(&mut self.store, &mut self.record) {
            Ok(()) => {
                self.tracker.save_complete();
                self.tracker.observe(self.chart.revision(), Instant::now());
                self.record_changed = false;
                self.saves += 1;
                Ok(())
            }
            Err(error) => {
                self.tracker.save_failed();
                Err(describe(error))
            }
        }
    }

    /// Save only when something changed. Returns true when a save happened.
    pub fn save_if_dirty(&mut self) -> Result<bool> {
        self.tracker.observe(self.chart.revision(), Instant::now());
        if !self.tracker.is_dirty() && !self.record_changed {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}

fn report_repairs(patient_id: &str, report: &LoadReport) {
    if report.is_clean() {
        return;
    }
    warn!(
        patient = %patient_id,
        unknown_teeth = report.unknown_teeth.len(),
        unknown_surfaces = report.unknown_surfaces.len(),
        mismatched_ids = report.mismatched_ids.len(),
        dropped_notes = report.dropped_notes.len(),
        dropped_conditions = report.dropped_conditions.len(),
        "stored chart repaired on load"
    );
}
