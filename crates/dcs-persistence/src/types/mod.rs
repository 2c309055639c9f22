//! Persisted patient record types.
//!
//! A record is plain JSON: the current chart, the periodontal chart, named
//! snapshots, and any sibling data other tools keep under the same key
//! (treatment plans, procedure logs, appointments), preserved verbatim.

mod record;
mod snapshot;

pub use record::PatientRecord;
pub use snapshot::ChartSnapshot;

/// Current schema version.
///
/// The loader rejects records with a version above this one.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Format tag written into every record envelope.
pub const FORMAT_TAG: &str = "dental-chart-studio/patient";

/// Store key prefix for patient records.
pub const PATIENT_KEY_PREFIX: &str = "dentalPatientData-";

/// Store key holding the id of the most recently saved patient.
pub const LAST_PATIENT_KEY: &str = "lastPatientId";

/// Store key for a patient's record.
pub fn patient_key(patient_id: &str) -> String {
    format!("{PATIENT_KEY_PREFIX}{patient_id}")
}
