//! Record saving operations.

use serde_json::value::to_raw_value;

use super::Envelope;
use super::digest::compute_digest;
use crate::error::{PersistenceError, Result};
use crate::store::{KeyValueStore, validate_patient_id};
use crate::types::{CURRENT_SCHEMA_VERSION, FORMAT_TAG, LAST_PATIENT_KEY, PatientRecord, patient_key};

/// Save a record under `dentalPatientData-<id>` and remember it as the last
/// patient.
pub fn save_record<S: KeyValueStore + ?Sized>(store: &mut S, record: &mut PatientRecord) -> Result<()> {
    validate_patient_id(&record.patient_id)?;
    record.touch();
    record.schema_version = CURRENT_SCHEMA_VERSION;

    let text = serialize_record(record)?;
    let key = patient_key(&record.patient_id);
    store.put(&key, &text)?;
    store.put(LAST_PATIENT_KEY, &record.patient_id)?;

    tracing::info!(patient = %record.patient_id, key, "saved patient record");
    Ok(())
}

/// Save a record asynchronously.
///
/// Spawns the save on the blocking thread pool so the async runtime is
/// never blocked by disk writes. Returns the record with its updated
/// timestamps.
pub async fn save_record_async<S>(store: S, record: PatientRecord) -> Result<PatientRecord>
where
    S: KeyValueStore + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut store = store;
        let mut record = record;
        save_record(&mut store, &mut record).map(|()| record)
    })
    .await
    .map_err(|e| PersistenceError::Serialization {
        source: Box::new(e),
    })?
}

/// Serialize a record into its envelope.
///
/// Format:
/// - `format`: [`FORMAT_TAG`]
/// - `version`: schema version
/// - `digest`: SHA-256 of the `record` text
/// - `record`: the patient record
fn serialize_record(record: &PatientRecord) -> Result<String> {
    let raw = to_raw_value(record).map_err(|e| PersistenceError::Serialization {
        source: Box::new(e),
    })?;
    let envelope = Envelope {
        format: Some(FORMAT_TAG.to_string()),
        version: Some(CURRENT_SCHEMA_VERSION),
        digest: Some(compute_digest(raw.get())),
        record: Some(raw),
    };
    serde_json::to_string(&envelope).map_err(|e| PersistenceError::Serialization {
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_save_record() {
        let mut store = MemoryStore::new();
        let mut record = PatientRecord::new("p-100");
        save_record(&mut store, &mut record).unwrap();

        let text = store.get("dentalPatientData-p-100").unwrap().unwrap();
        assert!(text.starts_with(r#"{"format":"dental-chart-studio/patient","version":1,"digest":""#));
        assert_eq!(store.get("lastPatientId").unwrap().as_deref(), Some("p-100"));
    }

    #[test]
    fn test_save_rejects_bad_patient_id() {
        let mut store = MemoryStore::new();
        let mut record = PatientRecord::new("");
        assert!(matches!(
            save_record(&mut store, &mut record),
            Err(PersistenceError::InvalidPatientId { .. })
        ));
        assert!(store.keys().unwrap().is_empty());
    }
}
