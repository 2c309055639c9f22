//! Record loading operations.

use super::Envelope;
use super::digest::compute_digest;
use crate::error::{PersistenceError, Result};
use crate::store::{KeyValueStore, validate_patient_id};
use crate::types::{
    CURRENT_SCHEMA_VERSION, FORMAT_TAG, LAST_PATIENT_KEY, PATIENT_KEY_PREFIX, PatientRecord,
    patient_key,
};

/// Load the record stored for `patient_id`.
///
/// Records written without an envelope (plain record JSON, as older charting
/// front ends stored them) are accepted without digest verification.
pub fn load_record<S: KeyValueStore + ?Sized>(store: &S, patient_id: &str) -> Result<PatientRecord> {
    validate_patient_id(patient_id)?;
    let key = patient_key(patient_id);
    let text = store
        .get(&key)?
        .ok_or_else(|| PersistenceError::NotFound { key: key.clone() })?;

    let mut record = parse_record(&text, &key)?;
    if record.patient_id.is_empty() {
        record.patient_id = patient_id.to_string();
    }
    tracing::info!(patient = %patient_id, key, "loaded patient record");
    Ok(record)
}

/// Load a record asynchronously on the blocking thread pool.
pub async fn load_record_async<S>(store: S, patient_id: String) -> Result<PatientRecord>
where
    S: KeyValueStore + Send + 'static,
{
    tokio::task::spawn_blocking(move || load_record(&store, &patient_id))
        .await
        .map_err(|e| PersistenceError::Deserialization {
            source: Box::new(e),
        })?
}

/// Patient ids with a stored record, sorted.
pub fn list_patients<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<String>> {
    Ok(store
        .keys()?
        .into_iter()
        .filter_map(|key| key.strip_prefix(PATIENT_KEY_PREFIX).map(str::to_string))
        .collect())
}

/// The patient saved most recently, if any.
pub fn last_patient_id<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<String>> {
    Ok(store
        .get(LAST_PATIENT_KEY)?
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty()))
}

/// Parse stored text and validate the envelope.
fn parse_record(text: &str, key: &str) -> Result<PatientRecord> {
    let invalid = |reason: String| PersistenceError::InvalidFormat {
        key: key.to_string(),
        reason,
    };

    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| invalid(format!("not JSON: {e}")))?;

    let Some(format) = envelope.format else {
        return deserialize(text);
    };
    if format != FORMAT_TAG {
        return Err(invalid(format!("unexpected format tag {format:?}")));
    }

    let version = envelope
        .version
        .ok_or_else(|| invalid("missing version".to_string()))?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: version,
            max_supported: CURRENT_SCHEMA_VERSION,
            key: key.to_string(),
        });
    }

    let record = envelope
        .record
        .ok_or_else(|| invalid("missing record".to_string()))?;
    if let Some(expected) = envelope.digest {
        let actual = compute_digest(record.get());
        if !actual.eq_ignore_ascii_case(&expected) {
            return Err(PersistenceError::DigestMismatch {
                key: key.to_string(),
                expected,
                actual,
            });
        }
    }

    deserialize(record.get())
}

fn deserialize(text: &str) -> Result<PatientRecord> {
    serde_json::from_str(text).map_err(|e| PersistenceError::Deserialization {
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::save::save_record;
    use crate::store::MemoryStore;

    #[test]
    fn test_load_record_round_trip() {
        let mut store = MemoryStore::new();
        let mut record = PatientRecord::new("p-100");
        record
            .extra
            .insert("treatmentPlan".to_string(), serde_json::json!([{"code": "D2740"}]));
        save_record(&mut store, &mut record).unwrap();

        let loaded = load_record(&store, "p-100").unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.extra["treatmentPlan"][0]["code"], "D2740");
    }

    #[test]
    fn test_load_missing_record() {
        let store = MemoryStore::new();
        assert!(matches!(
            load_record(&store, "p-404"),
            Err(PersistenceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_invalid_format() {
        let mut store = MemoryStore::new();
        store.put("dentalPatientData-p-1", "NOT JSON").unwrap();
        store
            .put("dentalPatientData-p-2", r#"{"format":"spreadsheet","version":1}"#)
            .unwrap();
        for id in ["p-1", "p-2"] {
            assert!(matches!(
                load_record(&store, id),
                Err(PersistenceError::InvalidFormat { .. })
            ));
        }
    }

    #[test]
    fn test_load_unsupported_version() {
        let mut store = MemoryStore::new();
        store
            .put(
                "dentalPatientData-p-1",
                r#"{"format":"dental-chart-studio/patient","version":999,"record":{}}"#,
            )
            .unwrap();
        assert!(matches!(
            load_record(&store, "p-1"),
            Err(PersistenceError::UnsupportedVersion { found: 999, .. })
        ));
    }

    #[test]
    fn test_load_legacy_record_without_envelope() {
        let mut store = MemoryStore::new();
        store
            .put(
                "dentalPatientData-p-7",
                r#"{"currentChart":{"dentitionMode":"primary","teeth":{}},"billingLog":[]}"#,
            )
            .unwrap();
        let record = load_record(&store, "p-7").unwrap();
        assert_eq!(record.patient_id, "p-7");
        assert_eq!(record.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(record.extra.contains_key("billingLog"));
    }

    #[test]
    fn test_list_patients() {
        let mut store = MemoryStore::new();
        save_record(&mut store, &mut PatientRecord::new("b")).unwrap();
        save_record(&mut store, &mut PatientRecord::new("a")).unwrap();
        assert_eq!(list_patients(&store).unwrap(), vec!["a", "b"]);
        assert_eq!(last_patient_id(&store).unwrap().as_deref(), Some("a"));
    }
}
