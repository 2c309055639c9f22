//! Record I/O against a key-value store.
//!
//! This module handles:
//! - Saving records inside a digest envelope
//! - Loading records with format, version and digest validation
//! - Listing patients and the last opened patient

mod digest;
mod load;
mod save;

pub use digest::{compute_digest, verify_digest};
pub use load::{last_patient_id, list_patients, load_record, load_record_async};
pub use save::{save_record, save_record_async};

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Stored form of a record.
///
/// `record` is kept as raw JSON text so the digest covers exactly the bytes
/// that were written.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    digest: Option<String>,
    #[serde(default)]
    record: Option<Box<RawValue>>,
}
