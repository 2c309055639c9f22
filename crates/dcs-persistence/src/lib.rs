//! Persistent storage for Dental Chart Studio patient records.
//!
//! Charts are stored one JSON record per patient in a string key-value
//! store, under `dentalPatientData-<id>`, with `lastPatientId` naming the
//! patient saved last.
//!
//! # Features
//!
//! - **Atomic writes** in the file store to prevent data corruption
//! - **SHA-256 digests** over the stored record text
//! - **Sibling data preserved** for tools sharing the record
//! - **Auto-save** with debounce and a maximum delay
//!
//! # Record Format
//!
//! ```text
//! {
//!   "format": "dental-chart-studio/patient",
//!   "version": 1,
//!   "digest": "<sha-256 hex of the record text>",
//!   "record": { "currentChart": ..., "perio": ..., "snapshots": [...], ... }
//! }
//! ```
//!
//! Bare records without the envelope are still read.
//!
//! # Architecture
//!
//! - `types/` - patient record and chart snapshots
//! - `store/` - key-value store trait, file and memory stores
//! - `io/` - save, load and digest
//! - `autosave/` - auto-save infrastructure (DirtyTracker, config)
//! - `convert.rs` - moving charts between the engine and records
//! - `error.rs` - error types with user-friendly messages

mod autosave;
mod convert;
mod error;
mod io;
mod store;
mod types;

pub use autosave::{AutoSaveConfig, DirtyTracker};
pub use error::{PersistenceError, Result};
pub use io::{
    compute_digest, last_patient_id, list_patients, load_record, load_record_async, save_record,
    save_record_async, verify_digest,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, validate_patient_id};
pub use types::{
    CURRENT_SCHEMA_VERSION, ChartSnapshot, FORMAT_TAG, LAST_PATIENT_KEY, PATIENT_KEY_PREFIX,
    PatientRecord, patient_key,
};
