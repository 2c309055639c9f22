//! Persistence error types.
//!
//! Every store and record operation returns a structured error with a
//! user-facing message and, where one exists, a remediation hint. None of
//! them touch the in-memory chart.

use std::path::PathBuf;

use thiserror::Error;

use dcs_core::ChartError;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No value stored under the key.
    #[error("No record stored under {key}")]
    NotFound { key: String },

    /// Patient ids become store keys and file names.
    #[error("Invalid patient id {id:?}")]
    InvalidPatientId { id: String },

    /// The stored value is not a patient record.
    #[error("Invalid patient record format")]
    InvalidFormat { key: String, reason: String },

    /// Record written by a newer schema.
    #[error("Patient record version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        key: String,
    },

    /// The record text no longer matches the digest written with it.
    #[error("Patient record digest mismatch for {key}")]
    DigestMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    /// No chart snapshot with that name.
    #[error("Snapshot not found: {name}")]
    SnapshotNotFound { name: String },

    /// The stored chart could not be laid onto a fresh chart.
    #[error("Failed to restore stored chart")]
    Restore {
        #[source]
        source: ChartError,
    },

    /// Serialization error.
    #[error("Failed to serialize patient record")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("Failed to deserialize patient record")]
    Deserialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::NotFound { key } => {
                format!("No saved chart was found for {key}.")
            }
            Self::InvalidPatientId { id } => {
                format!("'{id}' cannot be used as a patient identifier.")
            }
            Self::InvalidFormat { key, reason } => {
                format!("The data stored under {key} is not a valid patient record: {reason}")
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
                ..
            } => {
                format!(
                    "This patient record was saved by a newer version of Dental Chart Studio \
                    (record version {found}, your version supports up to {max_supported}). \
                    Please update the application."
                )
            }
            Self::DigestMismatch { key, .. } => {
                format!("The record stored under {key} was modified outside the application.")
            }
            Self::SnapshotNotFound { name } => {
                format!("There is no saved snapshot named '{name}'.")
            }
            Self::Restore { .. } => {
                "The saved chart does not match the dental layout and could not be opened."
                    .to_string()
            }
            Self::Serialization { .. } => {
                "An error occurred while saving the patient record.".to_string()
            }
            Self::Deserialization { .. } => {
                "An error occurred while reading the patient record. The data may be corrupted."
                    .to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::NotFound { .. } => Some("Check the patient id, or start a new chart.".into()),
            Self::InvalidPatientId { .. } => {
                Some("Use letters, digits, '-' and '_' only.".into())
            }
            Self::InvalidFormat { .. } | Self::DigestMismatch { .. } => {
                Some("Restore the record from a backup if you have one.".into())
            }
            Self::UnsupportedVersion { .. } => {
                Some("Install the latest version of Dental Chart Studio.".into())
            }
            Self::SnapshotNotFound { .. } => {
                Some("List the saved snapshots to see the available names.".into())
            }
            Self::Restore { .. } => Some("Switch the load policy to repair and retry.".into()),
            Self::Serialization { .. } => None,
            Self::Deserialization { .. } => Some("Try opening a backup if you have one.".into()),
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
