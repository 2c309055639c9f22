//! Key-value stores for patient records.
//!
//! - `FileStore` - one JSON file per key, written atomically
//! - `MemoryStore` - in-process map, for tests and scripted sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{PersistenceError, Result};

/// String key-value storage, the shape of a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Returns whether a value was removed.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// Every stored key, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Check that a patient id can be embedded in a store key.
pub fn validate_patient_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidPatientId { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_ids_are_restricted() {
        assert!(validate_patient_id("p-100_a").is_ok());
        assert!(validate_patient_id("").is_err());
        assert!(validate_patient_id("../etc").is_err());
        assert!(validate_patient_id("a b").is_err());
    }
}
