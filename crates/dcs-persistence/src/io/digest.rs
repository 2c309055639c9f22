//! Record digests for tamper and corruption detection.

use sha2::{Digest, Sha256};

/// SHA-256 of `text`, hex encoded.
pub fn compute_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `text` hashes to `expected`.
pub fn verify_digest(text: &str, expected: &str) -> bool {
    compute_digest(text).eq_ignore_ascii_case(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_digest() {
        // Known SHA-256 hash for "Hello, World!"
        assert_eq!(
            compute_digest("Hello, World!"),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn test_verify_digest() {
        let digest = compute_digest("{\"a\":1}");
        assert!(verify_digest("{\"a\":1}", &digest));
        assert!(verify_digest("{\"a\":1}", &digest.to_uppercase()));
        assert!(!verify_digest("{\"a\":2}", &digest));
    }
}
