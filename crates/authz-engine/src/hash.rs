//! Hashing utilities for rule set fingerprints.

use sha2::{Digest, Sha256};

/// Prefix of rule set fingerprints.
pub const RULE_SET_PREFIX: &str = "r:";

/// Computes SHA-256 hash of data and returns hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Computes SHA-256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    sha256_hex(s.as_bytes())
}

/// Computes a rule set fingerprint from its canonical form.
pub fn compute_fingerprint(canonical: &str) -> String {
    format!("{}{}", RULE_SET_PREFIX, sha256_str(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256_str("hello");
        assert_eq!(hash.len(), 64); // SHA-256 is 32 bytes = 64 hex chars
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_fingerprint() {
        let fingerprint = compute_fingerprint("[]");
        assert!(fingerprint.starts_with(RULE_SET_PREFIX));
        assert_eq!(fingerprint, compute_fingerprint("[]"));
        assert_ne!(fingerprint, compute_fingerprint("[{}]"));
    }
}
