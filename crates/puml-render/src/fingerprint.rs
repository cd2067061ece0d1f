//! Content fingerprint used as cache key and artifact filename stem.

use sha2::{Digest, Sha256};

/// Compute the fingerprint of a diagram source.
///
/// Hex-encoded SHA-256 of the exact UTF-8 bytes of `source`. The result is
/// always 64 characters, so it doubles as a filename stem.
#[must_use]
pub fn fingerprint(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint("@startuml\nA -> B\n@enduml");
        let b = fingerprint("@startuml\nA -> B\n@enduml");
        let c = fingerprint("@startuml\nC -> D\n@enduml");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_known_value() {
        // sha256("") is a fixed, well-known digest
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_fixed_length() {
        let long = "A -> B\n".repeat(10_000);
        for source in ["", "x", long.as_str()] {
            let hash = fingerprint(source);
            assert_eq!(hash.len(), 64, "SHA-256 hash should be 64 hex characters");
            assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_fingerprint_whitespace_matters() {
        assert_ne!(fingerprint("A -> B"), fingerprint("A -> B\n"));
        assert_ne!(fingerprint("A -> B\n"), fingerprint("A -> B\r\n"));
    }
}
