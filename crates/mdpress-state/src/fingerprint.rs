//! Content fingerprinting.
//!
//! Fingerprints are hex-encoded SHA-256 digests of a document's raw bytes.
//! They form the content component of the skip-decision key: a single changed
//! byte produces a different fingerprint and forces regeneration.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Fingerprint an in-memory byte slice.
#[must_use]
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Fingerprint a file on disk, reading it in chunks.
///
/// Used both for source documents and for verifying generated artifacts.
pub fn fingerprint_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = fingerprint_bytes(b"# Title\n");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint_bytes(b"same"), fingerprint_bytes(b"same"));
    }

    #[test]
    fn test_single_byte_change_alters_fingerprint() {
        assert_ne!(fingerprint_bytes(b"version a"), fingerprint_bytes(b"version b"));
    }

    #[test]
    fn test_file_matches_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("doc.md");
        std::fs::write(&path, b"# Heading\n\nbody\n").unwrap();

        let from_file = fingerprint_file(&path).unwrap();
        let from_bytes = fingerprint_bytes(b"# Heading\n\nbody\n");
        assert_eq!(from_file, from_bytes);
    }

    #[test]
    fn test_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(fingerprint_file(&tmp.path().join("absent.md")).is_err());
    }
}
