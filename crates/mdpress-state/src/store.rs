//! Durable state store backed by one JSON file per record.
//!
//! Directory layout:
//! ```text
//! {root}/
//! +-- guide.pdf.json        # record for ("guide", Pdf)
//! +-- guide.epub.json       # record for ("guide", Epub)
//! +-- api_reference.pdf.json
//! ```
//!
//! One file per `(identity, output_kind)` keeps concurrent upserts for
//! distinct documents from ever touching the same path. Each upsert writes a
//! sibling temp file and renames it into place, so readers never observe a
//! half-written record.

use std::fs;
use std::path::PathBuf;

use crate::record::{DocumentRecord, OutputKind};

/// Error raised by state store operations.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("state store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state record serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Contract for the conversion state store.
///
/// `lookup` never fails: an unreadable or corrupted record is reported as
/// absent, which forces regeneration rather than a crash or a silent skip.
pub trait StateStore: Send + Sync {
    /// Fetch the record for a document and output kind, if one exists.
    fn lookup(&self, identity: &str, output_kind: OutputKind) -> Option<DocumentRecord>;

    /// Insert or replace the record for `(record.identity, record.output_kind)`.
    fn upsert(&self, record: &DocumentRecord) -> Result<(), StateStoreError>;

    /// Remove every record, returning how many were removed.
    ///
    /// Used by the "clear cache" control surface to force full regeneration.
    fn clear_all(&self) -> Result<usize, StateStoreError>;
}

/// File-backed [`StateStore`] rooted at a directory on disk.
pub struct FileStateStore {
    root: PathBuf,
}

impl FileStateStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StateStoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn record_path(&self, identity: &str, output_kind: OutputKind) -> PathBuf {
        // Identities are path-derived; flatten separators so every record
        // lives directly under the root.
        let safe: String = identity
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.root.join(format!("{safe}.{output_kind}.json"))
    }
}

impl StateStore for FileStateStore {
    fn lookup(&self, identity: &str, output_kind: OutputKind) -> Option<DocumentRecord> {
        let path = self.record_path(identity, output_kind);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("unreadable state record {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("corrupt state record {}: {e}", path.display());
                None
            }
        }
    }

    fn upsert(&self, record: &DocumentRecord) -> Result<(), StateStoreError> {
        let path = self.record_path(&record.identity, record.output_kind);
        let json = serde_json::to_vec_pretty(record)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear_all(&self) -> Result<usize, StateStoreError> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            match path.extension() {
                Some(ext) if ext == "json" => {
                    fs::remove_file(&path)?;
                    removed += 1;
                }
                // Leftover from an interrupted upsert; swept but not counted.
                Some(ext) if ext == "tmp" => fs::remove_file(&path)?,
                _ => {}
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record(identity: &str, kind: OutputKind, fingerprint: &str) -> DocumentRecord {
        DocumentRecord {
            identity: identity.to_owned(),
            output_kind: kind,
            content_fingerprint: fingerprint.to_owned(),
            profile: "a4-print".to_owned(),
            output_fingerprint: Some("out-hash".to_owned()),
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_lookup_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();
        assert_eq!(store.lookup("guide", OutputKind::Pdf), None);
    }

    #[test]
    fn test_upsert_then_lookup() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();

        let rec = record("guide", OutputKind::Pdf, "fp1");
        store.upsert(&rec).unwrap();
        assert_eq!(store.lookup("guide", OutputKind::Pdf), Some(rec));
    }

    #[test]
    fn test_upsert_is_replace() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();

        store.upsert(&record("guide", OutputKind::Pdf, "fp1")).unwrap();
        store.upsert(&record("guide", OutputKind::Pdf, "fp2")).unwrap();

        let current = store.lookup("guide", OutputKind::Pdf).unwrap();
        assert_eq!(current.content_fingerprint, "fp2");
    }

    #[test]
    fn test_upsert_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();

        let rec = record("guide", OutputKind::Pdf, "fp1");
        store.upsert(&rec).unwrap();
        store.upsert(&rec).unwrap();
        assert_eq!(store.lookup("guide", OutputKind::Pdf), Some(rec));
    }

    #[test]
    fn test_output_kinds_are_independent() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();

        store.upsert(&record("guide", OutputKind::Pdf, "fp-pdf")).unwrap();
        store.upsert(&record("guide", OutputKind::Epub, "fp-epub")).unwrap();

        assert_eq!(
            store.lookup("guide", OutputKind::Pdf).unwrap().content_fingerprint,
            "fp-pdf"
        );
        assert_eq!(
            store.lookup("guide", OutputKind::Epub).unwrap().content_fingerprint,
            "fp-epub"
        );
        assert_eq!(store.lookup("guide", OutputKind::Mobi), None);
    }

    #[test]
    fn test_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("state");

        let store = FileStateStore::open(&root).unwrap();
        store.upsert(&record("guide", OutputKind::Pdf, "fp1")).unwrap();
        drop(store);

        let reopened = FileStateStore::open(&root).unwrap();
        assert!(reopened.lookup("guide", OutputKind::Pdf).is_some());
    }

    #[test]
    fn test_corrupt_record_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("state");
        let store = FileStateStore::open(&root).unwrap();

        store.upsert(&record("guide", OutputKind::Pdf, "fp1")).unwrap();
        fs::write(root.join("guide.pdf.json"), b"{ not json").unwrap();

        assert_eq!(store.lookup("guide", OutputKind::Pdf), None);
    }

    #[test]
    fn test_clear_all_counts_and_empties() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();

        store.upsert(&record("a", OutputKind::Pdf, "fp")).unwrap();
        store.upsert(&record("b", OutputKind::Epub, "fp")).unwrap();

        assert_eq!(store.clear_all().unwrap(), 2);
        assert_eq!(store.lookup("a", OutputKind::Pdf), None);
        assert_eq!(store.lookup("b", OutputKind::Epub), None);
        assert_eq!(store.clear_all().unwrap(), 0);
    }

    #[test]
    fn test_clear_all_sweeps_stale_tmp_files() {
        let tmp = TempDir::new().unwrap();
        let state_dir = tmp.path().join("state");
        let store = FileStateStore::open(&state_dir).unwrap();

        store.upsert(&record("a", OutputKind::Pdf, "fp")).unwrap();
        // Simulate an upsert interrupted between write and rename
        let stale = state_dir.join("b.pdf.json.tmp");
        std::fs::write(&stale, b"{").unwrap();

        assert_eq!(store.clear_all().unwrap(), 1);
        assert!(!stale.exists());
    }

    #[test]
    fn test_nested_identity_stays_in_root() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();

        let rec = record("docs/nested/guide", OutputKind::Pdf, "fp1");
        store.upsert(&rec).unwrap();
        assert_eq!(store.lookup("docs/nested/guide", OutputKind::Pdf), Some(rec));
    }

    #[test]
    fn test_concurrent_upserts_distinct_identities() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::open(tmp.path().join("state")).unwrap();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    let rec = record(&format!("doc-{i}"), OutputKind::Pdf, &format!("fp-{i}"));
                    store.upsert(&rec).unwrap();
                });
            }
        });

        for i in 0..8 {
            let rec = store.lookup(&format!("doc-{i}"), OutputKind::Pdf).unwrap();
            assert_eq!(rec.content_fingerprint, format!("fp-{i}"));
        }
    }
}
