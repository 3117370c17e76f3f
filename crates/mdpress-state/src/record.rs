//! Persisted conversion record types.

use serde::{Deserialize, Serialize};

/// Output document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Print-oriented PDF.
    Pdf,
    /// EPUB ebook.
    Epub,
    /// MOBI ebook (produced by converting an EPUB intermediate).
    Mobi,
}

impl OutputKind {
    /// Parse an output kind from its CLI/config name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(Self::Pdf),
            "epub" => Some(Self::Epub),
            "mobi" => Some(Self::Mobi),
            _ => None,
        }
    }

    /// Canonical lowercase name, also used as the artifact file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::Mobi => "mobi",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one document's last successful conversion for one output kind.
///
/// There is at most one current record per `(identity, output_kind)`; writes
/// are upserts. Records are written only after the external converter
/// succeeded, never speculatively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable path-derived document key.
    pub identity: String,
    /// Output kind this record covers.
    pub output_kind: OutputKind,
    /// Fingerprint of the source bytes at last successful conversion.
    pub content_fingerprint: String,
    /// Style/device profile used for that conversion.
    pub profile: String,
    /// Fingerprint of the generated artifact, when it could be computed.
    /// Used to detect external tampering or deletion of the output.
    pub output_fingerprint: Option<String>,
    /// Unix timestamp (seconds) of the successful conversion.
    pub updated_at: u64,
}
