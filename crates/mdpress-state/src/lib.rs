//! Conversion state tracking for mdpress.
//!
//! This crate decides whether a document needs to be converted again. It
//! provides:
//!
//! - [`fingerprint_bytes`] / [`fingerprint_file`]: SHA-256 content hashing
//! - [`DocumentRecord`]: the persisted state of one successful conversion
//! - [`StateStore`]: the lookup/upsert/clear contract
//! - [`FileStateStore`]: durable implementation backed by one JSON file per
//!   `(identity, output kind)` pair
//!
//! A record is only ever written after the external converter reported
//! success, so the store never claims work that did not happen. A store that
//! cannot be read is treated as empty: regenerating is always safe, silently
//! skipping is not.

mod fingerprint;
mod record;
mod store;

pub use fingerprint::{fingerprint_bytes, fingerprint_file};
pub use record::{DocumentRecord, OutputKind};
pub use store::{FileStateStore, StateStore, StateStoreError};
