//! Persistent Storage
//!
//! Optional on-disk audit trail of completed evaluation cycles, backed by
//! Sled DB. The in-memory run history works without it.

mod archive;

pub use archive::{ArchiveError, RunArchive};
