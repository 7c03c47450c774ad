//! Cycle Report Archive
//!
//! Persists completed cycle reports to Sled DB so the audit trail survives
//! restarts. Keys are the run timestamp (milliseconds) followed by the run
//! id, both big-endian, so iteration is chronological and two runs sharing a
//! millisecond never collide.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::CycleReport;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive database error: {0}")]
    Database(#[from] sled::Error),

    #[error("archive serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn timestamp_prefix(timestamp: DateTime<Utc>) -> [u8; 8] {
    // Pre-1970 timestamps sort first
    u64::try_from(timestamp.timestamp_millis())
        .unwrap_or(0)
        .to_be_bytes()
}

fn report_key(report: &CycleReport) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&timestamp_prefix(report.timestamp));
    key[8..].copy_from_slice(&report.run_id.to_be_bytes());
    key
}

/// Chronological store of cycle reports.
#[derive(Clone)]
pub struct RunArchive {
    db: Arc<sled::Db>,
}

impl RunArchive {
    /// Open or create the archive at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let db = sled::open(path)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Store a cycle report.
    ///
    /// Does not flush; sled flushes in the background and `flush()` is
    /// available for shutdown.
    pub fn store(&self, report: &CycleReport) -> Result<(), ArchiveError> {
        let value = serde_json::to_vec(report)?;
        self.db.insert(report_key(report), value)?;
        debug!(run_id = report.run_id, "Cycle report archived");
        Ok(())
    }

    /// The most recent `limit` reports, newest first. Unreadable entries are
    /// skipped.
    pub fn recent(&self, limit: usize) -> Vec<CycleReport> {
        self.db
            .iter()
            .rev()
            .filter_map(|item| item.ok())
            .filter_map(|(_key, value)| serde_json::from_slice::<CycleReport>(&value).ok())
            .take(limit)
            .collect()
    }

    /// Reports with `start <= timestamp < end`, oldest first.
    pub fn range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<CycleReport> {
        self.db
            .range(timestamp_prefix(start)..timestamp_prefix(end))
            .filter_map(|item| item.ok())
            .filter_map(|(_key, value)| serde_json::from_slice::<CycleReport>(&value).ok())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.db.len()
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<(), ArchiveError> {
        self.db.flush()?;
        Ok(())
    }

    /// Delete reports older than `cutoff`. Returns how many were removed.
    pub fn cleanup_before(&self, cutoff: DateTime<Utc>) -> Result<usize, ArchiveError> {
        let cutoff_key = timestamp_prefix(cutoff);
        let stale: Vec<sled::IVec> = self
            .db
            .range(..cutoff_key)
            .keys()
            .filter_map(|key| key.ok())
            .collect();

        for key in &stale {
            self.db.remove(key)?;
        }
        if !stale.is_empty() {
            self.db.flush()?;
        }
        Ok(stale.len())
    }
}
