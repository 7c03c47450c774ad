//! Run History
//!
//! Process-wide audit log of completed run states. Appends are serialized
//! behind a mutex so concurrent runs never interleave partial entries. The
//! log is bounded: once `capacity` is reached the oldest entry is evicted.
//! When an archive is attached every appended run is also written to disk
//! as a cycle report.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{CycleReport, PipelineState};
use crate::storage::RunArchive;

#[derive(Clone)]
pub struct RunHistory {
    entries: Arc<Mutex<VecDeque<PipelineState>>>,
    capacity: usize,
    archive: Option<RunArchive>,
}

impl RunHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: RunArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn archive(&self) -> Option<&RunArchive> {
        self.archive.as_ref()
    }

    /// Record a completed run. Archive failures are logged; the in-memory
    /// append always happens.
    pub fn append(&self, state: PipelineState) {
        if let Some(archive) = &self.archive {
            if let Err(e) = archive.store(&CycleReport::from(&state)) {
                warn!(run_id = state.run_id, error = %e, "Failed to archive cycle report");
            }
        }

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(state);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recently appended run.
    pub fn latest(&self) -> Option<PipelineState> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .back()
            .cloned()
    }

    /// Up to `limit` runs, newest first.
    pub fn recent(&self, limit: usize) -> Vec<PipelineState> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }
}
