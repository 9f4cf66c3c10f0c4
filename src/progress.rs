use crate::engine::JobState;
use crate::error::Result;
use crate::status::{JobStatus, StatusStore, StatusUpdate};

/// Whether processing should go on after a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Canceled,
}

/// Called by the engine at every checkpoint.
pub trait Checkpoint {
    fn checkpoint(&mut self, state: &JobState) -> Result<Flow>;
}

/// Runs without a status store and is never canceled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn checkpoint(&mut self, _state: &JobState) -> Result<Flow> {
        Ok(Flow::Continue)
    }
}

/// Reports progress to a status store and polls its cancel flag.
pub struct ProgressMonitor<S: StatusStore> {
    store: S,
    userid: String,
    checkpoints: u64,
}

impl<S: StatusStore> ProgressMonitor<S> {
    pub fn new(store: S, userid: &str) -> Self {
        Self { store, userid: userid.to_string(), checkpoints: 0 }
    }

    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }
}

impl<S: StatusStore> Checkpoint for ProgressMonitor<S> {
    fn checkpoint(&mut self, state: &JobState) -> Result<Flow> {
        self.checkpoints += 1;
        let until_date = state
            .oldest_timestamp
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let rec = self
            .store
            .update(&self.userid, StatusUpdate::progress(state.row_count, until_date.clone()))?;
        tracing::debug!(user = %self.userid, rows = state.row_count, until = %until_date, "checkpoint");
        if rec.cancel {
            self.store.update(&self.userid, StatusUpdate::new(JobStatus::Ready))?;
            return Ok(Flow::Canceled);
        }
        Ok(Flow::Continue)
    }
}
