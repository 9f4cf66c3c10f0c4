use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, StatsError};
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Ready,
    Waiting,
    Busy,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Ready => "ready",
            JobStatus::Waiting => "waiting",
            JobStatus::Busy => "busy",
            JobStatus::Error => "error",
        }
    }

    /// Whether a new job may be submitted from this state.
    pub fn accepts_submission(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Error)
    }
}

/// What the engine writes on every status round trip.
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub tweets_done: u64,
    pub until_date: String,
    pub report: Option<Report>,
    pub error_msg: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: JobStatus) -> Self {
        Self { status, ..Default::default() }
    }

    pub fn progress(tweets_done: u64, until_date: String) -> Self {
        Self { status: JobStatus::Busy, tweets_done, until_date, ..Default::default() }
    }

    pub fn error(msg: String) -> Self {
        Self { status: JobStatus::Error, error_msg: Some(msg), ..Default::default() }
    }

    pub fn finished(report: Report) -> Self {
        Self { status: JobStatus::Ready, report: Some(report), ..Default::default() }
    }
}

/// Status document as shown to the job's owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDoc {
    pub status: JobStatus,
    pub tweets_done: u64,
    pub until_date: String,
    pub error_msg: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusRecord {
    pub userid: String,
    pub status: StatusDoc,
    pub report: Option<Report>,
    pub last_generated: Option<DateTime<Utc>>,
    pub cancel: bool,
}

impl StatusRecord {
    fn apply(&mut self, update: StatusUpdate) {
        self.status = StatusDoc {
            status: update.status,
            tweets_done: update.tweets_done,
            until_date: update.until_date,
            error_msg: update.error_msg,
        };
        // every new job starts uncanceled
        if update.status == JobStatus::Waiting {
            self.cancel = false;
        }
        if let Some(report) = update.report {
            self.report = Some(report);
            self.last_generated = Some(Utc::now());
        }
    }
}

/// External record of a user's job status, shared with whoever may set the
/// cancel flag.
pub trait StatusStore {
    /// Overwrite the status and return the record as it now stands,
    /// including the current cancel flag.
    fn update(&self, userid: &str, update: StatusUpdate) -> Result<StatusRecord>;
}

#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    records: Mutex<HashMap<String, StatusRecord>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, userid: &str) {
        let mut records = self.lock();
        records.entry(userid.to_string()).or_insert_with(|| StatusRecord {
            userid: userid.to_string(),
            ..Default::default()
        });
    }

    /// `ready|error -> waiting`. Rejected while a job is queued or running.
    pub fn submit(&self, userid: &str) -> Result<StatusRecord> {
        let current = self.get(userid)?;
        if !current.status.status.accepts_submission() {
            return Err(StatsError::JobActive(userid.to_string()));
        }
        self.update(userid, StatusUpdate::new(JobStatus::Waiting))
    }

    pub fn request_cancel(&self, userid: &str) -> Result<()> {
        let mut records = self.lock();
        let rec = records.get_mut(userid).ok_or_else(|| StatsError::UnknownUser(userid.to_string()))?;
        rec.cancel = true;
        Ok(())
    }

    pub fn get(&self, userid: &str) -> Result<StatusRecord> {
        self.lock()
            .get(userid)
            .cloned()
            .ok_or_else(|| StatsError::UnknownUser(userid.to_string()))
    }

    /// What the owner sees. An error is shown once and then cleared to ready.
    pub fn view(&self, userid: &str) -> Result<StatusDoc> {
        let mut records = self.lock();
        let rec = records.get_mut(userid).ok_or_else(|| StatsError::UnknownUser(userid.to_string()))?;
        let shown = rec.status.clone();
        if shown.status == JobStatus::Error {
            rec.status = StatusDoc::default();
        }
        Ok(shown)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StatusRecord>> {
        // a panicked writer leaves plain data behind; keep serving it
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StatusStore for MemoryStatusStore {
    fn update(&self, userid: &str, update: StatusUpdate) -> Result<StatusRecord> {
        let mut records = self.lock();
        let rec = records.get_mut(userid).ok_or_else(|| StatsError::UnknownUser(userid.to_string()))?;
        rec.apply(update);
        Ok(rec.clone())
    }
}

impl<S: StatusStore + ?Sized> StatusStore for &S {
    fn update(&self, userid: &str, update: StatusUpdate) -> Result<StatusRecord> {
        (**self).update(userid, update)
    }
}

impl<S: StatusStore + ?Sized> StatusStore for std::sync::Arc<S> {
    fn update(&self, userid: &str, update: StatusUpdate) -> Result<StatusRecord> {
        (**self).update(userid, update)
    }
}
