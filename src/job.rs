use csv::StringRecord;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use crate::archive::TweetArchive;
use crate::config::StatsOpts;
use crate::engine::Aggregator;
use crate::error::Result;
use crate::progress::{Flow, ProgressMonitor};
use crate::report::Report;
use crate::status::{JobStatus, StatusStore, StatusUpdate};

/// How a job ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed { rows: u64, report: Report },
    Canceled { rows: u64 },
}

/// One report run for one user over one archive.
pub struct StatsJob<S: StatusStore> {
    userid: String,
    archive: PathBuf,
    opts: StatsOpts,
    store: S,
}

impl<S: StatusStore + Clone> StatsJob<S> {
    pub fn new(userid: &str, archive: impl AsRef<Path>, opts: StatsOpts, store: S) -> Self {
        Self {
            userid: userid.to_string(),
            archive: archive.as_ref().to_path_buf(),
            opts,
            store,
        }
    }

    /// Run to completion, cancellation or failure, recording the final
    /// state in the status store. Failures are stored as `error` status and
    /// also returned.
    pub fn run(&self) -> Result<JobOutcome> {
        tracing::info!(user = %self.userid, file = %self.archive.display(), "running stats job");
        let result = TweetArchive::open(&self.archive)
            .and_then(|mut archive| process_archive(&mut archive, &self.userid, &self.opts, self.store.clone()));
        self.record(result)
    }

    fn record(&self, result: Result<JobOutcome>) -> Result<JobOutcome> {
        match result {
            Ok(JobOutcome::Completed { rows, report }) => {
                self.store.update(&self.userid, StatusUpdate::finished(report.clone()))?;
                tracing::info!(user = %self.userid, rows, "finished stats job");
                Ok(JobOutcome::Completed { rows, report })
            }
            Ok(JobOutcome::Canceled { rows }) => {
                tracing::info!(user = %self.userid, rows, "canceled stats job");
                Ok(JobOutcome::Canceled { rows })
            }
            Err(e) => {
                let msg = format!("Error in stats job: {e}");
                tracing::error!(user = %self.userid, file = %self.archive.display(), error = ?e, "{msg}");
                self.store.update(&self.userid, StatusUpdate::error(msg))?;
                Err(e)
            }
        }
    }
}

/// Feed every row of the archive's tweet entry through a fresh aggregator.
/// Moves the job to `busy`; the caller owns the final status write.
pub fn process_archive<R, S>(
    archive: &mut TweetArchive<R>,
    userid: &str,
    opts: &StatsOpts,
    store: S,
) -> Result<JobOutcome>
where
    R: Read + Seek,
    S: StatusStore,
{
    store.update(userid, StatusUpdate::new(JobStatus::Busy))?;
    let mut rows = archive.rows(&opts.entry_name)?;
    let mut agg = Aggregator::with_monitor(opts.clone(), ProgressMonitor::new(store, userid));
    agg.set_columns(rows.columns());

    let mut row = StringRecord::new();
    while rows.next_row(&mut row)? {
        if agg.process_row(&row)? == Flow::Canceled {
            return Ok(JobOutcome::Canceled { rows: agg.state().row_count });
        }
    }
    let count = agg.state().row_count;
    let report = agg.finish()?;
    Ok(JobOutcome::Completed { rows: count, report })
}
