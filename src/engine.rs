use ahash::AHashMap;
use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use csv::StringRecord;
use std::collections::BTreeMap;

use crate::config::StatsOpts;
use crate::error::{Result, StatsError};
use crate::progress::{Checkpoint, Flow, NoCheckpoint};
use crate::record::{self, ColumnMap, Record};
use crate::report::Report;
use crate::tokenizer;
use crate::window::WindowRegistry;

/// Frequency counter over string keys that remembers first-seen order,
/// used to break ties when ranking.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: AHashMap<String, (u64, usize)>,
}

impl Tally {
    pub fn add(&mut self, key: &str) {
        if let Some(entry) = self.counts.get_mut(key) {
            entry.0 += 1;
            return;
        }
        let order = self.counts.len();
        self.counts.insert(key.to_string(), (1, order));
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).map(|(c, _)| *c).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|(c, _)| *c).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent keys, count descending, ties in first-seen order.
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut items: Vec<(&String, &(u64, usize))> = self.counts.iter().collect();
        items.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        items.into_iter().take(n).map(|(k, (c, _))| (k.clone(), *c)).collect()
    }
}

/// Counters for one count window.
#[derive(Debug, Clone, Default)]
pub struct AggregateBucket {
    pub by_hour: [u64; 24],
    pub by_dow: [u64; 7],
    pub by_mention: Tally,
    pub by_source: Tally,
    pub by_word: Tally,
}

#[derive(Debug, Clone, Default)]
pub struct JobState {
    pub row_count: u64,
    pub skipped_rows: u64,
    pub out_of_order_rows: u64,
    pub newest_timestamp: Option<DateTime<Tz>>,
    pub oldest_timestamp: Option<DateTime<Tz>>,
}

/// Everything the report is built from.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub by_month: BTreeMap<(i32, u32), u64>,
    pub buckets: BTreeMap<String, AggregateBucket>,
    pub state: JobState,
}

/// Streaming fold over the rows of one archive. One instance per job.
pub struct Aggregator<C: Checkpoint = NoCheckpoint> {
    opts: StatsOpts,
    columns: ColumnMap,
    windows: WindowRegistry,
    agg: Aggregates,
    monitor: C,
}

impl Aggregator<NoCheckpoint> {
    pub fn new(opts: StatsOpts) -> Self {
        Self::with_monitor(opts, NoCheckpoint)
    }
}

impl<C: Checkpoint> Aggregator<C> {
    pub fn with_monitor(opts: StatsOpts, monitor: C) -> Self {
        let windows = WindowRegistry::new(&opts.windows);
        let buckets = windows
            .iter()
            .map(|w| (w.name.clone(), AggregateBucket::default()))
            .collect();
        Self {
            opts,
            columns: ColumnMap::default(),
            windows,
            agg: Aggregates { buckets, ..Default::default() },
            monitor,
        }
    }

    pub fn set_columns(&mut self, columns: ColumnMap) {
        self.columns = columns;
    }

    pub fn state(&self) -> &JobState {
        &self.agg.state
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.agg
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn bucket(&self, window: &str) -> Option<&AggregateBucket> {
        self.agg.buckets.get(window)
    }

    pub fn monitor(&self) -> &C {
        &self.monitor
    }

    /// Consume one raw row. Short rows are counted and otherwise ignored.
    pub fn process_row(&mut self, row: &StringRecord) -> Result<Flow> {
        self.agg.state.row_count += 1;
        let parsed = record::parse_row(
            row,
            &self.columns,
            self.agg.state.row_count,
            self.opts.min_columns,
            &self.opts.timezone,
        )?;
        match parsed {
            Some(rec) => self.fold(&rec),
            None => self.agg.state.skipped_rows += 1,
        }
        self.maybe_checkpoint()
    }

    /// Consume a record that was parsed elsewhere.
    pub fn process_record(&mut self, rec: &Record) -> Result<Flow> {
        self.agg.state.row_count += 1;
        self.fold(rec);
        self.maybe_checkpoint()
    }

    fn maybe_checkpoint(&mut self) -> Result<Flow> {
        let every = self.opts.checkpoint_interval;
        if every > 0 && self.agg.state.row_count % every == 0 {
            return self.monitor.checkpoint(&self.agg.state);
        }
        Ok(Flow::Continue)
    }

    fn fold(&mut self, rec: &Record) {
        let ts = rec.timestamp;
        let state = &mut self.agg.state;

        // Last-N-days windows count back from the newest tweet, not from now.
        // The archive is expected newest first.
        if state.newest_timestamp.is_none() {
            state.newest_timestamp = Some(ts);
            self.windows.resolve_all(ts);
        }
        if let Some(prev) = state.oldest_timestamp {
            if ts > prev {
                if state.out_of_order_rows == 0 {
                    tracing::warn!(row = state.row_count, "archive is not ordered newest first; window cutoffs may be off");
                }
                state.out_of_order_rows += 1;
            }
        }
        state.oldest_timestamp = Some(ts);

        *self.agg.by_month.entry((ts.year(), ts.month())).or_insert(0) += 1;

        let mentions = tokenizer::extract_mentions(&rec.text);
        let source = tokenizer::source_label(&rec.source);
        let words = tokenizer::extract_words_with_min(&rec.text, self.opts.min_word_len);
        let count_hour = ts >= self.opts.hour_cutoff;
        let dow = ts.weekday().num_days_from_sunday() as usize;
        let hour = ts.hour() as usize;

        for window in self.windows.iter() {
            if !window.admits(&ts) { continue; }
            let Some(bucket) = self.agg.buckets.get_mut(&window.name) else { continue };
            if count_hour {
                bucket.by_hour[hour] += 1;
            }
            bucket.by_dow[dow] += 1;
            for m in &mentions {
                bucket.by_mention.add(m);
            }
            bucket.by_source.add(&source);
            for w in &words {
                bucket.by_word.add(w);
            }
        }
    }

    /// Fold the counters into the report. Fails with `NoData` when the
    /// archive held no valid rows.
    pub fn finish(self) -> Result<Report> {
        if self.agg.state.newest_timestamp.is_none() {
            return Err(StatsError::NoData);
        }
        Report::build(&self.agg, &self.windows, &self.opts)
    }
}
