use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::window::WindowDef;

pub const CHECKPOINT_INTERVAL: u64 = 300;
pub const MIN_COLUMNS: usize = 8;
pub const TOP_MENTIONS: usize = 10;
pub const TOP_SOURCES: usize = 10;
pub const TOP_WORDS: usize = 100;
pub const DEFAULT_ENTRY: &str = "tweets.csv";

/// Archive entries before this instant all carry 00:00:00 as their time of
/// day, so they stay out of the by-hour histogram.
pub fn zero_time_cutoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2010, 11, 4, 21, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
pub struct StatsOpts {
    pub checkpoint_interval: u64,
    pub min_columns: usize,
    pub min_word_len: usize,
    pub top_mentions: usize,
    pub top_sources: usize,
    pub top_words: usize,
    pub timezone: Tz,
    pub entry_name: String,
    pub hour_cutoff: DateTime<Utc>,
    pub windows: Vec<WindowDef>,
}

impl Default for StatsOpts {
    fn default() -> Self {
        Self {
            checkpoint_interval: CHECKPOINT_INTERVAL,
            min_columns: MIN_COLUMNS,
            min_word_len: crate::tokenizer::MIN_WORD_LEN,
            top_mentions: TOP_MENTIONS,
            top_sources: TOP_SOURCES,
            top_words: TOP_WORDS,
            timezone: Tz::UTC,
            entry_name: DEFAULT_ENTRY.to_string(),
            hour_cutoff: zero_time_cutoff(),
            windows: WindowDef::defaults(),
        }
    }
}
