use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::StatsOpts;
use crate::engine::{AggregateBucket, Aggregates, Tally};
use crate::error::{Result, StatsError};
use crate::window::WindowRegistry;

pub const PALETTE: [&str; 7] = [
    "#673AB7", "#3F51B5", "#2196F3",
    "#009688", "#4CAF50", "#FF5722",
    "#E91E63",
];

pub const DOW_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Weight tiers the word cloud assigns (`w1` lightest .. `w10` heaviest).
pub const WORD_TIERS: usize = 10;

pub fn palette_color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

pub fn make_tooltip(category: &str, count: u64) -> String {
    format!("<div class=\"tooltip\"><strong>{category}</strong><br />{count} tweets</div>")
}

/// `(year, zero-based month, day)` as charting libraries take dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTriple(pub i32, pub u32, pub u32);

impl DateTriple {
    fn from_date(d: NaiveDate) -> Self {
        use chrono::Datelike;
        DateTriple(d.year(), d.month0(), d.day())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPoint {
    pub date: DateTriple,
    pub count: u64,
    pub tooltip: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DowPoint {
    pub day: String,
    pub count: u64,
    pub tooltip: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourPoint {
    pub hour: u32,
    pub count: u64,
    pub tooltip: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedWord {
    pub text: String,
    pub weight: u64,
}

/// The document handed to the presentation layer. Per-window datasets are
/// keyed by window name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub by_month_data: Vec<MonthPoint>,
    pub by_month_min: DateTriple,
    pub by_month_max: DateTriple,
    pub by_dow_data: BTreeMap<String, Vec<DowPoint>>,
    pub by_hour_data: BTreeMap<String, Vec<HourPoint>>,
    pub by_mention_data: BTreeMap<String, Vec<RankedItem>>,
    pub by_source_data: BTreeMap<String, Vec<RankedItem>>,
    pub by_words_data: BTreeMap<String, Vec<WeightedWord>>,
    pub subtitle: String,
    pub extra_css: String,
}

impl Report {
    pub fn build(agg: &Aggregates, windows: &WindowRegistry, opts: &StatsOpts) -> Result<Report> {
        let (Some(newest), Some(oldest)) = (agg.state.newest_timestamp, agg.state.oldest_timestamp) else {
            return Err(StatsError::NoData);
        };
        let (Some(first), Some(last)) = (agg.by_month.keys().next(), agg.by_month.keys().next_back()) else {
            return Err(StatsError::NoData);
        };

        let by_month_data = agg
            .by_month
            .iter()
            .enumerate()
            .map(|(i, (&(year, month), &count))| MonthPoint {
                date: DateTriple(year, month - 1, 1),
                count,
                tooltip: make_tooltip(&format!("{year:04}-{month:02}"), count),
                color: palette_color(i).to_string(),
            })
            .collect();
        let (by_month_min, by_month_max) = month_range(*first, *last).ok_or(StatsError::NoData)?;

        let mut by_dow_data = BTreeMap::new();
        let mut by_hour_data = BTreeMap::new();
        let mut by_mention_data = BTreeMap::new();
        let mut by_source_data = BTreeMap::new();
        let mut by_words_data = BTreeMap::new();
        let empty = AggregateBucket::default();
        for window in windows.iter() {
            let bucket = agg.buckets.get(&window.name).unwrap_or(&empty);
            let name = window.name.clone();
            by_dow_data.insert(name.clone(), dow_points(bucket));
            by_hour_data.insert(name.clone(), hour_points(bucket));
            by_mention_data.insert(
                name.clone(),
                ranked(&bucket.by_mention, opts.top_mentions, |h| format!("@{h}")),
            );
            by_source_data.insert(name.clone(), ranked(&bucket.by_source, opts.top_sources, str::to_string));
            by_words_data.insert(
                name,
                bucket
                    .by_word
                    .top(opts.top_words)
                    .into_iter()
                    .map(|(text, weight)| WeightedWord { text, weight })
                    .collect(),
            );
        }

        let subtitle = format!(
            "from {} to {}",
            oldest.format("%Y-%m-%d"),
            newest.format("%Y-%m-%d")
        );

        Ok(Report {
            by_month_data,
            by_month_min,
            by_month_max,
            by_dow_data,
            by_hour_data,
            by_mention_data,
            by_source_data,
            by_words_data,
            subtitle,
            extra_css: word_cloud_css(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Chart range: mid-month before the first bucket through mid-month of the last.
fn month_range(first: (i32, u32), last: (i32, u32)) -> Option<(DateTriple, DateTriple)> {
    let lo = NaiveDate::from_ymd_opt(first.0, first.1, 15)?.checked_sub_months(Months::new(1))?;
    let hi = NaiveDate::from_ymd_opt(last.0, last.1, 15)?;
    Some((DateTriple::from_date(lo), DateTriple::from_date(hi)))
}

fn dow_points(bucket: &AggregateBucket) -> Vec<DowPoint> {
    DOW_NAMES
        .iter()
        .enumerate()
        .map(|(dow, name)| {
            let count = bucket.by_dow[dow];
            DowPoint {
                day: name.to_string(),
                count,
                tooltip: make_tooltip(name, count),
                color: palette_color(dow).to_string(),
            }
        })
        .collect()
}

fn hour_points(bucket: &AggregateBucket) -> Vec<HourPoint> {
    (0..24)
        .map(|hour| {
            let count = bucket.by_hour[hour];
            HourPoint {
                hour: hour as u32,
                count,
                tooltip: make_tooltip(&format!("Hour {hour}"), count),
                color: palette_color(hour).to_string(),
            }
        })
        .collect()
}

fn ranked(tally: &Tally, n: usize, label: impl Fn(&str) -> String) -> Vec<RankedItem> {
    tally
        .top(n)
        .into_iter()
        .map(|(key, count)| RankedItem { label: label(&key), count })
        .collect()
}

fn word_cloud_css() -> String {
    (1..=WORD_TIERS)
        .map(|tier| format!(".jqcloud span.w{tier} {{ color: {}; }}", palette_color(tier - 1)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_steps_back_across_year() {
        let (lo, hi) = month_range((2013, 1), (2013, 4)).unwrap();
        assert_eq!(lo, DateTriple(2012, 11, 15));
        assert_eq!(hi, DateTriple(2013, 3, 15));
    }

    #[test]
    fn css_has_one_rule_per_tier() {
        let css = word_cloud_css();
        assert_eq!(css.lines().count(), WORD_TIERS);
        assert!(css.starts_with(".jqcloud span.w1 { color: #673AB7; }"));
    }
}
