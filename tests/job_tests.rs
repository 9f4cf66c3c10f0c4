use std::io::Write;
use std::path::{Path, PathBuf};
use tweetscope::status::{JobStatus, MemoryStatusStore};
use tweetscope::{JobOutcome, StatsError, StatsJob, StatsOpts};

const HEADER: [&str; 10] = [
    "tweet_id", "in_reply_to_status_id", "in_reply_to_user_id", "timestamp", "source", "text",
    "retweeted_status_id", "retweeted_status_user_id", "retweeted_status_timestamp", "expanded_urls",
];

fn csv_bytes(rows: &[Vec<String>]) -> Vec<u8> {
    let mut w = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    w.write_record(HEADER).unwrap();
    for r in rows {
        w.write_record(r).unwrap();
    }
    w.into_inner().unwrap()
}

fn tweet(id: usize, ts: &str, text: &str) -> Vec<String> {
    vec![
        id.to_string(), String::new(), String::new(), ts.to_string(),
        "<a href=\"http://twitter.com\" rel=\"nofollow\">Twitter Web Client</a>".to_string(),
        text.to_string(), String::new(), String::new(), String::new(), String::new(),
    ]
}

fn write_archive(dir: &Path, entry: &str, rows: &[Vec<String>]) -> PathBuf {
    let path = dir.join("tweets.zip");
    let f = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(f);
    zip.start_file(entry, zip::write::FileOptions::default()).unwrap();
    zip.write_all(&csv_bytes(rows)).unwrap();
    zip.finish().unwrap();
    path
}

fn hourly_tweets(n: usize) -> Vec<Vec<String>> {
    let newest = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let ts = newest - chrono::Duration::hours(i as i64);
            tweet(i, &format!("{} +0000", ts.format("%Y-%m-%d %H:%M:%S")), "hello @Friend, nice weather")
        })
        .collect()
}

fn submitted_store() -> MemoryStatusStore {
    let store = MemoryStatusStore::new();
    store.register("42");
    store.submit("42").unwrap();
    store
}

#[test]
fn completed_job_stores_report_and_returns_to_ready() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = hourly_tweets(5);
    rows.insert(2, vec!["short".to_string(), "row".to_string()]);
    let path = write_archive(dir.path(), "tweets.csv", &rows);
    let store = submitted_store();

    let outcome = StatsJob::new("42", &path, StatsOpts::default(), &store).run().unwrap();
    let JobOutcome::Completed { rows, report } = outcome else { panic!("expected completion") };
    assert_eq!(rows, 6);
    assert_eq!(report.by_mention_data["alltime"][0].label, "@friend");
    assert_eq!(report.by_mention_data["alltime"][0].count, 5);
    assert_eq!(report.by_source_data["alltime"][0].label, "Twitter Web Client");

    let rec = store.get("42").unwrap();
    assert_eq!(rec.status.status, JobStatus::Ready);
    assert_eq!(rec.report.as_ref(), Some(&report));
    assert!(rec.last_generated.is_some());
}

#[test]
fn cancel_requested_before_start_stops_at_first_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "tweets.csv", &hourly_tweets(650));
    let store = submitted_store();
    store.request_cancel("42").unwrap();

    let outcome = StatsJob::new("42", &path, StatsOpts::default(), &store).run().unwrap();
    assert_eq!(outcome, JobOutcome::Canceled { rows: 300 });
    let rec = store.get("42").unwrap();
    assert_eq!(rec.status.status, JobStatus::Ready);
    assert!(rec.report.is_none());
}

#[test]
fn bad_timestamp_puts_job_in_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = hourly_tweets(3);
    rows.push(tweet(99, "sometime", "broken"));
    let path = write_archive(dir.path(), "tweets.csv", &rows);
    let store = submitted_store();

    let err = StatsJob::new("42", &path, StatsOpts::default(), &store).run().unwrap_err();
    assert!(matches!(err, StatsError::Timestamp { row: 4, .. }));
    let doc = store.view("42").unwrap();
    assert_eq!(doc.status, JobStatus::Error);
    assert!(doc.error_msg.unwrap().contains("sometime"));
    assert!(store.get("42").unwrap().report.is_none());
    assert_eq!(store.view("42").unwrap().status, JobStatus::Ready);
}

#[test]
fn archive_without_tweets_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "tweets.csv", &[vec!["1".to_string(), "2".to_string()]]);
    let store = submitted_store();
    let err = StatsJob::new("42", &path, StatsOpts::default(), &store).run().unwrap_err();
    assert!(matches!(err, StatsError::NoData));
    assert_eq!(store.get("42").unwrap().status.status, JobStatus::Error);
}

#[test]
fn missing_entry_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "other.csv", &hourly_tweets(2));
    let store = submitted_store();
    let err = StatsJob::new("42", &path, StatsOpts::default(), &store).run().unwrap_err();
    assert!(matches!(err, StatsError::MissingEntry(ref name) if name == "tweets.csv"));
}

#[test]
fn custom_entry_name_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "data/js/tweets.csv", &hourly_tweets(2));
    let store = submitted_store();
    let opts = StatsOpts { entry_name: "data/js/tweets.csv".into(), ..Default::default() };
    let outcome = StatsJob::new("42", &path, opts, &store).run().unwrap();
    assert!(matches!(outcome, JobOutcome::Completed { rows: 2, .. }));
}

#[test]
fn unreadable_archive_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tweets.zip");
    std::fs::write(&path, b"not a zip").unwrap();
    let store = submitted_store();
    assert!(StatsJob::new("42", &path, StatsOpts::default(), &store).run().is_err());
    assert_eq!(store.get("42").unwrap().status.status, JobStatus::Error);
}
