use tweetscope::status::{JobStatus, MemoryStatusStore, StatusDoc, StatusStore, StatusUpdate};
use tweetscope::StatsError;

#[test]
fn submission_moves_ready_to_waiting_and_clears_cancel() {
    let store = MemoryStatusStore::new();
    store.register("u");
    store.request_cancel("u").unwrap();
    let rec = store.submit("u").unwrap();
    assert_eq!(rec.status.status, JobStatus::Waiting);
    assert!(!rec.cancel);
}

#[test]
fn submission_is_rejected_while_job_active() {
    let store = MemoryStatusStore::new();
    store.register("u");
    store.submit("u").unwrap();
    assert!(matches!(store.submit("u"), Err(StatsError::JobActive(_))));
    store.update("u", StatusUpdate::new(JobStatus::Busy)).unwrap();
    assert!(matches!(store.submit("u"), Err(StatsError::JobActive(_))));
}

#[test]
fn error_is_shown_once_then_cleared() {
    let store = MemoryStatusStore::new();
    store.register("u");
    store.update("u", StatusUpdate::error("boom".into())).unwrap();
    let first = store.view("u").unwrap();
    assert_eq!(first.status, JobStatus::Error);
    assert_eq!(first.error_msg.as_deref(), Some("boom"));
    assert_eq!(store.view("u").unwrap(), StatusDoc::default());
    // error state accepts a new submission
    store.update("u", StatusUpdate::error("again".into())).unwrap();
    assert!(store.submit("u").is_ok());
}

#[test]
fn update_returns_externally_set_cancel_flag() {
    let store = MemoryStatusStore::new();
    store.register("u");
    store.request_cancel("u").unwrap();
    let rec = store.update("u", StatusUpdate::progress(300, "2024-01-01".into())).unwrap();
    assert!(rec.cancel);
}

#[test]
fn status_doc_serializes_with_camel_case_keys() {
    let doc = StatusDoc { status: JobStatus::Busy, tweets_done: 600, until_date: "2024-01-01".into(), error_msg: None };
    let v = serde_json::to_value(&doc).unwrap();
    assert_eq!(v, serde_json::json!({"status": "busy", "tweetsDone": 600, "untilDate": "2024-01-01", "errorMsg": null}));
}

#[test]
fn unknown_user_is_an_error() {
    let store = MemoryStatusStore::new();
    assert!(matches!(store.update("ghost", StatusUpdate::default()), Err(StatsError::UnknownUser(_))));
}
