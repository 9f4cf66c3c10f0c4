use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("row {row}: unparsable timestamp {value:?}")]
    Timestamp { row: u64, value: String },
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("archive has no entry named {0:?}")]
    MissingEntry(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive contains no tweets")]
    NoData,
    #[error("a job for user {0} is already waiting or running")]
    JobActive(String),
    #[error("unknown user {0}")]
    UnknownUser(String),
    #[error("json error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;
