pub mod error;
pub mod config;
pub mod tokenizer;
pub mod record;
pub mod window;
pub mod engine;
pub mod progress;
pub mod status;
pub mod report;
pub mod archive;
pub mod job;

pub use config::StatsOpts;
pub use engine::Aggregator;
pub use error::{Result, StatsError};
pub use job::{JobOutcome, StatsJob};
pub use report::Report;
