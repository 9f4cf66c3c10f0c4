use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tweetscope::status::MemoryStatusStore;
use tweetscope::{JobOutcome, StatsJob, StatsOpts};

#[derive(Parser, Debug)]
#[command(name = "tweetscope", version, about = "Tweet archive statistics")]
struct Cli {
    /// Archive (zip) exported from the user's account
    input: PathBuf,

    /// Owner of the job, used in logs and the status record
    #[arg(long = "user", default_value = "local")]
    user: String,

    /// Display timezone for hours, weekdays and months (IANA name)
    #[arg(long = "tz", default_value = "UTC")]
    tz: String,

    /// Archive entry holding the tweets
    #[arg(long = "entry", default_value = tweetscope::config::DEFAULT_ENTRY)]
    entry: String,

    /// Rows between progress checkpoints
    #[arg(long = "checkpoint-every", default_value_t = tweetscope::config::CHECKPOINT_INTERVAL)]
    checkpoint_every: u64,

    /// Words kept for the word cloud
    #[arg(long = "top-words", default_value_t = tweetscope::config::TOP_WORDS)]
    top_words: usize,

    /// Pretty-print the report
    #[arg(long = "pretty", default_value_t = false)]
    pretty: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(max_level)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let timezone: Tz = cli.tz.parse().map_err(|e| anyhow!("invalid timezone {}: {}", cli.tz, e))?;
    let opts = StatsOpts {
        timezone,
        entry_name: cli.entry.clone(),
        checkpoint_interval: cli.checkpoint_every,
        top_words: cli.top_words,
        ..Default::default()
    };

    let store = Arc::new(MemoryStatusStore::new());
    store.register(&cli.user);
    store.submit(&cli.user)?;
    {
        let store = store.clone();
        let user = cli.user.clone();
        // Ctrl-C behaves like the owner pressing cancel: honored at the next checkpoint.
        let _ = ctrlc::set_handler(move || {
            let _ = store.request_cancel(&user);
        });
    }

    let job = StatsJob::new(&cli.user, &cli.input, opts, store.clone());
    match job.run().with_context(|| format!("processing {}", cli.input.display()))? {
        JobOutcome::Completed { report, .. } => {
            let out = if cli.pretty { report.to_json_pretty()? } else { report.to_json()? };
            println!("{out}");
        }
        JobOutcome::Canceled { rows } => {
            eprintln!("canceled after {rows} rows");
        }
    }
    eprintln!("{}", serde_json::to_string(&store.view(&cli.user)?)?);
    Ok(())
}
