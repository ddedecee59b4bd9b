//! ORCID works sync job - entry point.
//!
//! Scheduled/triggered task with no required arguments; exits non-zero when
//! any author's run failed.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use orcid_sync::config::Config;
use orcid_sync::store::{FileCredentialStore, FileRecordProvider};
use orcid_sync::sync::{AuthorStatus, SyncJob};

#[derive(Parser, Debug)]
#[command(name = "orcid-sync")]
#[command(about = "Push claimed local works to ORCID author profiles")]
#[command(version)]
struct Cli {
    /// Credential/claims document (author id, ORCID iD, token, pending flag)
    #[arg(long, default_value = "orcid_credentials.json", env = "ORCID_SYNC_CREDENTIALS_FILE")]
    credentials: PathBuf,

    /// Bibliographic records document (author id -> claimed records)
    #[arg(long, default_value = "orcid_records.json", env = "ORCID_SYNC_RECORDS_FILE")]
    records: PathBuf,

    /// Collision blacklist document
    #[arg(long, env = "ORCID_SYNC_BLACKLIST_FILE")]
    blacklist: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(blacklist) = cli.blacklist {
        config.blacklist_path = blacklist;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        member_api = %config.member_api_url,
        public_api = %config.public_api_url,
        "starting ORCID sync job"
    );

    let credentials = Arc::new(FileCredentialStore::new(cli.credentials));
    let records = Arc::new(FileRecordProvider::new(cli.records));

    let job = SyncJob::new(config, credentials, records)?;
    let report = job.run().await?;

    for run in &report.authors {
        match run.status {
            AuthorStatus::Synced => {
                tracing::info!(author_id = run.author_id, pushed = run.works_pushed, "author synced");
            }
            AuthorStatus::TokenRevoked => {
                tracing::warn!(author_id = run.author_id, "author token revoked");
            }
            AuthorStatus::Failed => {
                tracing::error!(author_id = run.author_id, "author sync failed");
            }
        }
    }

    if report.success() {
        Ok(())
    } else {
        anyhow::bail!("sync job finished with failures")
    }
}
