//! Sync orchestration.
//!
//! Processes one author fully before starting the next: flip the pending flag
//! to in-flight, snapshot the remote identifiers, build batches from claimed
//! records, and push each batch to completion. Authors share no mutable state
//! except the durable blacklist, which is reloaded fresh per attempt.

pub mod batch;
pub mod extract;
pub mod push;

use std::sync::Arc;

use crate::blacklist::BlacklistStore;
use crate::client::RegistryClient;
use crate::config::Config;
use crate::error::SyncResult;
use crate::store::{AuthorCredential, CredentialStore, RecordProvider};

pub use extract::{DataWarning, Extraction};
pub use push::{PushEngine, PushOutcome};

/// Terminal status of one author's sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorStatus {
    /// Every batch completed.
    Synced,
    /// Authorization was revoked mid-run; not a job failure.
    TokenRevoked,
    /// A batch failed; remaining batches were aborted.
    Failed,
}

/// Outcome of one author's sync attempt.
#[derive(Debug, Clone)]
pub struct AuthorRun {
    /// Local author id.
    pub author_id: i64,

    /// ORCID iD.
    pub orcid: String,

    /// Terminal status.
    pub status: AuthorStatus,

    /// Works in batches that reached a completed push.
    pub works_pushed: usize,
}

/// Aggregated result of one job run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Per-author outcomes, in processing order.
    pub authors: Vec<AuthorRun>,
}

impl SyncReport {
    /// Overall job success: no author run failed. Revoked tokens count as
    /// completed attempts.
    #[must_use]
    pub fn success(&self) -> bool {
        self.authors.iter().all(|run| run.status != AuthorStatus::Failed)
    }
}

/// The scheduled sync job.
pub struct SyncJob {
    client: RegistryClient,
    blacklist: BlacklistStore,
    credentials: Arc<dyn CredentialStore>,
    records: Arc<dyn RecordProvider>,
    config: Config,
}

impl SyncJob {
    /// Create a job over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        records: Arc<dyn RecordProvider>,
    ) -> anyhow::Result<Self> {
        let client = RegistryClient::new(&config)?;
        let blacklist = BlacklistStore::new(config.blacklist_path.clone());
        Ok(Self { client, blacklist, credentials, records, config })
    }

    /// Run one sync pass over every author due for a push.
    ///
    /// # Errors
    ///
    /// Returns error only when a collaborator store fails; individual author
    /// failures are recorded in the report, not raised.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        let mut report = SyncReport::default();

        for author in self.credentials.credentials().await? {
            if !author.needs_sync() {
                continue;
            }

            tracing::info!(author_id = author.author_id, orcid = %author.orcid, "fetching works");

            // Flip before fetching: claims changing while we fetch must be
            // picked up by the next run, not lost under a late clear.
            self.credentials.mark_in_flight(author.author_id).await?;
            let run = self.sync_author(&author).await;
            self.credentials.clear_in_flight(author.author_id).await?;
            tracing::info!(author_id = author.author_id, "flag cleared");

            report.authors.push(run);
        }

        if report.success() {
            tracing::info!(authors = report.authors.len(), "sync pass complete");
        } else {
            tracing::warn!(authors = report.authors.len(), "sync pass finished with failures");
        }
        Ok(report)
    }

    /// One author's attempt: fetch, filter, batch, push.
    async fn sync_author(&self, author: &AuthorCredential) -> AuthorRun {
        let failed = |pushed| AuthorRun {
            author_id: author.author_id,
            orcid: author.orcid.clone(),
            status: AuthorStatus::Failed,
            works_pushed: pushed,
        };

        let known = self.client.fetch_known_ids(&author.orcid).await;
        let blacklisted = self.blacklist.load().for_author(&author.orcid);

        let records = match self.records.claimed_records(author.author_id).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(author_id = author.author_id, error = %err, "record provider failed");
                return failed(0);
            }
        };
        tracing::info!(author_id = author.author_id, records = records.len(), "records fetched");

        let mut warnings = Vec::new();
        let batches = batch::build(
            &records,
            author.author_id,
            &known,
            &blacklisted,
            &self.config,
            &mut warnings,
        );
        for warning in &warnings {
            tracing::warn!(record_id = warning.record_id, "{}", warning.message);
        }

        let engine = PushEngine::new(&self.client, &self.blacklist, self.credentials.as_ref());
        let mut pushed = 0;
        let mut status = AuthorStatus::Synced;

        for batch in batches {
            let size = batch.len();
            match engine.push_to_completion(author, batch).await {
                PushOutcome::Completed => pushed += size,
                PushOutcome::TokenRevoked => {
                    status = AuthorStatus::TokenRevoked;
                    break;
                }
                PushOutcome::Failed => {
                    status = AuthorStatus::Failed;
                    break;
                }
            }
        }

        AuthorRun { author_id: author.author_id, orcid: author.orcid.clone(), status, works_pushed: pushed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(status: AuthorStatus) -> AuthorRun {
        AuthorRun { author_id: 1, orcid: "x".to_string(), status, works_pushed: 0 }
    }

    #[test]
    fn report_success_tolerates_revoked_tokens() {
        let report = SyncReport { authors: vec![run(AuthorStatus::Synced), run(AuthorStatus::TokenRevoked)] };
        assert!(report.success());
    }

    #[test]
    fn report_fails_on_any_failed_author() {
        let report = SyncReport { authors: vec![run(AuthorStatus::Synced), run(AuthorStatus::Failed)] };
        assert!(!report.success());
    }

    #[test]
    fn empty_report_is_success() {
        assert!(SyncReport::default().success());
    }
}
