//! Push state machine with in-process collision resolution.
//!
//! Transmits one batch, shrinking it on identifier collisions until the
//! registry accepts the remainder. Collisions are informational, never
//! operator errors; every other non-2xx outcome ends the author's run.

use crate::blacklist::BlacklistStore;
use crate::client::{PushResponse, RegistryClient};
use crate::models::work::WorkSubmission;
use crate::store::{AuthorCredential, CredentialStore};

/// Terminal state of one batch push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The batch (or what remained of it after collisions) was accepted.
    ///
    /// A batch emptied entirely by collisions also completes: nothing left to
    /// push is treated as success. See DESIGN.md on this vacuous-success edge.
    Completed,
    /// The registry revoked authorization; the credential has been deleted.
    /// Counts as a completed attempt, not a job failure.
    TokenRevoked,
    /// Unrecoverable failure; the author's remaining batches must not run.
    Failed,
}

/// Drives batches through the registry write API.
pub struct PushEngine<'a> {
    client: &'a RegistryClient,
    blacklist: &'a BlacklistStore,
    credentials: &'a dyn CredentialStore,
}

impl<'a> PushEngine<'a> {
    /// Create an engine over the shared client and stores.
    #[must_use]
    pub fn new(
        client: &'a RegistryClient,
        blacklist: &'a BlacklistStore,
        credentials: &'a dyn CredentialStore,
    ) -> Self {
        Self { client, blacklist, credentials }
    }

    /// Push one batch to a terminal state.
    ///
    /// Each collision strictly shrinks the batch, so the loop ends within
    /// `batch.len()` collision rounds. Nothing here retries transport errors;
    /// retrying a push could duplicate submissions.
    pub async fn push_to_completion(
        &self,
        author: &AuthorCredential,
        mut batch: Vec<WorkSubmission>,
    ) -> PushOutcome {
        while !batch.is_empty() {
            tracing::info!(
                orcid = %author.orcid,
                author_id = author.author_id,
                works = batch.len(),
                "pushing works"
            );

            match self.client.push_batch(&author.orcid, &author.token, &batch).await {
                Ok(PushResponse::Accepted) => {
                    tracing::info!(orcid = %author.orcid, "push succeeded");
                    return PushOutcome::Completed;
                }
                Ok(PushResponse::Unauthorized) => {
                    // The token expired or the user revoked it.
                    if let Err(err) = self.credentials.delete_token(author.author_id).await {
                        tracing::error!(
                            author_id = author.author_id,
                            error = %err,
                            "failed to delete revoked credential"
                        );
                    }
                    tracing::warn!(
                        author_id = author.author_id,
                        "registry token revoked; credential deleted"
                    );
                    return PushOutcome::TokenRevoked;
                }
                Ok(PushResponse::Collision { value }) => {
                    let before = batch.len();
                    batch.retain(|work| !work.carries_id(&value));
                    if batch.len() == before {
                        tracing::error!(
                            orcid = %author.orcid,
                            %value,
                            "collision names an id absent from the batch; giving up"
                        );
                        return PushOutcome::Failed;
                    }

                    tracing::info!(
                        orcid = %author.orcid,
                        %value,
                        remaining = batch.len(),
                        "works have the same external id; dropping offender"
                    );
                    if let Err(err) = self.blacklist.record(&author.orcid, &value) {
                        tracing::error!(
                            orcid = %author.orcid,
                            error = %err,
                            "failed to persist blacklist entry"
                        );
                    }
                }
                Err(err) => {
                    tracing::error!(orcid = %author.orcid, error = %err, "push failed");
                    return PushOutcome::Failed;
                }
            }
        }

        tracing::info!(orcid = %author.orcid, "batch emptied by collisions; nothing left to push");
        PushOutcome::Completed
    }
}
