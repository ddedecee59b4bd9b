//! Collaborator stores: author credentials/claims and bibliographic records.
//!
//! The sync engine only sees these through narrow async traits. The file-backed
//! implementations make the binary a runnable scheduled job; tests reuse them
//! over temp files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::models::BibRecord;

/// Pending-change flag states for one author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncFlag {
    /// The claimed-works list changed since the last sync.
    Dirty,
    /// A sync attempt is running for this author.
    InFlight,
    /// Nothing to do.
    Quiescent,
}

const fn default_flag() -> SyncFlag {
    SyncFlag::Dirty
}

/// One author's registry credential and pending-change flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorCredential {
    /// Local author id.
    pub author_id: i64,

    /// ORCID iD (xxxx-xxxx-xxxx-xxxx).
    pub orcid: String,

    /// Bearer token from the authorization step; empty once revoked.
    #[serde(default)]
    pub token: String,

    /// Pending-change flag.
    #[serde(default = "default_flag")]
    pub flag: SyncFlag,
}

impl AuthorCredential {
    /// Whether this author is due for a sync attempt.
    #[must_use]
    pub fn needs_sync(&self) -> bool {
        self.flag == SyncFlag::Dirty && !self.token.is_empty()
    }
}

/// Credential and claims-flag store.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// All author credentials with their pending flags.
    async fn credentials(&self) -> SyncResult<Vec<AuthorCredential>>;

    /// Delete the stored token for an author (authorization revoked).
    async fn delete_token(&self, author_id: i64) -> SyncResult<()>;

    /// Flip the flag from dirty to in-flight before fetching.
    async fn mark_in_flight(&self, author_id: i64) -> SyncResult<()>;

    /// Clear the in-flight marker after the attempt.
    ///
    /// A flag set back to dirty mid-sync is left alone so the next run
    /// observes the change instead of losing it.
    async fn clear_in_flight(&self, author_id: i64) -> SyncResult<()>;
}

/// Bibliographic record provider.
#[async_trait::async_trait]
pub trait RecordProvider: Send + Sync {
    /// The author's claimed records, unclaimed ones excluded.
    async fn claimed_records(&self, author_id: i64) -> SyncResult<Vec<BibRecord>>;
}

/// Credential store over a JSON document.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store over the document at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> SyncResult<Vec<AuthorCredential>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, credentials: &[AuthorCredential]) -> SyncResult<()> {
        let body = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    fn update<F>(&self, author_id: i64, apply: F) -> SyncResult<()>
    where
        F: FnOnce(&mut AuthorCredential),
    {
        let mut credentials = self.load()?;
        let entry = credentials
            .iter_mut()
            .find(|c| c.author_id == author_id)
            .ok_or_else(|| SyncError::store(format!("unknown author id {author_id}")))?;
        apply(entry);
        self.save(&credentials)
    }
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
    async fn credentials(&self) -> SyncResult<Vec<AuthorCredential>> {
        self.load()
    }

    async fn delete_token(&self, author_id: i64) -> SyncResult<()> {
        self.update(author_id, |entry| entry.token.clear())
    }

    async fn mark_in_flight(&self, author_id: i64) -> SyncResult<()> {
        self.update(author_id, |entry| {
            if entry.flag == SyncFlag::Dirty {
                entry.flag = SyncFlag::InFlight;
            }
        })
    }

    async fn clear_in_flight(&self, author_id: i64) -> SyncResult<()> {
        self.update(author_id, |entry| {
            if entry.flag == SyncFlag::InFlight {
                entry.flag = SyncFlag::Quiescent;
            }
        })
    }
}

/// Record provider over a JSON document mapping author id to records.
#[derive(Debug, Clone)]
pub struct FileRecordProvider {
    path: PathBuf,
}

impl FileRecordProvider {
    /// Create a provider over the document at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> SyncResult<BTreeMap<i64, Vec<BibRecord>>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait::async_trait]
impl RecordProvider for FileRecordProvider {
    async fn claimed_records(&self, author_id: i64) -> SyncResult<Vec<BibRecord>> {
        Ok(self.load()?.remove(&author_id).unwrap_or_default())
    }
}
