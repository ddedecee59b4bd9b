//! ORCID works sync engine
//!
//! Outbound synchronization of a local scholarly-works catalog with an
//! ORCID-style author-profile registry: determine which claimed works the
//! registry does not know yet, batch and push them, resolve identifier
//! collisions in-process, and remember resolved collisions in a durable
//! per-author blacklist.
//!
//! # Features
//!
//! - **Collision resolution**: a rejected duplicate identifier shrinks the
//!   batch and is blacklisted, never resubmitted.
//! - **Fail-open reads**: a failed profile fetch degrades to an empty
//!   snapshot so pushes keep flowing.
//! - **Bounded retries**: read-side timeouts retry with exponential backoff;
//!   the write side never retries.
//! - **Revocation-aware**: a 401 deletes the stored credential without
//!   failing the job run.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use orcid_sync::config::Config;
//! use orcid_sync::store::{FileCredentialStore, FileRecordProvider};
//! use orcid_sync::sync::SyncJob;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let credentials = Arc::new(FileCredentialStore::new("credentials.json".into()));
//!     let records = Arc::new(FileRecordProvider::new("records.json".into()));
//!
//!     let job = SyncJob::new(config, credentials, records)?;
//!     let report = job.run().await?;
//!     println!("job success: {}", report.success());
//!     Ok(())
//! }
//! ```

pub mod blacklist;
pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod store;
pub mod sync;

pub use blacklist::{Blacklist, BlacklistStore};
pub use client::{PushResponse, RegistryClient};
pub use config::Config;
pub use error::{RegistryError, SyncError};
pub use models::{BibRecord, KnownIds, WorkSubmission};
pub use store::{AuthorCredential, CredentialStore, RecordProvider, SyncFlag};
pub use sync::{AuthorStatus, PushOutcome, SyncJob, SyncReport};
