//! Durable blacklist of collision-rejected identifiers.
//!
//! A JSON document mapping ORCID iD to the identifier values the registry has
//! rejected as duplicates. The document is read fresh at the start of each
//! author's attempt and rewritten immediately after each resolved collision,
//! so a crash mid-run never loses an already-resolved collision.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;

/// In-memory view of the blacklist document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blacklist(BTreeMap<String, BTreeSet<String>>);

impl Blacklist {
    /// Identifier values permanently rejected for this author.
    #[must_use]
    pub fn for_author(&self, orcid: &str) -> BTreeSet<String> {
        self.0.get(orcid).cloned().unwrap_or_default()
    }

    /// Whether the value is blacklisted for this author.
    #[must_use]
    pub fn contains(&self, orcid: &str, value: &str) -> bool {
        self.0.get(orcid).is_some_and(|values| values.contains(value))
    }

    /// Record a rejected value. Returns true if it was not present before.
    pub fn insert(&mut self, orcid: &str, value: &str) -> bool {
        self.0.entry(orcid.to_string()).or_default().insert(value.to_string())
    }

    /// Total number of blacklisted values across authors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Whether no value is blacklisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Durable store behind the blacklist document.
#[derive(Debug, Clone)]
pub struct BlacklistStore {
    path: PathBuf,
}

impl BlacklistStore {
    /// Create a store over the document at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the current blacklist.
    ///
    /// A missing document is a valid "no blacklist yet" state. A malformed
    /// document is alerted and treated as empty rather than blocking every
    /// push on a corrupt file.
    #[must_use]
    pub fn load(&self) -> Blacklist {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Blacklist::default(),
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "failed to read blacklist; treating as empty");
                return Blacklist::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(blacklist) => blacklist,
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "malformed blacklist document; treating as empty");
                Blacklist::default()
            }
        }
    }

    /// Record one rejected value and persist the document immediately.
    pub fn record(&self, orcid: &str, value: &str) -> SyncResult<()> {
        let mut blacklist = self.load();
        if blacklist.insert(orcid, value) {
            self.persist(&blacklist)?;
        }
        Ok(())
    }

    fn persist(&self, blacklist: &Blacklist) -> SyncResult<()> {
        let body = serde_json::to_string_pretty(blacklist)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> BlacklistStore {
        let path = std::env::temp_dir().join(format!("orcid-blacklist-{}.json", uuid::Uuid::new_v4()));
        BlacklistStore::new(path)
    }

    #[test]
    fn missing_document_is_empty() {
        let store = temp_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn record_persists_immediately() {
        let store = temp_store();
        store.record("0000-0001-2345-6789", "10.1/x").unwrap();
        store.record("0000-0001-2345-6789", "10.1/y").unwrap();

        let reread = BlacklistStore::new(store.path.clone()).load();
        let values = reread.for_author("0000-0001-2345-6789");
        assert_eq!(values.len(), 2);
        assert!(reread.contains("0000-0001-2345-6789", "10.1/x"));
        assert!(!reread.contains("0000-0009-9999-9999", "10.1/x"));

        std::fs::remove_file(&store.path).ok();
    }

    #[test]
    fn duplicate_record_is_idempotent() {
        let store = temp_store();
        store.record("0000-0001-2345-6789", "10.1/x").unwrap();
        store.record("0000-0001-2345-6789", "10.1/x").unwrap();
        assert_eq!(store.load().len(), 1);

        std::fs::remove_file(&store.path).ok();
    }

    #[test]
    fn malformed_document_treated_as_empty() {
        let store = temp_store();
        std::fs::write(&store.path, "{not json").unwrap();
        assert!(store.load().is_empty());

        std::fs::remove_file(&store.path).ok();
    }
}
