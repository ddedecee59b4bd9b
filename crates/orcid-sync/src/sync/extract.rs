//! External identifier extraction per work.
//!
//! Decides, for one record, which identifiers to submit, or that the work is
//! already synchronized. Pure over its inputs apart from the warning side
//! channel; "already exists" is a result variant, never control-flow.

use std::collections::BTreeSet;

use crate::ids::normalize_doi;
use crate::models::record::BibRecord;
use crate::models::work::{ExternalId, IdKind};
use crate::models::KnownIds;

/// Extraction result for one work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Submit the work with these identifiers; never empty.
    Submit(BTreeSet<ExternalId>),
    /// The work is already known remotely (or permanently rejected); skip it.
    Skip,
}

/// Non-fatal data-integrity finding reported while extracting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataWarning {
    /// Record the finding is about.
    pub record_id: i64,

    /// Human-readable description.
    pub message: String,
}

/// Extract the identifiers to submit for one record.
///
/// A single candidate identifier already present in the remote snapshot or in
/// the author's blacklist marks the whole work as already synchronized. When
/// no bibliographic identifier qualifies, the canonical URL becomes the one
/// synthetic identifier, so the result set is never empty.
#[must_use]
pub fn extract(
    record: &BibRecord,
    url: &str,
    known: &KnownIds,
    blacklisted: &BTreeSet<String>,
    warnings: &mut Vec<DataWarning>,
) -> Extraction {
    let mut ids = BTreeSet::new();

    for raw in &record.dois {
        let value = normalize_doi(raw).unwrap_or_else(|| raw.trim().to_string());
        if known.contains(IdKind::Doi, &value)
            || known.contains(IdKind::Doi, raw.trim())
            || blacklisted.contains(&value)
            || blacklisted.contains(raw.trim())
        {
            return Extraction::Skip;
        }
        ids.insert(ExternalId::new(IdKind::Doi, value));
    }

    if let Some(isbn) = record.isbn.as_deref() {
        if known.contains(IdKind::Isbn, isbn) || blacklisted.contains(isbn) {
            return Extraction::Skip;
        }
        ids.insert(ExternalId::new(IdKind::Isbn, isbn));
    }

    for arxiv in &record.arxiv_ids {
        if known.contains(IdKind::Arxiv, arxiv) || blacklisted.contains(arxiv.as_str()) {
            return Extraction::Skip;
        }
        let id = ExternalId::new(IdKind::Arxiv, arxiv);
        if ids.contains(&id) {
            warnings.push(DataWarning {
                record_id: record.record_id,
                message: format!("record carries the same arXiv id {arxiv} twice"),
            });
        } else {
            ids.insert(id);
        }
    }

    if known.contains(IdKind::Other, url) || blacklisted.contains(url) {
        return Extraction::Skip;
    }

    if ids.is_empty() {
        ids.insert(ExternalId::new(IdKind::Other, url));
    }

    Extraction::Submit(ids)
}
