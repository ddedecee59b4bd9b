//! Work batch construction.
//!
//! One pass over the author's claimed records: extract identifiers, drop works
//! that are already synchronized, and chunk the rest into push-sized batches.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::models::record::BibRecord;
use crate::models::work::WorkSubmission;
use crate::models::KnownIds;

use super::extract::{extract, DataWarning, Extraction};

/// Build submission batches in record order.
///
/// Every yielded batch is non-empty and no larger than the configured batch
/// size; the final batch may be partial. Skipped works are dropped silently.
#[must_use]
pub fn build(
    records: &[BibRecord],
    author_id: i64,
    known: &KnownIds,
    blacklisted: &BTreeSet<String>,
    config: &Config,
    warnings: &mut Vec<DataWarning>,
) -> Vec<Vec<WorkSubmission>> {
    let batch_size = config.batch_size.max(1);
    let mut batches = Vec::new();
    let mut current = Vec::new();

    for record in records {
        let url = config.record_url(record.record_id);
        match extract(record, &url, known, blacklisted, warnings) {
            Extraction::Skip => {
                tracing::debug!(record_id = record.record_id, "already synchronized, skipping");
            }
            Extraction::Submit(ids) => {
                current.push(WorkSubmission::from_record(record, author_id, url, ids, config));
                if current.len() == batch_size {
                    batches.push(std::mem::take(&mut current));
                }
            }
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
