//! Defensive parsing of the remote works profile.
//!
//! The registry's read API nests optional structures at every level: a profile
//! without `group`, a group without `external-ids`, a list without
//! `external-id` are all valid empty states, never errors.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::work::IdKind;
use crate::ids::normalize_doi;

/// Response body of `GET /{orcid}/works`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorksProfile {
    /// Work groups; absent means no works.
    #[serde(default)]
    pub group: Vec<WorkGroup>,
}

/// One group of works sharing identifiers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkGroup {
    /// Group-level external identifiers.
    #[serde(rename = "external-ids", default)]
    pub external_ids: Option<ExternalIdList>,

    /// Per-source work summaries.
    #[serde(rename = "work-summary", default)]
    pub work_summary: Vec<WorkSummary>,
}

/// Wrapper around the identifier list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIdList {
    /// The identifiers themselves.
    #[serde(rename = "external-id", default)]
    pub external_id: Vec<RemoteExternalId>,
}

/// One identifier as reported by the registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteExternalId {
    /// Identifier kind name, lowercased for comparison.
    #[serde(rename = "external-id-type", default)]
    pub id_type: Option<String>,

    /// Identifier value.
    #[serde(rename = "external-id-value", default)]
    pub value: Option<String>,
}

/// One work summary inside a group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkSummary {
    /// Nested title wrapper.
    #[serde(default)]
    pub title: Option<TitleWrapper>,

    /// Summary-level external identifiers.
    #[serde(rename = "external-ids", default)]
    pub external_ids: Option<ExternalIdList>,
}

/// Registry title nesting, outer level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleWrapper {
    /// Inner title value.
    #[serde(default)]
    pub title: Option<TitleValue>,
}

/// Registry title nesting, inner level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleValue {
    /// The title text.
    #[serde(default)]
    pub value: Option<String>,
}

impl WorksProfile {
    /// List DOIs with the title of the summary they appear on.
    #[must_use]
    pub fn dois_with_titles(&self) -> Vec<(String, Option<String>)> {
        let mut dois = Vec::new();
        for group in &self.group {
            for summary in &group.work_summary {
                let title = summary
                    .title
                    .as_ref()
                    .and_then(|t| t.title.as_ref())
                    .and_then(|t| t.value.clone());
                for id in summary.external_ids.iter().flat_map(|l| &l.external_id) {
                    if id.id_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("doi")) {
                        if let Some(doi) = id.value.as_deref().and_then(normalize_doi) {
                            dois.push((doi, title.clone()));
                        }
                    }
                }
            }
        }
        dois
    }
}

/// Immutable snapshot of the identifiers the registry already knows for one
/// author, one snapshot per sync attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIds {
    /// Known DOIs, both raw and normalized spellings.
    pub doi: BTreeSet<String>,

    /// Known ISBNs.
    pub isbn: BTreeSet<String>,

    /// Known arXiv ids.
    pub arxiv: BTreeSet<String>,

    /// Known fallback ids (canonical URLs).
    pub other: BTreeSet<String>,
}

impl KnownIds {
    /// Collect every identifier from a works profile.
    ///
    /// Identifiers appear both at group level and on individual summaries;
    /// both are consulted. Unknown identifier kinds are ignored.
    #[must_use]
    pub fn from_profile(profile: &WorksProfile) -> Self {
        let mut known = Self::default();

        for group in &profile.group {
            let group_ids = group.external_ids.iter().flat_map(|l| &l.external_id);
            let summary_ids = group
                .work_summary
                .iter()
                .flat_map(|s| s.external_ids.iter().flat_map(|l| &l.external_id));

            for id in group_ids.chain(summary_ids) {
                let (Some(kind), Some(value)) = (id.id_type.as_deref(), id.value.as_deref())
                else {
                    continue;
                };
                match kind.to_ascii_lowercase().as_str() {
                    "doi" => {
                        // Keep the raw spelling too; the registry may echo
                        // either form back in a collision.
                        if let Some(normalized) = normalize_doi(value) {
                            known.doi.insert(normalized);
                        }
                        known.doi.insert(value.to_string());
                    }
                    "isbn" => {
                        known.isbn.insert(value.to_string());
                    }
                    "arxiv" => {
                        known.arxiv.insert(value.to_string());
                    }
                    "other-id" => {
                        known.other.insert(value.to_string());
                    }
                    _ => {}
                }
            }
        }

        known
    }

    /// Whether the given identifier value is already known under this kind.
    #[must_use]
    pub fn contains(&self, kind: IdKind, value: &str) -> bool {
        match kind {
            IdKind::Doi => self.doi.contains(value),
            IdKind::Isbn => self.isbn.contains(value),
            IdKind::Arxiv => self.arxiv.contains(value),
            IdKind::Other => self.other.contains(value),
        }
    }

    /// Whether nothing is known for this author.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doi.is_empty() && self.isbn.is_empty() && self.arxiv.is_empty() && self.other.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_levels_are_valid_empty_states() {
        let profile: WorksProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.group.is_empty());

        let profile: WorksProfile = serde_json::from_str(r#"{"group": [{}]}"#).unwrap();
        assert!(KnownIds::from_profile(&profile).is_empty());

        let profile: WorksProfile =
            serde_json::from_str(r#"{"group": [{"external-ids": {}}]}"#).unwrap();
        assert!(KnownIds::from_profile(&profile).is_empty());
    }

    #[test]
    fn known_ids_collect_all_kinds() {
        let body = r#"{
            "group": [{
                "external-ids": {"external-id": [
                    {"external-id-type": "DOI", "external-id-value": "https://doi.org/10.1/x"},
                    {"external-id-type": "isbn", "external-id-value": "978-3-16"},
                    {"external-id-type": "pmid", "external-id-value": "ignored"}
                ]},
                "work-summary": [{
                    "external-ids": {"external-id": [
                        {"external-id-type": "arxiv", "external-id-value": "1501.00001"},
                        {"external-id-type": "other-id", "external-id-value": "https://site/record/1"}
                    ]}
                }]
            }]
        }"#;
        let profile: WorksProfile = serde_json::from_str(body).unwrap();
        let known = KnownIds::from_profile(&profile);

        assert!(known.contains(IdKind::Doi, "10.1/x"));
        assert!(known.contains(IdKind::Doi, "https://doi.org/10.1/x"));
        assert!(known.contains(IdKind::Isbn, "978-3-16"));
        assert!(known.contains(IdKind::Arxiv, "1501.00001"));
        assert!(known.contains(IdKind::Other, "https://site/record/1"));
        assert!(!known.contains(IdKind::Doi, "10.9/unseen"));
    }

    #[test]
    fn dois_with_titles_pairs_summary_title() {
        let body = r#"{
            "group": [{
                "work-summary": [{
                    "title": {"title": {"value": "A Paper"}},
                    "external-ids": {"external-id": [
                        {"external-id-type": "doi", "external-id-value": "10.1/x"}
                    ]}
                }]
            }]
        }"#;
        let profile: WorksProfile = serde_json::from_str(body).unwrap();
        assert_eq!(
            profile.dois_with_titles(),
            vec![("10.1/x".to_string(), Some("A Paper".to_string()))]
        );
    }
}
