//! Bibliographic record fields as returned by a record provider.
//!
//! The provider is a black box; this is the flattened view of the MARC fields
//! the sync engine needs. Every field is optional or defaulted so partial
//! records never fail to load.

use serde::{Deserialize, Serialize};

/// One author signature on a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    /// Local author id.
    pub author_id: i64,

    /// Display name as printed on the paper.
    pub name: String,
}

/// The fields needed to build one work submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BibRecord {
    /// Local record id.
    pub record_id: i64,

    /// Work title.
    #[serde(default)]
    pub title: String,

    /// Abstract text, if any.
    #[serde(default)]
    pub description: Option<String>,

    /// Journal title, if published in one.
    #[serde(default)]
    pub journal_title: Option<String>,

    /// DOI values, raw as recorded.
    #[serde(default)]
    pub dois: Vec<String>,

    /// ISBN, for books.
    #[serde(default)]
    pub isbn: Option<String>,

    /// arXiv identifiers.
    #[serde(default)]
    pub arxiv_ids: Vec<String>,

    /// Collection tags (e.g. "Published", "Book", "ConferencePaper", "Data").
    #[serde(default)]
    pub collections: Vec<String>,

    /// Thesis type (e.g. "PhD"), if the record is a thesis.
    #[serde(default)]
    pub thesis_type: Option<String>,

    /// Thesis defense date.
    #[serde(default)]
    pub thesis_date: Option<String>,

    /// Preprint date.
    #[serde(default)]
    pub preprint_date: Option<String>,

    /// Imprint (publisher) date.
    #[serde(default)]
    pub imprint_date: Option<String>,

    /// Publication year from the journal reference.
    #[serde(default)]
    pub journal_year: Option<String>,

    /// Whether the record carries a sourced report number.
    #[serde(default)]
    pub has_report_number: bool,

    /// Language name (e.g. "English"), if recorded.
    #[serde(default)]
    pub language: Option<String>,

    /// Author signatures, in record order.
    #[serde(default)]
    pub signatures: Vec<Signature>,

    /// Rendered citation text, expected to contain a BibTeX entry.
    #[serde(default)]
    pub citation: Option<String>,
}

impl BibRecord {
    /// Case-insensitive check for a collection tag.
    #[must_use]
    pub fn has_collection(&self, tag: &str) -> bool {
        self.collections.iter().any(|c| c.eq_ignore_ascii_case(tag))
    }
}
