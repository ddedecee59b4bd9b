//! Work submission payloads for the registry write API.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::record::BibRecord;
use crate::config::Config;

/// External identifier kinds the registry understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdKind {
    /// Digital Object Identifier.
    Doi,
    /// International Standard Book Number.
    Isbn,
    /// arXiv preprint identifier.
    Arxiv,
    /// Synthetic fallback, holds the work's canonical URL.
    #[serde(rename = "other-id")]
    Other,
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Doi => "doi",
            Self::Isbn => "isbn",
            Self::Arxiv => "arxiv",
            Self::Other => "other-id",
        };
        f.write_str(name)
    }
}

/// One (kind, value) external identifier pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalId {
    /// Identifier kind.
    #[serde(rename = "external-id-type")]
    pub kind: IdKind,

    /// Identifier value, normalized for DOIs.
    #[serde(rename = "external-id-value")]
    pub value: String,
}

impl ExternalId {
    /// Build an identifier pair.
    #[must_use]
    pub fn new(kind: IdKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }
}

/// Registry work type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkType {
    Book,
    Dissertation,
    ConferencePaper,
    DataSet,
    JournalArticle,
    WorkingPaper,
    Other,
}

impl WorkType {
    /// Classify a record from its collection tags and related fields.
    ///
    /// Precedence follows the catalog's curation rules: book and thesis tags
    /// win over conference/data tags; a published record with a journal is a
    /// journal article; an unpublished record with a sourced report number is
    /// a working paper.
    #[must_use]
    pub fn classify(record: &BibRecord) -> Self {
        if record.has_collection("book") {
            return Self::Book;
        }
        if record.thesis_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("phd")) {
            return Self::Dissertation;
        }
        if record.has_collection("conferencepaper") {
            return Self::ConferencePaper;
        }
        if record.has_collection("data") {
            return Self::DataSet;
        }

        let published = record.has_collection("published");
        if published && record.journal_title.is_some() {
            return Self::JournalArticle;
        }
        if record.has_report_number && !published {
            return Self::WorkingPaper;
        }

        Self::Other
    }
}

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[12]\d{3}$").expect("valid year pattern"));
static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[01]\d$").expect("valid month pattern"));
static DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-3]\d$").expect("valid day pattern"));

/// Publication date with year precision at minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationDate {
    /// Four-digit year.
    pub year: String,

    /// Two-digit month, only when the year is present and valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,

    /// Two-digit day, only when the month is present and valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
}

impl PublicationDate {
    /// Parse a simple date string such as `2014-03-01`, `2014-03` or `2014`.
    ///
    /// Rejects anything without a plausible year. Month and day are dropped
    /// individually when malformed; a day without a month is dropped too.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw
            .split(|c: char| c == '-' || c == '/' || c == '.' || c.is_whitespace())
            .filter(|part| !part.is_empty());

        let year = parts.next()?;
        if !YEAR_RE.is_match(year) {
            return None;
        }

        let mut date = Self { year: year.to_string(), month: None, day: None };

        if let Some(month) = parts.next() {
            if MONTH_RE.is_match(month) {
                date.month = Some(month.to_string());
                if let Some(day) = parts.next() {
                    if DAY_RE.is_match(day) {
                        date.day = Some(day.to_string());
                    }
                }
            }
        }

        Some(date)
    }

    /// Pick the publication date for a record.
    ///
    /// Preference order: preprint date, imprint date, thesis date, then the
    /// bare journal year.
    #[must_use]
    pub fn from_record(record: &BibRecord) -> Option<Self> {
        for candidate in [&record.preprint_date, &record.imprint_date, &record.thesis_date] {
            if let Some(date) = candidate.as_deref().and_then(Self::parse) {
                return Some(date);
            }
        }

        record
            .journal_year
            .as_deref()
            .filter(|year| YEAR_RE.is_match(year))
            .map(|year| Self { year: year.to_string(), month: None, day: None })
    }
}

/// A work contributor (anyone who signed the paper except the pushing author).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    /// Display name.
    pub name: String,

    /// Contributor attributes.
    pub attributes: ContributorAttributes,
}

/// Registry contributor attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorAttributes {
    /// Contribution role; this workflow only submits authors.
    pub role: String,
}

impl Contributor {
    /// Build an author contributor.
    #[must_use]
    pub fn author(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: ContributorAttributes { role: "author".to_string() },
        }
    }
}

/// Rendered citation attached to a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Citation format; always BibTeX in this workflow.
    #[serde(rename = "citation-type")]
    pub kind: String,

    /// Citation text.
    #[serde(rename = "citation-value")]
    pub value: String,
}

impl Citation {
    /// Extract the BibTeX entry from rendered citation text.
    ///
    /// The renderer wraps the entry in markup; the entry itself spans from the
    /// first `@` to the last `}`.
    #[must_use]
    pub fn bibtex(raw: &str) -> Option<Self> {
        let start = raw.find('@')?;
        let end = raw.rfind('}')?;
        if end < start {
            return None;
        }
        Some(Self { kind: "bibtex".to_string(), value: raw[start..=end].to_string() })
    }
}

/// Language names mapped to ISO 639-1 codes.
const LANGUAGE_MAP: &[(&str, &str)] = &[
    ("bulgarian", "bg"),
    ("chinese", "zh"),
    ("czech", "cs"),
    ("dutch", "nl"),
    ("english", "en"),
    ("esperanto", "eo"),
    ("finnish", "fi"),
    ("french", "fr"),
    ("german", "de"),
    ("greek", "el"),
    ("hebrew", "he"),
    ("hungarian", "hu"),
    ("indonesian", "id"),
    ("italian", "it"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("latin", "la"),
    ("norwegian", "no"),
    ("persian", "fa"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("romanian", "ro"),
    ("russian", "ru"),
    ("slovak", "sk"),
    ("spanish", "es"),
    ("swedish", "sv"),
    ("turkish", "tr"),
    ("ukrainian", "uk"),
];

/// Map a language name to its ISO 639-1 code, defaulting to English.
#[must_use]
pub fn language_code(name: Option<&str>) -> &'static str {
    name.and_then(|name| {
        let name = name.trim().to_ascii_lowercase();
        LANGUAGE_MAP.iter().find(|(key, _)| *key == name).map(|(_, code)| *code)
    })
    .unwrap_or("en")
}

/// One work as submitted to the registry write API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkSubmission {
    /// Local record id, not part of the wire payload.
    #[serde(skip)]
    pub record_id: i64,

    /// Work title.
    pub title: String,

    /// Truncated abstract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    /// Journal title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_title: Option<String>,

    /// BibTeX citation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,

    /// Registry work type.
    #[serde(rename = "type")]
    pub work_type: WorkType,

    /// Publication date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<PublicationDate>,

    /// External identifiers; never empty.
    pub external_ids: Vec<ExternalId>,

    /// Canonical record URL.
    pub url: String,

    /// Contributors; omitted for collaboration-scale author lists.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Contributor>,

    /// ISO 639-1 language code.
    pub language_code: String,

    /// Registry visibility; always public in this workflow.
    pub visibility: String,
}

impl WorkSubmission {
    /// Build a submission from a record and its extracted identifiers.
    #[must_use]
    pub fn from_record(
        record: &BibRecord,
        author_id: i64,
        url: String,
        ids: BTreeSet<ExternalId>,
        config: &Config,
    ) -> Self {
        let contributors = if record.signatures.len() > config.max_coauthors {
            // The registry can't process collaboration papers; drop the list.
            Vec::new()
        } else {
            record
                .signatures
                .iter()
                .filter(|sig| sig.author_id != author_id)
                .map(|sig| Contributor::author(&sig.name))
                .collect()
        };

        Self {
            record_id: record.record_id,
            title: record.title.clone(),
            short_description: record
                .description
                .as_deref()
                .map(|text| truncate_at_word(text, config.max_description_length)),
            journal_title: record.journal_title.clone(),
            citation: record.citation.as_deref().and_then(Citation::bibtex),
            work_type: WorkType::classify(record),
            publication_date: PublicationDate::from_record(record),
            external_ids: ids.into_iter().collect(),
            url,
            contributors,
            language_code: language_code(record.language.as_deref()).to_string(),
            visibility: "public".to_string(),
        }
    }

    /// Whether this submission carries the given identifier value.
    #[must_use]
    pub fn carries_id(&self, value: &str) -> bool {
        self.external_ids.iter().any(|id| id.value == value)
    }
}

/// JSON envelope for one push request.
#[derive(Debug, Serialize)]
pub struct WorkBatch<'a> {
    /// The works in this batch.
    pub works: &'a [WorkSubmission],
}

/// Truncate text to `max` characters, backing up to the last word boundary.
fn truncate_at_word(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    match truncated.rfind(' ') {
        Some(pos) => truncated[..pos].to_string(),
        None => truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Signature;

    fn test_config() -> Config {
        Config::for_testing("http://localhost", std::env::temp_dir().join("bl.json"))
    }

    #[test]
    fn classify_prefers_book_over_everything() {
        let record = BibRecord {
            collections: vec!["Book".to_string(), "ConferencePaper".to_string()],
            ..BibRecord::default()
        };
        assert_eq!(WorkType::classify(&record), WorkType::Book);
    }

    #[test]
    fn classify_phd_thesis_as_dissertation() {
        let record = BibRecord { thesis_type: Some("PhD".to_string()), ..BibRecord::default() };
        assert_eq!(WorkType::classify(&record), WorkType::Dissertation);
    }

    #[test]
    fn classify_published_journal_record() {
        let record = BibRecord {
            collections: vec!["Published".to_string()],
            journal_title: Some("Phys. Rev. D".to_string()),
            ..BibRecord::default()
        };
        assert_eq!(WorkType::classify(&record), WorkType::JournalArticle);
    }

    #[test]
    fn classify_unpublished_report_as_working_paper() {
        let record = BibRecord { has_report_number: true, ..BibRecord::default() };
        assert_eq!(WorkType::classify(&record), WorkType::WorkingPaper);
        let published = BibRecord {
            has_report_number: true,
            collections: vec!["Published".to_string()],
            ..BibRecord::default()
        };
        assert_eq!(WorkType::classify(&published), WorkType::Other);
    }

    #[test]
    fn date_parse_full_and_partial() {
        assert_eq!(
            PublicationDate::parse("2014-03-01"),
            Some(PublicationDate {
                year: "2014".to_string(),
                month: Some("03".to_string()),
                day: Some("01".to_string()),
            })
        );
        assert_eq!(
            PublicationDate::parse("2014-03"),
            Some(PublicationDate {
                year: "2014".to_string(),
                month: Some("03".to_string()),
                day: None,
            })
        );
        // Malformed month drops the day as well.
        assert_eq!(
            PublicationDate::parse("2014-33-01"),
            Some(PublicationDate { year: "2014".to_string(), month: None, day: None })
        );
        assert_eq!(PublicationDate::parse("sometime"), None);
        assert_eq!(PublicationDate::parse("999"), None);
    }

    #[test]
    fn date_precedence_prefers_preprint() {
        let record = BibRecord {
            preprint_date: Some("2015-06".to_string()),
            imprint_date: Some("2016-01".to_string()),
            journal_year: Some("2017".to_string()),
            ..BibRecord::default()
        };
        assert_eq!(PublicationDate::from_record(&record).unwrap().year, "2015");

        let journal_only =
            BibRecord { journal_year: Some("2017".to_string()), ..BibRecord::default() };
        let date = PublicationDate::from_record(&journal_only).unwrap();
        assert_eq!(date.year, "2017");
        assert!(date.month.is_none());
    }

    #[test]
    fn language_mapping_defaults_to_english() {
        assert_eq!(language_code(Some("Polish")), "pl");
        assert_eq!(language_code(Some(" german ")), "de");
        assert_eq!(language_code(Some("klingon")), "en");
        assert_eq!(language_code(None), "en");
    }

    #[test]
    fn citation_extracts_bibtex_span() {
        let raw = "<pre>@article{x, title={T}}</pre>";
        let citation = Citation::bibtex(raw).unwrap();
        assert_eq!(citation.kind, "bibtex");
        assert_eq!(citation.value, "@article{x, title={T}}");
        assert!(Citation::bibtex("no entry here").is_none());
    }

    #[test]
    fn truncation_backs_up_to_word_boundary() {
        assert_eq!(truncate_at_word("alpha beta gamma", 10), "alpha");
        assert_eq!(truncate_at_word("short", 10), "short");
        assert_eq!(truncate_at_word("unbrokenrun", 5), "unbro");
    }

    #[test]
    fn contributors_exclude_author_and_respect_ceiling() {
        let config = test_config();
        let record = BibRecord {
            record_id: 1,
            title: "T".to_string(),
            signatures: vec![
                Signature { author_id: 7, name: "Self, A.".to_string() },
                Signature { author_id: 8, name: "Other, B.".to_string() },
            ],
            ..BibRecord::default()
        };
        let ids = BTreeSet::from([ExternalId::new(IdKind::Doi, "10.1/x")]);
        let work = WorkSubmission::from_record(&record, 7, "u".to_string(), ids.clone(), &config);
        assert_eq!(work.contributors.len(), 1);
        assert_eq!(work.contributors[0].name, "Other, B.");

        let crowd = BibRecord {
            signatures: (0..30)
                .map(|i| Signature { author_id: i, name: format!("Author {i}") })
                .collect(),
            ..record
        };
        let work = WorkSubmission::from_record(&crowd, 7, "u".to_string(), ids, &config);
        assert!(work.contributors.is_empty());
    }

    #[test]
    fn submission_serializes_registry_field_names() {
        let config = test_config();
        let record = BibRecord {
            record_id: 9,
            title: "A Title".to_string(),
            language: Some("english".to_string()),
            ..BibRecord::default()
        };
        let ids = BTreeSet::from([ExternalId::new(IdKind::Doi, "10.1/x")]);
        let work = WorkSubmission::from_record(
            &record,
            1,
            "https://site/record/9".to_string(),
            ids,
            &config,
        );

        let json = serde_json::to_value(&work).unwrap();
        assert_eq!(json["title"], "A Title");
        assert_eq!(json["type"], "other");
        assert_eq!(json["visibility"], "public");
        assert_eq!(json["language-code"], "en");
        assert_eq!(json["external-ids"][0]["external-id-type"], "doi");
        assert_eq!(json["external-ids"][0]["external-id-value"], "10.1/x");
        assert!(json.get("short-description").is_none());
        assert!(json.get("contributors").is_none());
        assert!(json.get("record_id").is_none());
    }
}
