//! Identifier normalization.
//!
//! DOIs arrive in many spellings: bare (`10.1234/x`), prefixed (`doi:10.1234/x`),
//! or as resolver URLs. Remote comparison and the blacklist both work on the
//! canonical bare form.

/// Resolver prefixes stripped from raw DOI values, longest first.
const DOI_PREFIXES: &[&str] = &[
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "https://doi.org/",
    "http://doi.org/",
    "doi.org/",
    "doi:",
];

/// Canonicalize a raw DOI value to its bare `10.prefix/suffix` form.
///
/// Returns `None` when the value does not contain a DOI at all.
#[must_use]
pub fn normalize_doi(raw: &str) -> Option<String> {
    let mut value = raw.trim();

    for prefix in DOI_PREFIXES {
        if let (Some(head), Some(tail)) = (value.get(..prefix.len()), value.get(prefix.len()..)) {
            if head.eq_ignore_ascii_case(prefix) {
                value = tail.trim_start();
                break;
            }
        }
    }

    if value.starts_with("10.") && value.contains('/') {
        Some(value.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_doi_passes_through() {
        assert_eq!(normalize_doi("10.1103/PhysRevD.90.012345"), Some("10.1103/PhysRevD.90.012345".to_string()));
    }

    #[test]
    fn resolver_urls_are_stripped() {
        assert_eq!(normalize_doi("https://doi.org/10.1/x"), Some("10.1/x".to_string()));
        assert_eq!(normalize_doi("http://dx.doi.org/10.1/x"), Some("10.1/x".to_string()));
        assert_eq!(normalize_doi("DOI:10.1/x"), Some("10.1/x".to_string()));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(normalize_doi("  10.5555/demo  "), Some("10.5555/demo".to_string()));
    }

    #[test]
    fn non_dois_are_rejected() {
        assert_eq!(normalize_doi("arXiv:1234.5678"), None);
        assert_eq!(normalize_doi("10.1234"), None);
        assert_eq!(normalize_doi(""), None);
    }
}
