//! Configuration for the ORCID sync engine.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Registry endpoint constants.
pub mod api {
    use std::time::Duration;

    /// Member (write) API endpoint, used for pushing works.
    pub const MEMBER_API: &str = "https://api.orcid.org/v2.1";

    /// Public (read) API endpoint, used for fetching known works.
    pub const PUBLIC_API: &str = "https://pub.orcid.org/v2.1";

    /// Per-request timeout on the read side.
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(16);

    /// Per-request timeout on the write side. The registry can be slow to
    /// validate a batch, but an unbounded wait is worse.
    pub const PUSH_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Total attempts for a read request (initial try + retries).
    pub const FETCH_MAX_ATTEMPTS: u32 = 3;

    /// First retry wait on the read side; doubles per attempt.
    pub const FETCH_BACKOFF_BASE: Duration = Duration::from_millis(250);

    /// Upper bound for the read-side backoff.
    pub const FETCH_BACKOFF_MAX: Duration = Duration::from_secs(2);
}

/// Submission limits enforced when building work payloads.
pub mod limits {
    /// Works per push request.
    pub const BATCH_SIZE: usize = 1;

    /// Contributor lists above this size are omitted entirely; the registry
    /// rejects collaboration-scale author lists.
    pub const MAX_COAUTHORS: usize = 25;

    /// Maximum length of a short description, truncated at a word boundary.
    pub const MAX_DESCRIPTION_LENGTH: usize = 4500;
}

/// Engine configuration, passed into the orchestrator at construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Member (write) API base URL.
    pub member_api_url: String,

    /// Public (read) API base URL.
    pub public_api_url: String,

    /// Read-side access token for the public API (optional).
    pub public_token: Option<String>,

    /// Local site base URL, used to build canonical record links.
    pub site_url: String,

    /// Path of the collision blacklist document.
    pub blacklist_path: PathBuf,

    /// Works per push request.
    pub batch_size: usize,

    /// Read-side request timeout.
    pub fetch_timeout: Duration,

    /// Write-side request timeout.
    pub push_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Total attempts for a read request.
    pub fetch_max_attempts: u32,

    /// First retry wait on the read side.
    pub fetch_backoff_base: Duration,

    /// Contributor ceiling per work.
    pub max_coauthors: usize,

    /// Description length ceiling per work.
    pub max_description_length: usize,
}

impl Config {
    /// Create a configuration with production endpoints.
    #[must_use]
    pub fn new(site_url: String, blacklist_path: PathBuf, public_token: Option<String>) -> Self {
        Self {
            member_api_url: api::MEMBER_API.to_string(),
            public_api_url: api::PUBLIC_API.to_string(),
            public_token,
            site_url,
            blacklist_path,
            batch_size: limits::BATCH_SIZE,
            fetch_timeout: api::FETCH_TIMEOUT,
            push_timeout: api::PUSH_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            fetch_max_attempts: api::FETCH_MAX_ATTEMPTS,
            fetch_backoff_base: api::FETCH_BACKOFF_BASE,
            max_coauthors: limits::MAX_COAUTHORS,
            max_description_length: limits::MAX_DESCRIPTION_LENGTH,
        }
    }

    /// Create a test configuration pointed at a mock registry.
    #[must_use]
    pub fn for_testing(base_url: &str, blacklist_path: PathBuf) -> Self {
        Self {
            member_api_url: format!("{base_url}/member/v2.1"),
            public_api_url: format!("{base_url}/pub/v2.1"),
            public_token: None,
            site_url: "https://inspirehep.example.org".to_string(),
            blacklist_path,
            batch_size: limits::BATCH_SIZE,
            fetch_timeout: Duration::from_millis(500),
            push_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            fetch_max_attempts: api::FETCH_MAX_ATTEMPTS,
            fetch_backoff_base: Duration::from_millis(10), // fast retries in tests
            max_coauthors: limits::MAX_COAUTHORS,
            max_description_length: limits::MAX_DESCRIPTION_LENGTH,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing.
    pub fn from_env() -> anyhow::Result<Self> {
        let site_url = std::env::var("ORCID_SYNC_SITE_URL")
            .unwrap_or_else(|_| "https://inspirehep.net".to_string());
        let blacklist_path = std::env::var("ORCID_SYNC_BLACKLIST_FILE")
            .unwrap_or_else(|_| "orcid_blacklist.json".to_string());
        let public_token = std::env::var("ORCID_SYNC_PUBLIC_TOKEN").ok();

        let mut config = Self::new(site_url, PathBuf::from(blacklist_path), public_token);
        if let Ok(member) = std::env::var("ORCID_SYNC_MEMBER_API_URL") {
            config.member_api_url = member;
        }
        if let Ok(public) = std::env::var("ORCID_SYNC_PUBLIC_API_URL") {
            config.public_api_url = public;
        }
        Ok(config)
    }

    /// Canonical URL of a local record, used as the fallback external id.
    #[must_use]
    pub fn record_url(&self, record_id: i64) -> String {
        Url::parse(&self.site_url)
            .and_then(|base| base.join(&format!("record/{record_id}")))
            .map_or_else(
                |_| format!("{}/record/{record_id}", self.site_url.trim_end_matches('/')),
                |url| url.to_string(),
            )
    }

    /// Number of retries after the initial read attempt.
    #[must_use]
    pub const fn fetch_max_retries(&self) -> u32 {
        self.fetch_max_attempts.saturating_sub(1)
    }
}
