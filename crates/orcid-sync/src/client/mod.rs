//! Registry HTTP client.
//!
//! Two clients with deliberately different behavior:
//! - the read client retries connect/read timeouts with exponential backoff
//!   (bounded attempts) and fails open to an empty snapshot;
//! - the write client never retries, so a flaky network can't silently
//!   duplicate submissions.

mod middleware;

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{RegistryError, RegistryResult};
use crate::models::work::{WorkBatch, WorkSubmission};
use crate::models::{KnownIds, WorksProfile};

use middleware::TimeoutRetryStrategy;

/// Pattern the registry uses to name the conflicting value in a collision body.
static COLLISION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"have the same external id "([^"]+)""#).expect("valid collision pattern")
});

/// Write API response classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResponse {
    /// 200/201, the batch was accepted.
    Accepted,
    /// 401, the bearer token is invalid or revoked.
    Unauthorized,
    /// 4xx naming a duplicate external identifier.
    Collision {
        /// The conflicting identifier value, exactly as the registry spelled it.
        value: String,
    },
}

/// Client for the registry read and write APIs.
pub struct RegistryClient {
    /// Read client with timeout-only retry middleware.
    fetch: ClientWithMiddleware,

    /// Write client, no retry middleware.
    push: Client,

    /// Public (read) API base URL.
    public_api_url: String,

    /// Member (write) API base URL.
    member_api_url: String,

    /// Read-side access token, if configured.
    public_token: Option<String>,
}

impl RegistryClient {
    /// Create a new client from the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "application/json".parse().expect("valid accept header"),
        );

        let fetch = Client::builder()
            .default_headers(headers.clone())
            .timeout(config.fetch_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(config.fetch_backoff_base, api::FETCH_BACKOFF_MAX)
            .build_with_max_retries(config.fetch_max_retries());

        let fetch = ClientBuilder::new(fetch)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                TimeoutRetryStrategy,
            ))
            .build();

        let push = Client::builder()
            .default_headers(headers)
            .timeout(config.push_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            fetch,
            push,
            public_api_url: config.public_api_url.trim_end_matches('/').to_string(),
            member_api_url: config.member_api_url.trim_end_matches('/').to_string(),
            public_token: config.public_token.clone(),
        })
    }

    /// Fetch the identifiers the registry already knows for this author.
    ///
    /// On any terminal failure this returns the EMPTY snapshot and emits an
    /// alert. Callers proceed as if nothing is known remotely; the registry's
    /// own collision handling keeps redundant submissions idempotent. This is
    /// a deliberate availability-over-correctness tradeoff.
    pub async fn fetch_known_ids(&self, orcid: &str) -> KnownIds {
        match self.try_fetch_profile(orcid).await {
            Ok(profile) => KnownIds::from_profile(&profile),
            Err(err) => {
                tracing::error!(
                    %orcid,
                    error = %err,
                    "fetching remote works failed; proceeding with empty snapshot"
                );
                KnownIds::default()
            }
        }
    }

    /// Fetch and parse the raw works profile.
    async fn try_fetch_profile(&self, orcid: &str) -> RegistryResult<WorksProfile> {
        let url = format!("{}/{orcid}/works", self.public_api_url);

        let mut request = self.fetch.get(&url);
        if let Some(ref token) = self.public_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::unexpected(status.as_u16(), body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(RegistryError::from)
    }

    /// Submit one batch of works to the author's registry record.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a status the engine has no
    /// handling for; 200/201, 401 and recognizable collisions are classified,
    /// not errors.
    pub async fn push_batch(
        &self,
        orcid: &str,
        token: &str,
        works: &[WorkSubmission],
    ) -> RegistryResult<PushResponse> {
        let url = format!("{}/{orcid}/orcid-works", self.member_api_url);

        let response = self
            .push
            .post(&url)
            .bearer_auth(token)
            .json(&WorkBatch { works })
            .send()
            .await?;

        let status = response.status().as_u16();
        match status {
            200 | 201 => Ok(PushResponse::Accepted),
            401 => Ok(PushResponse::Unauthorized),
            400..=499 => {
                let body = response.text().await.unwrap_or_default();
                match collision_value(&body) {
                    Some(value) => Ok(PushResponse::Collision { value }),
                    None => Err(RegistryError::unexpected(status, body)),
                }
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(RegistryError::unexpected(status, body))
            }
        }
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("public_api_url", &self.public_api_url)
            .field("member_api_url", &self.member_api_url)
            .finish()
    }
}

/// Extract the conflicting identifier value from a collision body.
#[must_use]
pub fn collision_value(body: &str) -> Option<String> {
    COLLISION_RE.captures(body).map(|caps| caps[1].to_string())
}
