// LinkedIn REST client — bearer-authenticated GETs against the v2 API.
//
// A thin reqwest wrapper with a generic JSON GET helper. The posts and
// reactions modules build on top of it, and this type is the production
// implementation of the SocialClient trait.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::reactions::Reaction;
use super::traits::SocialClient;
use crate::config::TrackedEntity;

/// Default LinkedIn REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.linkedin.com/v2";

/// How many posts / reactions to request per listing. Only the most recent
/// window is ever looked at; there is no pagination.
pub const PAGE_SIZE: &str = "20";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated HTTP client for the LinkedIn posts and reactions endpoints.
pub struct LinkedInClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    entity: TrackedEntity,
}

impl LinkedInClient {
    /// Create a client for the given API base, credential and tracked entity.
    ///
    /// The entity is not validated here. See `list_tracked_posts`.
    pub fn new(base_url: &str, api_key: &str, entity: TrackedEntity) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("reactwatch/0.1 (reaction-relay)")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            entity,
        })
    }

    /// Make an authenticated GET request and deserialize the JSON response.
    ///
    /// `path` is appended to the base URL and must already be percent-encoded.
    /// Non-2xx responses, timeouts and unparseable bodies are all errors.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        debug!(path = path, "LinkedIn GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(params)
            .send()
            .await
            .with_context(|| format!("LinkedIn request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LinkedIn API {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize LinkedIn {path} response"))
    }
}

#[async_trait]
impl SocialClient for LinkedInClient {
    async fn list_tracked_posts(&self) -> Result<Vec<String>> {
        // Configuration problems mean "track nothing" and are reported on
        // every cycle until fixed.
        if self.entity.id.is_empty() {
            warn!("LINKEDIN_USER_ID not set. Tracking no posts.");
            return Ok(Vec::new());
        }
        let author = match self.entity.author_urn() {
            Ok(urn) => urn,
            Err(e) => {
                error!(error = %e, "Invalid tracked entity. Tracking no posts.");
                return Ok(Vec::new());
            }
        };

        super::posts::fetch_post_ids(self, &author).await
    }

    async fn list_reactions(&self, post_id: &str) -> Result<Vec<Reaction>> {
        super::reactions::fetch_reactions(self, post_id).await
    }
}
