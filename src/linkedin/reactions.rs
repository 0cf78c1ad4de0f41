// Reaction fetching — the most recent reactions on one tracked post.
//
// The wire shape is loosely typed: the reactor can be a profile with
// localized names or a bare member URN, and any field can be missing.
// Everything is normalised into `Reaction` here so the pipeline never
// looks at raw JSON.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::debug;

use super::client::{LinkedInClient, PAGE_SIZE};

/// Display name used when a reaction carries no readable reactor name.
pub const UNKNOWN_REACTOR: &str = "A LinkedIn member";

/// Reaction kind used when LinkedIn omits `reactionType`.
pub const UNKNOWN_KIND: &str = "UNKNOWN";

/// A reaction on a tracked post, as the pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Platform-assigned id, unique across LinkedIn.
    pub id: String,
    pub post_id: String,
    pub actor_name: String,
    /// LIKE, PRAISE, EMPATHY, … — passed through untouched.
    pub kind: String,
    /// When reactwatch fetched it, not when the member reacted.
    pub observed_at: DateTime<Utc>,
}

/// Response from `GET /posts/{id}/reactions`.
#[derive(Debug, Default, Deserialize)]
pub struct ReactionsResponse {
    #[serde(default)]
    pub elements: Option<Vec<ReactionElement>>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionElement {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "reactionType")]
    pub reaction_type: Option<String>,
    #[serde(default)]
    pub reactor: Option<Reactor>,
}

/// Who reacted. LinkedIn returns either an expanded profile or a member URN.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Reactor {
    Profile {
        #[serde(default, rename = "firstName")]
        first_name: Option<LocalizedString>,
        #[serde(default, rename = "lastName")]
        last_name: Option<LocalizedString>,
    },
    Urn(String),
    Other(serde_json::Value),
}

/// A multi-locale string, e.g. `{"localized": {"en_US": "Alice"}}`.
#[derive(Debug, Default, Deserialize)]
pub struct LocalizedString {
    #[serde(default)]
    pub localized: BTreeMap<String, String>,
}

impl LocalizedString {
    /// The en_US value, or the first locale available.
    pub fn best(&self) -> Option<&str> {
        self.localized
            .get("en_US")
            .or_else(|| self.localized.values().next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

impl Reactor {
    /// Human-readable name for the notification message.
    pub fn display_name(&self) -> String {
        match self {
            Reactor::Profile {
                first_name,
                last_name,
            } => {
                let parts: Vec<&str> = [first_name, last_name]
                    .iter()
                    .filter_map(|name| name.as_ref().and_then(LocalizedString::best))
                    .collect();
                if parts.is_empty() {
                    UNKNOWN_REACTOR.to_string()
                } else {
                    parts.join(" ")
                }
            }
            Reactor::Urn(urn) if !urn.trim().is_empty() => urn.trim().to_string(),
            _ => UNKNOWN_REACTOR.to_string(),
        }
    }
}

impl ReactionsResponse {
    /// Convert the raw listing into reactions, keeping listing order.
    ///
    /// Entries without an id can't be deduplicated and are dropped.
    pub fn into_reactions(self, post_id: &str, observed_at: DateTime<Utc>) -> Vec<Reaction> {
        self.elements
            .unwrap_or_default()
            .into_iter()
            .filter_map(|element| {
                let Some(id) = element.id.filter(|id| !id.is_empty()) else {
                    debug!(post_id = post_id, "Skipping reaction without an id");
                    return None;
                };
                Some(Reaction {
                    id,
                    post_id: post_id.to_string(),
                    actor_name: element
                        .reactor
                        .as_ref()
                        .map(Reactor::display_name)
                        .unwrap_or_else(|| UNKNOWN_REACTOR.to_string()),
                    kind: element
                        .reaction_type
                        .filter(|kind| !kind.is_empty())
                        .unwrap_or_else(|| UNKNOWN_KIND.to_string()),
                    observed_at,
                })
            })
            .collect()
    }
}

/// Fetch the most recent reactions for a post.
///
/// Post ids are URNs (`urn:li:share:…`), so they are percent-encoded
/// before going into the path.
pub async fn fetch_reactions(client: &LinkedInClient, post_id: &str) -> Result<Vec<Reaction>> {
    let path = format!(
        "posts/{}/reactions",
        utf8_percent_encode(post_id, NON_ALPHANUMERIC)
    );

    let response: ReactionsResponse = client
        .get_json(&path, &[("count", PAGE_SIZE)])
        .await
        .with_context(|| format!("Failed to fetch reactions for post {post_id}"))?;

    let reactions = response.into_reactions(post_id, Utc::now());
    debug!(
        post_id = post_id,
        count = reactions.len(),
        "Fetched reactions"
    );
    Ok(reactions)
}
