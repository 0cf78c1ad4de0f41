// Post listing — the tracked entity's most recent posts.
//
// Only post ids are needed. Posts are rediscovered from the live listing on
// every cycle and never stored.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use super::client::{LinkedInClient, PAGE_SIZE};

/// Response from `GET /posts?author=…`.
///
/// Every field is optional: a body without `elements` means no posts.
#[derive(Debug, Default, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub elements: Option<Vec<PostElement>>,
}

/// One entry of the posts listing. Only the id is read.
#[derive(Debug, Deserialize)]
pub struct PostElement {
    #[serde(default)]
    pub id: Option<String>,
}

impl PostsResponse {
    /// Extract post ids in listing order, dropping entries without an id.
    pub fn into_post_ids(self) -> Vec<String> {
        self.elements
            .unwrap_or_default()
            .into_iter()
            .filter_map(|post| post.id.filter(|id| !id.is_empty()))
            .collect()
    }
}

/// Fetch the most recent post ids for an author URN.
pub async fn fetch_post_ids(client: &LinkedInClient, author_urn: &str) -> Result<Vec<String>> {
    let response: PostsResponse = client
        .get_json("posts", &[("author", author_urn), ("count", PAGE_SIZE)])
        .await
        .with_context(|| format!("Failed to list posts for {author_urn}"))?;

    if response.elements.is_none() {
        info!(author = author_urn, "No posts found for the tracked entity");
        return Ok(Vec::new());
    }

    let ids = response.into_post_ids();
    debug!(author = author_urn, count = ids.len(), "Listed tracked posts");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_ids_in_order() {
        let json = r#"{
            "elements": [
                {"id": "urn:li:share:3", "commentary": "newest"},
                {"id": "urn:li:ugcPost:2"},
                {"id": "urn:li:share:1"}
            ],
            "paging": {"start": 0, "count": 20}
        }"#;
        let resp: PostsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_post_ids(),
            vec!["urn:li:share:3", "urn:li:ugcPost:2", "urn:li:share:1"]
        );
    }

    #[test]
    fn test_missing_elements_is_empty() {
        let resp: PostsResponse = serde_json::from_str(r#"{"paging": {}}"#).unwrap();
        assert!(resp.elements.is_none());
        assert!(resp.into_post_ids().is_empty());
    }

    #[test]
    fn test_null_elements_is_empty() {
        let resp: PostsResponse = serde_json::from_str(r#"{"elements": null}"#).unwrap();
        assert!(resp.into_post_ids().is_empty());
    }

    #[test]
    fn test_entries_without_id_are_skipped() {
        let json = r#"{"elements": [{"id": ""}, {"commentary": "no id"}, {"id": "urn:li:share:9"}]}"#;
        let resp: PostsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_post_ids(), vec!["urn:li:share:9"]);
    }
}
