//! Maps feed reads onto HTTP-style responses.
//!
//! The listener itself lives outside this crate; anything serving
//! `GET /rss?site=<id>` can hand the query value to [`respond`].

use crate::app::FeedError;
use crate::cache::RefreshCache;
use crate::feed::{to_xml, RSS_CONTENT_TYPE};

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl FeedResponse {
    fn error(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: TEXT_CONTENT_TYPE,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Status code for a failed read: unknown sites are the caller's fault,
/// fetch failures the upstream's.
pub fn status_for(error: &FeedError) -> u16 {
    match error {
        FeedError::UnknownSite(_) => 404,
        FeedError::FetchFailed { .. } => 502,
        FeedError::Config(_) | FeedError::Http(_) => 500,
    }
}

pub async fn respond(cache: &RefreshCache, site: Option<&str>) -> FeedResponse {
    let Some(site) = site.map(str::trim).filter(|s| !s.is_empty()) else {
        return FeedResponse::error(400, "Missing 'site' parameter".to_string());
    };

    match cache.get_or_refresh(site).await {
        Ok(feed) => FeedResponse {
            status: 200,
            content_type: RSS_CONTENT_TYPE,
            body: to_xml(&feed),
        },
        Err(e) => FeedResponse::error(status_for(&e), format!("Failed to generate RSS: {}", e)),
    }
}
