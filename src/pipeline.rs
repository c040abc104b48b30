use std::sync::Arc;

use tracing::instrument;

use crate::app::{FeedError, Result};
use crate::config::{SiteConfig, SiteRegistry};
use crate::domain::Feed;
use crate::extract::extract;
use crate::feed::assemble;
use crate::fetcher::{Fetcher, Page};

/// Fetch → extract → assemble for one site.
///
/// Has no side effects; storing the result is up to the caller.
pub struct Pipeline {
    registry: Arc<SiteRegistry>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl Pipeline {
    pub fn new(registry: Arc<SiteRegistry>, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn run(&self, site_id: &str) -> Result<Feed> {
        let config = self
            .registry
            .lookup(site_id)
            .ok_or_else(|| FeedError::UnknownSite(site_id.to_string()))?;

        let page = self
            .fetcher
            .fetch(&config.url)
            .await
            .map_err(|source| FeedError::FetchFailed {
                url: config.url.clone(),
                source,
            })?;

        Ok(build_feed(&page, config))
    }
}

// Kept synchronous: the parsed document must not live across an await.
fn build_feed(page: &Page, config: &SiteConfig) -> Feed {
    let document = page.document();
    assemble(config, extract(&document, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::fetcher::MemoryFetcher;

    const URL: &str = "https://example.com/";

    fn pipeline(fetcher: Arc<MemoryFetcher>) -> Pipeline {
        let mut sites = BTreeMap::new();
        sites.insert(
            "example".to_string(),
            SiteConfig {
                id: String::new(),
                name: "Example".into(),
                url: URL.into(),
                base_url: None,
                item_selector: "article".into(),
                title_selector: "h2".into(),
                link_selector: "a".into(),
                description_selector: Some("p".into()),
                date_selector: Some("time".into()),
                date_format: "%Y-%m-%d".into(),
            },
        );
        Pipeline::new(Arc::new(SiteRegistry::new(sites).unwrap()), fetcher)
    }

    #[tokio::test]
    async fn test_unknown_site() {
        let fetcher = Arc::new(MemoryFetcher::new());
        let err = pipeline(fetcher.clone()).run("nope").await.unwrap_err();

        assert!(matches!(err, FeedError::UnknownSite(ref id) if id == "nope"));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failed_carries_cause() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_failure(URL, "connection reset");

        let err = pipeline(fetcher).run("example").await.unwrap_err();
        match err {
            FeedError::FetchFailed { url, source } => {
                assert_eq!(url, URL);
                assert_eq!(source.to_string(), "connection reset");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_builds_feed() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_page(
            URL,
            r#"<article><h2>One</h2><a href="one">x</a><p>First</p><time>2024-01-02</time></article>
               <article><h2>Two</h2><p>No link</p></article>"#,
        );

        let feed = pipeline(fetcher).run("example").await.unwrap();
        assert_eq!(feed.title, "Example");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.entries[0].link, "https://example.com/one");
        assert!(feed.entries[0].published_at.is_some());
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_page(
            URL,
            r#"<article><h2>One</h2><a href="/one">x</a><time>bad</time></article>
               <article><h2>Two</h2><a href="https://elsewhere.org/2">y</a></article>"#,
        );
        let pipeline = pipeline(fetcher);

        let first = pipeline.run("example").await.unwrap();
        let second = pipeline.run("example").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(crate::feed::to_xml(&first), crate::feed::to_xml(&second));
    }
}
