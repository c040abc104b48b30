pub mod http_fetcher;
pub mod memory;

use async_trait::async_trait;
use scraper::Html;

use crate::app::FetchError;

pub use http_fetcher::HttpFetcher;
pub use memory::MemoryFetcher;

/// A fetched HTML page.
///
/// Holds the raw body; [`Page::document`] parses it into a queryable
/// document. The parsed [`Html`] is not `Send`, so parse only where no
/// `.await` follows.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Page, FetchError>;
}
