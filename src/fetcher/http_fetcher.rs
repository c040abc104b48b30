use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::app::FetchError;
use crate::config::FetchSettings;
use crate::fetcher::{Fetcher, Page};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

/// Whether a content type names an HTML or XML document.
fn is_document(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("html") || content_type.contains("xml")
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // A missing content type is given the benefit of the doubt.
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_document(content_type) {
                return Err(FetchError::NotDocument(content_type.to_string()));
            }
        }

        let body = response.text().await?;
        tracing::debug!(%url, bytes = body.len(), "Fetched page");

        Ok(Page::new(url, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    "<html><body><article>hi</article></body></html>",
                    "text/html; charset=utf-8",
                ),
            )
            .mount(&server)
            .await;

        let url = format!("{}/news", server.uri());
        let page = fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.url, url);
        assert!(page.body.contains("<article>hi</article>"));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher().fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
            )
            .mount(&server)
            .await;

        let err = fetcher().fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::NotDocument(ref ct) if ct == "image/png"));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let err = fetcher().fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[test]
    fn test_is_document() {
        assert!(is_document("text/html"));
        assert!(is_document("application/xhtml+xml"));
        assert!(is_document("TEXT/HTML; charset=UTF-8"));
        assert!(!is_document("application/json"));
    }
}
