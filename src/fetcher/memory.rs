use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::FetchError;
use crate::fetcher::{Fetcher, Page};

/// In-memory fetcher serving canned pages.
///
/// Unknown URLs fail like an unreachable host. Every call is counted,
/// including failed ones.
#[derive(Default)]
pub struct MemoryFetcher {
    pages: Mutex<HashMap<String, std::result::Result<String, String>>>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&self, url: &str, body: &str) {
        self.lock().insert(url.to_string(), Ok(body.to_string()));
    }

    pub fn set_failure(&self, url: &str, message: &str) {
        self.lock().insert(url.to_string(), Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, std::result::Result<String, String>>> {
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Page, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.lock().get(url) {
            Some(Ok(body)) => Ok(Page::new(url, body.as_str())),
            Some(Err(message)) => Err(FetchError::Other(message.clone())),
            None => Err(FetchError::Other(format!("no route to {}", url))),
        }
    }
}
