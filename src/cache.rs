//! Stale-while-revalidate cache of assembled feeds.
//!
//! Reads never wait on an upstream site once it has produced a feed:
//!
//! | cached entry | `get_or_refresh` |
//! |--------------|------------------|
//! | fresh        | returns it |
//! | expired      | returns it, refreshes in the background |
//! | none         | runs the pipeline inline; errors reach the caller |
//!
//! The map sits behind one reader/writer lock. The lock is only taken to look
//! up or install an entry, never while a page is being fetched.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::app::{FeedError, Result};
use crate::domain::Feed;
use crate::pipeline::Pipeline;

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
/// Longest TTL the cache accepts; larger values are clamped.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 86400);

#[derive(Debug, Clone)]
struct CacheEntry {
    feed: Arc<Feed>,
    expires_at: Instant,
    refreshed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Most recent refresh error per site, cleared on success.
    failures: HashMap<String, String>,
}

/// Result of [`RefreshCache::force_refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { entries: usize },
    Failed { reason: String },
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Missing,
}

/// Point-in-time view of one site's cache slot.
#[derive(Debug, Clone)]
pub struct SiteStatus {
    pub site_id: String,
    pub freshness: Freshness,
    pub entries: Option<usize>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Shared handle to the cache; clones refer to the same state.
#[derive(Clone)]
pub struct RefreshCache {
    inner: Arc<Inner>,
}

struct Inner {
    pipeline: Pipeline,
    ttl: Duration,
    state: RwLock<CacheState>,
    /// Sites with a stale-triggered refresh still running.
    in_flight: Mutex<HashSet<String>>,
}

impl RefreshCache {
    pub fn new(pipeline: Pipeline, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline,
                ttl: ttl.min(MAX_TTL),
                state: RwLock::new(CacheState::default()),
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Every site id the registry knows, sorted.
    pub fn site_ids(&self) -> Vec<String> {
        self.inner.pipeline.registry().site_ids()
    }

    /// Serve a feed, refreshing it as needed.
    ///
    /// Only a cold miss can fail: once a site has produced a feed, this keeps
    /// returning it however stale it gets.
    pub async fn get_or_refresh(&self, site_id: &str) -> Result<Arc<Feed>> {
        let cached = {
            let state = self.inner.state.read().await;
            state
                .entries
                .get(site_id)
                .map(|entry| (entry.feed.clone(), entry.expires_at))
        };

        match cached {
            Some((feed, expires_at)) if Instant::now() < expires_at => {
                debug!(site = %site_id, "Fresh cache hit");
                Ok(feed)
            }
            Some((feed, _)) => {
                debug!(site = %site_id, "Stale cache hit");
                self.spawn_refresh(site_id);
                Ok(feed)
            }
            None => {
                debug!(site = %site_id, "Cache miss");
                match self.inner.pipeline.run(site_id).await {
                    Ok(feed) => {
                        let feed = Arc::new(feed);
                        self.install(site_id, feed.clone()).await;
                        Ok(feed)
                    }
                    Err(e) => {
                        self.record_failure(site_id, &e).await;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Run the pipeline now and overwrite the entry on success.
    ///
    /// Failures are logged and recorded; the previous entry stays in place.
    pub async fn force_refresh(&self, site_id: &str) -> RefreshOutcome {
        info!(site = %site_id, "Refreshing cache");

        match self.inner.pipeline.run(site_id).await {
            Ok(feed) => {
                let entries = feed.len();
                self.install(site_id, Arc::new(feed)).await;
                info!(site = %site_id, entries, "Cache refreshed");
                RefreshOutcome::Refreshed { entries }
            }
            Err(e) => {
                warn!(site = %site_id, error = %e, "Failed to refresh cache");
                self.record_failure(site_id, &e).await;
                RefreshOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The cached feed, if any, without triggering a refresh.
    pub async fn cached(&self, site_id: &str) -> Option<Arc<Feed>> {
        let state = self.inner.state.read().await;
        state.entries.get(site_id).map(|entry| entry.feed.clone())
    }

    /// Status of every registered site.
    pub async fn status(&self) -> Vec<SiteStatus> {
        let now = Instant::now();
        let state = self.inner.state.read().await;

        self.site_ids()
            .into_iter()
            .map(|site_id| {
                let entry = state.entries.get(&site_id);
                let freshness = match entry {
                    Some(e) if now < e.expires_at => Freshness::Fresh,
                    Some(_) => Freshness::Stale,
                    None => Freshness::Missing,
                };

                SiteStatus {
                    freshness,
                    entries: entry.map(|e| e.feed.len()),
                    refreshed_at: entry.map(|e| e.refreshed_at),
                    last_error: state.failures.get(&site_id).cloned(),
                    site_id,
                }
            })
            .collect()
    }

    fn spawn_refresh(&self, site_id: &str) {
        let Some(guard) = InFlight::acquire(&self.inner, site_id) else {
            debug!(site = %site_id, "Refresh already in flight");
            return;
        };

        let cache = self.clone();
        let site_id = site_id.to_string();
        tokio::spawn(async move {
            let _guard = guard;
            cache.force_refresh(&site_id).await;
        });
    }

    async fn install(&self, site_id: &str, feed: Arc<Feed>) {
        let entry = CacheEntry {
            feed,
            expires_at: Instant::now() + self.inner.ttl,
            refreshed_at: Utc::now(),
        };

        let mut state = self.inner.state.write().await;
        state.entries.insert(site_id.to_string(), entry);
        state.failures.remove(site_id);
    }

    async fn record_failure(&self, site_id: &str, error: &FeedError) {
        // Unknown ids would otherwise grow the map without bound.
        if matches!(error, FeedError::UnknownSite(_)) {
            return;
        }

        let mut state = self.inner.state.write().await;
        state.failures.insert(site_id.to_string(), error.to_string());
    }
}

/// Marks a site's background refresh as running until dropped.
struct InFlight {
    inner: Arc<Inner>,
    site_id: String,
}

impl InFlight {
    fn acquire(inner: &Arc<Inner>, site_id: &str) -> Option<Self> {
        let mut in_flight = inner
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        in_flight.insert(site_id.to_string()).then(|| Self {
            inner: inner.clone(),
            site_id: site_id.to_string(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.site_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::config::{SiteConfig, SiteRegistry};
    use crate::fetcher::MemoryFetcher;

    const URL: &str = "https://example.com/";
    const TTL: Duration = Duration::from_secs(60);

    fn page(titles: &[&str]) -> String {
        titles
            .iter()
            .map(|t| format!(r#"<article><h2>{t}</h2><a href="/{t}">more</a></article>"#))
            .collect()
    }

    fn cache(fetcher: Arc<MemoryFetcher>) -> RefreshCache {
        cache_with_ttl(fetcher, TTL)
    }

    fn cache_with_ttl(fetcher: Arc<MemoryFetcher>, ttl: Duration) -> RefreshCache {
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
                description_selector: None,
                date_selector: None,
                date_format: String::new(),
            },
        );
        let registry = Arc::new(SiteRegistry::new(sites).unwrap());
        RefreshCache::new(Pipeline::new(registry, fetcher), ttl)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_hit_does_not_fetch() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_page(URL, &page(&["a"]));
        let cache = cache(fetcher.clone());

        let first = cache.get_or_refresh("example").await.unwrap();
        tokio::time::advance(TTL / 2).await;
        let second = cache.get_or_refresh("example").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_overwrites_fresh_entry() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_page(URL, &page(&["a"]));
        let cache = cache(fetcher.clone());
        cache.get_or_refresh("example").await.unwrap();

        fetcher.set_page(URL, &page(&["a", "b"]));
        let outcome = cache.force_refresh("example").await;

        assert_eq!(outcome, RefreshOutcome::Refreshed { entries: 2 });
        assert_eq!(cache.cached("example").await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_failure_keeps_entry() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_page(URL, &page(&["a"]));
        let cache = cache(fetcher.clone());
        let before = cache.get_or_refresh("example").await.unwrap();

        fetcher.set_failure(URL, "upstream down");
        let outcome = cache.force_refresh("example").await;

        assert!(!outcome.is_refreshed());
        assert_eq!(cache.cached("example").await.unwrap(), before);

        let status = cache.status().await;
        assert_eq!(status[0].freshness, Freshness::Fresh);
        assert!(status[0].last_error.as_deref().unwrap().contains("upstream down"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_recorded_failure() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_failure(URL, "flaky");
        let cache = cache(fetcher.clone());

        cache.force_refresh("example").await;
        assert!(cache.status().await[0].last_error.is_some());

        fetcher.set_page(URL, &page(&["a"]));
        cache.force_refresh("example").await;
        let status = cache.status().await;
        assert!(status[0].last_error.is_none());
        assert_eq!(status[0].entries, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_site_not_recorded() {
        let cache = cache(Arc::new(MemoryFetcher::new()));

        let err = cache.get_or_refresh("nope").await.unwrap_err();
        assert!(matches!(err, FeedError::UnknownSite(_)));

        let status = cache.status().await;
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].site_id, "example");
        assert_eq!(status[0].freshness, Freshness::Missing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_ttl_clamped() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_page(URL, &page(&["a"]));
        let cache = cache_with_ttl(fetcher, Duration::MAX);

        assert_eq!(cache.ttl(), MAX_TTL);
        assert_eq!(cache.force_refresh("example").await, RefreshOutcome::Refreshed { entries: 1 });
        assert_eq!(cache.status().await[0].freshness, Freshness::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reports_staleness() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_page(URL, &page(&["a"]));
        let cache = cache(fetcher);

        cache.force_refresh("example").await;
        assert_eq!(cache.status().await[0].freshness, Freshness::Fresh);

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(cache.status().await[0].freshness, Freshness::Stale);
    }
}
