use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app::error::Result;
use crate::cache::RefreshCache;
use crate::config::{Config, SiteRegistry};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::pipeline::Pipeline;
use crate::scheduler::Scheduler;

pub struct AppContext {
    pub config: Config,
    pub registry: Arc<SiteRegistry>,
    pub cache: RefreshCache,
}

impl AppContext {
    /// Load configuration and wire up the HTTP fetcher, pipeline and cache.
    ///
    /// `ttl` overrides `[cache] ttl` from the file.
    pub fn load(config_path: Option<&Path>, ttl: Option<Duration>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Self::with_fetcher(config, fetcher, ttl)
    }

    pub fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        ttl: Option<Duration>,
    ) -> Result<Self> {
        let ttl = match ttl {
            Some(ttl) => ttl,
            None => config.cache.ttl()?,
        };

        let registry = Arc::new(config.registry()?);
        let pipeline = Pipeline::new(registry.clone(), fetcher);
        let cache = RefreshCache::new(pipeline, ttl);

        Ok(Self {
            config,
            registry,
            cache,
        })
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.cache.clone())
    }
}
