//! # sitefeed
//!
//! Turns HTML pages that have no feed of their own into RSS 2.0 feeds.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler / RefreshCache → Pipeline → Fetcher → Extractor → Assembler → RefreshCache
//! ```
//!
//! Each configured site names a page URL and a set of CSS selectors. The
//! pipeline fetches the page, picks out one item container per article and
//! reads title, link, description and date from inside it. Feeds are served
//! from a stale-while-revalidate cache that a scheduler keeps warm.
//!
//! ## Quick Start
//!
//! ```bash
//! # List configured sites (creates ~/.config/sitefeed/sites.toml on first run)
//! sitefeed sites
//!
//! # Print one site's feed
//! sitefeed get example
//!
//! # Keep every feed refreshed
//! sitefeed run --ttl 10m
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the registry,
/// fetcher, pipeline and cache.
pub mod app;

/// Stale-while-revalidate feed cache.
///
/// - [`RefreshCache`](cache::RefreshCache): `get_or_refresh` for readers,
///   `force_refresh` for the scheduler
pub mod cache;

/// Command-line interface using clap.
///
/// - `sites` - List configured sites
/// - `get <site>` - Print one site's feed
/// - `run` - Refresh every site until interrupted
pub mod cli;

/// Configuration file and site registry.
///
/// Loads from `~/.config/sitefeed/sites.toml`.
pub mod config;

/// Core domain models: [`Feed`](domain::Feed) and [`FeedEntry`](domain::FeedEntry).
pub mod domain;

/// Selector-driven extraction of entries from HTML.
pub mod extract;

/// Feed assembly and RSS rendering.
pub mod feed;

/// Page fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for page fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`MemoryFetcher`](fetcher::MemoryFetcher): canned pages for tests and offline use
pub mod fetcher;

/// Mapping of feed reads onto HTTP-style responses.
pub mod frontend;

/// Fetch → extract → assemble for a single site.
pub mod pipeline;

/// Periodic refresh of every configured site.
pub mod scheduler;
