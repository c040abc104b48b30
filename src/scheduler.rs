//! Periodic refresh of every configured site.
//!
//! The site list is snapshotted when the scheduler is built; sites added to
//! the registry later are not swept.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::cache::{RefreshCache, RefreshOutcome, MAX_TTL};

/// Parse interval string like "1h", "30m", "6h", "1d"
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let (digits, unit) = if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else if let Some(minutes) = s.strip_suffix('m') {
        (minutes, 60)
    } else if let Some(days) = s.strip_suffix('d') {
        (days, 86400)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else {
        (s.as_str(), 1)
    };

    let value = digits
        .parse::<u64>()
        .map_err(|_| format!("Invalid interval: {}. Use format like '10m', '1h', '1d'", s))?;

    if value == 0 {
        return Err("Interval must be greater than zero".to_string());
    }

    let interval = value
        .checked_mul(unit)
        .map(Duration::from_secs)
        .filter(|interval| *interval <= MAX_TTL)
        .ok_or_else(|| format!("Interval too large: {} (max {})", s, format_interval(MAX_TTL)))?;

    Ok(interval)
}

/// Format interval for display
pub fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Tally of one sweep over all sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub refreshed: usize,
    pub failed: usize,
    pub entries: usize,
}

/// Sweeps every site on startup and then once per cache TTL.
#[derive(Clone)]
pub struct Scheduler {
    cache: RefreshCache,
    site_ids: Arc<Vec<String>>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(cache: RefreshCache) -> Self {
        let site_ids = Arc::new(cache.site_ids());
        let interval = cache.ttl();
        Self {
            cache,
            site_ids,
            interval,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn site_ids(&self) -> &[String] {
        &self.site_ids
    }

    /// Run until [`stop`](Self::stop) is called. The first sweep starts immediately.
    ///
    /// Each sweep is spawned, so a hung site never delays the next tick.
    pub async fn run(&self) {
        info!(
            sites = self.site_ids.len(),
            interval = %format_interval(self.interval),
            "Scheduler started"
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.load(Ordering::SeqCst) {
            timer.tick().await;

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let scheduler = self.clone();
            tokio::spawn(async move {
                scheduler.sweep().await;
            });
        }

        info!("Scheduler stopped");
    }

    /// Refresh every snapshotted site in parallel and wait for all of them.
    pub async fn sweep(&self) -> SweepSummary {
        let start = tokio::time::Instant::now();

        let handles = self.site_ids.iter().map(|site_id| {
            let cache = self.cache.clone();
            let site_id = site_id.clone();
            tokio::spawn(async move { cache.force_refresh(&site_id).await })
        });

        let mut summary = SweepSummary::default();
        for result in join_all(handles).await {
            match result {
                Ok(RefreshOutcome::Refreshed { entries }) => {
                    summary.refreshed += 1;
                    summary.entries += entries;
                }
                Ok(RefreshOutcome::Failed { .. }) => summary.failed += 1,
                Err(e) => {
                    error!("Task join error: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            refreshed = summary.refreshed,
            failed = summary.failed,
            entries = summary.entries,
            elapsed = ?start.elapsed(),
            "Sweep complete"
        );

        summary
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
