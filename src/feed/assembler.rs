use crate::config::SiteConfig;
use crate::domain::{Feed, FeedEntry};

/// Wrap extracted entries with the site's channel metadata.
pub fn assemble(config: &SiteConfig, entries: Vec<FeedEntry>) -> Feed {
    Feed {
        title: config.name.clone(),
        link: config.url.clone(),
        description: format!("RSS feed for {}", config.name),
        entries,
    }
}
