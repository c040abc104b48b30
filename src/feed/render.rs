use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::domain::{Feed, FeedEntry};

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

/// Build the RSS 2.0 channel for a feed.
///
/// `pubDate` is written in RFC 2822 and only when the entry has a timestamp.
/// Empty descriptions are omitted.
pub fn to_channel(feed: &Feed) -> Channel {
    ChannelBuilder::default()
        .title(feed.title.clone())
        .link(feed.link.clone())
        .description(feed.description.clone())
        .items(feed.entries.iter().map(to_item).collect::<Vec<_>>())
        .build()
}

pub fn to_xml(feed: &Feed) -> String {
    to_channel(feed).to_string()
}

fn to_item(entry: &FeedEntry) -> Item {
    let guid = GuidBuilder::default()
        .value(entry.guid().to_string())
        .permalink(true)
        .build();

    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(entry.link.clone()))
        .description((!entry.description.is_empty()).then(|| entry.description.clone()))
        .pub_date(entry.published_at.map(|dt| dt.to_rfc2822()))
        .guid(Some(guid))
        .build()
}
