use chrono::{DateTime, Utc};

/// One article scraped from a site.
///
/// Only the extractor builds these, and only when both `title` and `link`
/// are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    /// Absolute link; doubles as the entry's guid.
    pub link: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedEntry {
    pub fn guid(&self) -> &str {
        &self.link
    }
}

/// An assembled feed for one site, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub entries: Vec<FeedEntry>,
}

impl Feed {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_is_link() {
        let entry = FeedEntry {
            title: "Hello".into(),
            link: "https://example.com/hello".into(),
            description: String::new(),
            published_at: None,
        };
        assert_eq!(entry.guid(), "https://example.com/hello");
    }
}
