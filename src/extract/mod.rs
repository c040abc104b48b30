//! Turns a fetched HTML document into feed entries.
//!
//! Extraction never fails as a whole. Missing sub-elements and unset
//! optional selectors give empty fields, unparseable dates give no
//! timestamp, and candidates without a title or link are dropped.

mod date;

pub use date::parse_date;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::{SiteConfig, SCOPE};
use crate::domain::FeedEntry;

const ABSOLUTE_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Extract entries from `document` in document order.
pub fn extract(document: &Html, config: &SiteConfig) -> Vec<FeedEntry> {
    let item_selector = match Selector::parse(config.item_selector.trim()) {
        Ok(selector) => selector,
        Err(e) => {
            warn!(site = %config.id, error = %e, "Invalid item selector");
            return Vec::new();
        }
    };

    let title_sel = Relative::compile(config, "title", Some(&config.title_selector));
    let link_sel = Relative::compile(config, "link", Some(&config.link_selector));
    let description_sel =
        Relative::compile(config, "description", config.description_selector.as_deref());
    let date_sel = Relative::compile(config, "date", config.date_selector.as_deref());

    let mut containers = 0;
    let mut entries = Vec::new();

    for container in document.select(&item_selector) {
        containers += 1;

        let title = title_sel.text(container);
        let link = normalize_link(&link_sel.attr(container, "href"), config.base_url());
        if title.is_empty() || link.is_empty() {
            continue;
        }

        let raw_date = date_sel.text(container);
        let published_at = parse_date(&raw_date, &config.date_format);
        if published_at.is_none() && !raw_date.is_empty() {
            debug!(site = %config.id, %raw_date, format = %config.date_format, "Unparseable date");
        }

        entries.push(FeedEntry {
            title,
            link,
            description: description_sel.text(container),
            published_at,
        });
    }

    debug!(
        site = %config.id,
        containers,
        entries = entries.len(),
        "Extracted entries"
    );

    entries
}

/// Make `link` absolute by prefixing `base_url` verbatim.
///
/// No path joining happens: `https://abc.com/` + `/posts/1` gives
/// `https://abc.com//posts/1`. Empty links stay empty.
pub fn normalize_link(link: &str, base_url: &str) -> String {
    if link.is_empty() {
        return String::new();
    }

    let lower = link.to_ascii_lowercase();
    if ABSOLUTE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        link.to_string()
    } else {
        format!("{}{}", base_url, link)
    }
}

/// A selector evaluated inside an item container.
enum Relative {
    /// `:scope`: the container itself.
    Container,
    Select(Selector),
    /// Unset, blank or unparseable; always yields an empty field.
    Empty,
}

impl Relative {
    fn compile(config: &SiteConfig, field: &str, raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Self::Empty,
            Some(SCOPE) => return Self::Container,
            Some(raw) => raw,
        };

        match Selector::parse(raw) {
            Ok(selector) => Self::Select(selector),
            Err(e) => {
                warn!(site = %config.id, field, error = %e, "Invalid selector");
                Self::Empty
            }
        }
    }

    /// Text of every match, concatenated, with whitespace collapsed.
    fn text(&self, container: ElementRef<'_>) -> String {
        let raw: String = match self {
            Self::Container => container.text().collect(),
            Self::Select(selector) => container.select(selector).flat_map(|el| el.text()).collect(),
            Self::Empty => String::new(),
        };

        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Attribute of the first match.
    fn attr(&self, container: ElementRef<'_>, name: &str) -> String {
        let element = match self {
            Self::Container => Some(container),
            Self::Select(selector) => container.select(selector).next(),
            Self::Empty => None,
        };

        element
            .and_then(|el| el.value().attr(name))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }
}
