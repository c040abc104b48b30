use std::collections::BTreeMap;

use chrono::format::{Item, StrftimeItems};
use scraper::Selector;
use serde::Deserialize;
use url::Url;

use crate::config::ConfigError;

/// Sub-selector matching the item container itself.
pub const SCOPE: &str = ":scope";

/// Extraction rules for one site.
///
/// Every selector except `item_selector` is evaluated inside an item
/// container, not against the whole document. The selector [`SCOPE`] names
/// the container itself. A missing description or date selector leaves that
/// field empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    /// Registry key; filled in from the `[sites.<id>]` table name.
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub url: String,
    /// Prefix for relative links. Concatenated verbatim, so it usually needs
    /// a trailing slash. Defaults to `url`.
    #[serde(default)]
    pub base_url: Option<String>,
    pub item_selector: String,
    pub title_selector: String,
    pub link_selector: String,
    #[serde(default)]
    pub description_selector: Option<String>,
    #[serde(default)]
    pub date_selector: Option<String>,
    /// chrono `strftime` pattern, e.g. `%Y-%m-%d`.
    #[serde(default)]
    pub date_format: String,
}

impl SiteConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(&self.url)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            site: self.id.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".into()));
        }

        Url::parse(&self.url).map_err(|e| invalid(format!("url {:?}: {}", self.url, e)))?;
        if let Some(ref base) = self.base_url {
            Url::parse(base).map_err(|e| invalid(format!("base_url {:?}: {}", base, e)))?;
        }

        for (field, selector) in [
            ("item_selector", &self.item_selector),
            ("title_selector", &self.title_selector),
            ("link_selector", &self.link_selector),
        ] {
            if selector.trim().is_empty() {
                return Err(invalid(format!("{} must not be empty", field)));
            }
        }

        for (field, selector) in [
            ("item_selector", Some(self.item_selector.as_str())),
            ("title_selector", Some(self.title_selector.as_str())),
            ("link_selector", Some(self.link_selector.as_str())),
            ("description_selector", self.description_selector.as_deref()),
            ("date_selector", self.date_selector.as_deref()),
        ] {
            let Some(selector) = selector.map(str::trim) else {
                continue;
            };
            if selector.is_empty() || selector == SCOPE {
                continue;
            }
            Selector::parse(selector)
                .map_err(|e| invalid(format!("{} {:?}: {}", field, selector, e)))?;
        }

        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(format!("date_format {:?} is not a valid pattern", self.date_format)));
        }

        Ok(())
    }
}

/// Read-only lookup of site configurations by identifier.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: BTreeMap<String, SiteConfig>,
}

impl SiteRegistry {
    /// Build a registry, validating every site. The map keys become the site ids.
    pub fn new(sites: BTreeMap<String, SiteConfig>) -> Result<Self, ConfigError> {
        let sites = sites
            .into_iter()
            .map(|(id, mut site)| {
                site.id = id.clone();
                site.validate()?;
                Ok((id, site))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        Ok(Self { sites })
    }

    pub fn lookup(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.get(id)
    }

    /// All known site ids, sorted.
    pub fn site_ids(&self) -> Vec<String> {
        self.sites.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
