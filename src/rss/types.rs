//! Feed types for feedsync.

use serde::Serialize;

/// Number of items considered per feed, in feed order.
pub const MAX_ITEMS_PER_FEED: usize = 5;

/// An item as produced by the feed parser, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    /// Item title, possibly containing markup.
    pub title: Option<String>,
    /// Link to the original article.
    pub permalink: Option<String>,
    /// Item description or content (HTML).
    pub description: Option<String>,
}

impl RawItem {
    /// Create an empty raw item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the permalink.
    pub fn with_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.permalink = Some(permalink.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A normalized feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Plain-text title.
    pub title: String,
    /// Escaped permalink; the identity key of the item. Empty when unusable.
    pub permalink: String,
    /// Description HTML as published by the feed.
    pub description: String,
    /// Description followed by the source attribution line.
    pub body: String,
    /// URL of the feed this item came from.
    pub source_url: String,
}

impl FeedItem {
    /// Whether the item carries a usable identity key.
    pub fn has_permalink(&self) -> bool {
        !self.permalink.is_empty()
    }
}

/// Item returned by a preview query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewItem {
    /// Plain-text title.
    pub title: String,
    /// Permalink of the item.
    pub link: String,
    /// Description HTML.
    pub description: String,
}

impl From<FeedItem> for PreviewItem {
    fn from(item: FeedItem) -> Self {
        PreviewItem {
            title: item.title,
            link: item.permalink,
            description: item.description,
        }
    }
}

/// The configured list of feed URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSources {
    urls: Vec<String>,
}

impl FeedSources {
    /// Parse the multi-line configuration value.
    ///
    /// One URL per line; whitespace is trimmed, blank lines are skipped and
    /// repeated URLs are kept only at their first position.
    pub fn parse(text: &str) -> Self {
        let mut urls: Vec<String> = Vec::new();
        for line in text.lines() {
            let url = line.trim();
            if url.is_empty() || urls.iter().any(|u| u == url) {
                continue;
            }
            urls.push(url.to_string());
        }
        Self { urls }
    }

    /// Build from already-split URLs.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = urls
            .into_iter()
            .map(|u| u.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::parse(&text)
    }

    /// Configured URLs in order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Number of configured URLs.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether no URL is configured.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
