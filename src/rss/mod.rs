//! Feed fetching and item normalization.

pub mod fetcher;
pub mod normalizer;
pub mod types;

pub use fetcher::{parse_feed, validate_url, FeedFetcher, HttpFeedFetcher};
pub use normalizer::{escape_html, escape_url, normalize, source_attribution, strip_html};
pub use types::{FeedItem, FeedSources, PreviewItem, RawItem, MAX_ITEMS_PER_FEED};
