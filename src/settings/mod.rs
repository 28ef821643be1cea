//! Feed settings persistence and sync triggers.

mod repository;
mod service;

pub use repository::SettingsRepository;
pub use service::{OptionsSubmission, SettingsService, SubmissionOutcome};

/// Option holding the feed URL list, one URL per line.
pub const FEED_URLS_OPTION: &str = "rss_feed_urls";

/// Settings group of the feed settings form.
pub const SETTINGS_GROUP: &str = "rss_feed_settings_group";

/// On-demand query action that previews recent feed items.
pub const FETCH_RECENT_ACTION: &str = "fetch_recent_rss_posts";
