//! Request DTOs for Web API.

use serde::Deserialize;

use crate::settings::{OptionsSubmission, SETTINGS_GROUP};

/// Form body of an admin-ajax request.
#[derive(Debug, Clone, Deserialize)]
pub struct AjaxRequest {
    /// Action identifier.
    #[serde(default)]
    pub action: String,
}

/// Settings form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsRequest {
    /// Settings group. Defaults to the feed settings group.
    #[serde(default)]
    pub option_page: Option<String>,
    /// New feed URL list, one per line.
    #[serde(default)]
    pub rss_feed_urls: Option<String>,
}

impl From<OptionsRequest> for OptionsSubmission {
    fn from(req: OptionsRequest) -> Self {
        OptionsSubmission {
            option_page: req
                .option_page
                .unwrap_or_else(|| SETTINGS_GROUP.to_string()),
            rss_feed_urls: req.rss_feed_urls,
        }
    }
}
