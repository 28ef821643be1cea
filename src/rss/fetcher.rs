//! Feed fetcher with security measures.
//!
//! Fetches and parses RSS/Atom feeds with host validation and resource
//! limits. Every failure is reported as [`FeedSyncError::SourceUnreachable`]
//! tagged with the feed URL.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::config::SyncConfig;
use crate::rss::types::{RawItem, MAX_ITEMS_PER_FEED};
use crate::{FeedSyncError, Result};

/// Source of raw feed items.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch a feed and return at most [`MAX_ITEMS_PER_FEED`] items in feed order.
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>>;
}

/// HTTP feed fetcher backed by reqwest and feed-rs.
pub struct HttpFeedFetcher {
    client: Client,
    max_feed_size: u64,
    allow_private_hosts: bool,
}

impl HttpFeedFetcher {
    /// Create a fetcher from the sync configuration.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FeedSyncError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        validate_url(url, self.allow_private_hosts)
            .map_err(|e| FeedSyncError::unreachable(url, e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedSyncError::unreachable(url, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedSyncError::unreachable(
                url,
                format!("HTTP error: {}", response.status()),
            ));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(too_large(url, content_length, self.max_feed_size));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedSyncError::unreachable(url, format!("failed to read body: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(too_large(url, bytes.len() as u64, self.max_feed_size));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>> {
        let bytes = self.download(url).await?;
        let mut items =
            parse_feed(&bytes).map_err(|e| FeedSyncError::unreachable(url, e.to_string()))?;
        items.truncate(MAX_ITEMS_PER_FEED);
        debug!("Fetched {} item(s) from {}", items.len(), url);
        Ok(items)
    }
}

fn too_large(url: &str, size: u64, max: u64) -> FeedSyncError {
    FeedSyncError::unreachable(
        url,
        format!("feed too large: {} bytes (max {} bytes)", size, max),
    )
}

/// Validate a feed URL before fetching it.
///
/// The URL must be absolute http(s). Unless `allow_private_hosts` is set,
/// loopback, private, link-local and local-only hosts are refused.
pub fn validate_url(url: &str, allow_private_hosts: bool) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| FeedSyncError::Validation(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FeedSyncError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| FeedSyncError::Validation("URL has no host".to_string()))?;

    if allow_private_hosts {
        return Ok(());
    }

    let private_ip = match host {
        url::Host::Domain(domain) => {
            if is_forbidden_hostname(domain) {
                return Err(FeedSyncError::Validation(format!(
                    "forbidden host: {}",
                    domain
                )));
            }
            None
        }
        url::Host::Ipv4(ipv4) => Some(IpAddr::V4(ipv4)),
        url::Host::Ipv6(ipv6) => Some(IpAddr::V6(ipv6)),
    };

    match private_ip {
        Some(ip) if is_private_ip(&ip) => Err(FeedSyncError::Validation(format!(
            "private IP address not allowed: {}",
            ip
        ))),
        _ => Ok(()),
    }
}

fn is_forbidden_hostname(host: &str) -> bool {
    let host = host.to_lowercase();
    host == "localhost"
        || [".local", ".localhost", ".internal", ".lan", ".home"]
            .iter()
            .any(|suffix| host.ends_with(suffix))
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_loopback()
                || ipv4.is_private()
                || ipv4.is_link_local()
                || ipv4.is_broadcast()
                || ipv4.is_unspecified()
                || ipv4.is_documentation()
        }
        IpAddr::V6(ipv6) => {
            let first = ipv6.segments()[0];
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                // Unique local fc00::/7
                || (first & 0xfe00) == 0xfc00
                // Link-local fe80::/10
                || (first & 0xffc0) == 0xfe80
        }
    }
}

/// Parse feed bytes (RSS, Atom or JSON Feed) into raw items in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawItem>> {
    let feed = parser::parse(bytes)
        .map_err(|e| FeedSyncError::Validation(format!("failed to parse feed: {}", e)))?;

    Ok(feed.entries.into_iter().map(raw_item_from_entry).collect())
}

fn raw_item_from_entry(entry: Entry) -> RawItem {
    let permalink = permalink_of(&entry.links).or_else(|| {
        // RSS guids are often the permalink itself.
        let id = entry.id.trim();
        (id.starts_with("http://") || id.starts_with("https://")).then(|| id.to_string())
    });

    let description = entry
        .summary
        .map(|t| t.content)
        .or_else(|| entry.content.and_then(|c| c.body));

    RawItem {
        title: entry.title.map(|t| t.content),
        permalink,
        description,
    }
}

/// The alternate link of an entry, else its first link.
fn permalink_of(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}
