//! Sync passes over the configured feed sources.
//!
//! [`SyncEngine::apply`] fetches every source, normalizes the items and
//! reconciles them with the document store. [`SyncEngine::preview`] runs the
//! same fetch and normalize pipeline without touching the store.
//!
//! Sources are fetched concurrently up to a configured limit; reconciliation
//! runs afterwards, source by source, items in feed order. Whole apply passes
//! are serialized so overlapping triggers never race on a permalink.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::reconciler::{ReconcileAction, Reconciler};
use crate::config::SyncConfig;
use crate::rss::{normalize, FeedFetcher, FeedItem, FeedSources, PreviewItem, MAX_ITEMS_PER_FEED};
use crate::store::DocumentStore;
use crate::{FeedSyncError, Result};

/// Message returned to callers lacking the required capability.
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action.";

/// The caller of a sync operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Display name for logging.
    pub name: String,
    /// Whether the actor may manage site options.
    pub can_manage_options: bool,
}

impl Actor {
    /// An actor allowed to manage options.
    pub fn administrator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            can_manage_options: true,
        }
    }

    /// An actor without privileges.
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            can_manage_options: false,
        }
    }
}

/// Outcome of reconciling one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The store now reflects the item.
    Applied(ReconcileAction),
    /// Reconciling the item failed.
    Failed {
        /// Failure description.
        error: String,
    },
}

/// Report for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    /// Item permalink (empty when the item had none).
    pub permalink: String,
    /// Item title.
    pub title: String,
    /// What happened.
    pub outcome: ItemOutcome,
}

impl ItemReport {
    /// Whether the item was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Applied(_))
    }
}

/// Outcome of processing one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// The feed was fetched; per-item results follow.
    Synced {
        /// Item reports in feed order.
        items: Vec<ItemReport>,
    },
    /// The feed could not be fetched or parsed.
    Unreachable {
        /// Failure description.
        error: String,
    },
}

/// Report for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    /// Feed URL.
    pub url: String,
    /// What happened.
    pub outcome: SourceOutcome,
}

impl SourceReport {
    /// Item reports, empty for unreachable sources.
    pub fn items(&self) -> &[ItemReport] {
        match &self.outcome {
            SourceOutcome::Synced { items } => items,
            SourceOutcome::Unreachable { .. } => &[],
        }
    }

    /// Whether the source was fetched and every item applied.
    pub fn is_success(&self) -> bool {
        match &self.outcome {
            SourceOutcome::Synced { items } => items.iter().all(ItemReport::is_applied),
            SourceOutcome::Unreachable { .. } => false,
        }
    }
}

/// Aggregated result of an apply pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Per-source reports in configuration order.
    pub sources: Vec<SourceReport>,
}

impl SyncReport {
    /// Number of sources processed.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of sources fetched with every item applied.
    pub fn succeeded_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.is_success()).count()
    }

    /// Number of unreachable sources.
    pub fn unreachable_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Unreachable { .. }))
            .count()
    }

    /// Number of items applied across all sources.
    pub fn applied_items(&self) -> usize {
        self.items().filter(|i| i.is_applied()).count()
    }

    /// Number of items that failed across all sources.
    pub fn failed_items(&self) -> usize {
        self.items().filter(|i| !i.is_applied()).count()
    }

    /// Whether every source synced cleanly.
    pub fn is_success(&self) -> bool {
        self.succeeded_sources() == self.source_count()
    }

    /// One-line summary for logs and API responses.
    pub fn summary(&self) -> String {
        format!(
            "{} of {} sources synced successfully",
            self.succeeded_sources(),
            self.source_count()
        )
    }

    fn items(&self) -> impl Iterator<Item = &ItemReport> {
        self.sources.iter().flat_map(|s| s.items().iter())
    }
}

/// Feed-sync engine.
pub struct SyncEngine {
    fetcher: Arc<dyn FeedFetcher>,
    reconciler: Reconciler,
    max_concurrent_fetches: usize,
    fetch_timeout: Duration,
    apply_lock: Mutex<()>,
}

impl SyncEngine {
    /// Create an engine.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        fetcher: Arc<dyn FeedFetcher>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            fetcher,
            reconciler: Reconciler::new(store, config),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            fetch_timeout: Duration::from_secs(config.total_timeout_secs),
            apply_lock: Mutex::new(()),
        }
    }

    /// Run an apply pass.
    ///
    /// Never fails as a whole: unreachable sources and failed items are
    /// recorded in the returned report.
    pub async fn apply(&self, sources: &FeedSources) -> SyncReport {
        if sources.is_empty() {
            debug!("No feed sources configured, nothing to sync");
            return SyncReport::default();
        }

        let _guard = self.apply_lock.lock().await;
        info!("Starting sync of {} feed source(s)", sources.len());

        let fetched = self.fetch_all(sources).await;
        let mut report = SyncReport::default();

        for (url, result) in fetched {
            let outcome = match result {
                Ok(items) => SourceOutcome::Synced {
                    items: self.reconcile_items(&items).await,
                },
                Err(e) => {
                    warn!("Feed source {} unreachable: {}", url, e);
                    SourceOutcome::Unreachable {
                        error: e.to_string(),
                    }
                }
            };
            report.sources.push(SourceReport { url, outcome });
        }

        info!(
            applied = report.applied_items(),
            failed = report.failed_items(),
            "{}",
            report.summary()
        );
        report
    }

    /// Fetch and normalize recent items without writing to the store.
    ///
    /// Unreachable sources contribute no items. Fails only when `actor`
    /// may not manage options, in which case nothing is fetched.
    pub async fn preview(&self, actor: &Actor, sources: &FeedSources) -> Result<Vec<PreviewItem>> {
        if !actor.can_manage_options {
            warn!("Preview denied for {}", actor.name);
            return Err(FeedSyncError::Permission(
                PERMISSION_DENIED_MESSAGE.to_string(),
            ));
        }

        let mut preview = Vec::new();
        for (url, result) in self.fetch_all(sources).await {
            match result {
                Ok(items) => preview.extend(items.into_iter().map(PreviewItem::from)),
                Err(e) => warn!("Feed source {} unreachable during preview: {}", url, e),
            }
        }
        debug!("Preview for {} returned {} item(s)", actor.name, preview.len());
        Ok(preview)
    }

    async fn reconcile_items(&self, items: &[FeedItem]) -> Vec<ItemReport> {
        let mut reports = Vec::with_capacity(items.len());
        for item in items {
            let outcome = match self.reconciler.reconcile(item).await {
                Ok(action) => ItemOutcome::Applied(action),
                Err(e) => {
                    error!("Failed to sync item {:?}: {}", item.permalink, e);
                    ItemOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            reports.push(ItemReport {
                permalink: item.permalink.clone(),
                title: item.title.clone(),
                outcome,
            });
        }
        reports
    }

    /// Fetch every source with bounded concurrency, keeping configuration order.
    async fn fetch_all(&self, sources: &FeedSources) -> Vec<(String, Result<Vec<FeedItem>>)> {
        stream::iter(sources.urls().iter().cloned())
            .map(|url| async move {
                let result = self.fetch_source(&url).await;
                (url, result)
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await
    }

    async fn fetch_source(&self, url: &str) -> Result<Vec<FeedItem>> {
        let mut raw = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| {
                FeedSyncError::unreachable(
                    url,
                    format!("timed out after {}s", self.fetch_timeout.as_secs()),
                )
            })??;

        raw.truncate(MAX_ITEMS_PER_FEED);
        Ok(raw.into_iter().map(|item| normalize(item, url)).collect())
    }
}
