//! Settings service and sync triggers.
//!
//! Two hooks lead into the same apply pass. `option_updated` fires when the
//! feed URL option changes. `admin_init` fires on a settings submission for
//! the feed settings group whenever a non-empty URL list is already stored.
//! A single submission can trigger both; apply passes are idempotent and
//! serialized, so that is safe.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::repository::SettingsRepository;
use super::{FEED_URLS_OPTION, SETTINGS_GROUP};
use crate::db::Database;
use crate::rss::{FeedSources, PreviewItem};
use crate::sync::{Actor, SyncEngine, SyncReport, PERMISSION_DENIED_MESSAGE};
use crate::{FeedSyncError, Result};

/// A settings form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OptionsSubmission {
    /// Settings group the form belongs to.
    pub option_page: String,
    /// New feed URL list, one per line. `None` leaves the option untouched.
    #[serde(default)]
    pub rss_feed_urls: Option<String>,
}

impl OptionsSubmission {
    /// Submission for the feed settings group.
    pub fn feed_urls(value: impl Into<String>) -> Self {
        Self {
            option_page: SETTINGS_GROUP.to_string(),
            rss_feed_urls: Some(value.into()),
        }
    }

    fn targets_feed_settings(&self) -> bool {
        self.option_page == SETTINGS_GROUP
    }
}

/// Result of handling a settings submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    /// Whether the stored feed URL list changed.
    pub changed: bool,
    /// Reports of the apply passes the submission triggered, in order.
    pub reports: Vec<SyncReport>,
}

/// Loads feed settings and routes triggers to the sync engine.
pub struct SettingsService {
    db: Database,
    engine: Arc<SyncEngine>,
}

impl SettingsService {
    /// Create a new service.
    pub fn new(db: Database, engine: Arc<SyncEngine>) -> Self {
        Self { db, engine }
    }

    /// The sync engine.
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Raw stored feed URL list (empty when unset).
    pub async fn feed_urls(&self) -> Result<String> {
        Ok(SettingsRepository::new(self.db.pool())
            .get_option(FEED_URLS_OPTION)
            .await?
            .unwrap_or_default())
    }

    /// The configured feed sources.
    pub async fn feed_sources(&self) -> Result<FeedSources> {
        Ok(FeedSources::parse(&self.feed_urls().await?))
    }

    /// Run an apply pass over the stored feed sources.
    pub async fn run_sync(&self) -> Result<SyncReport> {
        let sources = self.feed_sources().await?;
        Ok(self.engine.apply(&sources).await)
    }

    /// Hook fired with the name of an option that was just updated.
    pub async fn option_updated(&self, name: &str) -> Result<Option<SyncReport>> {
        if name != FEED_URLS_OPTION {
            return Ok(None);
        }
        debug!("Option {} updated, syncing feeds", name);
        self.run_sync().await.map(Some)
    }

    /// Hook fired on administrative page load.
    ///
    /// Syncs when `submission` targets the feed settings group and a
    /// non-empty URL list is stored.
    pub async fn admin_init(
        &self,
        submission: Option<&OptionsSubmission>,
    ) -> Result<Option<SyncReport>> {
        if !submission.is_some_and(OptionsSubmission::targets_feed_settings) {
            return Ok(None);
        }
        if self.feed_urls().await?.is_empty() {
            return Ok(None);
        }
        debug!("Feed settings submitted, syncing feeds");
        self.run_sync().await.map(Some)
    }

    /// Handle a settings form submission.
    ///
    /// Runs `admin_init` against the value stored before the submission,
    /// then saves the new value and fires `option_updated` if it changed.
    pub async fn submit(
        &self,
        actor: &Actor,
        submission: &OptionsSubmission,
    ) -> Result<SubmissionOutcome> {
        if !actor.can_manage_options {
            return Err(FeedSyncError::Permission(
                PERMISSION_DENIED_MESSAGE.to_string(),
            ));
        }
        if !submission.targets_feed_settings() {
            return Err(FeedSyncError::Validation(format!(
                "unknown settings group: {}",
                submission.option_page
            )));
        }

        let mut outcome = SubmissionOutcome::default();
        if let Some(report) = self.admin_init(Some(submission)).await? {
            outcome.reports.push(report);
        }

        if let Some(value) = &submission.rss_feed_urls {
            outcome.changed = SettingsRepository::new(self.db.pool())
                .update_option(FEED_URLS_OPTION, value)
                .await?;
            if outcome.changed {
                info!("Feed URL list updated by {}", actor.name);
                if let Some(report) = self.option_updated(FEED_URLS_OPTION).await? {
                    outcome.reports.push(report);
                }
            }
        }

        Ok(outcome)
    }

    /// Preview recent items from the stored feed sources.
    pub async fn preview(&self, actor: &Actor) -> Result<Vec<PreviewItem>> {
        let sources = if actor.can_manage_options {
            self.feed_sources().await?
        } else {
            FeedSources::default()
        };
        self.engine.preview(actor, &sources).await
    }
}
