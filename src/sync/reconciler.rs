//! Per-item reconciliation against the document store.
//!
//! Every processed item ends in exactly one write: an insert, optionally
//! preceded by a permanent delete of the document previously synced from
//! the same permalink, or an in-place update when that strategy is chosen
//! and the store supports it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::config::{ReconcileStrategy, SyncConfig};
use crate::rss::FeedItem;
use crate::store::{DocumentFields, DocumentRef, DocumentStore, DocumentType, FEED_PERMALINK_META_KEY};
use crate::{FeedSyncError, Result};

/// What reconciling one item did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileAction {
    /// No document existed for the permalink; one was inserted.
    Created {
        /// The new document.
        id: i64,
    },
    /// The existing document was deleted and a new one inserted.
    Replaced {
        /// The deleted document.
        previous: i64,
        /// The new document.
        id: i64,
    },
    /// The existing document was rewritten under its identifier.
    Updated {
        /// The rewritten document.
        id: i64,
    },
}

impl ReconcileAction {
    /// The document now backing the item.
    pub fn document(&self) -> DocumentRef {
        match *self {
            ReconcileAction::Created { id }
            | ReconcileAction::Replaced { id, .. }
            | ReconcileAction::Updated { id } => DocumentRef::new(id),
        }
    }
}

/// Reconciles normalized feed items with synced documents.
pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
    strategy: ReconcileStrategy,
    author_id: i64,
    category: String,
    tag: String,
}

impl Reconciler {
    /// Create a reconciler writing to `store`.
    pub fn new(store: Arc<dyn DocumentStore>, config: &SyncConfig) -> Self {
        Self {
            store,
            strategy: config.strategy,
            author_id: config.author_id,
            category: config.category.clone(),
            tag: config.tag.clone(),
        }
    }

    /// Document fields for an item.
    pub fn build_fields(&self, item: &FeedItem) -> DocumentFields {
        DocumentFields::post(item.title.clone(), item.body.clone(), self.author_id)
            .with_meta(FEED_PERMALINK_META_KEY, item.permalink.clone())
            .with_category(self.category.clone())
            .with_tag(self.tag.clone())
    }

    /// Reconcile one item.
    ///
    /// Items without a usable permalink are rejected with a validation
    /// error; store failures are returned as [`FeedSyncError::StoreOperation`].
    pub async fn reconcile(&self, item: &FeedItem) -> Result<ReconcileAction> {
        if !item.has_permalink() {
            return Err(FeedSyncError::Validation(format!(
                "item \"{}\" has no usable permalink",
                item.title
            )));
        }
        let permalink = item.permalink.as_str();

        let existing = self
            .store
            .find_by_metadata(FEED_PERMALINK_META_KEY, permalink, DocumentType::Post, 1)
            .await
            .map_err(|e| store_failure("find", permalink, e))?;

        let fields = self.build_fields(item);

        let Some(previous) = existing.first().copied() else {
            let doc = self
                .store
                .insert(&fields)
                .await
                .map_err(|e| store_failure("insert", permalink, e))?;
            debug!(id = doc.id, permalink, "Created document");
            return Ok(ReconcileAction::Created { id: doc.id });
        };

        if self.strategy == ReconcileStrategy::UpdateInPlace && self.store.supports_update() {
            self.store
                .update(previous, &fields)
                .await
                .map_err(|e| store_failure("update", permalink, e))?;
            debug!(id = previous.id, permalink, "Updated document in place");
            return Ok(ReconcileAction::Updated { id: previous.id });
        }

        self.store
            .delete(previous, true)
            .await
            .map_err(|e| store_failure("delete", permalink, e))?;

        let doc = match self.store.insert(&fields).await {
            Ok(doc) => doc,
            Err(e) => {
                error!(
                    previous = previous.id,
                    permalink,
                    "Document deleted but replacement insert failed: {}",
                    e
                );
                return Err(store_failure(
                    "insert after delete",
                    permalink,
                    e,
                ));
            }
        };
        debug!(previous = previous.id, id = doc.id, permalink, "Replaced document");
        Ok(ReconcileAction::Replaced {
            previous: previous.id,
            id: doc.id,
        })
    }
}

fn store_failure(operation: &str, permalink: &str, err: FeedSyncError) -> FeedSyncError {
    FeedSyncError::StoreOperation(format!("{} failed for {}: {}", operation, permalink, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rss::{normalize, RawItem};
    use crate::store::{DocumentStatus, MemoryDocumentStore};

    fn item(title: &str, link: &str) -> FeedItem {
        normalize(
            RawItem::new()
                .with_title(title)
                .with_permalink(link)
                .with_description("<p>desc</p>"),
            "https://example.com/feed",
        )
    }

    fn reconciler(store: Arc<MemoryDocumentStore>, strategy: ReconcileStrategy) -> Reconciler {
        let config = SyncConfig {
            strategy,
            ..SyncConfig::default()
        };
        Reconciler::new(store, &config)
    }

    #[tokio::test]
    async fn test_create_then_replace() {
        let store = Arc::new(MemoryDocumentStore::new());
        let r = reconciler(store.clone(), ReconcileStrategy::DeleteAndInsert);

        let first = r.reconcile(&item("One", "https://example.com/1")).await.unwrap();
        let ReconcileAction::Created { id: first_id } = first else {
            panic!("expected create, got {first:?}");
        };

        let second = r
            .reconcile(&item("One v2", "https://example.com/1"))
            .await
            .unwrap();
        assert!(matches!(
            second,
            ReconcileAction::Replaced { previous, id } if previous == first_id && id != first_id
        ));

        let docs = store.list(DocumentType::Post).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "One v2");
    }

    #[tokio::test]
    async fn test_built_fields() {
        let store = Arc::new(MemoryDocumentStore::new());
        let r = reconciler(store.clone(), ReconcileStrategy::DeleteAndInsert);

        let action = r.reconcile(&item("<b>T</b>", "https://example.com/t")).await.unwrap();
        let doc = store.get(action.document()).await.unwrap().unwrap();

        assert_eq!(doc.title, "T");
        assert_eq!(doc.status, DocumentStatus::Publish);
        assert_eq!(doc.author_id, 1);
        assert_eq!(doc.feed_permalink(), Some("https://example.com/t"));
        assert_eq!(doc.categories, vec!["news-and-community"]);
        assert_eq!(doc.tags, vec!["rss-feed"]);
        assert!(doc.body.starts_with("<p>desc</p><p>Source: "));
    }

    #[tokio::test]
    async fn test_replaces_trashed_document() {
        let store = Arc::new(MemoryDocumentStore::new());
        let r = reconciler(store.clone(), ReconcileStrategy::DeleteAndInsert);

        let created = r.reconcile(&item("A", "https://example.com/a")).await.unwrap();
        store.delete(created.document(), false).await.unwrap();

        let again = r.reconcile(&item("A", "https://example.com/a")).await.unwrap();
        assert!(matches!(again, ReconcileAction::Replaced { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_in_place_keeps_identifier() {
        let store = Arc::new(MemoryDocumentStore::new());
        let r = reconciler(store.clone(), ReconcileStrategy::UpdateInPlace);

        let created = r.reconcile(&item("A", "https://example.com/a")).await.unwrap();
        let updated = r.reconcile(&item("A2", "https://example.com/a")).await.unwrap();

        assert_eq!(
            updated,
            ReconcileAction::Updated {
                id: created.document().id
            }
        );
        let doc = store.get(created.document()).await.unwrap().unwrap();
        assert_eq!(doc.title, "A2");
    }

    #[tokio::test]
    async fn test_rejects_item_without_permalink() {
        let store = Arc::new(MemoryDocumentStore::new());
        let r = reconciler(store.clone(), ReconcileStrategy::DeleteAndInsert);

        let result = r.reconcile(&item("No link", "javascript:void(0)")).await;

        assert!(matches!(result, Err(FeedSyncError::Validation(_))));
        assert_eq!(store.mutation_count(), 0);
    }
}
