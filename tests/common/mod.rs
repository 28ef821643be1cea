//! Common test utilities for feedsync integration tests.
//!
//! Provides a scripted feed fetcher, a store wrapper that injects failures,
//! and helpers for building engines and feeds.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedsync::store::{Document, DocumentFields, DocumentRef, DocumentStore, DocumentType};
use feedsync::{
    FeedFetcher, FeedSyncError, MemoryDocumentStore, RawItem, Result, SyncConfig, SyncEngine,
};

/// Scripted response for one feed URL.
#[derive(Debug, Clone)]
pub enum FeedScript {
    /// Return these items.
    Items(Vec<RawItem>),
    /// Fail as unreachable.
    Unreachable,
    /// Never respond.
    Stalled,
}

/// Fetcher returning scripted items per URL and counting calls.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, FeedScript>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a feed with items.
    pub fn set_items(&self, url: &str, items: Vec<RawItem>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), FeedScript::Items(items));
    }

    /// Script a feed as unreachable.
    pub fn set_unreachable(&self, url: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), FeedScript::Unreachable);
    }

    /// Script a feed that never responds.
    pub fn set_stalled(&self, url: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), FeedScript::Stalled);
    }

    /// Number of fetch calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().get(url).cloned();
        match script {
            // The fetcher contract returns full feeds here; capping is checked downstream.
            Some(FeedScript::Items(items)) => Ok(items),
            Some(FeedScript::Stalled) => futures::future::pending().await,
            Some(FeedScript::Unreachable) | None => {
                Err(FeedSyncError::unreachable(url, "connection refused"))
            }
        }
    }
}

/// Store wrapper that fails inserts for chosen titles.
pub struct FlakyStore {
    inner: MemoryDocumentStore,
    failing_titles: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            failing_titles: Mutex::new(HashSet::new()),
        }
    }

    /// Make inserts of documents with this title fail.
    pub fn fail_inserts_for(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }

    pub fn inner(&self) -> &MemoryDocumentStore {
        &self.inner
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn find_by_metadata(
        &self,
        key: &str,
        value: &str,
        doc_type: DocumentType,
        max_results: usize,
    ) -> Result<Vec<DocumentRef>> {
        self.inner
            .find_by_metadata(key, value, doc_type, max_results)
            .await
    }

    async fn delete(&self, doc: DocumentRef, permanent: bool) -> Result<()> {
        self.inner.delete(doc, permanent).await
    }

    async fn insert(&self, fields: &DocumentFields) -> Result<DocumentRef> {
        if self.failing_titles.lock().unwrap().contains(&fields.title) {
            return Err(FeedSyncError::StoreOperation("disk full".to_string()));
        }
        self.inner.insert(fields).await
    }

    async fn get(&self, doc: DocumentRef) -> Result<Option<Document>> {
        self.inner.get(doc).await
    }

    async fn list(&self, doc_type: DocumentType) -> Result<Vec<Document>> {
        self.inner.list(doc_type).await
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Build `count` raw items for a feed, permalinks `{base}/items/{i}`.
pub fn raw_items(base: &str, count: usize) -> Vec<RawItem> {
    (0..count)
        .map(|i| {
            RawItem::new()
                .with_title(format!("Item {i}"))
                .with_permalink(format!("{base}/items/{i}"))
                .with_description(format!("<p>Description {i}</p>"))
        })
        .collect()
}

/// Build an engine over a memory store with default configuration.
pub fn memory_engine(
    fetcher: Arc<ScriptedFetcher>,
) -> (SyncEngine, Arc<MemoryDocumentStore>) {
    let store = Arc::new(MemoryDocumentStore::new());
    let engine = SyncEngine::new(store.clone(), fetcher, &SyncConfig::default());
    (engine, store)
}

/// (permalink, title, body) of every stored post, sorted by permalink.
pub async fn snapshot(store: &dyn DocumentStore) -> Vec<(String, String, String)> {
    let mut docs: Vec<_> = store
        .list(DocumentType::Post)
        .await
        .unwrap()
        .into_iter()
        .map(|d| {
            (
                d.feed_permalink().unwrap_or_default().to_string(),
                d.title,
                d.body,
            )
        })
        .collect();
    docs.sort();
    docs
}
