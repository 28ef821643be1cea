//! In-memory document store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::types::{Document, DocumentFields, DocumentRef, DocumentStatus, DocumentType};
use super::DocumentStore;
use crate::{FeedSyncError, Result};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    documents: BTreeMap<i64, Document>,
    mutations: usize,
}

/// Document store kept entirely in memory.
///
/// Used for dry runs and tests. Supports in-place updates.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    inner: Mutex<Inner>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful delete, insert and update calls so far.
    pub fn mutation_count(&self) -> usize {
        self.lock().map(|inner| inner.mutations).unwrap_or(0)
    }

    /// Number of stored documents in any status.
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.documents.len()).unwrap_or(0)
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| FeedSyncError::StoreOperation("memory store lock poisoned".into()))
    }
}

fn document_from_fields(id: i64, fields: &DocumentFields) -> Document {
    let now = Utc::now();
    Document {
        id,
        doc_type: fields.doc_type,
        title: fields.title.clone(),
        body: fields.body.clone(),
        status: fields.status,
        author_id: fields.author_id,
        meta: fields.meta.clone(),
        categories: fields.categories.clone(),
        tags: fields.tags.clone(),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_by_metadata(
        &self,
        key: &str,
        value: &str,
        doc_type: DocumentType,
        max_results: usize,
    ) -> Result<Vec<DocumentRef>> {
        let inner = self.lock()?;
        Ok(inner
            .documents
            .values()
            .filter(|doc| doc.doc_type == doc_type && doc.meta_value(key) == Some(value))
            .take(max_results)
            .map(Document::reference)
            .collect())
    }

    async fn delete(&self, doc: DocumentRef, permanent: bool) -> Result<()> {
        let mut inner = self.lock()?;
        if permanent {
            if inner.documents.remove(&doc.id).is_none() {
                return Err(FeedSyncError::NotFound(format!("document {}", doc.id)));
            }
        } else {
            let stored = inner
                .documents
                .get_mut(&doc.id)
                .ok_or_else(|| FeedSyncError::NotFound(format!("document {}", doc.id)))?;
            stored.status = DocumentStatus::Trash;
            stored.updated_at = Utc::now();
        }
        inner.mutations += 1;
        Ok(())
    }

    async fn insert(&self, fields: &DocumentFields) -> Result<DocumentRef> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.documents.insert(id, document_from_fields(id, fields));
        inner.mutations += 1;
        Ok(DocumentRef::new(id))
    }

    fn supports_update(&self) -> bool {
        true
    }

    async fn update(&self, doc: DocumentRef, fields: &DocumentFields) -> Result<()> {
        let mut inner = self.lock()?;
        let stored = inner
            .documents
            .get_mut(&doc.id)
            .ok_or_else(|| FeedSyncError::NotFound(format!("document {}", doc.id)))?;
        let created_at = stored.created_at;
        *stored = document_from_fields(doc.id, fields);
        stored.created_at = created_at;
        inner.mutations += 1;
        Ok(())
    }

    async fn get(&self, doc: DocumentRef) -> Result<Option<Document>> {
        Ok(self.lock()?.documents.get(&doc.id).cloned())
    }

    async fn list(&self, doc_type: DocumentType) -> Result<Vec<Document>> {
        Ok(self
            .lock()?
            .documents
            .values()
            .filter(|doc| doc.doc_type == doc_type)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
