//! Document store adapters.
//!
//! The sync engine treats the store as the system of record and only needs
//! find-by-metadata, delete and insert. Stores that can rewrite a document
//! in place advertise it through [`DocumentStore::supports_update`].

pub mod memory;
pub mod sqlite;
pub mod types;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;
pub use types::{
    Document, DocumentFields, DocumentRef, DocumentStatus, DocumentType, FEED_PERMALINK_META_KEY,
    TAXONOMY_CATEGORY, TAXONOMY_TAG,
};

use async_trait::async_trait;

use crate::{FeedSyncError, Result};

/// CRUD-by-identifier contract consumed by the sync engine.
///
/// Each call is atomic on its own; no transaction spans several calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents of `doc_type`, in any status, whose metadata `key`
    /// equals `value` exactly. Returns at most `max_results`, oldest first.
    async fn find_by_metadata(
        &self,
        key: &str,
        value: &str,
        doc_type: DocumentType,
        max_results: usize,
    ) -> Result<Vec<DocumentRef>>;

    /// Delete a document. Non-permanent deletes move it to the trash.
    async fn delete(&self, doc: DocumentRef, permanent: bool) -> Result<()>;

    /// Insert a new document.
    async fn insert(&self, fields: &DocumentFields) -> Result<DocumentRef>;

    /// Whether [`DocumentStore::update`] is available.
    fn supports_update(&self) -> bool {
        false
    }

    /// Rewrite a document under its existing identifier.
    async fn update(&self, doc: DocumentRef, _fields: &DocumentFields) -> Result<()> {
        Err(FeedSyncError::StoreOperation(format!(
            "{} store cannot update document {} in place",
            self.name(),
            doc.id
        )))
    }

    /// Load a document.
    async fn get(&self, doc: DocumentRef) -> Result<Option<Document>>;

    /// List every document of a type, oldest first.
    async fn list(&self, doc_type: DocumentType) -> Result<Vec<Document>>;

    /// Store name for logging.
    fn name(&self) -> &'static str;
}
