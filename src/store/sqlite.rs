//! SQLite-backed document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::types::{
    Document, DocumentFields, DocumentRef, DocumentStatus, DocumentType, TAXONOMY_CATEGORY,
    TAXONOMY_TAG,
};
use super::DocumentStore;
use crate::datetime::parse_datetime_or_now;
use crate::db::Database;
use crate::{FeedSyncError, Result};

/// Row type for documents from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    doc_type: String,
    title: String,
    body: String,
    status: String,
    author_id: i64,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MetaRow {
    meta_key: String,
    meta_value: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct TermRow {
    taxonomy: String,
    term: String,
}

/// Document store persisted in the `documents`, `document_meta` and
/// `document_terms` tables.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    db: Database,
}

impl SqliteDocumentStore {
    /// Create a store over an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    async fn load(&self, row: DocumentRow) -> Result<Document> {
        let meta_rows = sqlx::query_as::<_, MetaRow>(
            r#"
            SELECT meta_key, meta_value
            FROM document_meta
            WHERE document_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(row.id)
        .fetch_all(self.pool())
        .await?;

        let term_rows = sqlx::query_as::<_, TermRow>(
            r#"
            SELECT taxonomy, term
            FROM document_terms
            WHERE document_id = $1
            ORDER BY rowid ASC
            "#,
        )
        .bind(row.id)
        .fetch_all(self.pool())
        .await?;

        let doc_type = row
            .doc_type
            .parse::<DocumentType>()
            .map_err(FeedSyncError::Database)?;
        let status = row
            .status
            .parse::<DocumentStatus>()
            .map_err(FeedSyncError::Database)?;

        let mut meta = BTreeMap::new();
        for m in meta_rows {
            meta.entry(m.meta_key).or_insert(m.meta_value);
        }

        let mut categories = Vec::new();
        let mut tags = Vec::new();
        for t in term_rows {
            match t.taxonomy.as_str() {
                TAXONOMY_CATEGORY => categories.push(t.term),
                TAXONOMY_TAG => tags.push(t.term),
                _ => {}
            }
        }

        Ok(Document {
            id: row.id,
            doc_type,
            title: row.title,
            body: row.body,
            status,
            author_id: row.author_id,
            meta,
            categories,
            tags,
            created_at: parse_datetime_or_now(&row.created_at),
            updated_at: parse_datetime_or_now(&row.updated_at),
        })
    }
}

/// Write meta and term rows for a document inside a transaction.
async fn write_attachments(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
    fields: &DocumentFields,
) -> Result<()> {
    for (key, value) in &fields.meta {
        sqlx::query(
            "INSERT INTO document_meta (document_id, meta_key, meta_value) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(key)
        .bind(value)
        .execute(&mut **tx)
        .await?;
    }

    let terms = fields
        .categories
        .iter()
        .map(|c| (TAXONOMY_CATEGORY, c))
        .chain(fields.tags.iter().map(|t| (TAXONOMY_TAG, t)));
    for (taxonomy, term) in terms {
        sqlx::query(
            "INSERT OR IGNORE INTO document_terms (document_id, taxonomy, term) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(taxonomy)
        .bind(term)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn find_by_metadata(
        &self,
        key: &str,
        value: &str,
        doc_type: DocumentType,
        max_results: usize,
    ) -> Result<Vec<DocumentRef>> {
        let limit = i64::try_from(max_results).unwrap_or(i64::MAX);
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT d.id
            FROM documents d
            JOIN document_meta m ON m.document_id = d.id
            WHERE m.meta_key = $1 AND m.meta_value = $2 AND d.doc_type = $3
            ORDER BY d.id ASC
            LIMIT $4
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(doc_type.as_str())
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(ids.into_iter().map(DocumentRef::new).collect())
    }

    async fn delete(&self, doc: DocumentRef, permanent: bool) -> Result<()> {
        let result = if permanent {
            sqlx::query("DELETE FROM documents WHERE id = $1")
                .bind(doc.id)
                .execute(self.pool())
                .await?
        } else {
            sqlx::query(
                "UPDATE documents SET status = $1, updated_at = datetime('now') WHERE id = $2",
            )
            .bind(DocumentStatus::Trash.as_str())
            .bind(doc.id)
            .execute(self.pool())
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(FeedSyncError::NotFound(format!("document {}", doc.id)));
        }
        debug!(id = doc.id, permanent, "Deleted document");
        Ok(())
    }

    async fn insert(&self, fields: &DocumentFields) -> Result<DocumentRef> {
        let mut tx = self.pool().begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO documents (doc_type, title, body, status, author_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(fields.doc_type.as_str())
        .bind(&fields.title)
        .bind(&fields.body)
        .bind(fields.status.as_str())
        .bind(fields.author_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        write_attachments(&mut tx, id, fields).await?;
        tx.commit().await?;

        debug!(id, "Inserted document");
        Ok(DocumentRef::new(id))
    }

    fn supports_update(&self) -> bool {
        true
    }

    async fn update(&self, doc: DocumentRef, fields: &DocumentFields) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET doc_type = $1, title = $2, body = $3, status = $4, author_id = $5,
                updated_at = datetime('now')
            WHERE id = $6
            "#,
        )
        .bind(fields.doc_type.as_str())
        .bind(&fields.title)
        .bind(&fields.body)
        .bind(fields.status.as_str())
        .bind(fields.author_id)
        .bind(doc.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(FeedSyncError::NotFound(format!("document {}", doc.id)));
        }

        sqlx::query("DELETE FROM document_meta WHERE document_id = $1")
            .bind(doc.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM document_terms WHERE document_id = $1")
            .bind(doc.id)
            .execute(&mut *tx)
            .await?;
        write_attachments(&mut tx, doc.id, fields).await?;
        tx.commit().await?;

        debug!(id = doc.id, "Updated document in place");
        Ok(())
    }

    async fn get(&self, doc: DocumentRef) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, doc_type, title, body, status, author_id, created_at, updated_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(doc.id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, doc_type: DocumentType) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, doc_type, title, body, status, author_id, created_at, updated_at
            FROM documents
            WHERE doc_type = $1
            ORDER BY id ASC
            "#,
        )
        .bind(doc_type.as_str())
        .fetch_all(self.pool())
        .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            documents.push(self.load(row).await?);
        }
        Ok(documents)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
