//! Database schema and migrations for feedsync.
//!
//! Migrations are applied in order; `schema_version` records which ones ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Documents with metadata and classification terms
    r#"
CREATE TABLE documents (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    doc_type    TEXT NOT NULL DEFAULT 'post',
    title       TEXT NOT NULL,
    body        TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'publish',   -- 'publish', 'trash'
    author_id   INTEGER NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_documents_doc_type ON documents(doc_type);

CREATE TABLE document_meta (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    meta_key    TEXT NOT NULL,
    meta_value  TEXT NOT NULL
);

CREATE INDEX idx_document_meta_lookup ON document_meta(meta_key, meta_value);
CREATE INDEX idx_document_meta_document_id ON document_meta(document_id);

CREATE TABLE document_terms (
    document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    taxonomy    TEXT NOT NULL,                     -- 'category' or 'post_tag'
    term        TEXT NOT NULL,
    PRIMARY KEY (document_id, taxonomy, term)
);
"#,
    // v2: Key/value options (feed URL list and other settings)
    r#"
CREATE TABLE options (
    name        TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
