//! Document types for feedsync.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata key holding the permalink a synced document was built from.
pub const FEED_PERMALINK_META_KEY: &str = "rss_feed_url";

/// Taxonomy name for categories.
pub const TAXONOMY_CATEGORY: &str = "category";

/// Taxonomy name for tags.
pub const TAXONOMY_TAG: &str = "post_tag";

/// Kind of document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Article.
    Post,
    /// Static page.
    Page,
}

impl DocumentType {
    /// Storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Post => "post",
            DocumentType::Page => "page",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(DocumentType::Post),
            "page" => Ok(DocumentType::Page),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Publication status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Publicly visible.
    Publish,
    /// Soft-deleted.
    Trash,
}

impl DocumentStatus {
    /// Storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Publish => "publish",
            DocumentStatus::Trash => "trash",
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(DocumentStatus::Publish),
            "trash" => Ok(DocumentStatus::Trash),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// Opaque reference to a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentRef {
    /// Document ID.
    pub id: i64,
}

impl DocumentRef {
    /// Create a reference from an ID.
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Fields of a document to insert or rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFields {
    /// Document type.
    pub doc_type: DocumentType,
    /// Title.
    pub title: String,
    /// Body HTML.
    pub body: String,
    /// Publication status.
    pub status: DocumentStatus,
    /// Author ID.
    pub author_id: i64,
    /// Metadata key/value pairs.
    pub meta: BTreeMap<String, String>,
    /// Category names.
    pub categories: Vec<String>,
    /// Tag names.
    pub tags: Vec<String>,
}

impl DocumentFields {
    /// Create a published post.
    pub fn post(title: impl Into<String>, body: impl Into<String>, author_id: i64) -> Self {
        Self {
            doc_type: DocumentType::Post,
            title: title.into(),
            body: body.into(),
            status: DocumentStatus::Publish,
            author_id,
            meta: BTreeMap::new(),
            categories: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Add a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Document ID.
    pub id: i64,
    /// Document type.
    pub doc_type: DocumentType,
    /// Title.
    pub title: String,
    /// Body HTML.
    pub body: String,
    /// Publication status.
    pub status: DocumentStatus,
    /// Author ID.
    pub author_id: i64,
    /// Metadata key/value pairs.
    pub meta: BTreeMap<String, String>,
    /// Category names.
    pub categories: Vec<String>,
    /// Tag names.
    pub tags: Vec<String>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Reference to this document.
    pub fn reference(&self) -> DocumentRef {
        DocumentRef::new(self.id)
    }

    /// Look up a metadata value.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// The permalink this document was synced from, if any.
    pub fn feed_permalink(&self) -> Option<&str> {
        self.meta_value(FEED_PERMALINK_META_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_fields_builder() {
        let fields = DocumentFields::post("Title", "Body", 1)
            .with_meta(FEED_PERMALINK_META_KEY, "https://example.com/a")
            .with_category("news-and-community")
            .with_tag("rss-feed");

        assert_eq!(fields.doc_type, DocumentType::Post);
        assert_eq!(fields.status, DocumentStatus::Publish);
        assert_eq!(fields.author_id, 1);
        assert_eq!(
            fields.meta.get(FEED_PERMALINK_META_KEY).map(String::as_str),
            Some("https://example.com/a")
        );
        assert_eq!(fields.categories, vec!["news-and-community"]);
        assert_eq!(fields.tags, vec!["rss-feed"]);
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in [
            DocumentStatus::Publish,
            DocumentStatus::Trash,
        ] {
            assert_eq!(status.as_str().parse::<DocumentStatus>(), Ok(status));
        }
        assert!("private".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn test_document_type_names() {
        assert_eq!("post".parse::<DocumentType>(), Ok(DocumentType::Post));
        assert_eq!(DocumentType::Page.as_str(), "page");
        assert!("attachment".parse::<DocumentType>().is_err());
    }
}
