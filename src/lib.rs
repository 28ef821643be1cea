//! feedsync - RSS feed synchronization engine
//!
//! Fetches a configured list of RSS/Atom feeds and keeps a document store
//! in step with the most recent items of each feed.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod rss;
pub mod settings;
pub mod store;
pub mod sync;
pub mod web;

pub use config::{Config, ReconcileStrategy, SyncConfig};
pub use db::Database;
pub use error::{FeedSyncError, Result};
pub use rss::{FeedFetcher, FeedItem, FeedSources, HttpFeedFetcher, PreviewItem, RawItem};
pub use settings::{OptionsSubmission, SettingsService};
pub use store::{
    Document, DocumentFields, DocumentRef, DocumentStore, MemoryDocumentStore, SqliteDocumentStore,
};
pub use sync::{Actor, ReconcileAction, SyncEngine, SyncReport, SyncScheduler};
pub use web::WebServer;
