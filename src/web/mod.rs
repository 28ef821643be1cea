//! Web API module for feedsync.
//!
//! Exposes the on-demand preview query, the feed settings form and a
//! health check over HTTP.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
