//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{token_matches, RequestActor, ADMIN_ACTOR_NAME};
pub use cors::create_cors_layer;
