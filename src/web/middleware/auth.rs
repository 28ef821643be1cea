//! Bearer token authentication.
//!
//! A request presenting the configured admin token acts as an
//! administrator; anything else acts anonymously. Handlers decide what an
//! anonymous actor may do.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::sync::Actor;
use crate::web::handlers::AppState;

/// Name given to requests authenticated with the admin token.
pub const ADMIN_ACTOR_NAME: &str = "admin";

/// Extractor resolving the caller of a request.
#[derive(Debug, Clone)]
pub struct RequestActor(pub Actor);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestActor {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let actor = match token {
            Some(token) if token_matches(&state.admin_token, token) => {
                Actor::administrator(ADMIN_ACTOR_NAME)
            }
            _ => Actor::anonymous(),
        };
        Ok(RequestActor(actor))
    }
}

/// Compare a presented token with the expected one in constant time.
///
/// An empty expected token never matches.
pub fn token_matches(expected: &str, presented: &str) -> bool {
    let expected = expected.as_bytes();
    let presented = presented.as_bytes();
    if expected.is_empty() || expected.len() != presented.len() {
        return false;
    }
    expected
        .iter()
        .zip(presented)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
