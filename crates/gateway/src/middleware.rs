//! Middleware for authentication and request logging

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

/// The authenticated user's internal ID, stored in request extensions by
/// [`auth_middleware`]
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().copied().ok_or_else(|| {
            GatewayError::AuthenticationFailed("user not authenticated".to_string())
        })
    }
}

/// Authentication middleware that validates session tokens.
///
/// Accepts a `Bearer` authorization header or, for WebSocket upgrades where
/// browsers cannot set headers, a `token` query parameter.
pub async fn auth_middleware(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> GatewayResult<Response> {
    let header_token = bearer_token(request.headers());
    let query_token = token_from_query(request.uri());

    let token = header_token.or(query_token).ok_or_else(|| {
        GatewayError::AuthenticationFailed("missing authentication token".to_string())
    })?;

    let session = state.session_service.validate(&token).await?;

    request.extensions_mut().insert(CurrentUser(session.user_id));

    Ok(next.run(request).await)
}

/// Extract a bearer token from the Authorization header
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Extract a `token` query parameter
pub fn token_from_query(uri: &Uri) -> Option<String> {
    uri.query().and_then(|query| {
        query.split('&').find_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some("token"), Some(value)) => urlencoding::decode(value)
                    .ok()
                    .map(|decoded| decoded.into_owned()),
                _ => None,
            }
        })
    })
}

/// Logging middleware for request/response logging
pub async fn logging_middleware(request: Request, next: Next) -> impl IntoResponse {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn token_from_query_finds_the_token_pair() {
        let uri: Uri = "/ws/chat?token=abc123&foo=bar".parse().unwrap();
        assert_eq!(token_from_query(&uri).as_deref(), Some("abc123"));

        let uri: Uri = "/ws/chat?foo=bar".parse().unwrap();
        assert_eq!(token_from_query(&uri), None);

        let uri: Uri = "/ws/chat".parse().unwrap();
        assert_eq!(token_from_query(&uri), None);
    }

    #[test]
    fn token_from_query_decodes_percent_encoding() {
        let uri: Uri = "/ws/chat?token=a%2Bb".parse().unwrap();
        assert_eq!(token_from_query(&uri).as_deref(), Some("a+b"));
    }
}
