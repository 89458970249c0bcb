use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

use crate::core::session::Session;
use crate::shared::constants::LOGIN_URL;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// Build the login URL that sends the visitor back to `path` afterwards
pub fn login_redirect_url(path: &str) -> String {
    format!("{}?next={}", LOGIN_URL, urlencoding::encode(path))
}

/// Gate for routes that need a logged-in user.
///
/// Must run inside the session middleware. Anonymous visitors are redirected
/// to the login page with a `next` parameter pointing back here.
pub async fn login_required(session: Session, req: Request, next: Next) -> Response {
    let authenticated = session.lock().await.is_authenticated();

    if !authenticated {
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());
        tracing::debug!("Anonymous request to {} redirected to login", path);
        return Redirect::to(&login_redirect_url(&path)).into_response();
    }

    next.run(req).await
}

/// Only local absolute paths are accepted as post-login redirect targets
pub fn safe_next_path(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        Some(next.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_url_encodes_next() {
        assert_eq!(
            login_redirect_url("/restricted/"),
            "/login/?next=%2Frestricted%2F"
        );
    }

    #[test]
    fn test_safe_next_path() {
        assert_eq!(safe_next_path(Some("/restricted/")).as_deref(), Some("/restricted/"));
        assert_eq!(safe_next_path(Some("//evil.example")), None);
        assert_eq!(safe_next_path(Some("https://evil.example")), None);
        assert_eq!(safe_next_path(Some("/\\evil.example")), None);
        assert_eq!(safe_next_path(Some("")), None);
        assert_eq!(safe_next_path(None), None);
    }
}
