//! Visitor session middleware.
//!
//! Every browser gets an opaque session id in a cookie. The id keys the
//! session tier of the status store, so it must survive the round trip to
//! the identity provider and back.
//!
//! ```text
//! Request ─ Cookie: age_gate_sid=<uuid> ─▶ visitor_session_middleware
//!   valid id:   VisitorSession(id) in extensions
//!   missing/bad: fresh id in extensions + Set-Cookie on the response
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::SessionConfig;
use crate::domain::foundation::VisitorId;

/// How the session cookie is named and issued.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl SessionCookie {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age_secs: config.ttl_secs,
            secure: config.secure,
        }
    }

    /// Reads the visitor id from the request's `Cookie` headers.
    pub fn read(&self, headers: &HeaderMap) -> Option<VisitorId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, value)| value.trim().parse().ok())
    }

    /// `Set-Cookie` value issuing this visitor id.
    pub fn issue(&self, visitor: &VisitorId) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.name, visitor, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Session middleware state.
pub type SessionCookieState = Arc<SessionCookie>;

/// Attaches a `VisitorSession` to every request, minting one when needed.
pub async fn visitor_session_middleware(
    State(cookie): State<SessionCookieState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (visitor, minted) = match cookie.read(request.headers()) {
        Some(visitor) => (visitor, false),
        None => (VisitorId::new(), true),
    };
    request.extensions_mut().insert(VisitorSession(visitor));

    let mut response = next.run(request).await;

    if minted {
        match HeaderValue::from_str(&cookie.issue(&visitor)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Could not encode session cookie"),
        }
    }
    response
}

/// The current visitor's session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitorSession(pub VisitorId);

impl<S> axum::extract::FromRequestParts<S> for VisitorSession
where
    S: Send + Sync,
{
    type Rejection = MissingVisitorSession;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<VisitorSession>()
                .copied()
                .ok_or(MissingVisitorSession)
        })
    }
}

/// The route was mounted without `visitor_session_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct MissingVisitorSession;

impl IntoResponse for MissingVisitorSession {
    fn into_response(self) -> Response {
        tracing::error!("Visitor session middleware is not installed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "code": "INTERNAL_ERROR",
                "message": "An internal error occurred",
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn cookie() -> SessionCookie {
        SessionCookie {
            name: "age_gate_sid".to_string(),
            max_age_secs: 3600,
            secure: false,
        }
    }

    fn headers(cookie_header: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie_header).unwrap());
        headers
    }

    async fn echo(VisitorSession(visitor): VisitorSession) -> String {
        visitor.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(echo))
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(cookie()),
                visitor_session_middleware,
            ))
    }

    #[test]
    fn read_finds_cookie_among_others() {
        let visitor = VisitorId::new();
        let found = cookie().read(&headers(&format!(
            "theme=dark; age_gate_sid={}; cart=3",
            visitor
        )));
        assert_eq!(found, Some(visitor));
    }

    #[test]
    fn read_ignores_malformed_id() {
        assert_eq!(cookie().read(&headers("age_gate_sid=not-a-uuid")), None);
    }

    #[test]
    fn read_ignores_similarly_named_cookie() {
        let visitor = VisitorId::new();
        assert_eq!(
            cookie().read(&headers(&format!("xage_gate_sid={}", visitor))),
            None
        );
    }

    #[test]
    fn issue_sets_hardening_attributes() {
        let visitor = VisitorId::new();
        let issued = cookie().issue(&visitor);
        assert!(issued.starts_with(&format!("age_gate_sid={}", visitor)));
        assert!(issued.contains("HttpOnly"));
        assert!(issued.contains("SameSite=Lax"));
        assert!(issued.contains("Path=/"));
        assert!(!issued.contains("Secure"));

        let secure = SessionCookie {
            secure: true,
            ..cookie()
        };
        assert!(secure.issue(&visitor).ends_with("; Secure"));
    }

    #[tokio::test]
    async fn new_visitor_gets_cookie() {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let visitor = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(set_cookie.starts_with(&format!("age_gate_sid={}", visitor)));
    }

    #[tokio::test]
    async fn returning_visitor_keeps_id_without_new_cookie() {
        let visitor = VisitorId::new();
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header(header::COOKIE, format!("age_gate_sid={}", visitor))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), visitor.to_string());
    }

    #[tokio::test]
    async fn extractor_without_middleware_is_500() {
        let app: Router = Router::new().route("/", get(echo));
        let response = app
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
