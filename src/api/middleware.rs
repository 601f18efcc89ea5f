//! HTTP middleware and shared request plumbing
//!
//! Contains:
//! - Application state
//! - [`AdminError`], the error type every handler returns
//! - Authentication (session cookie) and admin authorization
//! - Error page rendering
//! - [`RequestScope`], the per-request view of the content service

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tera::Context as TeraContext;
use tracing::{error, warn};

use crate::config::SessionConfig;
use crate::models::ContentType;
use crate::services::{
    DashboardSummaryBuilder, HierarchyResolver, PublishCoordinator, SessionData, SessionStore, StagingAggregator,
    StagingError,
};
use crate::store::{AccountStore, ContentStore, StoreError, StoreFactory};
use crate::views::{page_context, Navigation, Section, ViewEngine, ViewError};

pub const SESSION_COOKIE: &str = "session";

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<dyn StoreFactory>,
    pub sessions: Arc<SessionStore>,
    pub views: Arc<ViewEngine>,
    pub session_config: Arc<SessionConfig>,
}

/// Signed-in session attached to the request by [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub data: SessionData,
}

/// Error page to render for a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    NotFound,
    Client { status: u16 },
}

/// Handler error
#[derive(Debug)]
pub enum AdminError {
    /// Missing entity or malformed id, recovered with a redirect
    NotFound { redirect_to: String },
    /// Dangling parent reference, recovered with a redirect to the root
    BrokenHierarchy,
    /// The content service rejected the session credential
    Unauthorized,
    /// The sign-in form was rejected
    InvalidLogin,
    /// Any other content service failure
    Upstream { status: u16 },
    /// Re-rendered form with field errors
    Validation(String),
    /// Unknown page, or a page the session may not see
    PageNotFound,
    Internal(String),
}

impl AdminError {
    pub fn not_found(redirect_to: impl Into<String>) -> Self {
        AdminError::NotFound {
            redirect_to: redirect_to.into(),
        }
    }

    /// Redirect a not-found error somewhere more specific
    pub fn or_redirect(self, path: impl Into<String>) -> Self {
        match self {
            AdminError::NotFound { .. } => AdminError::not_found(path),
            other => other,
        }
    }
}

/// List page of a content type, or the dashboard for nested types
pub fn list_path(kind: ContentType) -> String {
    if kind.descriptor().is_nested() {
        "/dashboard".to_string()
    } else {
        format!("/{}", kind.collection())
    }
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized => AdminError::Unauthorized,
            StoreError::NotFound => AdminError::not_found("/dashboard"),
            other => {
                warn!("Content service error: {}", other);
                AdminError::Upstream { status: other.status() }
            }
        }
    }
}

impl From<StagingError> for AdminError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::NotFound { kind, .. } => AdminError::not_found(list_path(kind)),
            StagingError::NotPublishable(_) => AdminError::PageNotFound,
            StagingError::Store(e) => e.into(),
        }
    }
}

impl From<ViewError> for AdminError {
    fn from(err: ViewError) -> Self {
        AdminError::Internal(err.to_string())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::NotFound { redirect_to } => {
                warn!("Not found, redirecting to {}", redirect_to);
                Redirect::to(&redirect_to).into_response()
            }
            AdminError::BrokenHierarchy => {
                warn!("Broken hierarchy, redirecting to root");
                Redirect::to("/").into_response()
            }
            AdminError::Unauthorized => Redirect::to("/signout").into_response(),
            AdminError::InvalidLogin => Redirect::to("/signin?invalid_login=true").into_response(),
            AdminError::Upstream { status } => {
                let code = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                let mut response = code.into_response();
                response.extensions_mut().insert(ErrorPage::Client { status });
                response
            }
            AdminError::Validation(html) => (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response(),
            AdminError::PageNotFound => {
                let mut response = StatusCode::NOT_FOUND.into_response();
                response.extensions_mut().insert(ErrorPage::NotFound);
                response
            }
            AdminError::Internal(message) => {
                error!("Internal error: {}", message);
                let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                response.extensions_mut().insert(ErrorPage::Client { status: 500 });
                response
            }
        }
    }
}

/// Extract the session id from the cookie header
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|cookie| cookie.trim().strip_prefix("session="))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// `Set-Cookie` value starting a session
pub fn session_cookie(id: &str, config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, id, config.ttl_seconds
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value ending a session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Authentication middleware, sends signed-out visitors to the sign-in page
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(id) = extract_session_id(request.headers()) else {
        return Redirect::to("/signin").into_response();
    };
    let Some(data) = state.sessions.get(&id).await else {
        return Redirect::to("/signin").into_response();
    };

    request.extensions_mut().insert(CurrentSession { id, data });
    next.run(request).await
}

/// Admin authorization middleware; other sessions see the 404 page
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AdminError> {
    let is_admin = request
        .extensions()
        .get::<CurrentSession>()
        .is_some_and(|session| session.data.is_admin);
    if !is_admin {
        return Err(AdminError::PageNotFound);
    }
    Ok(next.run(request).await)
}

/// Render responses carrying an [`ErrorPage`]
pub async fn render_error_pages(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let session_id = extract_session_id(request.headers());
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().copied() else {
        return response;
    };

    let session = match session_id {
        Some(id) => state.sessions.get(&id).await,
        None => None,
    };
    let mut context = page_context(&Navigation::for_session(session.as_ref()));
    let template = match page {
        ErrorPage::NotFound => "404.html",
        ErrorPage::Client { status } => {
            context.insert("status", &status);
            "client-error.html"
        }
    };
    let body = state.views.render_with_fallback(template, &context);
    (response.status(), Html(body)).into_response()
}

/// Per-request access to the content service and templates
pub struct RequestScope {
    pub session: SessionData,
    pub content: Arc<dyn ContentStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub views: Arc<ViewEngine>,
}

impl FromRequestParts<AppState> for RequestScope {
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<CurrentSession>()
            .map(|current| current.data.clone())
            .ok_or(AdminError::Unauthorized)?;
        let token = Some(session.auth_token.as_str());
        Ok(Self {
            content: state.stores.content(token),
            accounts: state.stores.accounts(token),
            views: state.views.clone(),
            session,
        })
    }
}

impl RequestScope {
    pub fn aggregator(&self) -> StagingAggregator {
        StagingAggregator::new(self.content.clone())
    }

    pub fn resolver(&self) -> HierarchyResolver {
        HierarchyResolver::new(self.content.clone())
    }

    pub fn publisher(&self) -> PublishCoordinator {
        PublishCoordinator::new(self.content.clone())
    }

    pub fn dashboard(&self) -> DashboardSummaryBuilder {
        DashboardSummaryBuilder::new(self.aggregator())
    }

    /// Base template context for a page in the given section
    pub fn page(&self, section: Section) -> TeraContext {
        page_context(&Navigation::new(section, Some(&self.session)))
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<Html<String>, AdminError> {
        Ok(Html(self.views.render(template, context)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_session_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_id(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=abc-123"));
        assert_eq!(extract_session_id(&headers), Some("abc-123".to_string()));

        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(extract_session_id(&headers), None);
    }

    #[test]
    fn test_session_cookie() {
        let config = SessionConfig {
            ttl_seconds: 60,
            secure_cookie: true,
        };
        assert_eq!(
            session_cookie("id", &config),
            "session=id; Path=/; HttpOnly; SameSite=Lax; Max-Age=60; Secure"
        );
        assert!(clear_session_cookie().ends_with("Max-Age=0"));
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(AdminError::from(StoreError::Unauthorized), AdminError::Unauthorized));
        assert!(matches!(
            AdminError::from(StoreError::Http(503)),
            AdminError::Upstream { status: 503 }
        ));
    }

    #[test]
    fn test_staging_not_found_redirects_to_list() {
        let err = AdminError::from(StagingError::NotFound {
            kind: ContentType::VideoSeries,
            id: 1,
        });
        assert!(matches!(err, AdminError::NotFound { ref redirect_to } if redirect_to == "/videoSeries"));

        let err = AdminError::from(StagingError::NotFound {
            kind: ContentType::Timing,
            id: 1,
        })
        .or_redirect("/models/3/stages/4");
        assert!(matches!(err, AdminError::NotFound { ref redirect_to } if redirect_to == "/models/3/stages/4"));
    }

    #[test]
    fn test_responses() {
        let response = AdminError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/signout");

        let response = AdminError::Upstream { status: 503 }.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.extensions().get::<ErrorPage>(),
            Some(&ErrorPage::Client { status: 503 })
        );

        let response = AdminError::BrokenHierarchy.into_response();
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
