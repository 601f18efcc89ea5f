//! Sign-in and sign-out
//!
//! - GET /signin - Sign-in form
//! - POST /signin - Exchange credentials for a content-service token
//! - GET /signout - End the session

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::info;

use super::middleware::{clear_session_cookie, extract_session_id, session_cookie, AdminError, AppState};
use crate::models::SigninForm;
use crate::services::SessionData;
use crate::store::StoreError;
use crate::views::{page_context, Navigation};

#[derive(Debug, Default, Deserialize)]
pub struct SigninQuery {
    #[serde(default)]
    pub invalid_login: bool,
}

/// GET /signin
pub async fn signin_form(
    State(state): State<AppState>,
    Query(query): Query<SigninQuery>,
) -> Result<Html<String>, AdminError> {
    let mut context = page_context(&Navigation::for_session(None));
    context.insert("invalid_login", &query.invalid_login);
    Ok(Html(state.views.render("signin.html", &context)?))
}

/// POST /signin
pub async fn signin(State(state): State<AppState>, Form(form): Form<SigninForm>) -> Result<Response, AdminError> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return Err(AdminError::InvalidLogin);
    }

    let login = state
        .stores
        .accounts(None)
        .login(email, &form.password)
        .await
        .map_err(|e| match e {
            StoreError::Unauthorized | StoreError::NotFound => AdminError::InvalidLogin,
            other => other.into(),
        })?;

    info!("{} signed in", login.username);
    let id = state
        .sessions
        .create(SessionData {
            auth_token: login.token,
            is_admin: login.is_admin,
            username: login.username,
        })
        .await;

    let cookie = session_cookie(&id, &state.session_config);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// GET /signout
pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = extract_session_id(&headers) {
        state.sessions.remove(&id).await;
    }
    ([(header::SET_COOKIE, clear_session_cookie())], Redirect::to("/dashboard")).into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", get(signin_form).post(signin))
        .route("/signout", get(signout))
}
