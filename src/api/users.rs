//! User administration (admin only)
//!
//! - GET /users - All users
//! - GET /users/{id} - User with their API tokens
//! - GET|POST /users/new - Create a user
//! - GET|POST /users/{id}/edit - Edit name, email and admin flag
//! - GET|POST /users/{id}/change-password - Set a new password

use axum::{
    extract::OriginalUri,
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use tracing::info;

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::RouteParams;
use crate::models::{form::apply_errors, ChangePasswordForm, FormErrors, FormField, UserForm};
use crate::views::Section;

fn user_id(params: &[(String, String)]) -> Result<i64, AdminError> {
    params
        .iter()
        .find(|(name, _)| name == "user_id")
        .and_then(|(_, value)| value.parse().ok())
        .ok_or_else(|| AdminError::not_found("/users"))
}

fn render_form(
    scope: &RequestScope,
    title: &str,
    mut fields: Vec<FormField>,
    errors: Option<&FormErrors>,
    action: &str,
    cancel_to: &str,
) -> Result<String, AdminError> {
    if let Some(errors) = errors {
        apply_errors(&mut fields, errors);
    }
    let mut context = scope.page(Section::Users);
    context.insert("title", title);
    context.insert("fields", &fields);
    context.insert("action", action);
    context.insert("cancel_to", cancel_to);
    context.insert("has_errors", &errors.is_some_and(|e| !e.is_empty()));
    Ok(scope.views.render("resource/form.html", &context)?)
}

/// GET /users
pub async fn index(scope: RequestScope) -> Result<Html<String>, AdminError> {
    let users = scope.accounts.users().await?;

    let mut context = scope.page(Section::Users);
    context.insert("users", &users);
    scope.render("users/index.html", &context)
}

/// GET /users/{user_id}
pub async fn show(scope: RequestScope, RouteParams(params): RouteParams) -> Result<Html<String>, AdminError> {
    let id = user_id(&params)?;
    let (user, tokens) = tokio::try_join!(scope.accounts.user(id), scope.accounts.user_tokens(id))
        .map_err(|e| AdminError::from(e).or_redirect("/users"))?;

    let mut context = scope.page(Section::Users);
    context.insert("user", &user);
    context.insert("tokens", &tokens);
    scope.render("users/show.html", &context)
}

/// GET /users/new
pub async fn new_form(scope: RequestScope, OriginalUri(uri): OriginalUri) -> Result<Html<String>, AdminError> {
    let fields = UserForm::default().fields(true);
    Ok(Html(render_form(&scope, "New User", fields, None, uri.path(), "/users")?))
}

/// POST /users/new
pub async fn create(
    scope: RequestScope,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<UserForm>,
) -> Result<Redirect, AdminError> {
    let payload = form.validate(true).map_err(|errors| {
        match render_form(&scope, "New User", form.fields(true), Some(&errors), uri.path(), "/users") {
            Ok(html) => AdminError::Validation(html),
            Err(e) => e,
        }
    })?;

    let user = scope.accounts.create_user(&payload).await?;
    info!("Created user {}", user.id);
    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

/// GET /users/{user_id}/edit
pub async fn edit_form(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Html<String>, AdminError> {
    let id = user_id(&params)?;
    let user = scope
        .accounts
        .user(id)
        .await
        .map_err(|e| AdminError::from(e).or_redirect("/users"))?;

    let title = format!("Edit User {}", user.name);
    let fields = UserForm::from_user(&user).fields(false);
    let back = format!("/users/{}", id);
    Ok(Html(render_form(&scope, &title, fields, None, uri.path(), &back)?))
}

/// POST /users/{user_id}/edit
pub async fn update(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<UserForm>,
) -> Result<Redirect, AdminError> {
    let id = user_id(&params)?;
    let back = format!("/users/{}", id);
    let payload = form.validate(false).map_err(|errors| {
        match render_form(&scope, "Edit User", form.fields(false), Some(&errors), uri.path(), &back) {
            Ok(html) => AdminError::Validation(html),
            Err(e) => e,
        }
    })?;

    let user = scope
        .accounts
        .patch_user(id, &payload)
        .await
        .map_err(|e| AdminError::from(e).or_redirect("/users"))?;
    info!("Updated user {}", user.id);
    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

/// GET /users/{user_id}/change-password
pub async fn change_password_form(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Html<String>, AdminError> {
    let id = user_id(&params)?;
    let user = scope
        .accounts
        .user(id)
        .await
        .map_err(|e| AdminError::from(e).or_redirect("/users"))?;

    let title = format!("Change Password of {}", user.name);
    let fields = ChangePasswordForm::default().fields();
    let back = format!("/users/{}", id);
    Ok(Html(render_form(&scope, &title, fields, None, uri.path(), &back)?))
}

/// POST /users/{user_id}/change-password
pub async fn change_password(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Redirect, AdminError> {
    let id = user_id(&params)?;
    let back = format!("/users/{}", id);
    let password = form.validate().map_err(|errors| {
        match render_form(&scope, "Change Password", form.fields(), Some(&errors), uri.path(), &back) {
            Ok(html) => AdminError::Validation(html),
            Err(e) => e,
        }
    })?;

    let user = scope
        .accounts
        .change_password(id, &password)
        .await
        .map_err(|e| AdminError::from(e).or_redirect("/users"))?;
    info!("Changed password of user {}", user.id);
    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/new", get(new_form).post(create))
        .route("/{user_id}", get(show))
        .route("/{user_id}/edit", get(edit_form).post(update))
        .route("/{user_id}/change-password", get(change_password_form).post(change_password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id() {
        let params = vec![("user_id".to_string(), "12".to_string())];
        assert_eq!(user_id(&params).unwrap(), 12);

        let params = vec![("user_id".to_string(), "x".to_string())];
        assert!(matches!(user_id(&params), Err(AdminError::NotFound { ref redirect_to }) if redirect_to == "/users"));
    }
}
