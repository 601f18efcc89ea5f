//! Registered devices (admin only)
//!
//! - GET /devices - Devices registered for push notifications

use axum::{response::Html, routing::get, Router};

use super::middleware::{AdminError, AppState, RequestScope};
use crate::views::Section;

/// GET /devices
pub async fn index(scope: RequestScope) -> Result<Html<String>, AdminError> {
    let devices = scope.accounts.devices().await?;

    let mut context = scope.page(Section::Devices);
    context.insert("devices", &devices);
    scope.render("devices/index.html", &context)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
