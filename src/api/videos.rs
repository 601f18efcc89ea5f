//! Video list
//!
//! - GET /videos - Videos known to the content service (read only)

use axum::{response::Html, routing::get, Router};

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::rows;
use crate::models::ContentType;
use crate::views::Section;

/// GET /videos
pub async fn index(scope: RequestScope) -> Result<Html<String>, AdminError> {
    let videos = scope.aggregator().fetch_all(ContentType::Video).await?;

    let mut context = scope.page(Section::Videos);
    context.insert("videos", &rows(&videos));
    scope.render("videos/index.html", &context)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
