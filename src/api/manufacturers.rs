//! Manufacturer pages
//!
//! - GET /manufacturers - Published and draft manufacturers
//! - GET /manufacturers/{id} - Manufacturer with its models
//! - /manufacturers/new, /{id}/edit, /{id}/delete, /{id}/publish

use axum::{response::Html, routing::get, Router};

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::{self, find_row, rows, Location, RouteParams};
use crate::models::{ContentType, Manufacturer};
use crate::views::Section;

/// GET /manufacturers/{id}
pub async fn show(scope: RequestScope, RouteParams(params): RouteParams) -> Result<Html<String>, AdminError> {
    let id = Location::parse(ContentType::Manufacturer, &params)?.item_id(ContentType::Manufacturer)?;

    let aggregator = scope.aggregator();
    let (manufacturers, models) = tokio::try_join!(
        aggregator.fetch_all(ContentType::Manufacturer),
        aggregator.fetch_all(ContentType::Model),
    )?;
    let manufacturer = find_row(&manufacturers, id).ok_or_else(|| AdminError::not_found("/manufacturers"))?;
    let models = models.filter(|model| model.get_i64("manufacturerID") == Some(id));

    let mut context = scope.page(Section::Manufacturers);
    context.insert("manufacturer", &manufacturer);
    context.insert("models", &rows(&models));
    scope.render("manufacturers/show.html", &context)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(resource::index::<Manufacturer>))
        .route("/{manufacturer_id}", get(show))
        .merge(resource::routes::<Manufacturer>())
}
