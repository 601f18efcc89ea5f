//! Car model pages
//!
//! - GET /models - Published and draft models
//! - GET /models/{id} - Model with its images and stages
//! - /models/new, /{id}/edit, /{id}/delete, /{id}/publish
//! - Images and stages are managed below `/models/{id}`

use axum::{response::Html, routing::get, Router};

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::{self, find_row, rows, Location, RouteParams};
use super::stages;
use crate::models::{CarImage, CarModel, ContentType};
use crate::views::Section;

/// GET /models/{id}
pub async fn show(scope: RequestScope, RouteParams(params): RouteParams) -> Result<Html<String>, AdminError> {
    let id = Location::parse(ContentType::Model, &params)?.item_id(ContentType::Model)?;

    let aggregator = scope.aggregator();
    let (models, manufacturers, images, stages) = tokio::try_join!(
        aggregator.fetch_all(ContentType::Model),
        aggregator.fetch_all(ContentType::Manufacturer),
        aggregator.fetch_all(ContentType::Image),
        aggregator.fetch_all(ContentType::Stage),
    )?;
    let model = find_row(&models, id).ok_or_else(|| AdminError::not_found("/models"))?;
    let manufacturer = model
        .item
        .get_i64("manufacturerID")
        .and_then(|manufacturer_id| find_row(&manufacturers, manufacturer_id));

    let mut context = scope.page(Section::Models);
    context.insert("model", &model);
    context.insert("manufacturer", &manufacturer);
    context.insert("images", &rows(&images.children_of(ContentType::Model, id)));
    context.insert("stages", &rows(&stages.children_of(ContentType::Model, id)));
    scope.render("models/show.html", &context)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(resource::index::<CarModel>))
        .route("/{model_id}", get(show))
        .merge(resource::routes::<CarModel>())
        .nest("/{model_id}/images", resource::routes::<CarImage>())
        .nest("/{model_id}/stages", stages::router())
}
