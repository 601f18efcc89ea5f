//! Stage pages, nested below their model
//!
//! - GET /models/{model_id}/stages/{id} - Stage with its timings and videos
//! - /models/{model_id}/stages/new, /{id}/edit, /{id}/delete, /{id}/publish
//! - Timings and video links are managed below the stage

use axum::{response::Html, routing::get, Router};

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::{self, find_row, rows, Location, RouteParams};
use super::video_series::link_rows;
use crate::models::{CarStage, ContentType, StageTiming, VideoLink};
use crate::services::StagingError;
use crate::store::ContentStoreExt;
use crate::views::Section;

/// GET /models/{model_id}/stages/{stage_id}
pub async fn show(scope: RequestScope, RouteParams(params): RouteParams) -> Result<Html<String>, AdminError> {
    let location = Location::parse(ContentType::Stage, &params)?;
    let id = location.item_id(ContentType::Stage)?;
    let Some((_, model_id)) = location.parent else {
        return Err(AdminError::not_found("/models"));
    };
    let back = format!("/models/{}", model_id);

    let aggregator = scope.aggregator();
    let (model, stages, timings, links, videos) = tokio::try_join!(
        async { scope.content.find(ContentType::Model, model_id).await.map_err(StagingError::from) },
        aggregator.fetch_all(ContentType::Stage),
        aggregator.fetch_all(ContentType::Timing),
        aggregator.fetch_all(ContentType::VideoSeriesVideoLink),
        aggregator.fetch_all(ContentType::Video),
    )?;
    let model = model.ok_or_else(|| AdminError::not_found("/models"))?;
    let stage = find_row(&stages, id)
        .filter(|stage| stage.item.belongs_to(ContentType::Stage, ContentType::Model, model_id))
        .ok_or_else(|| AdminError::not_found(&back))?;

    let mut context = scope.page(Section::Models);
    context.insert("model", &model);
    context.insert("stage", &stage);
    context.insert("base", &format!("{}/stages/{}", back, id));
    context.insert("timings", &rows(&timings.children_of(ContentType::Stage, id)));
    context.insert("videos", &link_rows(&links.children_of(ContentType::Stage, id), &videos));
    scope.render("stages/show.html", &context)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{stage_id}", get(show))
        .merge(resource::routes::<CarStage>())
        .nest("/{stage_id}/timings", resource::routes::<StageTiming>())
        .nest("/{stage_id}/videos", resource::routes::<VideoLink>())
}
