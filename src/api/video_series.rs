//! Video series pages
//!
//! - GET /videoSeries - Published and draft series
//! - GET /videoSeries/{id} - Series with its linked videos
//! - /videoSeries/new, /{id}/edit, /{id}/delete, /{id}/publish
//! - Video links are managed below `/videoSeries/{id}/videos`

use axum::{response::Html, routing::get, Router};

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::{self, find_row, rows_labeled, Location, Row, RouteParams};
use crate::models::{ContentType, VideoLink, VideoSerie};
use crate::services::StagedCollection;
use crate::views::Section;

/// Rows of video links, labeled with the linked video's title
pub fn link_rows(links: &StagedCollection, videos: &StagedCollection) -> Vec<Row> {
    rows_labeled(links, |link| {
        let video_id = link.get_i64("videoID");
        video_id
            .and_then(|id| videos.find(id))
            .map(|video| video.label())
            .unwrap_or_else(|| format!("Video #{}", video_id.unwrap_or_default()))
    })
}

/// GET /videoSeries/{id}
pub async fn show(scope: RequestScope, RouteParams(params): RouteParams) -> Result<Html<String>, AdminError> {
    let id = Location::parse(ContentType::VideoSeries, &params)?.item_id(ContentType::VideoSeries)?;

    let aggregator = scope.aggregator();
    let (series, links, videos) = tokio::try_join!(
        aggregator.fetch_all(ContentType::VideoSeries),
        aggregator.fetch_all(ContentType::VideoSeriesVideoLink),
        aggregator.fetch_all(ContentType::Video),
    )?;
    let serie = find_row(&series, id).ok_or_else(|| AdminError::not_found("/videoSeries"))?;

    let mut context = scope.page(Section::VideoSeries);
    context.insert("serie", &serie);
    context.insert("videos", &link_rows(&links.children_of(ContentType::VideoSeries, id), &videos));
    scope.render("video_series/show.html", &context)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(resource::index::<VideoSerie>))
        .route("/{series_id}", get(show))
        .merge(resource::routes::<VideoSerie>())
        .nest("/{series_id}/videos", resource::routes::<VideoLink>())
}
