//! Navigation shortcuts for nested entities
//!
//! Timings and stages live below their model. These routes look up the
//! owning chain and redirect to the nested stage page.
//!
//! - GET /timings/{id} - Stage page of the timing
//! - GET /stages/{id} - Stage page of the stage

use axum::{response::Redirect, routing::get, Router};

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::{Location, RouteParams};
use crate::models::ContentType;
use crate::services::HierarchyPath;

/// Nested stage page of a resolved path, `None` if the chain is broken
fn stage_page(path: &HierarchyPath, stage_id: i64) -> Option<String> {
    if path.broken {
        return None;
    }
    let model_id = path.ancestor(ContentType::Model)?;
    Some(format!("/models/{}/stages/{}", model_id, stage_id))
}

/// GET /timings/{timing_id}
pub async fn timing(scope: RequestScope, RouteParams(params): RouteParams) -> Result<Redirect, AdminError> {
    let id = Location::parse(ContentType::Timing, &params)?.item_id(ContentType::Timing)?;
    let path = scope.resolver().resolve(ContentType::Timing, id).await?;

    let target = path
        .ancestor(ContentType::Stage)
        .and_then(|stage_id| stage_page(&path, stage_id));
    match target {
        Some(target) => Ok(Redirect::to(&target)),
        None => Err(AdminError::BrokenHierarchy),
    }
}

/// GET /stages/{stage_id}
pub async fn stage(scope: RequestScope, RouteParams(params): RouteParams) -> Result<Redirect, AdminError> {
    let id = Location::parse(ContentType::Stage, &params)?.item_id(ContentType::Stage)?;
    let path = scope.resolver().resolve(ContentType::Stage, id).await?;

    match stage_page(&path, id) {
        Some(target) => Ok(Redirect::to(&target)),
        None => Err(AdminError::BrokenHierarchy),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/timings/{timing_id}", get(timing))
        .route("/stages/{stage_id}", get(stage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::PathNode;

    fn node(kind: ContentType, id: i64) -> PathNode {
        PathNode {
            kind,
            id,
            label: String::new(),
        }
    }

    #[test]
    fn test_stage_page() {
        let path = HierarchyPath {
            leaf: node(ContentType::Timing, 9),
            ancestors: vec![node(ContentType::Model, 1), node(ContentType::Stage, 4)],
            broken: false,
        };
        assert_eq!(stage_page(&path, 4).as_deref(), Some("/models/1/stages/4"));

        let broken = HierarchyPath {
            leaf: node(ContentType::Timing, 9),
            ancestors: vec![node(ContentType::Stage, 4)],
            broken: true,
        };
        assert_eq!(stage_page(&broken, 4), None);
    }
}
