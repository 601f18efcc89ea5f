//! Generic resource handlers
//!
//! Every editable content type shares the same new/edit/delete/publish flow.
//! The handlers here are generic over a [`ContentSchema`]; the route a request
//! arrived on tells them which entity is addressed and which parent owns it.
//!
//! Route parameters are named after the type they identify (`model_id`,
//! `stage_id`, ...). The parameter matching the schema's own type is the
//! entity id, the nearest other one is the owning parent.

use axum::{
    extract::{FromRequestParts, OriginalUri, Path, Query},
    http::request::Parts,
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use super::middleware::{list_path, AdminError, AppState, RequestScope};
use crate::models::{form::apply_errors, ContentSchema, ContentType, FormErrors, Item, Scope};
use crate::services::{HierarchyPath, StagedCollection, StagingError};
use crate::store::ContentStoreExt;
use crate::views::Section;

/// Route parameter carrying the id of a content type
pub fn id_param(kind: ContentType) -> &'static str {
    match kind {
        ContentType::Manufacturer => "manufacturer_id",
        ContentType::Model => "model_id",
        ContentType::Image => "image_id",
        ContentType::Stage => "stage_id",
        ContentType::Timing => "timing_id",
        ContentType::Video => "video_id",
        ContentType::VideoSeries => "series_id",
        ContentType::VideoSeriesVideoLink => "link_id",
    }
}

fn param_kind(name: &str) -> Option<ContentType> {
    ContentType::ALL.into_iter().find(|kind| id_param(*kind) == name)
}

/// Navigation section a content type lives in
pub fn section_of(kind: ContentType) -> Section {
    match kind {
        ContentType::Manufacturer => Section::Manufacturers,
        ContentType::Model | ContentType::Image | ContentType::Stage | ContentType::Timing => Section::Models,
        ContentType::Video => Section::Videos,
        ContentType::VideoSeries | ContentType::VideoSeriesVideoLink => Section::VideoSeries,
    }
}

/// Page that shows an item: its own page, or the page that lists it
pub fn item_href(kind: ContentType, item: &Item) -> String {
    match kind {
        ContentType::Image | ContentType::VideoSeriesVideoLink => match item.parent_ref(kind) {
            Some((parent, id)) => format!("/{}/{}", parent.collection(), id),
            None => "/".to_string(),
        },
        ContentType::Video => "/videos".to_string(),
        _ => format!("/{}/{}", kind.collection(), item.id),
    }
}

/// Path parameters of the matched route, in order
pub struct RouteParams(pub Vec<(String, String)>);

impl<S: Send + Sync> FromRequestParts<S> for RouteParams {
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Option::<Path<Vec<(String, String)>>>::from_request_parts(parts, state).await {
            Ok(Some(Path(params))) => Ok(Self(params)),
            Ok(None) => Ok(Self(Vec::new())),
            Err(_) => Err(AdminError::PageNotFound),
        }
    }
}

/// Entity and parent addressed by a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<(ContentType, i64)>,
    pub id: Option<i64>,
    /// Every owning entity named by the route, outermost first
    pub ancestors: Vec<(ContentType, i64)>,
}

impl Location {
    pub fn parse(kind: ContentType, params: &[(String, String)]) -> Result<Self, AdminError> {
        let mut location = Location {
            parent: None,
            id: None,
            ancestors: Vec::new(),
        };
        for (name, value) in params {
            let Some(param_kind) = param_kind(name) else {
                continue;
            };
            let id: i64 = value
                .parse()
                .map_err(|_| AdminError::not_found(list_path(kind)))?;
            if param_kind == kind {
                location.id = Some(id);
            } else {
                location.parent = Some((param_kind, id));
                location.ancestors.push((param_kind, id));
            }
        }
        Ok(location)
    }

    pub fn scope(&self) -> Scope {
        Scope { parent: self.parent }
    }

    pub fn item_id(&self, kind: ContentType) -> Result<i64, AdminError> {
        self.id.ok_or_else(|| AdminError::not_found(list_path(kind)))
    }
}

/// Drop the last `segments` path segments
fn strip_segments(path: &str, segments: usize) -> String {
    let parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    let keep = parts.len().saturating_sub(segments);
    let stripped = parts[..keep].join("/");
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped
    }
}

/// Where "cancel" leads from a `/new` page
fn new_back_path(kind: ContentType, path: &str) -> String {
    if kind.descriptor().is_nested() {
        strip_segments(path, 2)
    } else {
        list_path(kind)
    }
}

/// Where "cancel" leads from an item action page
fn item_back_path(kind: ContentType, id: i64, path: &str) -> String {
    let descriptor = kind.descriptor();
    if descriptor.is_nested() {
        strip_segments(path, 3)
    } else if descriptor.has_detail_page {
        format!("/{}/{}", kind.collection(), id)
    } else {
        list_path(kind)
    }
}

/// Row of a listing
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub id: i64,
    pub label: String,
    pub href: String,
    pub draft: bool,
    pub item: Item,
}

/// Rows for a staged collection, published first
pub fn rows(collection: &StagedCollection) -> Vec<Row> {
    rows_labeled(collection, Item::label)
}

pub fn rows_labeled(collection: &StagedCollection, label: impl Fn(&Item) -> String) -> Vec<Row> {
    collection
        .all()
        .map(|item| Row {
            id: item.id,
            label: label(item),
            href: item_href(collection.kind, item),
            draft: collection.is_draft(item.id),
            item: item.clone(),
        })
        .collect()
}

/// Row of a single entity of a staged collection
pub fn find_row(collection: &StagedCollection, id: i64) -> Option<Row> {
    collection.find(id).map(|item| Row {
        id,
        label: item.label(),
        href: item_href(collection.kind, item),
        draft: collection.is_draft(id),
        item: item.clone(),
    })
}

async fn load_options<S: ContentSchema>(scope: &RequestScope) -> Result<Vec<Item>, AdminError> {
    match S::OPTIONS {
        Some(kind) => {
            let collection = scope.aggregator().fetch_all(kind).await?;
            Ok(collection.all().cloned().collect())
        }
        None => Ok(Vec::new()),
    }
}

/// Whether every route id agrees with the resolved ancestors of an entity
fn route_matches(route: &[(ContentType, i64)], path: &HierarchyPath) -> bool {
    route.iter().all(|&(kind, id)| path.ancestor(kind) == Some(id))
}

async fn ensure_parent(scope: &RequestScope, location: &Location) -> Result<(), AdminError> {
    let Some((kind, id)) = location.parent else {
        return Ok(());
    };
    let Some(parent) = scope.content.find(kind, id).await? else {
        return Err(AdminError::BrokenHierarchy);
    };
    if let Some((_, outer)) = location.ancestors.split_last() {
        if !outer.is_empty() {
            let path = scope.resolver().resolve_item(kind, &parent).await?;
            if !route_matches(outer, &path) {
                return Err(AdminError::BrokenHierarchy);
            }
        }
    }
    Ok(())
}

/// Fetch the addressed item and check it belongs to the route's parent
async fn load_item<S: ContentSchema>(
    scope: &RequestScope,
    location: &Location,
    back: &str,
) -> Result<Item, AdminError> {
    let id = location.item_id(S::KIND)?;
    let item = scope
        .content
        .show(S::KIND, id)
        .await
        .map_err(|e| AdminError::from(StagingError::for_entity(S::KIND, id, e)).or_redirect(back))?;
    if let Some((parent, parent_id)) = location.parent {
        if !item.belongs_to(S::KIND, parent, parent_id) {
            return Err(AdminError::not_found(back));
        }
    }
    if location.ancestors.len() > 1 {
        let path = scope.resolver().resolve_item(S::KIND, &item).await?;
        if !route_matches(&location.ancestors, &path) {
            return Err(AdminError::not_found(back));
        }
    }
    Ok(item)
}

struct FormPage<'a> {
    title: String,
    action: &'a str,
    cancel_to: &'a str,
}

fn render_form<S: ContentSchema>(
    scope: &RequestScope,
    page: FormPage<'_>,
    form: &S::Form,
    options: &[Item],
    errors: Option<&FormErrors>,
) -> Result<String, AdminError> {
    let mut fields = S::fields(form, options);
    if let Some(errors) = errors {
        apply_errors(&mut fields, errors);
    }
    let mut context = scope.page(section_of(S::KIND));
    context.insert("title", &page.title);
    context.insert("singular", S::KIND.descriptor().singular);
    context.insert("fields", &fields);
    context.insert("action", page.action);
    context.insert("cancel_to", page.cancel_to);
    context.insert("has_errors", &errors.is_some_and(|e| !e.is_empty()));
    Ok(scope.views.render("resource/form.html", &context)?)
}

/// GET list page of a top-level type
pub async fn index<S: ContentSchema>(scope: RequestScope) -> Result<Html<String>, AdminError> {
    let collection = scope.aggregator().fetch_all(S::KIND).await?;
    let descriptor = S::KIND.descriptor();

    let mut context = scope.page(section_of(S::KIND));
    context.insert("title", descriptor.title);
    context.insert("singular", descriptor.singular);
    context.insert("rows", &rows(&collection));
    context.insert("has_pending", &collection.has_pending());
    context.insert("new_href", &format!("/{}/new", descriptor.collection));
    scope.render("resource/index.html", &context)
}

/// GET `/new`
pub async fn new_form<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Html<String>, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    ensure_parent(&scope, &location).await?;
    let options = load_options::<S>(&scope).await?;

    let mut form = S::Form::default();
    S::prefill(&mut form, &query, &options);

    let back = new_back_path(S::KIND, uri.path());
    let page = FormPage {
        title: format!("New {}", S::KIND.descriptor().singular),
        action: uri.path(),
        cancel_to: &back,
    };
    Ok(Html(render_form::<S>(&scope, page, &form, &options, None)?))
}

/// POST `/new`
pub async fn create<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<S::Form>,
) -> Result<Redirect, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    ensure_parent(&scope, &location).await?;

    let payload = match S::validate(&form, &location.scope()) {
        Ok(payload) => payload,
        Err(errors) => {
            let options = load_options::<S>(&scope).await?;
            let back = new_back_path(S::KIND, uri.path());
            let page = FormPage {
                title: format!("New {}", S::KIND.descriptor().singular),
                action: uri.path(),
                cancel_to: &back,
            };
            return Err(AdminError::Validation(render_form::<S>(
                &scope,
                page,
                &form,
                &options,
                Some(&errors),
            )?));
        }
    };

    let item = scope.content.create(S::KIND, payload).await?;
    info!("Created {} {}", S::KIND, item.id);
    let path = scope.resolver().resolve_item(S::KIND, &item).await?;
    Ok(Redirect::to(&path.redirect_target().to_path()))
}

/// GET `/{id}/edit`
pub async fn edit_form<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Html<String>, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    let id = location.item_id(S::KIND)?;
    let back = item_back_path(S::KIND, id, uri.path());
    let item = load_item::<S>(&scope, &location, &back).await?;
    let options = load_options::<S>(&scope).await?;

    let form = S::form_from_item(&item);
    let page = FormPage {
        title: format!("Edit {} {}", S::KIND.descriptor().singular, item.label()),
        action: uri.path(),
        cancel_to: &back,
    };
    Ok(Html(render_form::<S>(&scope, page, &form, &options, None)?))
}

/// POST `/{id}/edit`
pub async fn update<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<S::Form>,
) -> Result<Redirect, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    let id = location.item_id(S::KIND)?;
    let back = item_back_path(S::KIND, id, uri.path());
    let item = load_item::<S>(&scope, &location, &back).await?;

    let payload = match S::validate(&form, &location.scope()) {
        Ok(payload) => payload,
        Err(errors) => {
            let options = load_options::<S>(&scope).await?;
            let page = FormPage {
                title: format!("Edit {} {}", S::KIND.descriptor().singular, item.label()),
                action: uri.path(),
                cancel_to: &back,
            };
            return Err(AdminError::Validation(render_form::<S>(
                &scope,
                page,
                &form,
                &options,
                Some(&errors),
            )?));
        }
    };

    let updated = scope
        .content
        .patch(S::KIND, id, payload)
        .await
        .map_err(|e| AdminError::from(e).or_redirect(&back))?;
    info!("Updated {} {}", S::KIND, id);
    let path = scope.resolver().resolve_item(S::KIND, &updated).await?;
    Ok(Redirect::to(&path.redirect_target().to_path()))
}

/// GET `/{id}/delete`
pub async fn delete_confirm<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Html<String>, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    let id = location.item_id(S::KIND)?;
    let back = item_back_path(S::KIND, id, uri.path());
    let item = load_item::<S>(&scope, &location, &back).await?;

    let mut context = scope.page(section_of(S::KIND));
    context.insert("singular", S::KIND.descriptor().singular);
    context.insert("label", &item.label());
    context.insert("item", &item);
    context.insert("action", uri.path());
    context.insert("cancel_to", &back);
    scope.render("resource/delete.html", &context)
}

/// POST `/{id}/delete`
pub async fn delete<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Redirect, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    let id = location.item_id(S::KIND)?;
    let back = item_back_path(S::KIND, id, uri.path());
    let item = load_item::<S>(&scope, &location, &back).await?;

    // the owner has to be resolved while the item still exists
    let target = if S::KIND.descriptor().is_nested() {
        let path = scope.resolver().resolve_item(S::KIND, &item).await?;
        path.redirect_target().to_path()
    } else {
        list_path(S::KIND)
    };

    scope
        .content
        .delete(S::KIND, id)
        .await
        .map_err(|e| AdminError::from(e).or_redirect(&back))?;
    info!("Deleted {} {}", S::KIND, id);
    Ok(Redirect::to(&target))
}

/// GET `/{id}/publish`
pub async fn publish_confirm<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Html<String>, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    let id = location.item_id(S::KIND)?;
    let back = item_back_path(S::KIND, id, uri.path());
    load_item::<S>(&scope, &location, &back).await?;

    let confirmation = scope
        .publisher()
        .confirm_publish(S::KIND, id)
        .await
        .map_err(|e| AdminError::from(e).or_redirect(&back))?;

    let mut context = scope.page(section_of(S::KIND));
    context.insert("confirmation", &confirmation);
    context.insert("action", uri.path());
    context.insert("cancel_to", &back);
    scope.render("resource/publish.html", &context)
}

/// POST `/{id}/publish`
pub async fn publish<S: ContentSchema>(
    scope: RequestScope,
    RouteParams(params): RouteParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Redirect, AdminError> {
    let location = Location::parse(S::KIND, &params)?;
    let id = location.item_id(S::KIND)?;
    let back = item_back_path(S::KIND, id, uri.path());
    load_item::<S>(&scope, &location, &back).await?;

    let target = scope
        .publisher()
        .execute_publish(S::KIND, id)
        .await
        .map_err(|e| AdminError::from(e).or_redirect(&back))?;
    Ok(Redirect::to(&target.to_path()))
}

/// new/edit/delete/publish routes of a content type
pub fn routes<S: ContentSchema>() -> Router<AppState> {
    let id = id_param(S::KIND);
    Router::new()
        .route("/new", get(new_form::<S>).post(create::<S>))
        .route(&format!("/{{{}}}/edit", id), get(edit_form::<S>).post(update::<S>))
        .route(&format!("/{{{}}}/delete", id), get(delete_confirm::<S>).post(delete::<S>))
        .route(&format!("/{{{}}}/publish", id), get(publish_confirm::<S>).post(publish::<S>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_location_nested_timing() {
        let location = Location::parse(
            ContentType::Timing,
            &params(&[("model_id", "1"), ("stage_id", "2"), ("timing_id", "3")]),
        )
        .unwrap();
        assert_eq!(location.parent, Some((ContentType::Stage, 2)));
        assert_eq!(location.id, Some(3));
        assert_eq!(
            location.ancestors,
            vec![(ContentType::Model, 1), (ContentType::Stage, 2)]
        );
    }

    #[test]
    fn test_location_new_stage() {
        let location = Location::parse(ContentType::Stage, &params(&[("model_id", "4")])).unwrap();
        assert_eq!(location.parent, Some((ContentType::Model, 4)));
        assert_eq!(location.id, None);
        assert_eq!(location.scope().parent_id(ContentType::Model), Some(4));
    }

    #[test]
    fn test_location_rejects_garbage_id() {
        let err = Location::parse(ContentType::Manufacturer, &params(&[("manufacturer_id", "abc")])).unwrap_err();
        assert!(matches!(err, AdminError::NotFound { ref redirect_to } if redirect_to == "/manufacturers"));
    }

    #[test]
    fn test_back_paths() {
        assert_eq!(new_back_path(ContentType::Model, "/models/new"), "/models");
        assert_eq!(new_back_path(ContentType::Stage, "/models/3/stages/new"), "/models/3");
        assert_eq!(
            item_back_path(ContentType::Timing, 9, "/models/3/stages/4/timings/9/edit"),
            "/models/3/stages/4"
        );
        assert_eq!(item_back_path(ContentType::VideoSeries, 2, "/videoSeries/2/edit"), "/videoSeries/2");
    }

    #[test]
    fn test_item_href() {
        let image = Item::from_value(5, json!({"carModelID": 3}));
        assert_eq!(item_href(ContentType::Image, &image), "/models/3");
        let timing = Item::from_value(6, json!({"stageID": 3}));
        assert_eq!(item_href(ContentType::Timing, &timing), "/timings/6");
        let link = Item::from_value(7, json!({"stageID": 2}));
        assert_eq!(item_href(ContentType::VideoSeriesVideoLink, &link), "/stages/2");
    }

    #[test]
    fn test_rows_mark_drafts() {
        let collection = StagedCollection::new(
            ContentType::Manufacturer,
            vec![Item::from_value(1, json!({"name": "Audi"}))],
            vec![Item::from_value(2, json!({"name": "BMW"}))],
        );
        let rows = rows(&collection);
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].draft);
        assert!(rows[1].draft);
        assert_eq!(rows[1].href, "/manufacturers/2");
    }
}
