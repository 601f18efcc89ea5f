//! Router tests against the in-memory content store

use super::*;
use crate::config::SessionConfig;
use crate::models::ContentType;
use crate::services::{SessionData, SessionStore};
use crate::store::{ContentStore, MemoryContentStore, MemoryStoreFactory, StoreError};
use crate::views::ViewEngine;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct TestApp {
    server: TestServer,
    store: Arc<MemoryContentStore>,
    sessions: Arc<SessionStore>,
    _public: TempDir,
}

impl TestApp {
    fn new(store: MemoryContentStore) -> Self {
        let store = Arc::new(store);
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let state = AppState {
            stores: MemoryStoreFactory::boxed(store.clone()),
            sessions: sessions.clone(),
            views: Arc::new(ViewEngine::new(None).unwrap()),
            session_config: Arc::new(SessionConfig::default()),
        };
        let public = TempDir::new().unwrap();
        std::fs::write(public.path().join("robots.txt"), "User-agent: *").unwrap();
        let server = TestServer::new(build_router(state, public.path())).unwrap();
        Self {
            server,
            store,
            sessions,
            _public: public,
        }
    }

    async fn cookie(&self, is_admin: bool) -> HeaderValue {
        let id = self
            .sessions
            .create(SessionData {
                auth_token: "token".to_string(),
                is_admin,
                username: "Chris".to_string(),
            })
            .await;
        HeaderValue::from_str(&format!("session={}", id)).unwrap()
    }

    async fn get(&self, path: &str) -> TestResponse {
        let cookie = self.cookie(true).await;
        self.server.get(path).add_header(header::COOKIE, cookie).await
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let cookie = self.cookie(true).await;
        self.server.post(path).add_header(header::COOKIE, cookie).form(form).await
    }
}

fn location(response: &TestResponse) -> String {
    response.header(header::LOCATION).to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_signed_out_visitor_is_sent_to_signin() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app.server.get("/dashboard").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/signin");
}

#[tokio::test]
async fn test_root_redirects_to_dashboard() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app.server.get("/").await;

    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_signin_starts_session() {
    let store = MemoryContentStore::new();
    store.add_user("Chris", "chris@jp-fan-app.de", "supersecret", true).await;
    let app = TestApp::new(store);

    let response = app
        .server
        .post("/signin")
        .form(&[("email", "chris@jp-fan-app.de"), ("password", "supersecret")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = response.header(header::SET_COOKIE).to_str().unwrap().to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let id = cookie.trim_start_matches("session=").split(';').next().unwrap();
    let session = app.sessions.get(id).await.unwrap();
    assert_eq!(session.username, "Chris");
    assert!(session.is_admin);
}

#[tokio::test]
async fn test_signin_rejects_wrong_password() {
    let store = MemoryContentStore::new();
    store.add_user("Chris", "chris@jp-fan-app.de", "supersecret", true).await;
    let app = TestApp::new(store);

    let response = app
        .server
        .post("/signin")
        .form(&[("email", "chris@jp-fan-app.de"), ("password", "wrong")])
        .await;

    assert_eq!(location(&response), "/signin?invalid_login=true");

    let page = app.server.get("/signin?invalid_login=true").await;
    page.assert_status_ok();
    assert!(page.text().contains("Invalid email or password"));
}

#[tokio::test]
async fn test_signout_ends_session() {
    let app = TestApp::new(MemoryContentStore::new());
    let cookie = app.cookie(false).await;

    let response = app.server.get("/signout").add_header(header::COOKIE, cookie.clone()).await;
    assert_eq!(location(&response), "/dashboard");
    assert!(response.header(header::SET_COOKIE).to_str().unwrap().contains("Max-Age=0"));

    let response = app.server.get("/dashboard").add_header(header::COOKIE, cookie).await;
    assert_eq!(location(&response), "/signin");
}

#[tokio::test]
async fn test_dashboard_lists_drafts() {
    let store = MemoryContentStore::new();
    store.insert_published(ContentType::Manufacturer, json!({"name": "Audi"})).await;
    let porsche = store.insert_draft(ContentType::Manufacturer, json!({"name": "Porsche"})).await;
    let app = TestApp::new(store);

    let response = app.get("/dashboard").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Porsche"));
    assert!(html.contains(&format!("href=\"/manufacturers/{}\"", porsche)));
    assert!(html.contains("href=\"/dashboard\""));
    assert!(!html.contains("Audi"));
    assert!(html.contains("class=\"active\""));
}

#[tokio::test]
async fn test_dashboard_without_drafts() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app.get("/dashboard").await;

    assert!(response.text().contains("No drafts waiting to be published"));
}

#[tokio::test]
async fn test_publish_manufacturer() {
    let store = MemoryContentStore::new();
    let id = store.insert_draft(ContentType::Manufacturer, json!({"name": "Porsche"})).await;
    let app = TestApp::new(store);

    let confirm = app.get(&format!("/manufacturers/{}/publish", id)).await;
    confirm.assert_status_ok();
    assert!(confirm.text().contains("Publish Manufacturer Porsche?"));

    let response = app.post(&format!("/manufacturers/{}/publish", id), &[]).await;
    assert_eq!(location(&response), format!("/manufacturers/{}", id));

    let published = app.store.index_published(ContentType::Manufacturer).await.unwrap();
    assert!(published.iter().any(|item| item.id == id));
    assert!(app.store.index_draft(ContentType::Manufacturer).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_publish_timing_redirects_to_model() {
    let store = MemoryContentStore::new();
    let model = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let stage = store
        .insert_published(ContentType::Stage, json!({"carModelID": model, "name": "Stock"}))
        .await;
    let timing = store.insert_draft(ContentType::Timing, json!({"stageID": stage})).await;
    let app = TestApp::new(store);

    let response = app
        .post(&format!("/models/{}/stages/{}/timings/{}/publish", model, stage, timing), &[])
        .await;

    assert_eq!(location(&response), format!("/models/{}", model));
}

#[tokio::test]
async fn test_missing_manufacturer_redirects_to_list() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app.get("/manufacturers/42").await;
    assert_eq!(location(&response), "/manufacturers");

    let response = app.get("/manufacturers/abc/edit").await;
    assert_eq!(location(&response), "/manufacturers");
}

#[tokio::test]
async fn test_create_manufacturer() {
    let app = TestApp::new(MemoryContentStore::new());

    let form = app.get("/manufacturers/new").await;
    form.assert_status_ok();
    assert!(form.text().contains("New Manufacturer"));

    let response = app.post("/manufacturers/new", &[("name", "Lamborghini")]).await;
    response.assert_status(StatusCode::SEE_OTHER);

    let drafts = app.store.index_draft(ContentType::Manufacturer).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(location(&response), format!("/manufacturers/{}", drafts[0].id));
}

#[tokio::test]
async fn test_invalid_form_is_rendered_again() {
    let store = MemoryContentStore::new();
    let model = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let app = TestApp::new(store);

    let response = app
        .post(&format!("/models/{}/stages/new", model), &[("name", ""), ("ps", "lots")])
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text();
    assert!(html.contains("This field is required"));
    assert!(html.contains("Please enter a number"));
    assert!(app.store.index_draft(ContentType::Stage).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_stage_redirects_to_model() {
    let store = MemoryContentStore::new();
    let model = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let app = TestApp::new(store);

    let response = app
        .post(
            &format!("/models/{}/stages/new", model),
            &[("name", "Stage 1"), ("isStock", "true"), ("ps", "470")],
        )
        .await;

    assert_eq!(location(&response), format!("/models/{}", model));
    let drafts = app.store.index_draft(ContentType::Stage).await.unwrap();
    assert_eq!(drafts[0].get_i64("carModelID"), Some(model));
    assert_eq!(drafts[0].get_bool("isStock"), Some(true));
}

#[tokio::test]
async fn test_new_stage_for_missing_model() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app.get("/models/99/stages/new").await;

    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_stage_page_shows_timings_and_videos() {
    let store = MemoryContentStore::new();
    let model = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let stage = store
        .insert_published(ContentType::Stage, json!({"carModelID": model, "name": "Stage 1"}))
        .await;
    store
        .insert_draft(ContentType::Timing, json!({"stageID": stage, "second1": 3.5}))
        .await;
    let video = store
        .insert_published(ContentType::Video, json!({"title": "Autobahn run", "videoID": "abc"}))
        .await;
    store
        .insert_published(
            ContentType::VideoSeriesVideoLink,
            json!({"videoID": video, "stageID": stage, "videoSerieID": null}),
        )
        .await;
    let app = TestApp::new(store);

    let response = app.get(&format!("/models/{}/stages/{}", model, stage)).await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("3.5"));
    assert!(html.contains("Autobahn run"));
}

#[tokio::test]
async fn test_stage_of_other_model_redirects() {
    let store = MemoryContentStore::new();
    let rs3 = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let m2 = store.insert_published(ContentType::Model, json!({"name": "M2"})).await;
    let stage = store
        .insert_published(ContentType::Stage, json!({"carModelID": rs3, "name": "Stock"}))
        .await;
    let app = TestApp::new(store);

    let response = app.get(&format!("/models/{}/stages/{}/edit", m2, stage)).await;

    assert_eq!(location(&response), format!("/models/{}", m2));
}

#[tokio::test]
async fn test_timing_under_other_model_redirects() {
    let store = MemoryContentStore::new();
    let rs3 = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let m2 = store.insert_published(ContentType::Model, json!({"name": "M2"})).await;
    let stage = store
        .insert_published(ContentType::Stage, json!({"carModelID": rs3, "name": "Stock"}))
        .await;
    let timing = store.insert_published(ContentType::Timing, json!({"stageID": stage})).await;
    let app = TestApp::new(store);

    let response = app
        .get(&format!("/models/{}/stages/{}/timings/{}/edit", rs3, stage, timing))
        .await;
    response.assert_status_ok();

    let response = app
        .get(&format!("/models/{}/stages/{}/timings/{}/edit", m2, stage, timing))
        .await;
    assert_eq!(location(&response), format!("/models/{}/stages/{}", m2, stage));

    let response = app.get(&format!("/models/{}/stages/{}/timings/new", m2, stage)).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_find_timing() {
    let store = MemoryContentStore::new();
    let model = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let stage = store
        .insert_published(ContentType::Stage, json!({"carModelID": model, "name": "Stock"}))
        .await;
    let timing = store.insert_published(ContentType::Timing, json!({"stageID": stage})).await;
    let orphan = store.insert_published(ContentType::Timing, json!({"stageID": 999})).await;
    let app = TestApp::new(store);

    let response = app.get(&format!("/timings/{}", timing)).await;
    assert_eq!(location(&response), format!("/models/{}/stages/{}", model, stage));

    let response = app.get(&format!("/stages/{}", stage)).await;
    assert_eq!(location(&response), format!("/models/{}/stages/{}", model, stage));

    let response = app.get(&format!("/timings/{}", orphan)).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_delete_image_redirects_to_model() {
    let store = MemoryContentStore::new();
    let model = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
    let image = store
        .insert_published(ContentType::Image, json!({"carModelID": model, "copyrightInformation": "JP"}))
        .await;
    let app = TestApp::new(store);

    let response = app.post(&format!("/models/{}/images/{}/delete", model, image), &[]).await;

    assert_eq!(location(&response), format!("/models/{}", model));
    assert!(app.store.index_published(ContentType::Image).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_manufacturer_redirects_to_list() {
    let store = MemoryContentStore::new();
    let id = store.insert_published(ContentType::Manufacturer, json!({"name": "Audi"})).await;
    let app = TestApp::new(store);

    let confirm = app.get(&format!("/manufacturers/{}/delete", id)).await;
    assert!(confirm.text().contains("Delete Manufacturer Audi?"));

    let response = app.post(&format!("/manufacturers/{}/delete", id), &[]).await;
    assert_eq!(location(&response), "/manufacturers");
}

#[tokio::test]
async fn test_series_video_link_flow() {
    let store = MemoryContentStore::new();
    let series = store
        .insert_published(ContentType::VideoSeries, json!({"title": "Autobahn Runs", "isPublic": true}))
        .await;
    let video = store.insert_published(ContentType::Video, json!({"title": "Run 1"})).await;
    let app = TestApp::new(store);

    let form = app.get(&format!("/videoSeries/{}/videos/new", series)).await;
    assert!(form.text().contains("Run 1"));

    let response = app
        .post(
            &format!("/videoSeries/{}/videos/new", series),
            &[("videoID", &video.to_string()), ("referenceID", "1")],
        )
        .await;
    assert_eq!(location(&response), format!("/videoSeries/{}", series));

    let links = app.store.index_draft(ContentType::VideoSeriesVideoLink).await.unwrap();
    assert_eq!(links[0].get_i64("videoSerieID"), Some(series));

    let page = app.get(&format!("/videoSeries/{}", series)).await;
    assert!(page.text().contains("Run 1"));
}

#[tokio::test]
async fn test_upstream_error_renders_status_page() {
    let store = MemoryContentStore::new().with_failure(ContentType::Manufacturer, StoreError::Http(503));
    let app = TestApp::new(store);

    let response = app.get("/manufacturers").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().contains("failed with status 503"));
}

#[tokio::test]
async fn test_failing_dashboard_type_fails_the_page() {
    let store = MemoryContentStore::new().with_failure(ContentType::Timing, StoreError::Http(500));
    let app = TestApp::new(store);

    let response = app.get("/dashboard").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upstream_unauthorized_signs_out() {
    let store = MemoryContentStore::new().with_failure(ContentType::Video, StoreError::Unauthorized);
    let app = TestApp::new(store);

    let response = app.get("/videos").await;

    assert_eq!(location(&response), "/signout");
}

#[tokio::test]
async fn test_admin_pages_hidden_from_editors() {
    let store = MemoryContentStore::new();
    store.add_device("ios", Some("de")).await;
    let app = TestApp::new(store);

    let editor = app.cookie(false).await;
    let response = app.server.get("/devices").add_header(header::COOKIE, editor).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().contains("Page not found"));

    let response = app.get("/devices").await;
    response.assert_status_ok();
    assert!(response.text().contains("ios"));
}

#[tokio::test]
async fn test_user_administration() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app
        .post(
            "/users/new",
            &[("name", "Editor"), ("email", "editor@jp-fan-app.de"), ("password", "longenough")],
        )
        .await;
    let target = location(&response);
    assert!(target.starts_with("/users/"));

    let page = app.get(&target).await;
    page.assert_status_ok();
    assert!(page.text().contains("editor@jp-fan-app.de"));

    let response = app
        .post(&format!("{}/change-password", target), &[("password", "short")])
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post(
            &format!("{}/edit", target),
            &[("name", "Chief"), ("email", "chief@jp-fan-app.de"), ("isAdmin", "true")],
        )
        .await;
    assert_eq!(location(&response), target);

    let list = app.get("/users").await;
    assert!(list.text().contains("Chief"));
}

#[tokio::test]
async fn test_unknown_path_renders_404() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app.server.get("/does/not/exist").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().contains("Page not found"));
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = TestApp::new(MemoryContentStore::new());

    let response = app.server.get("/robots.txt").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "User-agent: *");
}
