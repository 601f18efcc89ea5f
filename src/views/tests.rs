//! Tests for the view engine

use super::*;
use crate::services::SessionData;
use std::fs;
use tempfile::TempDir;

fn admin() -> SessionData {
    SessionData {
        auth_token: "token".to_string(),
        is_admin: true,
        username: "Chris".to_string(),
    }
}

#[test]
fn test_embedded_templates_are_loaded() {
    let engine = ViewEngine::new(None).unwrap();

    for template in [
        "base.html",
        "signin.html",
        "dashboard.html",
        "404.html",
        "client-error.html",
        "resource/index.html",
        "resource/form.html",
        "resource/delete.html",
        "resource/publish.html",
        "models/show.html",
        "stages/show.html",
    ] {
        assert!(engine.has_template(template), "missing {}", template);
    }
}

#[test]
fn test_not_found_page_renders_navigation() {
    let engine = ViewEngine::new(None).unwrap();
    let context = page_context(&Navigation::new(Section::Dashboard, Some(&admin())));

    let html = engine.render("404.html", &context).unwrap();

    assert!(html.contains("Page not found"));
    assert!(html.contains("href=\"/users\""));
    assert!(html.contains("Chris"));
}

#[test]
fn test_client_error_page_shows_status() {
    let engine = ViewEngine::new(None).unwrap();
    let mut context = page_context(&Navigation::for_session(None));
    context.insert("status", &503);

    let html = engine.render("client-error.html", &context).unwrap();

    assert!(html.contains("503"));
    assert!(!html.contains("Sign out"));
}

#[test]
fn test_override_dir_replaces_embedded_template() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("404.html"),
        r#"{% extends "base.html" %}
{% block content %}<p>Custom missing page</p>{% endblock %}"#,
    )
    .unwrap();

    let engine = ViewEngine::new(Some(temp_dir.path())).unwrap();
    let html = engine
        .render("404.html", &page_context(&Navigation::for_session(None)))
        .unwrap();

    assert!(html.contains("Custom missing page"));
    assert!(html.contains("JP Fan App"));
}

#[test]
fn test_override_dir_adds_nested_templates() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("extra")).unwrap();
    fs::write(temp_dir.path().join("extra/hello.html"), "Hello {{ name }}").unwrap();
    fs::write(temp_dir.path().join("extra/notes.txt"), "ignored").unwrap();

    let engine = ViewEngine::new(Some(temp_dir.path())).unwrap();
    let mut context = TeraContext::new();
    context.insert("name", "Stage 1");

    assert_eq!(engine.render("extra/hello.html", &context).unwrap(), "Hello Stage 1");
    assert!(!engine.has_template("extra/notes.txt"));
}

#[test]
fn test_missing_override_dir_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let engine = ViewEngine::new(Some(&temp_dir.path().join("nope"))).unwrap();
    assert!(engine.has_template("base.html"));
}

#[test]
fn test_broken_override_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("404.html"), "{% if %}").unwrap();

    assert!(matches!(ViewEngine::new(Some(temp_dir.path())), Err(ViewError::Template(_))));
}

#[test]
fn test_render_with_fallback() {
    let engine = ViewEngine::new(None).unwrap();

    let html = engine.render_with_fallback("does-not-exist.html", &TeraContext::new());

    assert!(html.contains("Template Error"));
    assert!(html.contains("does-not-exist.html"));
}
