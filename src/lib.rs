//! JP Fan App admin - staging and publication of app content
//!
//! This library provides the admin web application: draft/published staging
//! over the content service, publication workflow, and the server-rendered pages.

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod store;
pub mod views;
