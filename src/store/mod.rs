//! Content-storage collaborator
//!
//! The admin tool owns no durable state. Every read and write goes through a
//! [`ContentStore`] (content items) or an [`AccountStore`] (users, devices,
//! sign-in). A [`StoreFactory`] hands out request-scoped stores bound to the
//! caller's credential, so no credential is ever shared between requests.

mod http;
mod memory;

pub use http::{HttpContentStore, HttpStoreFactory, UpstreamClient};
pub use memory::{MemoryContentStore, MemoryStoreFactory};

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{ContentType, Device, EditUser, Item, LoginResult, User, UserToken};

/// Collaborator errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entity not found")]
    NotFound,

    #[error("Not authorized")]
    Unauthorized,

    #[error("Content service responded with status {0}")]
    Http(u16),

    #[error("Content service unreachable: {0}")]
    Transport(String),

    #[error("Invalid response from content service: {0}")]
    Decode(String),
}

impl StoreError {
    /// Numeric status to show on the error page
    pub fn status(&self) -> u16 {
        match self {
            StoreError::NotFound => 404,
            StoreError::Unauthorized => 401,
            StoreError::Http(status) => *status,
            StoreError::Transport(_) | StoreError::Decode(_) => 502,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-type content operations offered by the content service
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn index_published(&self, kind: ContentType) -> StoreResult<Vec<Item>>;
    async fn index_draft(&self, kind: ContentType) -> StoreResult<Vec<Item>>;
    async fn show(&self, kind: ContentType, id: i64) -> StoreResult<Item>;
    async fn create(&self, kind: ContentType, fields: Map<String, Value>) -> StoreResult<Item>;
    async fn patch(&self, kind: ContentType, id: i64, fields: Map<String, Value>) -> StoreResult<Item>;
    async fn delete(&self, kind: ContentType, id: i64) -> StoreResult<()>;
    async fn publish(&self, kind: ContentType, id: i64) -> StoreResult<()>;
}

/// Account operations offered by the content service
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> StoreResult<LoginResult>;
    async fn users(&self) -> StoreResult<Vec<User>>;
    async fn user(&self, id: i64) -> StoreResult<User>;
    async fn user_tokens(&self, id: i64) -> StoreResult<Vec<UserToken>>;
    async fn create_user(&self, user: &EditUser) -> StoreResult<User>;
    async fn patch_user(&self, id: i64, user: &EditUser) -> StoreResult<User>;
    async fn change_password(&self, id: i64, password: &str) -> StoreResult<User>;
    async fn devices(&self) -> StoreResult<Vec<Device>>;
}

/// Hands out stores bound to one caller's credential
pub trait StoreFactory: Send + Sync {
    fn content(&self, token: Option<&str>) -> Arc<dyn ContentStore>;
    fn accounts(&self, token: Option<&str>) -> Arc<dyn AccountStore>;
}

/// Convenience lookups on top of [`ContentStore`]
#[async_trait]
pub trait ContentStoreExt {
    /// `show` with `NotFound` mapped to `None`
    async fn find(&self, kind: ContentType, id: i64) -> StoreResult<Option<Item>>;
}

#[async_trait]
impl<S: ContentStore + ?Sized> ContentStoreExt for S {
    async fn find(&self, kind: ContentType, id: i64) -> StoreResult<Option<Item>> {
        match self.show(kind, id).await {
            Ok(item) => Ok(Some(item)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
