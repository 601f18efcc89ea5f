//! HTTP implementation of the content-storage collaborator
//!
//! [`UpstreamClient`] is shared process-wide and carries only immutable
//! connection settings. Each inbound request obtains its own
//! [`HttpContentStore`] through [`UpstreamClient::scoped`], which holds that
//! request's session token.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::{AccountStore, ContentStore, StoreError, StoreFactory, StoreResult};
use crate::config::UpstreamConfig;
use crate::models::{ContentType, Device, EditUser, Item, LoginResult, User, UserToken};

const API_PREFIX: &str = "/api/v1";
const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Shared connection settings for the content service
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    access_token: Arc<str>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("jpfan-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').into(),
            access_token: config.access_token.as_str().into(),
        })
    }

    /// A store bound to one caller's session token
    pub fn scoped(&self, auth_token: Option<String>) -> HttpContentStore {
        HttpContentStore {
            client: self.clone(),
            auth_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request-scoped store talking to the content service
pub struct HttpContentStore {
    client: UpstreamClient,
    auth_token: Option<String>,
}

impl HttpContentStore {
    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.client.base_url, API_PREFIX, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let mut builder = self.client.http.request(method, url);
        if !self.client.access_token.is_empty() {
            builder = builder.header(ACCESS_TOKEN_HEADER, &*self.client.access_token);
        }
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        check_status(response.status())?;
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> StoreResult<T> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn check_status(status: StatusCode) -> StoreResult<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
        StatusCode::NOT_FOUND => Err(StoreError::NotFound),
        s => Err(StoreError::Http(s.as_u16())),
    }
}

fn collection_path(kind: ContentType) -> String {
    format!("/{}", kind.collection())
}

fn item_path(kind: ContentType, id: i64) -> String {
    format!("/{}/{}", kind.collection(), id)
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn index_published(&self, kind: ContentType) -> StoreResult<Vec<Item>> {
        self.fetch(self.request(Method::GET, &collection_path(kind))).await
    }

    async fn index_draft(&self, kind: ContentType) -> StoreResult<Vec<Item>> {
        let path = format!("{}/draft", collection_path(kind));
        self.fetch(self.request(Method::GET, &path)).await
    }

    async fn show(&self, kind: ContentType, id: i64) -> StoreResult<Item> {
        self.fetch(self.request(Method::GET, &item_path(kind, id))).await
    }

    async fn create(&self, kind: ContentType, fields: Map<String, Value>) -> StoreResult<Item> {
        let builder = self.request(Method::POST, &collection_path(kind)).json(&fields);
        self.fetch(builder).await
    }

    async fn patch(&self, kind: ContentType, id: i64, fields: Map<String, Value>) -> StoreResult<Item> {
        let builder = self.request(Method::PATCH, &item_path(kind, id)).json(&fields);
        self.fetch(builder).await
    }

    async fn delete(&self, kind: ContentType, id: i64) -> StoreResult<()> {
        self.send(self.request(Method::DELETE, &item_path(kind, id))).await?;
        Ok(())
    }

    async fn publish(&self, kind: ContentType, id: i64) -> StoreResult<()> {
        let path = format!("{}/publish", item_path(kind, id));
        self.send(self.request(Method::POST, &path)).await?;
        Ok(())
    }
}

/// Sign-in response body
#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

#[async_trait]
impl AccountStore for HttpContentStore {
    async fn login(&self, email: &str, password: &str) -> StoreResult<LoginResult> {
        let builder = self
            .request(Method::POST, "/auth/login")
            .json(&json!({ "email": email, "password": password }));
        let response: LoginResponse = self.fetch(builder).await?;
        Ok(LoginResult {
            token: response.token,
            username: response.user.name,
            is_admin: response.user.is_admin,
        })
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        self.fetch(self.request(Method::GET, "/users")).await
    }

    async fn user(&self, id: i64) -> StoreResult<User> {
        self.fetch(self.request(Method::GET, &format!("/users/{}", id))).await
    }

    async fn user_tokens(&self, id: i64) -> StoreResult<Vec<UserToken>> {
        self.fetch(self.request(Method::GET, &format!("/users/{}/tokens", id)))
            .await
    }

    async fn create_user(&self, user: &EditUser) -> StoreResult<User> {
        self.fetch(self.request(Method::POST, "/users").json(user)).await
    }

    async fn patch_user(&self, id: i64, user: &EditUser) -> StoreResult<User> {
        let builder = self.request(Method::PATCH, &format!("/users/{}", id)).json(user);
        self.fetch(builder).await
    }

    async fn change_password(&self, id: i64, password: &str) -> StoreResult<User> {
        let builder = self
            .request(Method::POST, &format!("/users/{}/password", id))
            .json(&json!({ "password": password }));
        self.fetch(builder).await
    }

    async fn devices(&self) -> StoreResult<Vec<Device>> {
        self.fetch(self.request(Method::GET, "/devices")).await
    }
}

/// Factory producing request-scoped HTTP stores
#[derive(Clone)]
pub struct HttpStoreFactory {
    client: UpstreamClient,
}

impl HttpStoreFactory {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: UpstreamClient) -> Arc<dyn StoreFactory> {
        Arc::new(Self::new(client))
    }
}

impl StoreFactory for HttpStoreFactory {
    fn content(&self, token: Option<&str>) -> Arc<dyn ContentStore> {
        Arc::new(self.client.scoped(token.map(str::to_string)))
    }

    fn accounts(&self, token: Option<&str>) -> Arc<dyn AccountStore> {
        Arc::new(self.client.scoped(token.map(str::to_string)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            base_url: "https://api.example.test/".to_string(),
            access_token: "app-token".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(check_status(StatusCode::OK), Ok(()));
        assert_eq!(check_status(StatusCode::NO_CONTENT), Ok(()));
        assert_eq!(check_status(StatusCode::UNAUTHORIZED), Err(StoreError::Unauthorized));
        assert_eq!(check_status(StatusCode::NOT_FOUND), Err(StoreError::NotFound));
        assert_eq!(check_status(StatusCode::BAD_GATEWAY), Err(StoreError::Http(502)));
    }

    #[test]
    fn test_paths() {
        assert_eq!(collection_path(ContentType::VideoSeries), "/videoSeries");
        assert_eq!(item_path(ContentType::Timing, 4), "/timings/4");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let store = client().scoped(None);
        assert_eq!(
            store.url("/manufacturers/draft"),
            "https://api.example.test/api/v1/manufacturers/draft"
        );
    }

    #[test]
    fn test_request_headers_are_scoped() {
        let client = client();
        let alice = client
            .scoped(Some("alice".into()))
            .request(Method::GET, "/models")
            .build()
            .unwrap();
        let anonymous = client.scoped(None).request(Method::GET, "/models").build().unwrap();

        assert_eq!(alice.headers()["authorization"], "Bearer alice");
        assert_eq!(alice.headers()[ACCESS_TOKEN_HEADER], "app-token");
        assert!(anonymous.headers().get("authorization").is_none());
    }
}
