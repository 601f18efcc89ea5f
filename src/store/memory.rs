//! In-process content store
//!
//! Keeps published and draft collections per content type in memory. Used by
//! the test suite and by the `demo` feature. Per-type latency and failures can
//! be injected to exercise the dashboard fan-out.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, ContentStore, StoreError, StoreFactory, StoreResult};
use crate::models::{ContentType, Device, EditUser, Item, LoginResult, User, UserToken};

#[derive(Default)]
struct Collections {
    published: Vec<Item>,
    draft: Vec<Item>,
}

#[derive(Default)]
struct Accounts {
    users: Vec<User>,
    passwords: HashMap<i64, String>,
    tokens: HashMap<i64, Vec<UserToken>>,
    devices: Vec<Device>,
}

#[derive(Default)]
struct State {
    content: HashMap<ContentType, Collections>,
    accounts: Accounts,
    next_id: i64,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_mut(&mut self, kind: ContentType, id: i64) -> Option<&mut Item> {
        let collections = self.content.get_mut(&kind)?;
        collections
            .published
            .iter_mut()
            .chain(collections.draft.iter_mut())
            .find(|item| item.id == id)
    }
}

/// Content and account store held in process memory
#[derive(Default)]
pub struct MemoryContentStore {
    state: RwLock<State>,
    delays: HashMap<ContentType, Duration>,
    failures: HashMap<ContentType, StoreError>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay both listing calls of a content type
    pub fn with_delay(mut self, kind: ContentType, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    /// Fail every listing call of a content type
    pub fn with_failure(mut self, kind: ContentType, error: StoreError) -> Self {
        self.failures.insert(kind, error);
        self
    }

    pub async fn insert_published(&self, kind: ContentType, fields: Value) -> i64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state
            .content
            .entry(kind)
            .or_default()
            .published
            .push(Item::from_value(id, fields));
        id
    }

    pub async fn insert_draft(&self, kind: ContentType, fields: Value) -> i64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state
            .content
            .entry(kind)
            .or_default()
            .draft
            .push(Item::from_value(id, fields));
        id
    }

    /// Insert a draft under an explicit id, possibly shadowing a published one
    pub async fn insert_draft_with_id(&self, kind: ContentType, id: i64, fields: Value) {
        let mut state = self.state.write().await;
        state.next_id = state.next_id.max(id);
        state
            .content
            .entry(kind)
            .or_default()
            .draft
            .push(Item::from_value(id, fields));
    }

    pub async fn add_user(&self, name: &str, email: &str, password: &str, is_admin: bool) -> User {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            is_admin,
        };
        state.accounts.users.push(user.clone());
        state.accounts.passwords.insert(id, password.to_string());
        user
    }

    pub async fn add_device(&self, platform: &str, language_code: Option<&str>) -> Device {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let device = Device {
            id,
            platform: platform.to_string(),
            token: Some(Uuid::new_v4().simple().to_string()),
            language_code: language_code.map(str::to_string),
            created_at: Some(chrono::Utc::now()),
        };
        state.accounts.devices.push(device.clone());
        device
    }

    async fn listing(&self, kind: ContentType) -> StoreResult<()> {
        if let Some(delay) = self.delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }
        match self.failures.get(&kind) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Populate the store with a small sample catalogue
    pub async fn seed_demo(&self) {
        use ContentType::*;

        self.add_user("Admin", "admin@jp-fan-app.de", "jpfanapp", true).await;
        self.add_user("Editor", "editor@jp-fan-app.de", "jpfanapp", false).await;
        self.add_device("ios", Some("de")).await;
        self.add_device("android", Some("en")).await;

        let audi = self.insert_published(Manufacturer, json!({"name": "Audi"})).await;
        let bmw = self.insert_published(Manufacturer, json!({"name": "BMW"})).await;
        self.insert_draft(Manufacturer, json!({"name": "Porsche"})).await;

        let rs3 = self
            .insert_published(
                Model,
                json!({"name": "RS3", "manufacturerID": audi, "transmissionType": "automatic", "axleType": "all", "mainImageID": null}),
            )
            .await;
        let m2 = self
            .insert_draft(
                Model,
                json!({"name": "M2", "manufacturerID": bmw, "transmissionType": "manual", "axleType": "rear", "mainImageID": null}),
            )
            .await;

        self.insert_published(
            Image,
            json!({"carModelID": rs3, "copyrightInformation": "JP Performance", "description": "Front"}),
        )
        .await;
        let stock = self
            .insert_published(
                Stage,
                json!({"carModelID": rs3, "name": "Stock", "description": null, "isStock": true, "ps": 400, "nm": 480}),
            )
            .await;
        let stage1 = self
            .insert_draft(
                Stage,
                json!({"carModelID": rs3, "name": "Stage 1", "description": "Software", "isStock": false, "ps": 470, "nm": 600}),
            )
            .await;
        self.insert_draft(
            Stage,
            json!({"carModelID": m2, "name": "Stock", "description": null, "isStock": true, "ps": 370, "nm": 465}),
        )
        .await;
        self.insert_published(
            Timing,
            json!({"stageID": stock, "second1": 3.9, "second2": 8.6, "second3": null}),
        )
        .await;
        self.insert_draft(
            Timing,
            json!({"stageID": stage1, "second1": 3.5, "second2": 7.9, "second3": null}),
        )
        .await;

        let video = self
            .insert_published(
                Video,
                json!({"videoID": "dQw4w9WgXcQ", "title": "RS3 Stage 1 on the Autobahn", "description": null,
                       "thumbnailURL": null, "publishedAt": "2020-02-20T12:00:00Z"}),
            )
            .await;
        let series = self
            .insert_published(
                VideoSeries,
                json!({"title": "Autobahn Runs", "description": "Top speed runs", "isPublic": true}),
            )
            .await;
        self.insert_draft(
            VideoSeriesVideoLink,
            json!({"videoID": video, "referenceID": 1, "videoSerieID": series, "stageID": null}),
        )
        .await;
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn index_published(&self, kind: ContentType) -> StoreResult<Vec<Item>> {
        self.listing(kind).await?;
        let state = self.state.read().await;
        Ok(state
            .content
            .get(&kind)
            .map(|c| c.published.clone())
            .unwrap_or_default())
    }

    async fn index_draft(&self, kind: ContentType) -> StoreResult<Vec<Item>> {
        self.listing(kind).await?;
        let state = self.state.read().await;
        Ok(state
            .content
            .get(&kind)
            .map(|c| c.draft.clone())
            .unwrap_or_default())
    }

    async fn show(&self, kind: ContentType, id: i64) -> StoreResult<Item> {
        let mut state = self.state.write().await;
        state.find_mut(kind, id).map(|item| item.clone()).ok_or(StoreError::NotFound)
    }

    async fn create(&self, kind: ContentType, fields: Map<String, Value>) -> StoreResult<Item> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let item = Item::new(id, fields);
        state.content.entry(kind).or_default().draft.push(item.clone());
        Ok(item)
    }

    async fn patch(&self, kind: ContentType, id: i64, fields: Map<String, Value>) -> StoreResult<Item> {
        let mut state = self.state.write().await;
        let item = state.find_mut(kind, id).ok_or(StoreError::NotFound)?;
        item.apply_patch(fields);
        Ok(item.clone())
    }

    async fn delete(&self, kind: ContentType, id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let collections = state.content.get_mut(&kind).ok_or(StoreError::NotFound)?;
        let before = collections.published.len() + collections.draft.len();
        collections.published.retain(|item| item.id != id);
        collections.draft.retain(|item| item.id != id);
        if collections.published.len() + collections.draft.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn publish(&self, kind: ContentType, id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let collections = state.content.get_mut(&kind).ok_or(StoreError::NotFound)?;
        if let Some(pos) = collections.draft.iter().position(|item| item.id == id) {
            let item = collections.draft.remove(pos);
            collections.published.push(item);
            return Ok(());
        }
        if collections.published.iter().any(|item| item.id == id) {
            return Ok(());
        }
        Err(StoreError::NotFound)
    }
}

#[async_trait]
impl AccountStore for MemoryContentStore {
    async fn login(&self, email: &str, password: &str) -> StoreResult<LoginResult> {
        let mut state = self.state.write().await;
        let user = state
            .accounts
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or(StoreError::Unauthorized)?;
        if state.accounts.passwords.get(&user.id).map(String::as_str) != Some(password) {
            return Err(StoreError::Unauthorized);
        }
        let token_id = state.allocate_id();
        let token = UserToken {
            id: token_id,
            token: Uuid::new_v4().to_string(),
            created_at: Some(chrono::Utc::now()),
        };
        state.accounts.tokens.entry(user.id).or_default().push(token.clone());
        Ok(LoginResult {
            token: token.token,
            username: user.name,
            is_admin: user.is_admin,
        })
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.accounts.users.clone())
    }

    async fn user(&self, id: i64) -> StoreResult<User> {
        let state = self.state.read().await;
        state
            .accounts
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn user_tokens(&self, id: i64) -> StoreResult<Vec<UserToken>> {
        let state = self.state.read().await;
        if !state.accounts.users.iter().any(|u| u.id == id) {
            return Err(StoreError::NotFound);
        }
        Ok(state.accounts.tokens.get(&id).cloned().unwrap_or_default())
    }

    async fn create_user(&self, user: &EditUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state.accounts.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::Http(409));
        }
        let id = state.allocate_id();
        let created = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        };
        state.accounts.users.push(created.clone());
        state
            .accounts
            .passwords
            .insert(id, user.password.clone().unwrap_or_default());
        Ok(created)
    }

    async fn patch_user(&self, id: i64, user: &EditUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let existing = state
            .accounts
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        existing.name = user.name.clone();
        existing.email = user.email.clone();
        existing.is_admin = user.is_admin;
        Ok(existing.clone())
    }

    async fn change_password(&self, id: i64, password: &str) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let user = state
            .accounts
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        state.accounts.passwords.insert(id, password.to_string());
        Ok(user)
    }

    async fn devices(&self) -> StoreResult<Vec<Device>> {
        Ok(self.state.read().await.accounts.devices.clone())
    }
}

/// Factory sharing one in-memory store between all requests
#[derive(Clone)]
pub struct MemoryStoreFactory {
    store: Arc<MemoryContentStore>,
}

impl MemoryStoreFactory {
    pub fn new(store: Arc<MemoryContentStore>) -> Self {
        Self { store }
    }

    pub fn boxed(store: Arc<MemoryContentStore>) -> Arc<dyn StoreFactory> {
        Arc::new(Self::new(store))
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn content(&self, _token: Option<&str>) -> Arc<dyn ContentStore> {
        self.store.clone()
    }

    fn accounts(&self, _token: Option<&str>) -> Arc<dyn AccountStore> {
        self.store.clone()
    }
}
