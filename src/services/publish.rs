//! Publish coordinator
//!
//! Drives the one-way draft -> published transition of a single entity and
//! decides where the admin lands afterwards: the entity's own page for
//! top-level types, the owning top-level entity's page for nested ones.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::{HierarchyPath, HierarchyResolver, RedirectTarget, StagingError};
use crate::models::{ContentType, Item};
use crate::store::ContentStore;

/// Everything the publish confirmation page shows
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationContext {
    pub kind: ContentType,
    pub singular: &'static str,
    pub item: Item,
    pub label: String,
    pub path: HierarchyPath,
    /// Where "cancel" leads
    pub cancel_to: String,
}

pub struct PublishCoordinator {
    store: Arc<dyn ContentStore>,
    resolver: HierarchyResolver,
}

impl PublishCoordinator {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            resolver: HierarchyResolver::new(store.clone()),
            store,
        }
    }

    fn ensure_publishable(kind: ContentType) -> Result<(), StagingError> {
        if kind.descriptor().publishable {
            Ok(())
        } else {
            Err(StagingError::NotPublishable(kind))
        }
    }

    /// Load the entity and its owning chain for review
    pub async fn confirm_publish(&self, kind: ContentType, id: i64) -> Result<ConfirmationContext, StagingError> {
        Self::ensure_publishable(kind)?;
        let item = self
            .store
            .show(kind, id)
            .await
            .map_err(|e| StagingError::for_entity(kind, id, e))?;
        let path = self.resolver.resolve_item(kind, &item).await?;
        Ok(ConfirmationContext {
            kind,
            singular: kind.descriptor().singular,
            label: item.label(),
            cancel_to: path.redirect_target().to_path(),
            item,
            path,
        })
    }

    /// Publish the entity and return where to go next
    ///
    /// Entities that are already published are forwarded to the content
    /// service unchanged.
    pub async fn execute_publish(&self, kind: ContentType, id: i64) -> Result<RedirectTarget, StagingError> {
        Self::ensure_publishable(kind)?;
        self.store
            .publish(kind, id)
            .await
            .map_err(|e| StagingError::for_entity(kind, id, e))?;
        info!("Published {} {}", kind, id);
        self.resolver.redirect_for(kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StagingAggregator;
    use crate::store::MemoryContentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_round_trip() {
        let store = Arc::new(MemoryContentStore::new());
        let id = store.insert_draft(ContentType::Manufacturer, json!({"name": "Porsche"})).await;
        let aggregator = StagingAggregator::new(store.clone());

        let before = aggregator.fetch_all(ContentType::Manufacturer).await.unwrap();
        assert!(before.is_draft(id));
        assert!(before.published.is_empty());

        let target = PublishCoordinator::new(store.clone())
            .execute_publish(ContentType::Manufacturer, id)
            .await
            .unwrap();
        assert_eq!(
            target,
            RedirectTarget::Detail {
                kind: ContentType::Manufacturer,
                id
            }
        );

        let after = aggregator.fetch_all(ContentType::Manufacturer).await.unwrap();
        assert!(!after.is_draft(id));
        assert_eq!(after.published[0].id, id);
    }

    #[tokio::test]
    async fn test_nested_publish_redirects_to_owner() {
        let store = Arc::new(MemoryContentStore::new());
        let model = store.insert_published(ContentType::Model, json!({"name": "RS3"})).await;
        let stage = store.insert_published(ContentType::Stage, json!({"carModelID": model})).await;
        let timing = store.insert_draft(ContentType::Timing, json!({"stageID": stage})).await;

        let target = PublishCoordinator::new(store)
            .execute_publish(ContentType::Timing, timing)
            .await
            .unwrap();
        assert_eq!(target.to_path(), format!("/models/{}", model));
    }

    #[tokio::test]
    async fn test_publish_with_broken_chain_goes_to_root() {
        let store = Arc::new(MemoryContentStore::new());
        let image = store
            .insert_draft(ContentType::Image, json!({"carModelID": 404, "copyrightInformation": "x"}))
            .await;

        let target = PublishCoordinator::new(store)
            .execute_publish(ContentType::Image, image)
            .await
            .unwrap();
        assert_eq!(target, RedirectTarget::Root);
    }

    #[tokio::test]
    async fn test_publish_twice_is_forwarded() {
        let store = Arc::new(MemoryContentStore::new());
        let id = store.insert_published(ContentType::VideoSeries, json!({"title": "T"})).await;

        let coordinator = PublishCoordinator::new(store);
        assert!(coordinator.execute_publish(ContentType::VideoSeries, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_videos_cannot_be_published() {
        let store = Arc::new(MemoryContentStore::new());
        let id = store.insert_published(ContentType::Video, json!({"title": "v"})).await;

        let coordinator = PublishCoordinator::new(store);
        let err = coordinator.execute_publish(ContentType::Video, id).await.unwrap_err();
        assert!(matches!(err, StagingError::NotPublishable(ContentType::Video)));
    }

    #[tokio::test]
    async fn test_confirm_publish() {
        let store = Arc::new(MemoryContentStore::new());
        let series = store.insert_published(ContentType::VideoSeries, json!({"title": "Runs"})).await;
        let link = store
            .insert_draft(ContentType::VideoSeriesVideoLink, json!({"videoID": 3, "videoSerieID": series}))
            .await;

        let coordinator = PublishCoordinator::new(store);
        let context = coordinator
            .confirm_publish(ContentType::VideoSeriesVideoLink, link)
            .await
            .unwrap();
        assert_eq!(context.path.ancestor_ids(), vec![(ContentType::VideoSeries, series)]);
        assert_eq!(context.cancel_to, format!("/videoSeries/{}", series));

        let err = coordinator.confirm_publish(ContentType::Manufacturer, 77).await.unwrap_err();
        assert!(matches!(err, StagingError::NotFound { id: 77, .. }));
    }
}
