//! Staging aggregator
//!
//! Partitions one content type into its published and draft subsets by
//! querying both listing endpoints of the content service concurrently.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use super::StagingError;
use crate::models::{ContentType, Item};
use crate::store::ContentStore;

/// Published and draft items of one content type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedCollection {
    pub kind: ContentType,
    pub published: Vec<Item>,
    pub draft: Vec<Item>,
}

impl StagedCollection {
    /// Build a collection; an id listed in both subsets is kept as published
    pub fn new(kind: ContentType, published: Vec<Item>, mut draft: Vec<Item>) -> Self {
        let published_ids: HashSet<i64> = published.iter().map(|item| item.id).collect();
        let before = draft.len();
        draft.retain(|item| !published_ids.contains(&item.id));
        if draft.len() != before {
            warn!(
                "{} {} listed as both published and draft, keeping published",
                before - draft.len(),
                kind.collection()
            );
        }
        Self { kind, published, draft }
    }

    pub fn empty(kind: ContentType) -> Self {
        Self {
            kind,
            published: Vec::new(),
            draft: Vec::new(),
        }
    }

    /// Published items followed by draft items, each in source order
    pub fn all(&self) -> impl Iterator<Item = &Item> {
        self.published.iter().chain(self.draft.iter())
    }

    pub fn len(&self) -> usize {
        self.published.len() + self.draft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_pending(&self) -> bool {
        !self.draft.is_empty()
    }

    pub fn is_draft(&self, id: i64) -> bool {
        self.draft.iter().any(|item| item.id == id)
    }

    pub fn find(&self, id: i64) -> Option<&Item> {
        self.all().find(|item| item.id == id)
    }

    /// Items owned by the given parent, keeping the published/draft split
    pub fn children_of(&self, parent: ContentType, parent_id: i64) -> StagedCollection {
        self.filter(|item| item.belongs_to(self.kind, parent, parent_id))
    }

    /// Items matching the predicate, keeping the published/draft split
    pub fn filter(&self, predicate: impl Fn(&Item) -> bool) -> StagedCollection {
        let keep = |items: &[Item]| -> Vec<Item> { items.iter().filter(|item| predicate(item)).cloned().collect() };
        StagedCollection {
            kind: self.kind,
            published: keep(&self.published),
            draft: keep(&self.draft),
        }
    }
}

/// Fetches staged collections from the content service
#[derive(Clone)]
pub struct StagingAggregator {
    store: Arc<dyn ContentStore>,
}

impl StagingAggregator {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Fetch both subsets of a content type; fails if either call fails
    pub async fn fetch_all(&self, kind: ContentType) -> Result<StagedCollection, StagingError> {
        let descriptor = kind.descriptor();
        if !descriptor.indexable {
            return Ok(StagedCollection::empty(kind));
        }

        let published = self.store.index_published(kind);
        let draft = async {
            if descriptor.draftable {
                self.store.index_draft(kind).await
            } else {
                Ok(Vec::new())
            }
        };
        let (published, draft) = tokio::try_join!(published, draft)?;
        Ok(StagedCollection::new(kind, published, draft))
    }
}
