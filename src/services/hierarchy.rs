//! Hierarchy resolution
//!
//! Nested entities point at their owner through a parent reference field
//! (timing -> stage -> model, image -> model, video link -> series or stage).
//! [`HierarchyResolver`] walks these references up to the top-level owner to
//! find where an admin should be sent after touching a nested entity.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::StagingError;
use crate::models::{ContentType, Item};
use crate::store::{ContentStore, ContentStoreExt};

/// Upper bound on chain length, guards against reference cycles
const MAX_DEPTH: usize = 8;

/// One resolved entity on a hierarchy path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathNode {
    pub kind: ContentType,
    pub id: i64,
    pub label: String,
}

impl PathNode {
    fn of(kind: ContentType, item: &Item) -> Self {
        Self {
            kind,
            id: item.id,
            label: item.label(),
        }
    }
}

/// Ancestor chain of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyPath {
    pub leaf: PathNode,
    /// Resolved ancestors, top-most first, without the leaf
    pub ancestors: Vec<PathNode>,
    /// A parent reference was missing or dangling
    pub broken: bool,
}

impl HierarchyPath {
    /// `(type, id)` pairs of the ancestors, top-most first
    pub fn ancestor_ids(&self) -> Vec<(ContentType, i64)> {
        self.ancestors.iter().map(|node| (node.kind, node.id)).collect()
    }

    /// The top-most resolved entity, the leaf itself for top-level types
    pub fn root(&self) -> &PathNode {
        self.ancestors.first().unwrap_or(&self.leaf)
    }

    /// Nearest resolved ancestor of the given type
    pub fn ancestor(&self, kind: ContentType) -> Option<i64> {
        self.ancestors.iter().rev().find(|node| node.kind == kind).map(|node| node.id)
    }

    /// Where to send the admin after publishing or editing the leaf
    pub fn redirect_target(&self) -> RedirectTarget {
        if self.broken {
            return RedirectTarget::Root;
        }
        let root = self.root();
        if root.kind.descriptor().has_detail_page {
            RedirectTarget::Detail {
                kind: root.kind,
                id: root.id,
            }
        } else {
            RedirectTarget::List(root.kind)
        }
    }
}

/// Navigation target after a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Detail { kind: ContentType, id: i64 },
    List(ContentType),
    Root,
}

impl RedirectTarget {
    pub fn to_path(self) -> String {
        match self {
            RedirectTarget::Detail { kind, id } => format!("/{}/{}", kind.collection(), id),
            RedirectTarget::List(kind) => format!("/{}", kind.collection()),
            RedirectTarget::Root => "/".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct HierarchyResolver {
    store: Arc<dyn ContentStore>,
}

impl HierarchyResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Fetch the entity and resolve its ancestors
    pub async fn resolve(&self, kind: ContentType, id: i64) -> Result<HierarchyPath, StagingError> {
        let item = self
            .store
            .show(kind, id)
            .await
            .map_err(|e| StagingError::for_entity(kind, id, e))?;
        self.resolve_item(kind, &item).await
    }

    /// Resolve the ancestors of an already fetched entity
    pub async fn resolve_item(&self, kind: ContentType, item: &Item) -> Result<HierarchyPath, StagingError> {
        let mut ancestors = Vec::new();
        let mut broken = false;
        let mut current_kind = kind;
        let mut current = item.clone();

        while current_kind.descriptor().is_nested() {
            if ancestors.len() >= MAX_DEPTH {
                broken = true;
                break;
            }
            let Some((parent_kind, parent_id)) = current.parent_ref(current_kind) else {
                warn!("{} {} has no parent reference", current_kind, current.id);
                broken = true;
                break;
            };
            match self.store.find(parent_kind, parent_id).await? {
                Some(parent) => {
                    ancestors.push(PathNode::of(parent_kind, &parent));
                    current_kind = parent_kind;
                    current = parent;
                }
                None => {
                    warn!(
                        "{} {} refers to missing {} {}",
                        current_kind, current.id, parent_kind, parent_id
                    );
                    broken = true;
                    break;
                }
            }
        }

        ancestors.reverse();
        Ok(HierarchyPath {
            leaf: PathNode::of(kind, item),
            ancestors,
            broken,
        })
    }

    /// Redirect target for an entity, [`RedirectTarget::Root`] if it is gone
    pub async fn redirect_for(&self, kind: ContentType, id: i64) -> Result<RedirectTarget, StagingError> {
        match self.resolve(kind, id).await {
            Ok(path) => Ok(path.redirect_target()),
            Err(StagingError::NotFound { .. }) => {
                warn!("{} {} vanished while resolving redirect", kind, id);
                Ok(RedirectTarget::Root)
            }
            Err(e) => Err(e),
        }
    }
}
