//! Dashboard summary
//!
//! Fans out one [`StagingAggregator::fetch_all`] per content type, runs them
//! concurrently and merges the results into a pending-work summary. Any
//! failing type fails the whole summary.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::debug;

use super::{StagedCollection, StagingAggregator, StagingError};
use crate::models::{ContentType, Item};

/// Pending work of one content type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardEntry {
    pub kind: ContentType,
    pub title: &'static str,
    pub has_draft: bool,
    pub draft_items: Vec<Item>,
}

/// Pending work across content types, in caller order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub entries: Vec<DashboardEntry>,
    pub has_drafts_overall: bool,
}

impl DashboardSummary {
    pub fn from_collections(collections: Vec<StagedCollection>) -> Self {
        let entries: Vec<DashboardEntry> = collections
            .into_iter()
            .map(|collection| DashboardEntry {
                kind: collection.kind,
                title: collection.kind.descriptor().title,
                has_draft: collection.has_pending(),
                draft_items: collection.draft,
            })
            .collect();
        let has_drafts_overall = entries.iter().any(|entry| entry.has_draft);
        Self {
            entries,
            has_drafts_overall,
        }
    }

    pub fn entry(&self, kind: ContentType) -> Option<&DashboardEntry> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }
}

pub struct DashboardSummaryBuilder {
    aggregator: StagingAggregator,
}

impl DashboardSummaryBuilder {
    pub fn new(aggregator: StagingAggregator) -> Self {
        Self { aggregator }
    }

    pub async fn summarize(&self, types: &[ContentType]) -> Result<DashboardSummary, StagingError> {
        debug!("Summarizing {} content types", types.len());
        let collections = try_join_all(types.iter().map(|kind| self.aggregator.fetch_all(*kind))).await?;
        Ok(DashboardSummary::from_collections(collections))
    }
}
