//! Services layer - the staging workflow
//!
//! Every service here is stateless and built per request around a
//! request-scoped [`ContentStore`](crate::store::ContentStore):
//! - [`StagingAggregator`] partitions one content type into published and draft items
//! - [`DashboardSummaryBuilder`] fans the aggregator out over several types
//! - [`HierarchyResolver`] walks parent references of nested entities
//! - [`PublishCoordinator`] performs the draft -> published transition
//!
//! [`SessionStore`] holds signed-in sessions.

pub mod aggregator;
pub mod dashboard;
mod error;
pub mod hierarchy;
pub mod publish;
pub mod session;

pub use aggregator::{StagedCollection, StagingAggregator};
pub use dashboard::{DashboardEntry, DashboardSummary, DashboardSummaryBuilder};
pub use error::StagingError;
pub use hierarchy::{HierarchyPath, HierarchyResolver, PathNode, RedirectTarget};
pub use publish::{ConfirmationContext, PublishCoordinator};
pub use session::{SessionData, SessionStore};
