//! Staging workflow errors

use thiserror::Error;

use crate::models::ContentType;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ContentType, id: i64 },

    #[error("{0} entries cannot be published")]
    NotPublishable(ContentType),

    #[error(transparent)]
    Store(StoreError),
}

impl StagingError {
    /// Map a collaborator error raised while addressing one entity
    pub fn for_entity(kind: ContentType, id: i64, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => StagingError::NotFound { kind, id },
            other => StagingError::Store(other),
        }
    }
}

impl From<StoreError> for StagingError {
    fn from(err: StoreError) -> Self {
        StagingError::Store(err)
    }
}
