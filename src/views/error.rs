//! View engine error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    /// Template could not be loaded or rendered
    #[error("Template error: {0}")]
    Template(String),

    /// Override directory could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
