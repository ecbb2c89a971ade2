//! Common error types for the recommender

use crate::models::UserId;
use thiserror::Error;

/// Common result type for recommender operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the clustering core and its storage collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration, e.g. canopy thresholds out of order
    #[error("Configuration error: {0}")]
    Config(String),

    /// A profile cannot be fed to the distance measure
    #[error("Malformed profile for user {user_id}: {reason}")]
    MalformedProfile { user_id: UserId, reason: String },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Collaborator I/O failure, annotated with the work in progress
    #[error("Storage failure while {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored profile JSON could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap `source` as a storage failure that happened while doing `context`
    pub fn storage(context: impl Into<String>, source: Error) -> Self {
        Error::Storage {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for collaborator I/O failures, which are always fatal to a run
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Error::Storage { .. } | Error::Database(_) | Error::Io(_) | Error::Serialization(_)
        )
    }
}

/// Attach the in-progress context to a collaborator result
pub trait StorageContext<T> {
    fn storage_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> StorageContext<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn storage_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::storage(context(), e.into()))
    }
}
