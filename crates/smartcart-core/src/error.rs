//! Error kinds surfaced by the discovery operations.

use std::fmt;

use thiserror::Error;

use crate::completion::CompletionError;
use crate::prompt::PromptError;

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Which record a [`DiscoveryError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    Customer,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Product => write!(f, "product"),
            EntityKind::Customer => write!(f, "customer"),
        }
    }
}

/// Failure of a search, recommendation or description request.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The requested customer or product does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: i64 },

    /// Another customer already registered this email address.
    #[error("email address already in use: {0}")]
    EmailInUse(String),

    /// The completion service failed on a path with no degraded result.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// A store collaborator failed.
    #[error("store error: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl DiscoveryError {
    pub fn product_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: EntityKind::Product,
            id,
        }
    }

    pub fn customer_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: EntityKind::Customer,
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<anyhow::Error> for DiscoveryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err)
    }
}
