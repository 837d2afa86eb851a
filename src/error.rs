use thiserror::Error;

use crate::types::{DestinationId, PointId, PointType};

/// Coarse classification of [`TripError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An id is absent from the store or the catalog.
    NotFound,
    /// Form input broke a local constraint.
    Validation,
    /// A lifecycle call targeted a node that is not part of the tree.
    State,
    /// Settings, reference data or logging could not be set up.
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    #[error("point `{0}` not found")]
    PointNotFound(PointId),
    #[error("destination `{0}` not found")]
    DestinationNotFound(DestinationId),
    #[error("no offers registered for point type `{0}`")]
    OffersNotFound(PointType),
    #[error("point `{0}` already exists")]
    DuplicatePoint(PointId),
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("target node is not part of the visual tree")]
    DetachedNode,
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TripError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TripError::PointNotFound(_)
            | TripError::DestinationNotFound(_)
            | TripError::OffersNotFound(_) => ErrorKind::NotFound,
            TripError::DuplicatePoint(_) | TripError::Validation { .. } => ErrorKind::Validation,
            TripError::DetachedNode => ErrorKind::State,
            TripError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<serde_json::Error> for TripError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TripError>;
