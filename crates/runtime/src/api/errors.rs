//! Unified error types surfaced by the engine API.
//!
//! Wraps failures from collaborators, the ledger repository, and invocation
//! validation so callers can bubble them up with consistent context.
use thiserror::Error;

use stealth_core::{ActionKind, EntityId, ErrorSeverity, StealthError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type returned by collaborator implementations.
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Failures reported by external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("perception store failed for {entity}: {message}")]
    Store { entity: EntityId, message: String },

    #[error("derived effect on {subject} failed: {message}")]
    Effect { subject: EntityId, message: String },

    #[error("scene query failed: {0}")]
    Scene(String),

    #[error("visual refresh failed: {0}")]
    Visuals(String),
}

impl StealthError for CollaboratorError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CollaboratorError::Visuals(_) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CollaboratorError::Store { .. } => "COLLABORATOR_STORE",
            CollaboratorError::Effect { .. } => "COLLABORATOR_EFFECT",
            CollaboratorError::Scene(_) => "COLLABORATOR_SCENE",
            CollaboratorError::Visuals(_) => "COLLABORATOR_VISUALS",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("acting entity {0} not found on the scene")]
    ActingEntityNotFound(EntityId),

    #[error("{action} requires a point target")]
    AnchorRequired { action: ActionKind },

    #[error("anchor entity {0} not found on the scene")]
    AnchorNotFound(EntityId),

    /// An external write failed part way through. Changes counted in
    /// `committed` stay applied and are recorded in the ledger.
    #[error("external apply failed after {committed} committed change(s)")]
    ExternalApply {
        committed: usize,
        #[source]
        source: CollaboratorError,
    },

    #[error("engine requires {0} to be configured before building")]
    MissingCapability(&'static str),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl StealthError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::ActingEntityNotFound(_)
            | EngineError::AnchorRequired { .. }
            | EngineError::AnchorNotFound(_) => ErrorSeverity::Validation,
            EngineError::MissingCapability(_) => ErrorSeverity::Internal,
            EngineError::ExternalApply { source, .. } => source.severity(),
            EngineError::Repository(err) => err.severity(),
            EngineError::Collaborator(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            EngineError::ActingEntityNotFound(_) => "ENGINE_ACTING_ENTITY_NOT_FOUND",
            EngineError::AnchorRequired { .. } => "ENGINE_ANCHOR_REQUIRED",
            EngineError::AnchorNotFound(_) => "ENGINE_ANCHOR_NOT_FOUND",
            EngineError::ExternalApply { .. } => "ENGINE_EXTERNAL_APPLY",
            EngineError::MissingCapability(_) => "ENGINE_MISSING_CAPABILITY",
            EngineError::Repository(err) => err.error_code(),
            EngineError::Collaborator(err) => err.error_code(),
        }
    }
}

impl EngineError {
    /// Number of changes that stayed applied when the call failed.
    pub fn committed(&self) -> usize {
        match self {
            EngineError::ExternalApply { committed, .. } => *committed,
            _ => 0,
        }
    }
}
