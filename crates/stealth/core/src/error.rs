//! Common error infrastructure for stealth-core.
//!
//! This module provides the severity classification shared by every error type
//! in the workspace, plus the errors raised while analysing a single subject.
//!
//! # Design Principles
//!
//! - **Pure resolution never fails**: malformed roll data degrades to a
//!   `failure` outcome instead of surfacing an error
//! - **Per-subject isolation**: an [`AnalysisError`] excludes one subject from
//!   the change set without aborting the batch
//! - **Severity Classification**: errors are categorized for recovery strategies

use crate::state::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry, or the engine skips and continues
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected inconsistency worth investigating
/// - **Fatal**: a required collaborator is unusable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Skip-and-continue or retry.
    ///
    /// Examples: one subject's analysis failed, a ledger entry references a
    /// removed entity.
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: acting entity missing from the scene, Point Out without a target.
    Validation,

    /// Unexpected state inconsistency.
    Internal,

    /// A collaborator the engine cannot work without has failed.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all stealth errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait StealthError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while analysing one observer/subject pair.
///
/// The engine logs these and drops the subject from the change set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisError {
    /// Roll data was missing or malformed.
    ///
    /// Only reported for diagnostics; resolution itself degrades to `failure`.
    #[error("roll data is missing or malformed")]
    InvalidRoll,

    /// The subject is no longer resolvable on the scene.
    #[error("subject {0} not found on the scene")]
    SubjectNotFound(EntityId),

    /// The entity that should supply the difficulty has no usable stat block.
    #[error("entity {0} has no stat block for the difficulty lookup")]
    MissingStatBlock(EntityId),

    /// The observer's map could not be read from the store.
    #[error("perception map of {0} is unavailable")]
    StateUnavailable(EntityId),

    /// The stored state belongs to a different channel than the action writes.
    #[error("state for {0} is stored on the wrong channel")]
    ChannelMismatch(EntityId),
}

impl StealthError for AnalysisError {
    fn severity(&self) -> ErrorSeverity {
        use AnalysisError::*;
        match self {
            InvalidRoll | SubjectNotFound(_) | MissingStatBlock(_) | StateUnavailable(_) => {
                ErrorSeverity::Recoverable
            }
            ChannelMismatch(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use AnalysisError::*;
        match self {
            InvalidRoll => "ANALYSIS_INVALID_ROLL",
            SubjectNotFound(_) => "ANALYSIS_SUBJECT_NOT_FOUND",
            MissingStatBlock(_) => "ANALYSIS_MISSING_STAT_BLOCK",
            StateUnavailable(_) => "ANALYSIS_STATE_UNAVAILABLE",
            ChannelMismatch(_) => "ANALYSIS_CHANNEL_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_are_skippable() {
        let err = AnalysisError::SubjectNotFound(EntityId::new("goblin"));
        assert!(err.severity().is_recoverable());
        assert_eq!(err.error_code(), "ANALYSIS_SUBJECT_NOT_FOUND");
    }

    #[test]
    fn channel_mismatch_is_internal() {
        let err = AnalysisError::ChannelMismatch(EntityId::new("wall-1"));
        assert!(err.severity().is_internal());
    }
}
