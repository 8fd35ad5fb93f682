//! Lineage error types

use thiserror::Error;

use crate::layer::Plane;
use crate::name::EntityId;

/// Errors raised by the lineage, routing and registry components
///
/// Every variant signals a caller bug or corrupted bookkeeping. Mutating a
/// deleted entity is not an error; see [`crate::Mutation::SkippedDeleted`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("Entity already registered: {0}")]
    DuplicateEntity(EntityId),

    #[error("Entity {0} has no prior version")]
    NoPriorVersion(EntityId),

    #[error("Malformed name '{name}': {reason}")]
    MalformedName { name: String, reason: String },

    #[error("Entity {id} is already on the {existing} plane (requested {requested})")]
    AlreadyAssigned {
        id: EntityId,
        existing: Plane,
        requested: Plane,
    },

    #[error("Operation needs at least one operand")]
    EmptyOperandList,
}

impl LineageError {
    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for lineage operations
pub type LineageResult<T> = Result<T, LineageError>;
