//! Error taxonomy shared by all occurrence operations
//!
//! Each component has its own error enum; [`OccurrenceError`] wraps them so
//! callers can use `?` across components, and [`ErrorKind`] gives a
//! machine-checkable classification for translating errors into messages.

use thiserror::Error;

use crate::core::triage::ClassificationError;
use crate::core::workflow::TransitionError;
use crate::entities::capa::CapaError;
use crate::entities::classification::UnknownValue;
use crate::entities::occurrence::ValidationError;
use crate::entities::outcome::OutcomeError;
use crate::store::StoreError;

/// Error categories exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed enum value or missing required field
    InvalidValue,
    /// Operation attempted on a closed or ineligible occurrence
    InvalidState,
    IllegalTransition,
    IllegalCapaTransition,
    MissingJustification,
    EmptyOutcomeTypes,
    NotificationRequired,
    /// Optimistic concurrency failure from the store
    Conflict,
    /// Status change attempted on a terminal occurrence
    Closed,
    /// Storage failed for reasons unrelated to the record (I/O, encoding)
    Storage,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::InvalidValue => "invalid_value",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::IllegalTransition => "illegal_transition",
            ErrorKind::IllegalCapaTransition => "illegal_capa_transition",
            ErrorKind::MissingJustification => "missing_justification",
            ErrorKind::EmptyOutcomeTypes => "empty_outcome_types",
            ErrorKind::NotificationRequired => "notification_required",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Closed => "closed",
            ErrorKind::Storage => "storage",
        };
        write!(f, "{}", s)
    }
}

impl UnknownValue {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidValue
    }
}

impl ClassificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassificationError::InvalidState { .. } | ClassificationError::NotSentinel { .. } => {
                ErrorKind::InvalidState
            }
            ClassificationError::InvalidValue(_) => ErrorKind::InvalidValue,
        }
    }
}

impl TransitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransitionError::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            TransitionError::Closed { .. } => ErrorKind::Closed,
        }
    }
}

impl CapaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CapaError::IllegalTransition { .. } | CapaError::InconsistentRecord { .. } => {
                ErrorKind::IllegalCapaTransition
            }
            CapaError::EmptyField { .. } | CapaError::NotFound { .. } => ErrorKind::InvalidValue,
        }
    }
}

impl OutcomeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OutcomeError::EmptyOutcomeTypes => ErrorKind::EmptyOutcomeTypes,
            OutcomeError::MissingJustification => ErrorKind::MissingJustification,
            OutcomeError::NotificationRequired { .. } => ErrorKind::NotificationRequired,
            OutcomeError::InvalidNotificationDate { .. }
            | OutcomeError::PrimaryOutcomeNotInTypes { .. }
            | OutcomeError::DuplicateCapa { .. } => ErrorKind::InvalidValue,
            OutcomeError::Capa(e) => e.kind(),
            OutcomeError::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::SubtypeMismatch { .. } | ValidationError::MissingField { .. } => {
                ErrorKind::InvalidValue
            }
            ValidationError::Closed { .. } => ErrorKind::InvalidState,
            ValidationError::Outcome(e) => e.kind(),
        }
    }
}

/// Any error produced by the occurrence core or its store
#[derive(Debug, Error)]
pub enum OccurrenceError {
    #[error(transparent)]
    Value(#[from] UnknownValue),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Outcome(#[from] OutcomeError),

    #[error(transparent)]
    Capa(#[from] CapaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OccurrenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OccurrenceError::Value(e) => e.kind(),
            OccurrenceError::Classification(e) => e.kind(),
            OccurrenceError::Transition(e) => e.kind(),
            OccurrenceError::Outcome(e) => e.kind(),
            OccurrenceError::Capa(e) => e.kind(),
            OccurrenceError::Validation(e) => e.kind(),
            OccurrenceError::Store(e) => e.kind(),
        }
    }
}

pub type OccurrenceResult<T> = std::result::Result<T, OccurrenceError>;
