//! Core module - status workflow, triage, outcome handling and shared types

pub mod config;
pub mod error;
pub mod identity;
pub mod resolution;
pub mod status;
pub mod triage;
pub mod workflow;

pub use config::WorkflowConfig;
pub use error::{ErrorKind, OccurrenceError, OccurrenceResult};
pub use identity::{CapaId, IdParseError, Protocolo};
pub use resolution::{
    add_capa, advance_capa_in, attach_outcome, record_capa_evidence, record_capa_verification,
};
pub use status::OccurrenceStatus;
pub use triage::{
    acknowledge_sentinel, assign_triage, classify, classify_str, ClassificationError,
    TriageAssignment, TriageChange,
};
pub use workflow::{GuardFailure, TransitionError, WorkflowEngine};
