//! Entity type definitions

pub mod capa;
pub mod classification;
pub mod occurrence;
pub mod outcome;

pub use capa::{advance_capa, Capa, CapaError, CapaStatus};
pub use classification::{
    OccurrenceSubtype, OccurrenceType, OutcomeType, TriageClassification, UnknownValue,
};
pub use occurrence::{
    AuditEntry, Occurrence, PatientData, PessoaComunicada, RegistradorData,
    SentinelAcknowledgement, ValidationError,
};
pub use outcome::{ExternalNotification, OccurrenceOutcome, OutcomeDraft, OutcomeError};
