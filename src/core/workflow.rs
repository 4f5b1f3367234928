//! Workflow engine for occurrence status transitions
//!
//! Validates transitions against the status table and its guards, and applies
//! accepted ones by appending an audit entry. Transitions are pure: the input
//! occurrence is never modified.

use chrono::Utc;
use thiserror::Error;

use crate::core::config::WorkflowConfig;
use crate::core::status::OccurrenceStatus;
use crate::entities::classification::OutcomeType;
use crate::entities::occurrence::{AuditEntry, Occurrence};

/// Why a guard rejected a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardFailure {
    /// The edge is not part of the transition table
    NotInTable,
    TriageMissing,
    OutcomeMissing,
    /// Moving to `acao_em_andamento` needs at least one CAPA
    NoCapa,
    /// Some CAPAs are not completed yet
    OpenCapas { count: usize },
    SentinelWithoutCapa,
    SentinelNotAcknowledged,
    CapaRequiredByOutcome { tipo: OutcomeType },
    /// `improcedente` needs an outcome of exactly `{improcedente}`
    NotUnfounded,
}

impl std::fmt::Display for GuardFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardFailure::NotInTable => write!(f, "transition not permitted"),
            GuardFailure::TriageMissing => write!(f, "triage has not been assigned"),
            GuardFailure::OutcomeMissing => write!(f, "no outcome attached"),
            GuardFailure::NoCapa => write!(f, "outcome has no CAPA"),
            GuardFailure::OpenCapas { count } => {
                write!(f, "{} CAPA(s) not yet completed", count)
            }
            GuardFailure::SentinelWithoutCapa => {
                write!(f, "sentinel event requires at least one CAPA")
            }
            GuardFailure::SentinelNotAcknowledged => {
                write!(f, "sentinel event has not been acknowledged")
            }
            GuardFailure::CapaRequiredByOutcome { tipo } => {
                write!(f, "outcome type {} requires at least one CAPA", tipo)
            }
            GuardFailure::NotUnfounded => {
                write!(f, "outcome types must be exactly [improcedente]")
            }
        }
    }
}

/// Errors that can occur during status transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Illegal status transition: {from} → {to} ({reason})")]
    IllegalTransition {
        from: OccurrenceStatus,
        to: OccurrenceStatus,
        reason: GuardFailure,
    },

    #[error("Occurrence is closed ({status}); no further status changes are allowed")]
    Closed { status: OccurrenceStatus },
}

/// Workflow engine for managing status transitions
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    config: WorkflowConfig,
}

impl WorkflowEngine {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Check if an edge is in the transition table (guards not evaluated)
    pub fn is_valid_transition(&self, from: OccurrenceStatus, to: OccurrenceStatus) -> bool {
        use OccurrenceStatus::*;
        matches!(
            (from, to),
            // Normal forward transitions
            (Registrada, EmTriagem)
                | (EmTriagem, EmAnalise)
                | (EmAnalise, AcaoEmAndamento)
                | (AcaoEmAndamento, Concluida)
                // Skip-forward
                | (Registrada, EmAnalise)
                | (EmAnalise, Concluida)
                // Re-open for further review
                | (AcaoEmAndamento, EmAnalise)
                // Unfounded
                | (EmAnalise, Improcedente)
                | (AcaoEmAndamento, Improcedente)
        )
    }

    /// Get table edges leaving the given status
    pub fn allowed_transitions(&self, current: OccurrenceStatus) -> Vec<OccurrenceStatus> {
        use OccurrenceStatus::*;
        match current {
            Registrada => vec![EmTriagem, EmAnalise],
            EmTriagem => vec![EmAnalise],
            EmAnalise => vec![AcaoEmAndamento, Concluida, Improcedente],
            AcaoEmAndamento => vec![Concluida, EmAnalise, Improcedente],
            Concluida | Improcedente => vec![],
        }
    }

    /// Transitions whose guards pass right now
    pub fn available_transitions(&self, occurrence: &Occurrence) -> Vec<OccurrenceStatus> {
        self.allowed_transitions(occurrence.status)
            .into_iter()
            .filter(|to| self.check_guard(occurrence, *to).is_ok())
            .collect()
    }

    fn check_guard(&self, occurrence: &Occurrence, to: OccurrenceStatus) -> Result<(), GuardFailure> {
        use OccurrenceStatus::*;

        match (occurrence.status, to) {
            (Registrada, EmTriagem) | (Registrada, EmAnalise) | (EmTriagem, EmAnalise) => {
                if occurrence.triage.is_none() {
                    return Err(GuardFailure::TriageMissing);
                }
            }
            (EmAnalise, AcaoEmAndamento) => {
                let outcome = occurrence.outcome.as_ref().ok_or(GuardFailure::OutcomeMissing)?;
                if outcome.capas().is_empty() {
                    return Err(GuardFailure::NoCapa);
                }
            }
            (EmAnalise, Concluida) | (AcaoEmAndamento, Concluida) => {
                self.check_closure(occurrence)?;
            }
            (EmAnalise, Improcedente) | (AcaoEmAndamento, Improcedente) => {
                let outcome = occurrence.outcome.as_ref().ok_or(GuardFailure::OutcomeMissing)?;
                if !outcome.content.is_unfounded_only() {
                    return Err(GuardFailure::NotUnfounded);
                }
            }
            (AcaoEmAndamento, EmAnalise) => {}
            _ => return Err(GuardFailure::NotInTable),
        }
        Ok(())
    }

    fn check_closure(&self, occurrence: &Occurrence) -> Result<(), GuardFailure> {
        let outcome = occurrence.outcome.as_ref().ok_or(GuardFailure::OutcomeMissing)?;

        let open = outcome.open_capas();
        if open > 0 {
            return Err(GuardFailure::OpenCapas { count: open });
        }

        let has_capa = !outcome.capas().is_empty();
        if occurrence.is_sentinel() {
            if self.config.sentinel_requires_capa && !has_capa {
                return Err(GuardFailure::SentinelWithoutCapa);
            }
            if self.config.require_sentinel_acknowledgement
                && occurrence.sentinela_reconhecida.is_none()
            {
                return Err(GuardFailure::SentinelNotAcknowledged);
            }
        }
        if !has_capa {
            if let Some(tipo) = outcome
                .tipos()
                .iter()
                .copied()
                .find(|t| self.config.requires_capa(*t))
            {
                return Err(GuardFailure::CapaRequiredByOutcome { tipo });
            }
        }
        Ok(())
    }

    /// Check if the occurrence may move to `to` right now
    pub fn can_transition(
        &self,
        occurrence: &Occurrence,
        to: OccurrenceStatus,
    ) -> Result<(), TransitionError> {
        if occurrence.is_closed() {
            return Err(TransitionError::Closed {
                status: occurrence.status,
            });
        }
        self.check_guard(occurrence, to)
            .map_err(|reason| TransitionError::IllegalTransition {
                from: occurrence.status,
                to,
                reason,
            })
    }

    /// Apply a transition, returning the updated occurrence
    pub fn transition(
        &self,
        occurrence: &Occurrence,
        to: OccurrenceStatus,
        actor: &str,
    ) -> Result<Occurrence, TransitionError> {
        if let Err(e) = self.can_transition(occurrence, to) {
            tracing::debug!(protocolo = %occurrence.display_id(), error = %e, "Transition rejected");
            return Err(e);
        }

        let now = Utc::now();
        let mut next = occurrence.clone();
        next.auditoria.push(AuditEntry {
            from_status: occurrence.status,
            to_status: to,
            actor: actor.to_string(),
            at: now,
        });
        next.status = to;
        next.updated_at = now;
        if to.is_terminal() {
            next.finalizada_em = Some(now);
        }

        tracing::info!(
            protocolo = %occurrence.display_id(),
            from = %occurrence.status,
            to = %to,
            actor,
            "Status changed"
        );
        Ok(next)
    }
}
