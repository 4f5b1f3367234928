//! Triage classifier
//!
//! Assigns or revises the severity classification of an occurrence and tags
//! each change as initial, escalation, de-escalation or unchanged, using the
//! fixed severity order of [`TriageClassification`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::core::status::OccurrenceStatus;
use crate::entities::classification::{TriageClassification, UnknownValue};
use crate::entities::occurrence::{Occurrence, SentinelAcknowledgement};

/// Errors raised by the triage classifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("Triage cannot be changed while occurrence is {status}")]
    InvalidState { status: OccurrenceStatus },

    #[error("Sentinel acknowledgement not applicable: {reason}")]
    NotSentinel { reason: String },

    #[error(transparent)]
    InvalidValue(#[from] UnknownValue),
}

/// Kind of change a triage assignment represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageChange {
    /// First classification of the occurrence
    Initial,
    /// Strictly more severe than before
    Escalation,
    /// Strictly less severe than before
    DeEscalation,
    /// Same classification as before
    Unchanged,
}

impl TriageChange {
    /// Compare a proposed classification with the current one
    pub fn between(
        current: Option<TriageClassification>,
        proposed: TriageClassification,
    ) -> Self {
        match current {
            None => TriageChange::Initial,
            Some(current) => match proposed.cmp(&current) {
                Ordering::Greater => TriageChange::Escalation,
                Ordering::Less => TriageChange::DeEscalation,
                Ordering::Equal => TriageChange::Unchanged,
            },
        }
    }
}

impl std::fmt::Display for TriageChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriageChange::Initial => write!(f, "initial"),
            TriageChange::Escalation => write!(f, "escalation"),
            TriageChange::DeEscalation => write!(f, "de-escalation"),
            TriageChange::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A recorded triage decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageAssignment {
    pub classificacao: TriageClassification,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anterior: Option<TriageClassification>,

    pub mudanca: TriageChange,

    pub atribuido_por: String,

    pub atribuido_em: DateTime<Utc>,
}

impl TriageAssignment {
    /// An escalation that lands on `evento_sentinela`
    pub fn is_sentinel_escalation(&self) -> bool {
        self.classificacao.is_sentinel()
            && matches!(
                self.mudanca,
                TriageChange::Escalation | TriageChange::Initial
            )
    }
}

/// Evaluate a proposed classification against the occurrence
///
/// Nothing is recorded; see [`assign_triage`] to apply the result.
pub fn classify(
    occurrence: &Occurrence,
    new_triage: TriageClassification,
    actor: &str,
) -> Result<TriageAssignment, ClassificationError> {
    if !occurrence.status.accepts_triage() {
        tracing::debug!(
            protocolo = %occurrence.display_id(),
            status = %occurrence.status,
            "Triage rejected"
        );
        return Err(ClassificationError::InvalidState {
            status: occurrence.status,
        });
    }

    Ok(TriageAssignment {
        classificacao: new_triage,
        anterior: occurrence.triage,
        mudanca: TriageChange::between(occurrence.triage, new_triage),
        atribuido_por: actor.to_string(),
        atribuido_em: Utc::now(),
    })
}

/// Same as [`classify`] for a raw wire value
pub fn classify_str(
    occurrence: &Occurrence,
    new_triage: &str,
    actor: &str,
) -> Result<TriageAssignment, ClassificationError> {
    let parsed: TriageClassification = new_triage.parse()?;
    classify(occurrence, parsed, actor)
}

/// Classify and record the assignment on a copy of the occurrence
pub fn assign_triage(
    occurrence: &Occurrence,
    new_triage: TriageClassification,
    actor: &str,
) -> Result<(Occurrence, TriageAssignment), ClassificationError> {
    let assignment = classify(occurrence, new_triage, actor)?;

    let mut next = occurrence.clone();
    next.triage = Some(assignment.classificacao);
    next.updated_at = assignment.atribuido_em;
    if !assignment.classificacao.is_sentinel() {
        next.sentinela_reconhecida = None;
    }
    next.historico_triagem.push(assignment.clone());

    if assignment.is_sentinel_escalation() {
        tracing::warn!(
            protocolo = %occurrence.display_id(),
            actor,
            "Occurrence classified as sentinel event"
        );
    } else {
        tracing::info!(
            protocolo = %occurrence.display_id(),
            triage = %assignment.classificacao,
            change = %assignment.mudanca,
            actor,
            "Triage assigned"
        );
    }
    Ok((next, assignment))
}

/// Record that an accountable person acknowledged a sentinel classification
pub fn acknowledge_sentinel(
    occurrence: &Occurrence,
    actor: &str,
) -> Result<Occurrence, ClassificationError> {
    if occurrence.is_closed() {
        return Err(ClassificationError::InvalidState {
            status: occurrence.status,
        });
    }
    if !occurrence.is_sentinel() {
        return Err(ClassificationError::NotSentinel {
            reason: format!(
                "triage is {}",
                occurrence
                    .triage
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "not assigned".to_string())
            ),
        });
    }

    let mut next = occurrence.clone();
    let now = Utc::now();
    next.sentinela_reconhecida = Some(SentinelAcknowledgement {
        reconhecido_por: actor.to_string(),
        reconhecido_em: now,
    });
    next.updated_at = now;
    tracing::info!(protocolo = %occurrence.display_id(), actor, "Sentinel event acknowledged");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::classification::{OccurrenceSubtype, OccurrenceType};
    use crate::entities::classification::TriageClassification::*;

    fn occurrence() -> Occurrence {
        Occurrence::new(
            OccurrenceType::Assistencial,
            OccurrenceSubtype::Extravasamento,
            "Extravasamento de contraste",
        )
        .unwrap()
    }

    #[test]
    fn test_first_assignment_is_initial() {
        let a = classify(&occurrence(), NearMiss, "ana").unwrap();
        assert_eq!(a.mudanca, TriageChange::Initial);
        assert_eq!(a.anterior, None);
        assert_eq!(a.atribuido_por, "ana");
    }

    #[test]
    fn test_same_value_is_unchanged() {
        for level in TriageClassification::all() {
            assert_eq!(
                TriageChange::between(Some(*level), *level),
                TriageChange::Unchanged
            );
        }
    }

    #[test]
    fn test_escalation_and_de_escalation() {
        assert_eq!(
            TriageChange::between(Some(NearMiss), EventoAdverso),
            TriageChange::Escalation
        );
        assert_eq!(
            TriageChange::between(Some(EventoSentinela), CircunstanciaRisco),
            TriageChange::DeEscalation
        );
        // Not lexical: "evento_adverso" < "incidente_sem_dano" as strings
        assert_eq!(
            TriageChange::between(Some(IncidenteSemDano), EventoAdverso),
            TriageChange::Escalation
        );
    }

    #[test]
    fn test_assign_records_history() {
        let (occ, _) = assign_triage(&occurrence(), NearMiss, "ana").unwrap();
        let (occ, a) = assign_triage(&occ, EventoAdverso, "bruno").unwrap();
        assert_eq!(occ.triage, Some(EventoAdverso));
        assert_eq!(a.anterior, Some(NearMiss));
        assert_eq!(occ.historico_triagem.len(), 2);
        assert_eq!(occ.historico_triagem[1].mudanca, TriageChange::Escalation);
        // Triage does not move the status
        assert_eq!(occ.status, OccurrenceStatus::Registrada);
    }

    #[test]
    fn test_rejected_outside_triage_statuses() {
        let mut occ = occurrence();
        for status in [
            OccurrenceStatus::EmAnalise,
            OccurrenceStatus::AcaoEmAndamento,
            OccurrenceStatus::Concluida,
            OccurrenceStatus::Improcedente,
        ] {
            occ.status = status;
            assert_eq!(
                classify(&occ, NearMiss, "ana"),
                Err(ClassificationError::InvalidState { status })
            );
        }
    }

    #[test]
    fn test_unknown_value() {
        let err = classify_str(&occurrence(), "gravissimo", "ana").unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidValue(_)));
        assert!(classify_str(&occurrence(), "evento_sentinela", "ana").is_ok());
    }

    #[test]
    fn test_sentinel_acknowledgement() {
        assert!(matches!(
            acknowledge_sentinel(&occurrence(), "ana"),
            Err(ClassificationError::NotSentinel { .. })
        ));

        let (occ, a) = assign_triage(&occurrence(), EventoSentinela, "ana").unwrap();
        assert!(a.is_sentinel_escalation());
        let occ = acknowledge_sentinel(&occ, "diretor").unwrap();
        assert_eq!(
            occ.sentinela_reconhecida.as_ref().map(|s| s.reconhecido_por.as_str()),
            Some("diretor")
        );

        // De-escalation drops the acknowledgement
        let (occ, _) = assign_triage(&occ, EventoAdverso, "ana").unwrap();
        assert!(occ.sentinela_reconhecida.is_none());
    }
}
