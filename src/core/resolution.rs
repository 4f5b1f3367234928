//! Outcome and CAPA operations on an occurrence
//!
//! Outcomes attach only while the occurrence is `em_analise` or
//! `acao_em_andamento`. After closure the sole permitted change is recording
//! CAPA verification and advancing `concluida → verificada`.

use chrono::Utc;

use crate::core::identity::CapaId;
use crate::entities::capa::{advance_capa, Capa, CapaError, CapaStatus};
use crate::entities::occurrence::Occurrence;
use crate::entities::outcome::{OccurrenceOutcome, OutcomeDraft, OutcomeError};

/// What kind of CAPA edit is being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapaEdit {
    /// Anything other than verification
    Regular,
    /// Recording or advancing to verification, allowed after closure
    Verification,
}

fn ensure_outcome_editable(occurrence: &Occurrence) -> Result<(), OutcomeError> {
    if occurrence.status.accepts_outcome() {
        Ok(())
    } else {
        Err(OutcomeError::InvalidState {
            status: occurrence.status,
            reason: "outcomes are edited only in em_analise or acao_em_andamento".to_string(),
        })
    }
}

fn ensure_capa_editable(occurrence: &Occurrence, edit: CapaEdit) -> Result<(), OutcomeError> {
    if occurrence.is_closed() && edit == CapaEdit::Verification {
        return Ok(());
    }
    ensure_outcome_editable(occurrence)
}

fn outcome_mut(next: &mut Occurrence) -> Result<&mut OccurrenceOutcome, OutcomeError> {
    let status = next.status;
    next.outcome.as_mut().ok_or_else(|| OutcomeError::InvalidState {
        status,
        reason: "no outcome attached".to_string(),
    })
}

fn capa_mut<'a>(
    outcome: &'a mut OccurrenceOutcome,
    id: &CapaId,
) -> Result<&'a mut Capa, OutcomeError> {
    outcome
        .capa_mut(id)
        .ok_or_else(|| CapaError::NotFound { id: id.clone() }.into())
}

/// Attach or replace the outcome of an occurrence
///
/// Attaching content identical to the stored outcome is a no-op, so the
/// stored `definidoPor`/`definidoEm` are kept.
pub fn attach_outcome(
    occurrence: &Occurrence,
    draft: OutcomeDraft,
    actor: &str,
) -> Result<Occurrence, OutcomeError> {
    let result = try_attach(occurrence, draft, actor);
    if let Err(e) = &result {
        tracing::debug!(protocolo = %occurrence.display_id(), error = %e, "Outcome rejected");
    }
    result
}

fn try_attach(
    occurrence: &Occurrence,
    draft: OutcomeDraft,
    actor: &str,
) -> Result<Occurrence, OutcomeError> {
    ensure_outcome_editable(occurrence)?;
    draft.validate()?;

    if let Some(existing) = &occurrence.outcome {
        if existing.content == draft {
            return Ok(occurrence.clone());
        }
    }
    check_capa_progress(occurrence.outcome.as_ref(), &draft)?;

    let now = Utc::now();
    let mut next = occurrence.clone();
    next.outcome = Some(OccurrenceOutcome {
        content: draft,
        definido_por: actor.to_string(),
        definido_em: now,
    });
    next.updated_at = now;

    tracing::info!(protocolo = %occurrence.display_id(), actor, "Outcome attached");
    Ok(next)
}

/// CAPA progress moves only through the dedicated CAPA operations
///
/// A resubmitted CAPA must carry its stored status, evidence and verification
/// unchanged. CAPAs new to the outcome start as a blank `pendente`. A CAPA
/// past `pendente` cannot be dropped from the outcome.
fn check_capa_progress(
    existing: Option<&OccurrenceOutcome>,
    draft: &OutcomeDraft,
) -> Result<(), CapaError> {
    for capa in &draft.capas {
        match existing.and_then(|o| o.capa(&capa.id)) {
            Some(stored) if capa.status != stored.status => {
                return Err(CapaError::IllegalTransition {
                    id: capa.id.clone(),
                    from: stored.status,
                    to: capa.status,
                    reason: "CAPA status changes only through advance".to_string(),
                });
            }
            Some(stored) if !capa.same_progress(stored) => {
                return Err(CapaError::InconsistentRecord {
                    id: capa.id.clone(),
                    status: stored.status,
                    reason: "evidence and verification are recorded only through CAPA operations"
                        .to_string(),
                });
            }
            Some(_) => {}
            None if capa.status != CapaStatus::Pendente => {
                return Err(CapaError::IllegalTransition {
                    id: capa.id.clone(),
                    from: CapaStatus::Pendente,
                    to: capa.status,
                    reason: "new CAPAs start as pendente".to_string(),
                });
            }
            None if capa.has_progress() => {
                return Err(CapaError::InconsistentRecord {
                    id: capa.id.clone(),
                    status: capa.status,
                    reason: "a new CAPA cannot carry evidence or verification".to_string(),
                });
            }
            None => {}
        }
    }

    if let Some(existing) = existing {
        if let Some(dropped) = existing
            .capas()
            .iter()
            .filter(|c| c.status != CapaStatus::Pendente)
            .find(|c| draft.capas.iter().all(|d| d.id != c.id))
        {
            return Err(CapaError::InconsistentRecord {
                id: dropped.id.clone(),
                status: dropped.status,
                reason: "a started CAPA cannot be removed from the outcome".to_string(),
            });
        }
    }
    Ok(())
}

/// Add a CAPA to the occurrence's outcome
pub fn add_capa(occurrence: &Occurrence, capa: Capa, actor: &str) -> Result<Occurrence, OutcomeError> {
    ensure_capa_editable(occurrence, CapaEdit::Regular)?;
    capa.validate()?;

    let mut next = occurrence.clone();
    let outcome = outcome_mut(&mut next)?;
    if outcome.capa(&capa.id).is_some() {
        return Err(OutcomeError::DuplicateCapa { id: capa.id });
    }
    tracing::info!(protocolo = %occurrence.display_id(), capa = %capa.id, actor, "CAPA added");
    outcome.content.capas.push(capa);
    next.updated_at = Utc::now();
    Ok(next)
}

/// Record execution evidence on one of the occurrence's CAPAs
pub fn record_capa_evidence(
    occurrence: &Occurrence,
    id: &CapaId,
    evidencia: &str,
) -> Result<Occurrence, OutcomeError> {
    ensure_capa_editable(occurrence, CapaEdit::Regular)?;

    let mut next = occurrence.clone();
    capa_mut(outcome_mut(&mut next)?, id)?.record_evidence(evidencia)?;
    next.updated_at = Utc::now();
    Ok(next)
}

/// Record the effectiveness check on one of the occurrence's CAPAs
pub fn record_capa_verification(
    occurrence: &Occurrence,
    id: &CapaId,
    verificacao_eficacia: &str,
    verificado_por: &str,
) -> Result<Occurrence, OutcomeError> {
    ensure_capa_editable(occurrence, CapaEdit::Verification)?;

    let mut next = occurrence.clone();
    capa_mut(outcome_mut(&mut next)?, id)?
        .record_verification(verificacao_eficacia, verificado_por)?;
    next.updated_at = Utc::now();
    Ok(next)
}

/// Advance one of the occurrence's CAPAs
pub fn advance_capa_in(
    occurrence: &Occurrence,
    id: &CapaId,
    target: CapaStatus,
    actor: &str,
) -> Result<Occurrence, OutcomeError> {
    let edit = if target == CapaStatus::Verificada {
        CapaEdit::Verification
    } else {
        CapaEdit::Regular
    };
    ensure_capa_editable(occurrence, edit)?;

    let mut next = occurrence.clone();
    let slot = capa_mut(outcome_mut(&mut next)?, id)?;
    *slot = advance_capa(slot, target, actor)?;
    next.updated_at = Utc::now();
    Ok(next)
}
