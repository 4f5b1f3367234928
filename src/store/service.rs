//! Load-apply-save wrapper around the pure occurrence operations

use crate::core::error::OccurrenceResult;
use crate::core::identity::{CapaId, Protocolo};
use crate::core::resolution;
use crate::core::status::OccurrenceStatus;
use crate::core::triage::{self, TriageAssignment};
use crate::core::workflow::WorkflowEngine;
use crate::entities::capa::{Capa, CapaStatus};
use crate::entities::classification::TriageClassification;
use crate::entities::occurrence::{Occurrence, PessoaComunicada};
use crate::entities::outcome::OutcomeDraft;

use super::OccurrenceStore;

/// Runs operations against stored occurrences
///
/// Each call loads the current record, applies one pure operation and saves
/// the result. A concurrent writer surfaces as a `Conflict` store error and
/// nothing is persisted.
pub struct OccurrenceService<S: OccurrenceStore> {
    store: S,
    engine: WorkflowEngine,
}

impl<S: OccurrenceStore> OccurrenceService<S> {
    pub fn new(store: S, engine: WorkflowEngine) -> Self {
        Self { store, engine }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    pub fn load(&self, protocolo: &Protocolo) -> OccurrenceResult<Occurrence> {
        Ok(self.store.load(protocolo)?)
    }

    /// Validate and persist a new occurrence, assigning its protocol
    pub fn register(&self, occurrence: Occurrence) -> OccurrenceResult<Occurrence> {
        occurrence.validate()?;
        let saved = self.store.insert(occurrence)?;
        tracing::info!(
            protocolo = %saved.display_id(),
            tipo = %saved.tipo,
            subtipo = %saved.subtipo,
            "Occurrence registered"
        );
        Ok(saved)
    }

    fn update<F>(&self, protocolo: &Protocolo, apply: F) -> OccurrenceResult<Occurrence>
    where
        F: FnOnce(&Occurrence) -> OccurrenceResult<Occurrence>,
    {
        let current = self.store.load(protocolo)?;
        let next = apply(&current).map_err(|e| {
            tracing::debug!(protocolo = %protocolo, kind = %e.kind(), "Operation rejected");
            e
        })?;
        if next == current {
            return Ok(current);
        }
        Ok(self.store.save(next)?)
    }

    pub fn classify(
        &self,
        protocolo: &Protocolo,
        new_triage: TriageClassification,
        actor: &str,
    ) -> OccurrenceResult<(Occurrence, TriageAssignment)> {
        let current = self.store.load(protocolo)?;
        let (next, assignment) = triage::assign_triage(&current, new_triage, actor)?;
        Ok((self.store.save(next)?, assignment))
    }

    pub fn acknowledge_sentinel(
        &self,
        protocolo: &Protocolo,
        actor: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| Ok(triage::acknowledge_sentinel(occ, actor)?))
    }

    pub fn transition(
        &self,
        protocolo: &Protocolo,
        to: OccurrenceStatus,
        actor: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| Ok(self.engine.transition(occ, to, actor)?))
    }

    pub fn attach_outcome(
        &self,
        protocolo: &Protocolo,
        draft: OutcomeDraft,
        actor: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| {
            Ok(resolution::attach_outcome(occ, draft, actor)?)
        })
    }

    /// Replace the outcome while carrying over the stored CAPAs
    ///
    /// The merge happens on the record loaded for this update, so a CAPA
    /// added concurrently is either kept or surfaces as a `Conflict`.
    pub fn attach_outcome_keeping_capas(
        &self,
        protocolo: &Protocolo,
        mut draft: OutcomeDraft,
        actor: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| {
            if let Some(existing) = &occ.outcome {
                draft.capas = existing.content.capas.clone();
            }
            Ok(resolution::attach_outcome(occ, draft, actor)?)
        })
    }

    pub fn add_capa(
        &self,
        protocolo: &Protocolo,
        capa: Capa,
        actor: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| Ok(resolution::add_capa(occ, capa, actor)?))
    }

    pub fn record_capa_evidence(
        &self,
        protocolo: &Protocolo,
        id: &CapaId,
        evidencia: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| {
            Ok(resolution::record_capa_evidence(occ, id, evidencia)?)
        })
    }

    pub fn record_capa_verification(
        &self,
        protocolo: &Protocolo,
        id: &CapaId,
        verificacao_eficacia: &str,
        verificado_por: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| {
            Ok(resolution::record_capa_verification(
                occ,
                id,
                verificacao_eficacia,
                verificado_por,
            )?)
        })
    }

    pub fn advance_capa(
        &self,
        protocolo: &Protocolo,
        id: &CapaId,
        target: CapaStatus,
        actor: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| {
            Ok(resolution::advance_capa_in(occ, id, target, actor)?)
        })
    }

    pub fn forward_to_physician(
        &self,
        protocolo: &Protocolo,
        medico: &str,
        mensagem: &str,
        actor: &str,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| {
            Ok(occ.forward_to_physician(medico, mensagem, actor)?)
        })
    }

    pub fn add_pessoa_comunicada(
        &self,
        protocolo: &Protocolo,
        pessoa: PessoaComunicada,
    ) -> OccurrenceResult<Occurrence> {
        self.update(protocolo, |occ| Ok(occ.add_pessoa_comunicada(pessoa)?))
    }
}
