//! Occurrence outcome: how an occurrence was resolved

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

use crate::core::identity::CapaId;
use crate::core::status::OccurrenceStatus;
use crate::entities::capa::{Capa, CapaError};
use crate::entities::classification::OutcomeType;

/// Errors raised while validating or attaching an outcome
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    #[error("Outcome must have at least one type")]
    EmptyOutcomeTypes,

    #[error("Outcome justification is required")]
    MissingJustification,

    #[error("External notification required: {reason}")]
    NotificationRequired { reason: String },

    #[error("Invalid notification date '{value}': expected YYYY-MM-DD")]
    InvalidNotificationDate { value: String },

    #[error("Primary outcome '{desfecho}' is not one of the outcome types")]
    PrimaryOutcomeNotInTypes { desfecho: OutcomeType },

    #[error("Duplicate CAPA id in outcome: {id}")]
    DuplicateCapa { id: CapaId },

    #[error(transparent)]
    Capa(#[from] CapaError),

    #[error("Occurrence in status {status} cannot accept this change: {reason}")]
    InvalidState {
        status: OccurrenceStatus,
        reason: String,
    },
}

/// Record of a mandatory notification to an external body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNotification {
    /// Body that was notified (e.g. health surveillance agency)
    pub orgao_notificado: String,

    /// Notification date (YYYY-MM-DD)
    pub data: String,

    /// Person who sent the notification
    pub responsavel: String,

    /// Reference to the uploaded receipt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anexo_comprovante: Option<String>,

    /// Reference to the generated notification document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documento_gerado: Option<String>,
}

impl ExternalNotification {
    pub fn new(
        orgao_notificado: impl Into<String>,
        data: NaiveDate,
        responsavel: impl Into<String>,
    ) -> Self {
        Self {
            orgao_notificado: orgao_notificado.into(),
            data: data.format("%Y-%m-%d").to_string(),
            responsavel: responsavel.into(),
            anexo_comprovante: None,
            documento_gerado: None,
        }
    }

    pub fn validate(&self) -> Result<(), OutcomeError> {
        for (field, value) in [
            ("orgaoNotificado", &self.orgao_notificado),
            ("data", &self.data),
            ("responsavel", &self.responsavel),
        ] {
            if value.trim().is_empty() {
                return Err(OutcomeError::NotificationRequired {
                    reason: format!("notificacaoExterna.{} is empty", field),
                });
            }
        }
        NaiveDate::parse_from_str(self.data.trim(), "%Y-%m-%d").map_err(|_| {
            OutcomeError::InvalidNotificationDate {
                value: self.data.clone(),
            }
        })?;
        Ok(())
    }
}

/// Outcome as submitted by a caller, before it is stamped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDraft {
    #[serde(default)]
    pub tipos: BTreeSet<OutcomeType>,

    #[serde(default)]
    pub justificativa: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desfecho_principal: Option<OutcomeType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notificacao_externa: Option<ExternalNotification>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capas: Vec<Capa>,
}

impl OutcomeDraft {
    pub fn new(tipos: impl IntoIterator<Item = OutcomeType>, justificativa: impl Into<String>) -> Self {
        Self {
            tipos: tipos.into_iter().collect(),
            justificativa: justificativa.into(),
            ..Default::default()
        }
    }

    pub fn with_primary(mut self, desfecho: OutcomeType) -> Self {
        self.desfecho_principal = Some(desfecho);
        self
    }

    pub fn with_notification(mut self, notificacao: ExternalNotification) -> Self {
        self.notificacao_externa = Some(notificacao);
        self
    }

    pub fn with_capa(mut self, capa: Capa) -> Self {
        self.capas.push(capa);
        self
    }

    /// Check every outcome invariant
    pub fn validate(&self) -> Result<(), OutcomeError> {
        if self.tipos.is_empty() {
            return Err(OutcomeError::EmptyOutcomeTypes);
        }
        if self.justificativa.trim().is_empty() {
            return Err(OutcomeError::MissingJustification);
        }

        if self.tipos.contains(&OutcomeType::NotificacaoExterna) {
            match &self.notificacao_externa {
                Some(n) => n.validate()?,
                None => {
                    return Err(OutcomeError::NotificationRequired {
                        reason: "tipos include notificacao_externa but notificacaoExterna is absent"
                            .to_string(),
                    })
                }
            }
        }

        if let Some(desfecho) = self.desfecho_principal {
            if !self.tipos.contains(&desfecho) {
                return Err(OutcomeError::PrimaryOutcomeNotInTypes { desfecho });
            }
        }

        let mut seen = HashSet::new();
        for capa in &self.capas {
            if !seen.insert(&capa.id) {
                return Err(OutcomeError::DuplicateCapa {
                    id: capa.id.clone(),
                });
            }
            capa.validate()?;
        }
        Ok(())
    }

    /// True when the outcome was ruled unfounded and nothing else
    pub fn is_unfounded_only(&self) -> bool {
        self.tipos.len() == 1 && self.tipos.contains(&OutcomeType::Improcedente)
    }
}

/// Stored outcome of an occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceOutcome {
    #[serde(flatten)]
    pub content: OutcomeDraft,

    /// Who defined the outcome
    pub definido_por: String,

    /// When the outcome was defined
    pub definido_em: DateTime<Utc>,
}

impl OccurrenceOutcome {
    pub fn tipos(&self) -> &BTreeSet<OutcomeType> {
        &self.content.tipos
    }

    pub fn capas(&self) -> &[Capa] {
        &self.content.capas
    }

    pub fn capa(&self, id: &CapaId) -> Option<&Capa> {
        self.content.capas.iter().find(|c| &c.id == id)
    }

    pub fn capa_mut(&mut self, id: &CapaId) -> Option<&mut Capa> {
        self.content.capas.iter_mut().find(|c| &c.id == id)
    }

    /// Number of CAPAs not yet `concluida` or `verificada`
    pub fn open_capas(&self) -> usize {
        self.content.capas.iter().filter(|c| !c.status.is_done()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> ExternalNotification {
        ExternalNotification::new(
            "ANVISA",
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            "Núcleo de Segurança do Paciente",
        )
    }

    #[test]
    fn test_valid_outcome() {
        let draft = OutcomeDraft::new([OutcomeType::Orientacao], "Treinamento realizado")
            .with_primary(OutcomeType::Orientacao);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_empty_types() {
        let draft = OutcomeDraft::new([], "x");
        assert_eq!(draft.validate(), Err(OutcomeError::EmptyOutcomeTypes));
    }

    #[test]
    fn test_blank_justification() {
        let draft = OutcomeDraft::new([OutcomeType::Treinamento], "  ");
        assert_eq!(draft.validate(), Err(OutcomeError::MissingJustification));
    }

    #[test]
    fn test_notification_required() {
        let draft = OutcomeDraft::new([OutcomeType::NotificacaoExterna], "Evento notificável");
        assert!(matches!(
            draft.validate(),
            Err(OutcomeError::NotificationRequired { .. })
        ));

        let mut incomplete = notification();
        incomplete.responsavel = String::new();
        let draft = draft.with_notification(incomplete);
        assert!(matches!(
            draft.validate(),
            Err(OutcomeError::NotificationRequired { .. })
        ));
    }

    #[test]
    fn test_notification_date_must_parse() {
        let mut n = notification();
        n.data = "01/10/2026".to_string();
        let draft =
            OutcomeDraft::new([OutcomeType::NotificacaoExterna], "Evento notificável").with_notification(n);
        assert!(matches!(
            draft.validate(),
            Err(OutcomeError::InvalidNotificationDate { .. })
        ));
    }

    #[test]
    fn test_primary_must_be_member() {
        let draft = OutcomeDraft::new([OutcomeType::Orientacao], "ok")
            .with_primary(OutcomeType::AcaoDisciplinar);
        assert_eq!(
            draft.validate(),
            Err(OutcomeError::PrimaryOutcomeNotInTypes {
                desfecho: OutcomeType::AcaoDisciplinar
            })
        );
    }

    #[test]
    fn test_duplicate_capa_ids() {
        let capa = Capa::new(
            "causa",
            "ação",
            "resp",
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        );
        let draft = OutcomeDraft::new([OutcomeType::AlteracaoProcesso], "ok")
            .with_capa(capa.clone())
            .with_capa(capa);
        assert!(matches!(
            draft.validate(),
            Err(OutcomeError::DuplicateCapa { .. })
        ));
    }

    #[test]
    fn test_unfounded_only() {
        assert!(OutcomeDraft::new([OutcomeType::Improcedente], "x").is_unfounded_only());
        assert!(
            !OutcomeDraft::new([OutcomeType::Improcedente, OutcomeType::Orientacao], "x")
                .is_unfounded_only()
        );
    }

    #[test]
    fn test_stored_outcome_wire_shape() {
        let outcome = OccurrenceOutcome {
            content: OutcomeDraft::new([OutcomeType::Orientacao], "Orientado"),
            definido_por: "maria".to_string(),
            definido_em: Utc::now(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["tipos"], serde_json::json!(["orientacao"]));
        assert_eq!(json["justificativa"], "Orientado");
        assert_eq!(json["definidoPor"], "maria");
        assert!(json.get("definidoEm").is_some());
        assert!(json.get("content").is_none());
    }
}
