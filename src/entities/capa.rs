//! Corrective and preventive actions (CAPA)
//!
//! Each CAPA runs its own forward-only lifecycle:
//! `pendente → em_andamento → concluida → verificada`.
//! Completion needs recorded evidence; verification needs the verifier and the
//! verification time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::core::identity::CapaId;
use crate::entities::classification::UnknownValue;

/// CAPA lifecycle status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CapaStatus {
    #[default]
    Pendente,
    EmAndamento,
    Concluida,
    Verificada,
}

impl CapaStatus {
    pub fn all() -> &'static [CapaStatus] {
        &[
            CapaStatus::Pendente,
            CapaStatus::EmAndamento,
            CapaStatus::Concluida,
            CapaStatus::Verificada,
        ]
    }

    /// The only status reachable from this one
    pub fn next(&self) -> Option<CapaStatus> {
        match self {
            CapaStatus::Pendente => Some(CapaStatus::EmAndamento),
            CapaStatus::EmAndamento => Some(CapaStatus::Concluida),
            CapaStatus::Concluida => Some(CapaStatus::Verificada),
            CapaStatus::Verificada => None,
        }
    }

    /// Completed, verified or not
    pub fn is_done(&self) -> bool {
        matches!(self, CapaStatus::Concluida | CapaStatus::Verificada)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapaStatus::Pendente => "pendente",
            CapaStatus::EmAndamento => "em_andamento",
            CapaStatus::Concluida => "concluida",
            CapaStatus::Verificada => "verificada",
        }
    }
}

impl std::fmt::Display for CapaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CapaStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CapaStatus::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| UnknownValue {
                kind: "CAPA status",
                value: s.to_string(),
            })
    }
}

/// Errors raised by the CAPA lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapaError {
    #[error("Illegal CAPA transition for {id}: {from} → {to} ({reason})")]
    IllegalTransition {
        id: CapaId,
        from: CapaStatus,
        to: CapaStatus,
        reason: String,
    },

    #[error("CAPA {id} is {status} but {reason}")]
    InconsistentRecord {
        id: CapaId,
        status: CapaStatus,
        reason: String,
    },

    #[error("CAPA field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("CAPA not found: {id}")]
    NotFound { id: CapaId },
}

/// A corrective/preventive action tied to an occurrence outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capa {
    /// Generated when a submitted CAPA omits it
    #[serde(default)]
    pub id: CapaId,

    /// Root cause being addressed
    pub causa_raiz: String,

    /// Action to be taken
    pub acao: String,

    /// Person accountable for the action
    pub responsavel: String,

    /// Due date
    pub prazo: NaiveDate,

    /// Evidence that the action was carried out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidencia: Option<String>,

    /// Effectiveness check notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verificacao_eficacia: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verificado_por: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verificado_em: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: CapaStatus,
}

fn require_text(field: &'static str, value: &str) -> Result<(), CapaError> {
    if value.trim().is_empty() {
        Err(CapaError::EmptyField { field })
    } else {
        Ok(())
    }
}

impl Capa {
    /// Create a pending CAPA with a fresh id
    pub fn new(
        causa_raiz: impl Into<String>,
        acao: impl Into<String>,
        responsavel: impl Into<String>,
        prazo: NaiveDate,
    ) -> Self {
        Self {
            id: CapaId::new(),
            causa_raiz: causa_raiz.into(),
            acao: acao.into(),
            responsavel: responsavel.into(),
            prazo,
            evidencia: None,
            verificacao_eficacia: None,
            verificado_por: None,
            verificado_em: None,
            status: CapaStatus::Pendente,
        }
    }

    fn is_verification_recorded(&self) -> bool {
        self.verificado_por
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
            && self.verificado_em.is_some()
    }

    fn has_evidence(&self) -> bool {
        self.evidencia
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty())
    }

    /// Whether evidence or verification has been recorded
    pub fn has_progress(&self) -> bool {
        self.evidencia.is_some()
            || self.verificacao_eficacia.is_some()
            || self.verificado_por.is_some()
            || self.verificado_em.is_some()
    }

    /// Same status, evidence and verification as `other`
    pub fn same_progress(&self, other: &Capa) -> bool {
        self.status == other.status
            && self.evidencia == other.evidencia
            && self.verificacao_eficacia == other.verificacao_eficacia
            && self.verificado_por == other.verificado_por
            && self.verificado_em == other.verificado_em
    }

    /// Check the record's own invariants
    pub fn validate(&self) -> Result<(), CapaError> {
        require_text("causaRaiz", &self.causa_raiz)?;
        require_text("acao", &self.acao)?;
        require_text("responsavel", &self.responsavel)?;

        if self.status.is_done() && !self.has_evidence() {
            return Err(CapaError::InconsistentRecord {
                id: self.id.clone(),
                status: self.status,
                reason: "evidencia is missing".to_string(),
            });
        }
        if self.status == CapaStatus::Verificada && !self.is_verification_recorded() {
            return Err(CapaError::InconsistentRecord {
                id: self.id.clone(),
                status: self.status,
                reason: "verificadoPor/verificadoEm are missing".to_string(),
            });
        }
        Ok(())
    }

    /// Record evidence of execution; only before the CAPA is completed
    pub fn record_evidence(&mut self, evidencia: &str) -> Result<(), CapaError> {
        require_text("evidencia", evidencia)?;
        if self.status.is_done() {
            return Err(CapaError::InconsistentRecord {
                id: self.id.clone(),
                status: self.status,
                reason: "evidence is frozen once the action is completed".to_string(),
            });
        }
        self.evidencia = Some(evidencia.to_string());
        Ok(())
    }

    /// Record the effectiveness check; only once the CAPA is completed
    pub fn record_verification(
        &mut self,
        verificacao_eficacia: &str,
        verificado_por: &str,
    ) -> Result<(), CapaError> {
        require_text("verificacaoEficacia", verificacao_eficacia)?;
        require_text("verificadoPor", verificado_por)?;
        if self.status != CapaStatus::Concluida {
            return Err(CapaError::InconsistentRecord {
                id: self.id.clone(),
                status: self.status,
                reason: "verification is recorded only on completed actions".to_string(),
            });
        }
        self.verificacao_eficacia = Some(verificacao_eficacia.to_string());
        self.verificado_por = Some(verificado_por.to_string());
        self.verificado_em = Some(Utc::now());
        Ok(())
    }

    /// Move one step forward in the lifecycle
    pub fn advance(&mut self, target: CapaStatus) -> Result<(), CapaError> {
        let illegal = |reason: &str| CapaError::IllegalTransition {
            id: self.id.clone(),
            from: self.status,
            to: target,
            reason: reason.to_string(),
        };

        if self.status.next() != Some(target) {
            return Err(illegal("CAPA status only moves one step forward"));
        }
        if target == CapaStatus::Concluida && !self.has_evidence() {
            return Err(illegal("evidencia must be recorded first"));
        }
        if target == CapaStatus::Verificada && !self.is_verification_recorded() {
            return Err(illegal("verificadoPor and verificadoEm must be recorded first"));
        }

        self.status = target;
        Ok(())
    }
}

/// Advance a CAPA to `target`, returning the updated record
///
/// The input is left untouched; on error nothing changes.
pub fn advance_capa(capa: &Capa, target: CapaStatus, actor: &str) -> Result<Capa, CapaError> {
    let mut next = capa.clone();
    match next.advance(target) {
        Ok(()) => {
            tracing::info!(capa = %capa.id, from = %capa.status, to = %target, actor, "CAPA advanced");
            Ok(next)
        }
        Err(e) => {
            tracing::debug!(capa = %capa.id, error = %e, "CAPA transition rejected");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Capa {
        Capa::new(
            "Piso molhado sem sinalização",
            "Instalar placas de aviso",
            "Equipe de Hotelaria",
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        )
    }

    #[test]
    fn test_new_capa_is_pending() {
        let capa = sample();
        assert_eq!(capa.status, CapaStatus::Pendente);
        assert!(capa.validate().is_ok());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut capa = advance_capa(&sample(), CapaStatus::EmAndamento, "ana").unwrap();
        capa.record_evidence("Fotos das placas instaladas").unwrap();
        let mut capa = advance_capa(&capa, CapaStatus::Concluida, "ana").unwrap();
        capa.record_verification("Sem novas quedas em 30 dias", "Qualidade")
            .unwrap();
        let capa = advance_capa(&capa, CapaStatus::Verificada, "qualidade").unwrap();
        assert_eq!(capa.status, CapaStatus::Verificada);
        assert!(capa.verificado_em.is_some());
        assert!(capa.validate().is_ok());
    }

    #[test]
    fn test_cannot_skip_steps() {
        let capa = sample();
        let err = advance_capa(&capa, CapaStatus::Concluida, "ana").unwrap_err();
        assert!(matches!(err, CapaError::IllegalTransition { .. }));

        let err = advance_capa(&capa, CapaStatus::Pendente, "ana").unwrap_err();
        assert!(matches!(err, CapaError::IllegalTransition { .. }));
    }

    #[test]
    fn test_completion_requires_evidence() {
        let capa = advance_capa(&sample(), CapaStatus::EmAndamento, "ana").unwrap();
        let err = advance_capa(&capa, CapaStatus::Concluida, "ana").unwrap_err();
        match err {
            CapaError::IllegalTransition { reason, .. } => assert!(reason.contains("evidencia")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_verification_requires_verifier() {
        let mut capa = advance_capa(&sample(), CapaStatus::EmAndamento, "ana").unwrap();
        capa.record_evidence("feito").unwrap();
        let capa = advance_capa(&capa, CapaStatus::Concluida, "ana").unwrap();
        let err = advance_capa(&capa, CapaStatus::Verificada, "ana").unwrap_err();
        assert!(matches!(err, CapaError::IllegalTransition { .. }));
        // Failed advance leaves the input untouched
        assert_eq!(capa.status, CapaStatus::Concluida);
    }

    #[test]
    fn test_record_verification_only_when_completed() {
        let mut capa = sample();
        assert!(matches!(
            capa.record_verification("ok", "Qualidade"),
            Err(CapaError::InconsistentRecord { .. })
        ));
        assert!(matches!(
            capa.record_evidence("   "),
            Err(CapaError::EmptyField { field: "evidencia" })
        ));
    }

    #[test]
    fn test_validate_detects_inconsistent_status() {
        let mut capa = sample();
        capa.status = CapaStatus::Concluida;
        assert!(matches!(
            capa.validate(),
            Err(CapaError::InconsistentRecord { .. })
        ));

        capa.evidencia = Some("relatório".to_string());
        assert!(capa.validate().is_ok());

        capa.status = CapaStatus::Verificada;
        assert!(capa.validate().is_err());
    }

    #[test]
    fn test_wire_field_names() {
        let capa = sample();
        let json = serde_json::to_value(&capa).unwrap();
        assert!(json.get("causaRaiz").is_some());
        assert!(json.get("responsavel").is_some());
        assert_eq!(json["status"], "pendente");
        assert!(json.get("verificadoPor").is_none());
    }
}
