//! Occurrence record - the aggregate root
//!
//! An occurrence owns its triage history, outcome, CAPAs and audit trail.
//! Communicated parties, triage assignments and audit entries are append-only
//! and kept in chronological order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::Protocolo;
use crate::core::status::OccurrenceStatus;
use crate::core::triage::TriageAssignment;
use crate::entities::classification::{OccurrenceSubtype, OccurrenceType, TriageClassification};
use crate::entities::outcome::{OccurrenceOutcome, OutcomeError};

/// Required-field and shape violations on an occurrence record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Subtype '{subtipo}' does not belong to type '{tipo}'")]
    SubtypeMismatch {
        tipo: OccurrenceType,
        subtipo: OccurrenceSubtype,
    },

    #[error("Required field '{field}' is empty")]
    MissingField { field: String },

    #[error("Occurrence is closed ({status})")]
    Closed { status: OccurrenceStatus },

    #[error("Invalid outcome: {0}")]
    Outcome(#[from] OutcomeError),
}

fn require(field: impl Into<String>, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField {
            field: field.into(),
        })
    } else {
        Ok(())
    }
}

/// Patient involved in the occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientData {
    pub nome: String,

    /// Medical record number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prontuario: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setor: Option<String>,
}

/// Staff member who registered the occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistradorData {
    pub nome: String,
    pub setor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funcao: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contato: Option<String>,
}

/// Person who was informed about the occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PessoaComunicada {
    pub nome: String,

    /// Relationship to the patient or role in the organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vinculo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comunicado_em: Option<DateTime<Utc>>,
}

/// One accepted status transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub from_status: OccurrenceStatus,
    pub to_status: OccurrenceStatus,
    pub actor: String,
    pub at: DateTime<Utc>,
}

/// Acknowledgement that a sentinel event was seen by an accountable person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentinelAcknowledgement {
    pub reconhecido_por: String,
    pub reconhecido_em: DateTime<Utc>,
}

/// An adverse-event / incident report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// Assigned by the store on first persist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocolo: Option<Protocolo>,

    pub tipo: OccurrenceType,
    pub subtipo: OccurrenceSubtype,

    #[serde(default)]
    pub status: OccurrenceStatus,

    /// What happened, as reported
    #[serde(default)]
    pub descricao: String,

    /// Current triage classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triage: Option<TriageClassification>,

    #[serde(default)]
    pub historico_triagem: Vec<TriageAssignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinela_reconhecida: Option<SentinelAcknowledgement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_data: Option<PatientData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrador_data: Option<RegistradorData>,

    #[serde(default)]
    pub pessoas_comunicadas: Vec<PessoaComunicada>,

    /// Message forwarded to the reviewing physician
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensagem_medico: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medico_destino: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encaminhada_em: Option<DateTime<Utc>>,

    /// Set when a terminal status is reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalizada_em: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OccurrenceOutcome>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub auditoria: Vec<AuditEntry>,

    /// Optimistic concurrency version, bumped by the store on each save
    #[serde(default)]
    pub versao: u64,
}

impl Occurrence {
    /// Create a new occurrence in status `registrada`
    pub fn new(
        tipo: OccurrenceType,
        subtipo: OccurrenceSubtype,
        descricao: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if !subtipo.belongs_to(tipo) {
            return Err(ValidationError::SubtypeMismatch { tipo, subtipo });
        }

        let now = Utc::now();
        Ok(Self {
            protocolo: None,
            tipo,
            subtipo,
            status: OccurrenceStatus::Registrada,
            descricao: descricao.into(),
            triage: None,
            historico_triagem: Vec::new(),
            sentinela_reconhecida: None,
            patient_data: None,
            registrador_data: None,
            pessoas_comunicadas: Vec::new(),
            mensagem_medico: None,
            medico_destino: None,
            encaminhada_em: None,
            finalizada_em: None,
            outcome: None,
            created_at: now,
            updated_at: now,
            auditoria: Vec::new(),
            versao: 0,
        })
    }

    pub fn with_patient(mut self, patient: PatientData) -> Self {
        self.patient_data = Some(patient);
        self
    }

    pub fn with_registrador(mut self, registrador: RegistradorData) -> Self {
        self.registrador_data = Some(registrador);
        self
    }

    /// Protocol for logs and listings, or a placeholder before first persist
    pub fn display_id(&self) -> String {
        self.protocolo
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "(unsaved)".to_string())
    }

    /// Closed occurrences accept no status or outcome change
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_sentinel(&self) -> bool {
        self.triage.is_some_and(|t| t.is_sentinel())
    }

    fn ensure_open(&self) -> Result<(), ValidationError> {
        if self.is_closed() {
            Err(ValidationError::Closed {
                status: self.status,
            })
        } else {
            Ok(())
        }
    }

    /// Append a communicated party
    pub fn add_pessoa_comunicada(&self, pessoa: PessoaComunicada) -> Result<Self, ValidationError> {
        self.ensure_open()?;
        require("pessoasComunicadas.nome", &pessoa.nome)?;

        let mut next = self.clone();
        next.pessoas_comunicadas.push(pessoa);
        next.updated_at = Utc::now();
        Ok(next)
    }

    /// Forward the occurrence to a physician for review
    pub fn forward_to_physician(
        &self,
        medico_destino: &str,
        mensagem_medico: &str,
        actor: &str,
    ) -> Result<Self, ValidationError> {
        self.ensure_open()?;
        require("medicoDestino", medico_destino)?;
        require("mensagemMedico", mensagem_medico)?;

        let mut next = self.clone();
        let now = Utc::now();
        next.medico_destino = Some(medico_destino.to_string());
        next.mensagem_medico = Some(mensagem_medico.to_string());
        next.encaminhada_em = Some(now);
        next.updated_at = now;
        tracing::info!(
            protocolo = %self.display_id(),
            medico = medico_destino,
            actor,
            "Occurrence forwarded to physician"
        );
        Ok(next)
    }

    /// Check required fields and stored invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.subtipo.belongs_to(self.tipo) {
            return Err(ValidationError::SubtypeMismatch {
                tipo: self.tipo,
                subtipo: self.subtipo,
            });
        }
        if let Some(patient) = &self.patient_data {
            require("patientData.nome", &patient.nome)?;
        }
        if let Some(registrador) = &self.registrador_data {
            require("registradorData.nome", &registrador.nome)?;
            require("registradorData.setor", &registrador.setor)?;
        }
        for (i, pessoa) in self.pessoas_comunicadas.iter().enumerate() {
            require(format!("pessoasComunicadas[{}].nome", i), &pessoa.nome)?;
        }
        if let Some(outcome) = &self.outcome {
            outcome.content.validate()?;
            require("outcome.definidoPor", &outcome.definido_por)?;
        }
        if self.medico_destino.is_some() {
            require(
                "mensagemMedico",
                self.mensagem_medico.as_deref().unwrap_or_default(),
            )?;
        }
        Ok(())
    }
}
