//! Classification vocabulary for occurrences
//!
//! Occurrence types and subtypes, triage severity levels and outcome types.
//! Wire values are snake_case Portuguese identifiers shared with existing stored
//! records; `label()` returns the display text and is never used for decisions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Error returned when a wire value does not name a known classification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Top-level occurrence category, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceType {
    /// Patient care events
    Assistencial,
    /// Administrative events
    Administrativa,
    /// Equipment, systems and infrastructure
    Tecnica,
    /// Exam review requests
    RevisaoExame,
}

impl OccurrenceType {
    pub fn all() -> &'static [OccurrenceType] {
        &[
            OccurrenceType::Assistencial,
            OccurrenceType::Administrativa,
            OccurrenceType::Tecnica,
            OccurrenceType::RevisaoExame,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceType::Assistencial => "assistencial",
            OccurrenceType::Administrativa => "administrativa",
            OccurrenceType::Tecnica => "tecnica",
            OccurrenceType::RevisaoExame => "revisao_exame",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OccurrenceType::Assistencial => "Assistencial",
            OccurrenceType::Administrativa => "Administrativa",
            OccurrenceType::Tecnica => "Técnica",
            OccurrenceType::RevisaoExame => "Revisão de Exame",
        }
    }

    /// Subtypes permitted under this type
    pub fn subtypes(&self) -> Vec<OccurrenceSubtype> {
        OccurrenceSubtype::all()
            .iter()
            .copied()
            .filter(|s| s.tipo() == *self)
            .collect()
    }
}

impl std::fmt::Display for OccurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OccurrenceType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OccurrenceType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| UnknownValue::new("occurrence type", s))
    }
}

/// Refinement of an occurrence type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceSubtype {
    // assistencial
    Extravasamento,
    QuedasTraumas,
    ErroMedicacao,
    Flebite,
    LesaoPressao,
    ReacaoAdversa,
    IdentificacaoPaciente,
    // administrativa
    Agendamento,
    Atendimento,
    Faturamento,
    Comunicacao,
    // tecnica
    FalhaEquipamento,
    FalhaSistema,
    Infraestrutura,
    QualidadeImagem,
    /// Reserved for compatibility; always implies type `revisao_exame`
    RevisaoExame,
}

impl OccurrenceSubtype {
    pub fn all() -> &'static [OccurrenceSubtype] {
        use OccurrenceSubtype::*;
        &[
            Extravasamento,
            QuedasTraumas,
            ErroMedicacao,
            Flebite,
            LesaoPressao,
            ReacaoAdversa,
            IdentificacaoPaciente,
            Agendamento,
            Atendimento,
            Faturamento,
            Comunicacao,
            FalhaEquipamento,
            FalhaSistema,
            Infraestrutura,
            QualidadeImagem,
            RevisaoExame,
        ]
    }

    /// The type this subtype belongs to
    pub fn tipo(&self) -> OccurrenceType {
        use OccurrenceSubtype::*;
        match self {
            Extravasamento | QuedasTraumas | ErroMedicacao | Flebite | LesaoPressao
            | ReacaoAdversa | IdentificacaoPaciente => OccurrenceType::Assistencial,
            Agendamento | Atendimento | Faturamento | Comunicacao => {
                OccurrenceType::Administrativa
            }
            FalhaEquipamento | FalhaSistema | Infraestrutura | QualidadeImagem => {
                OccurrenceType::Tecnica
            }
            RevisaoExame => OccurrenceType::RevisaoExame,
        }
    }

    pub fn belongs_to(&self, tipo: OccurrenceType) -> bool {
        self.tipo() == tipo
    }

    pub fn as_str(&self) -> &'static str {
        use OccurrenceSubtype::*;
        match self {
            Extravasamento => "extravasamento",
            QuedasTraumas => "quedas_traumas",
            ErroMedicacao => "erro_medicacao",
            Flebite => "flebite",
            LesaoPressao => "lesao_pressao",
            ReacaoAdversa => "reacao_adversa",
            IdentificacaoPaciente => "identificacao_paciente",
            Agendamento => "agendamento",
            Atendimento => "atendimento",
            Faturamento => "faturamento",
            Comunicacao => "comunicacao",
            FalhaEquipamento => "falha_equipamento",
            FalhaSistema => "falha_sistema",
            Infraestrutura => "infraestrutura",
            QualidadeImagem => "qualidade_imagem",
            RevisaoExame => "revisao_exame",
        }
    }

    pub fn label(&self) -> &'static str {
        use OccurrenceSubtype::*;
        match self {
            Extravasamento => "Extravasamento",
            QuedasTraumas => "Quedas e Traumas",
            ErroMedicacao => "Erro de Medicação",
            Flebite => "Flebite",
            LesaoPressao => "Lesão por Pressão",
            ReacaoAdversa => "Reação Adversa",
            IdentificacaoPaciente => "Identificação do Paciente",
            Agendamento => "Agendamento",
            Atendimento => "Atendimento",
            Faturamento => "Faturamento",
            Comunicacao => "Comunicação",
            FalhaEquipamento => "Falha de Equipamento",
            FalhaSistema => "Falha de Sistema",
            Infraestrutura => "Infraestrutura",
            QualidadeImagem => "Qualidade de Imagem",
            RevisaoExame => "Revisão de Exame",
        }
    }
}

impl std::fmt::Display for OccurrenceSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OccurrenceSubtype {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        OccurrenceSubtype::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownValue::new("occurrence subtype", s))
    }
}

/// Triage severity, declared in ascending order
///
/// The derived `Ord` follows the discriminants, so
/// `CircunstanciaRisco < NearMiss < IncidenteSemDano < EventoAdverso < EventoSentinela`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TriageClassification {
    /// Circumstance with potential to cause harm
    CircunstanciaRisco = 1,
    /// Event intercepted before reaching the patient
    NearMiss = 2,
    /// Reached the patient without harm
    IncidenteSemDano = 3,
    /// Reached the patient and caused harm
    EventoAdverso = 4,
    /// Death or severe permanent harm
    EventoSentinela = 5,
}

impl TriageClassification {
    pub fn all() -> &'static [TriageClassification] {
        &[
            TriageClassification::CircunstanciaRisco,
            TriageClassification::NearMiss,
            TriageClassification::IncidenteSemDano,
            TriageClassification::EventoAdverso,
            TriageClassification::EventoSentinela,
        ]
    }

    /// Position in the severity order (1 = least severe)
    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub fn is_sentinel(&self) -> bool {
        *self == TriageClassification::EventoSentinela
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TriageClassification::CircunstanciaRisco => "circunstancia_risco",
            TriageClassification::NearMiss => "near_miss",
            TriageClassification::IncidenteSemDano => "incidente_sem_dano",
            TriageClassification::EventoAdverso => "evento_adverso",
            TriageClassification::EventoSentinela => "evento_sentinela",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TriageClassification::CircunstanciaRisco => "Circunstância de Risco",
            TriageClassification::NearMiss => "Near Miss",
            TriageClassification::IncidenteSemDano => "Incidente sem Dano",
            TriageClassification::EventoAdverso => "Evento Adverso",
            TriageClassification::EventoSentinela => "Evento Sentinela",
        }
    }
}

impl std::fmt::Display for TriageClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TriageClassification {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TriageClassification::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownValue::new("triage classification", s))
    }
}

/// How an occurrence was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeType {
    /// Report found to be unfounded
    Improcedente,
    /// Staff guidance
    Orientacao,
    /// Training delivered
    Treinamento,
    /// Process change
    AlteracaoProcesso,
    /// Corrective maintenance
    ManutencaoCorretiva,
    /// Disciplinary action
    AcaoDisciplinar,
    /// Mandatory notification to an external body
    NotificacaoExterna,
}

impl OutcomeType {
    pub fn all() -> &'static [OutcomeType] {
        &[
            OutcomeType::Improcedente,
            OutcomeType::Orientacao,
            OutcomeType::Treinamento,
            OutcomeType::AlteracaoProcesso,
            OutcomeType::ManutencaoCorretiva,
            OutcomeType::AcaoDisciplinar,
            OutcomeType::NotificacaoExterna,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeType::Improcedente => "improcedente",
            OutcomeType::Orientacao => "orientacao",
            OutcomeType::Treinamento => "treinamento",
            OutcomeType::AlteracaoProcesso => "alteracao_processo",
            OutcomeType::ManutencaoCorretiva => "manutencao_corretiva",
            OutcomeType::AcaoDisciplinar => "acao_disciplinar",
            OutcomeType::NotificacaoExterna => "notificacao_externa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeType::Improcedente => "Improcedente",
            OutcomeType::Orientacao => "Orientação",
            OutcomeType::Treinamento => "Treinamento",
            OutcomeType::AlteracaoProcesso => "Alteração de Processo",
            OutcomeType::ManutencaoCorretiva => "Manutenção Corretiva",
            OutcomeType::AcaoDisciplinar => "Ação Disciplinar",
            OutcomeType::NotificacaoExterna => "Notificação Externa",
        }
    }
}

impl std::fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutcomeType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        OutcomeType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownValue::new("outcome type", s))
    }
}
