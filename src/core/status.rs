//! Occurrence status values

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::classification::UnknownValue;

/// Lifecycle status of an occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    #[default]
    Registrada,
    EmTriagem,
    EmAnalise,
    AcaoEmAndamento,
    Concluida,
    Improcedente,
}

impl OccurrenceStatus {
    pub fn all() -> &'static [OccurrenceStatus] {
        &[
            OccurrenceStatus::Registrada,
            OccurrenceStatus::EmTriagem,
            OccurrenceStatus::EmAnalise,
            OccurrenceStatus::AcaoEmAndamento,
            OccurrenceStatus::Concluida,
            OccurrenceStatus::Improcedente,
        ]
    }

    /// `concluida` and `improcedente` close the occurrence
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OccurrenceStatus::Concluida | OccurrenceStatus::Improcedente
        )
    }

    /// Triage may only be assigned or revised in these statuses
    pub fn accepts_triage(&self) -> bool {
        matches!(
            self,
            OccurrenceStatus::Registrada | OccurrenceStatus::EmTriagem
        )
    }

    /// Outcomes and CAPAs are edited only in these statuses
    pub fn accepts_outcome(&self) -> bool {
        matches!(
            self,
            OccurrenceStatus::EmAnalise | OccurrenceStatus::AcaoEmAndamento
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceStatus::Registrada => "registrada",
            OccurrenceStatus::EmTriagem => "em_triagem",
            OccurrenceStatus::EmAnalise => "em_analise",
            OccurrenceStatus::AcaoEmAndamento => "acao_em_andamento",
            OccurrenceStatus::Concluida => "concluida",
            OccurrenceStatus::Improcedente => "improcedente",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OccurrenceStatus::Registrada => "Registrada",
            OccurrenceStatus::EmTriagem => "Em Triagem",
            OccurrenceStatus::EmAnalise => "Em Análise",
            OccurrenceStatus::AcaoEmAndamento => "Ação em Andamento",
            OccurrenceStatus::Concluida => "Concluída",
            OccurrenceStatus::Improcedente => "Improcedente",
        }
    }
}

impl std::fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OccurrenceStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        OccurrenceStatus::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| UnknownValue {
                kind: "occurrence status",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(OccurrenceStatus::Concluida.is_terminal());
        assert!(OccurrenceStatus::Improcedente.is_terminal());
        assert!(!OccurrenceStatus::AcaoEmAndamento.is_terminal());
        assert!(!OccurrenceStatus::Registrada.is_terminal());
    }

    #[test]
    fn test_status_display_round_trip() {
        for status in OccurrenceStatus::all() {
            assert_eq!(status.to_string().parse::<OccurrenceStatus>().unwrap(), *status);
        }
        assert!("aberta".parse::<OccurrenceStatus>().is_err());
    }

    #[test]
    fn test_default_is_registrada() {
        assert_eq!(OccurrenceStatus::default(), OccurrenceStatus::Registrada);
    }
}
