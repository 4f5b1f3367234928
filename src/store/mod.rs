//! Storage adapters for occurrence records
//!
//! Stores persist whole records keyed by protocol and enforce optimistic
//! concurrency: a save succeeds only if the stored `versao` still matches the
//! version the caller read. The append-only sequences (audit trail, triage
//! history, communicated parties) are checked at this edge too.

pub mod memory;
pub mod service;
pub mod yaml_file;

pub use memory::MemoryStore;
pub use service::OccurrenceService;
pub use yaml_file::YamlFileStore;

use thiserror::Error;

use crate::core::error::ErrorKind;
use crate::core::identity::Protocolo;
use crate::entities::classification::{OccurrenceSubtype, OccurrenceType};
use crate::entities::occurrence::Occurrence;
use crate::yaml::YamlError;

/// Errors raised by occurrence stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Occurrence not found: {protocolo}")]
    NotFound { protocolo: Protocolo },

    #[error("Occurrence {protocolo} changed since it was read (read version {expected}, stored version {found}); reload and retry")]
    Conflict {
        protocolo: Protocolo,
        expected: u64,
        found: u64,
    },

    #[error("Occurrence {protocolo} already exists")]
    AlreadyExists { protocolo: Protocolo },

    #[error("Occurrence has no protocol; insert it before saving")]
    Unsaved,

    #[error("Occurrence {protocolo}: {field} is append-only and the update rewrites existing entries")]
    HistoryRewritten {
        protocolo: Protocolo,
        field: &'static str,
    },

    #[error("Failed to read stored occurrence: {0}")]
    Yaml(#[from] YamlError),

    #[error("Failed to serialize occurrence: {0}")]
    Serialize(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Conflict { .. } | StoreError::AlreadyExists { .. } => ErrorKind::Conflict,
            StoreError::NotFound { .. } | StoreError::Yaml(_) => ErrorKind::InvalidValue,
            StoreError::Unsaved | StoreError::HistoryRewritten { .. } => ErrorKind::InvalidState,
            StoreError::Serialize(_) | StoreError::Io(_) | StoreError::Poisoned => {
                ErrorKind::Storage
            }
        }
    }
}

/// Persistence boundary for occurrence records
pub trait OccurrenceStore {
    /// Load an occurrence by protocol
    fn load(&self, protocolo: &Protocolo) -> Result<Occurrence, StoreError>;

    /// Persist a new occurrence, assigning its protocol when absent
    ///
    /// The stored record starts at version 1.
    fn insert(&self, occurrence: Occurrence) -> Result<Occurrence, StoreError>;

    /// Replace a stored occurrence
    ///
    /// `occurrence.versao` must equal the stored version; the returned record
    /// carries the incremented version.
    fn save(&self, occurrence: Occurrence) -> Result<Occurrence, StoreError>;

    /// All stored occurrences, oldest first
    fn list(&self) -> Result<Vec<Occurrence>, StoreError>;
}

/// Assign a protocol on first persist
pub(crate) fn prepare_insert(mut occurrence: Occurrence) -> Occurrence {
    if occurrence.protocolo.is_none() {
        occurrence.protocolo = Some(Protocolo::new());
    }
    occurrence.versao = 1;
    occurrence
}

fn is_prefix<T: PartialEq>(stored: &[T], next: &[T]) -> bool {
    next.len() >= stored.len() && next[..stored.len()] == *stored
}

/// Check version and append-only sequences before replacing `stored` with `next`
pub(crate) fn check_update(stored: &Occurrence, next: &Occurrence) -> Result<(), StoreError> {
    let protocolo = next.protocolo.clone().ok_or(StoreError::Unsaved)?;

    if stored.versao != next.versao {
        return Err(StoreError::Conflict {
            protocolo,
            expected: next.versao,
            found: stored.versao,
        });
    }

    let sequences = [
        ("auditoria", is_prefix(&stored.auditoria, &next.auditoria)),
        (
            "historicoTriagem",
            is_prefix(&stored.historico_triagem, &next.historico_triagem),
        ),
        (
            "pessoasComunicadas",
            is_prefix(&stored.pessoas_comunicadas, &next.pessoas_comunicadas),
        ),
    ];
    if let Some((field, _)) = sequences.iter().find(|(_, ok)| !ok) {
        return Err(StoreError::HistoryRewritten { protocolo, field });
    }
    Ok(())
}

/// Translate the legacy storage shape into the canonical one
///
/// Older records keep `revisao_exame` only as a subtype under another type.
pub fn normalize_legacy(mut occurrence: Occurrence) -> Occurrence {
    if occurrence.subtipo == OccurrenceSubtype::RevisaoExame
        && occurrence.tipo != OccurrenceType::RevisaoExame
    {
        tracing::debug!(
            protocolo = %occurrence.display_id(),
            tipo = %occurrence.tipo,
            "Normalizing legacy revisao_exame record"
        );
        occurrence.tipo = OccurrenceType::RevisaoExame;
    }
    occurrence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::occurrence::{AuditEntry, PessoaComunicada};
    use crate::core::status::OccurrenceStatus;
    use chrono::Utc;

    fn stored() -> Occurrence {
        prepare_insert(
            Occurrence::new(
                OccurrenceType::Assistencial,
                OccurrenceSubtype::Flebite,
                "Flebite em MSE",
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_prepare_insert_assigns_protocol_once() {
        let occ = stored();
        let protocolo = occ.protocolo.clone();
        assert!(protocolo.is_some());
        assert_eq!(prepare_insert(occ).protocolo, protocolo);
    }

    #[test]
    fn test_check_update_version_mismatch() {
        let s = stored();
        let mut next = s.clone();
        next.versao = 0;
        assert!(matches!(
            check_update(&s, &next),
            Err(StoreError::Conflict { expected: 0, found: 1, .. })
        ));
    }

    #[test]
    fn test_check_update_rejects_rewritten_audit() {
        let mut s = stored();
        s.auditoria.push(AuditEntry {
            from_status: OccurrenceStatus::Registrada,
            to_status: OccurrenceStatus::EmTriagem,
            actor: "ana".to_string(),
            at: Utc::now(),
        });
        let mut next = s.clone();
        next.auditoria[0].actor = "mallory".to_string();
        assert!(matches!(
            check_update(&s, &next),
            Err(StoreError::HistoryRewritten { field: "auditoria", .. })
        ));

        let mut next = s.clone();
        next.auditoria.clear();
        assert!(check_update(&s, &next).is_err());
    }

    #[test]
    fn test_check_update_allows_appends() {
        let s = stored();
        let mut next = s.clone();
        next.pessoas_comunicadas.push(PessoaComunicada {
            nome: "Mãe".to_string(),
            ..Default::default()
        });
        assert!(check_update(&s, &next).is_ok());
    }

    #[test]
    fn test_normalize_legacy_revisao_exame() {
        let mut occ = stored();
        occ.tipo = OccurrenceType::Assistencial;
        occ.subtipo = OccurrenceSubtype::RevisaoExame;
        let occ = normalize_legacy(occ);
        assert_eq!(occ.tipo, OccurrenceType::RevisaoExame);

        let untouched = normalize_legacy(stored());
        assert_eq!(untouched.tipo, OccurrenceType::Assistencial);
    }
}
