//! Shared helper functions for CLI commands

use console::{style, StyledObject};
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::config::WorkflowConfig;
use crate::core::error::OccurrenceError;
use crate::core::identity::Protocolo;
use crate::core::status::OccurrenceStatus;
use crate::core::workflow::WorkflowEngine;
use crate::entities::classification::TriageClassification;
use crate::store::{OccurrenceService, OccurrenceStore, YamlFileStore};

/// Turn a core error into a report carrying its kind as the diagnostic code
pub fn report(err: impl Into<OccurrenceError>) -> miette::Report {
    let err = err.into();
    miette::miette!(code = format!("occ::{}", err.kind()), "{}", err)
}

/// Name recorded as the actor of mutating commands
pub fn actor(global: &GlobalOpts) -> String {
    global
        .actor
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Open the file store and workflow engine selected by the global options
pub fn open_service(global: &GlobalOpts) -> Result<OccurrenceService<YamlFileStore>> {
    let config = WorkflowConfig::load_or_default(global.config.as_deref())?;
    let store = YamlFileStore::open(&global.store).map_err(report)?;
    Ok(OccurrenceService::new(store, WorkflowEngine::new(config)))
}

/// Resolve a full protocol or a unique prefix of one
///
/// The `OC-` prefix is optional and matching is case-insensitive.
pub fn resolve_protocolo(store: &impl OccurrenceStore, query: &str) -> Result<Protocolo> {
    if let Ok(protocolo) = query.parse::<Protocolo>() {
        return Ok(protocolo);
    }

    let needle = query.trim().to_uppercase();
    let needle = if needle.starts_with("OC-") {
        needle
    } else {
        format!("OC-{}", needle)
    };

    let matches: Vec<Protocolo> = store
        .list()
        .map_err(report)?
        .into_iter()
        .filter_map(|o| o.protocolo)
        .filter(|p| p.to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(miette::miette!(
            code = "occ::invalid_value",
            "No occurrence found matching '{}'",
            query
        )),
        [only] => Ok(only.clone()),
        many => Err(miette::miette!(
            code = "occ::invalid_value",
            "Ambiguous protocol '{}' matches {} occurrences",
            query,
            many.len()
        )),
    }
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn styled_status(status: OccurrenceStatus) -> StyledObject<&'static str> {
    let s = style(status.as_str());
    match status {
        OccurrenceStatus::Registrada => s.dim(),
        OccurrenceStatus::EmTriagem | OccurrenceStatus::EmAnalise => s.yellow(),
        OccurrenceStatus::AcaoEmAndamento => s.cyan(),
        OccurrenceStatus::Concluida => s.green(),
        OccurrenceStatus::Improcedente => s.dim(),
    }
}

pub fn styled_triage(triage: Option<TriageClassification>) -> StyledObject<&'static str> {
    match triage {
        None => style("-").dim(),
        Some(t) if t.is_sentinel() => style(t.as_str()).red().bold(),
        Some(t) if t >= TriageClassification::EventoAdverso => style(t.as_str()).red(),
        Some(t) => style(t.as_str()),
    }
}

/// Serialize a value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::classification::{OccurrenceSubtype, OccurrenceType};
    use crate::entities::occurrence::Occurrence;
    use crate::store::MemoryStore;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("ação", 4), "ação");
        assert_eq!(truncate_str("manutenção corretiva", 10), "manuten...");
    }

    #[test]
    fn test_resolve_by_prefix() {
        let store = MemoryStore::new();
        let occ = store
            .insert(
                Occurrence::new(
                    OccurrenceType::Tecnica,
                    OccurrenceSubtype::FalhaSistema,
                    "PACS fora do ar",
                )
                .unwrap(),
            )
            .unwrap();
        let protocolo = occ.protocolo.unwrap();
        let full = protocolo.to_string();

        assert_eq!(resolve_protocolo(&store, &full).unwrap(), protocolo);
        let prefix = full[3..12].to_lowercase();
        assert_eq!(resolve_protocolo(&store, &prefix).unwrap(), protocolo);
        assert!(resolve_protocolo(&store, "OC-ZZZZ").is_err());
    }
}
