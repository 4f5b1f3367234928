//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use chrono::NaiveDate;
use tempfile::TempDir;

use occ::core::identity::Protocolo;
use occ::core::status::OccurrenceStatus;
use occ::core::workflow::WorkflowEngine;
use occ::core::WorkflowConfig;
use occ::entities::capa::Capa;
use occ::entities::classification::{OccurrenceSubtype, OccurrenceType, TriageClassification};
use occ::entities::occurrence::Occurrence;
use occ::store::{MemoryStore, OccurrenceService};

/// Helper to get an occ command bound to a store directory
pub fn occ(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("occ"));
    cmd.env_remove("OCC_CONFIG")
        .env_remove("RUST_LOG")
        .env("OCC_STORE", tmp.path().join("store"))
        .env("OCC_ACTOR", "tester")
        .current_dir(tmp.path());
    cmd
}

/// Helper to register an occurrence through the CLI and return its protocol
pub fn create_occurrence(tmp: &TempDir, tipo: &str, subtipo: &str, descricao: &str) -> String {
    let output = occ(tmp)
        .args([
            "--json",
            "new",
            "--tipo",
            tipo,
            "--subtipo",
            subtipo,
            "--descricao",
            descricao,
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "occ new failed: {:?}", output);

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value["protocolo"].as_str().unwrap().to_string()
}

/// In-memory service with default configuration
pub fn service() -> OccurrenceService<MemoryStore> {
    service_with(WorkflowConfig::default())
}

pub fn service_with(config: WorkflowConfig) -> OccurrenceService<MemoryStore> {
    OccurrenceService::new(MemoryStore::new(), WorkflowEngine::new(config))
}

pub fn sample_occurrence() -> Occurrence {
    Occurrence::new(
        OccurrenceType::Assistencial,
        OccurrenceSubtype::Extravasamento,
        "Extravasamento de contraste em MSD",
    )
    .unwrap()
}

pub fn register(svc: &OccurrenceService<MemoryStore>) -> Protocolo {
    svc.register(sample_occurrence()).unwrap().protocolo.unwrap()
}

/// Register, triage and move an occurrence into analysis
pub fn in_analysis(
    svc: &OccurrenceService<MemoryStore>,
    triage: TriageClassification,
) -> Protocolo {
    let protocolo = register(svc);
    svc.classify(&protocolo, triage, "enfermeira").unwrap();
    svc.transition(&protocolo, OccurrenceStatus::EmTriagem, "enfermeira")
        .unwrap();
    svc.transition(&protocolo, OccurrenceStatus::EmAnalise, "qualidade")
        .unwrap();
    protocolo
}

pub fn sample_capa() -> Capa {
    Capa::new(
        "Acesso venoso sem checagem de refluxo",
        "Revisar POP de punção e treinar equipe",
        "Coordenação de enfermagem",
        NaiveDate::from_ymd_opt(2026, 12, 15).unwrap(),
    )
}
