//! Status workflow tests: transition table, audit trail and closure gates

mod common;

use common::{in_analysis, register, sample_capa, sample_occurrence, service, service_with};
use occ::core::error::ErrorKind;
use occ::core::status::OccurrenceStatus;
use occ::core::triage::assign_triage;
use occ::core::workflow::{GuardFailure, TransitionError, WorkflowEngine};
use occ::core::WorkflowConfig;
use occ::entities::capa::CapaStatus;
use occ::entities::classification::{
    OccurrenceSubtype, OccurrenceType, OutcomeType, TriageClassification,
};
use occ::entities::occurrence::Occurrence;
use occ::entities::outcome::OutcomeDraft;

// ============================================================================
// Transition table
// ============================================================================

#[test]
fn test_pairs_outside_table_are_illegal() {
    let engine = WorkflowEngine::default();
    let (triaged, _) = assign_triage(
        &sample_occurrence(),
        TriageClassification::NearMiss,
        "ana",
    )
    .unwrap();

    for from in OccurrenceStatus::all() {
        for to in OccurrenceStatus::all() {
            let mut occ = triaged.clone();
            occ.status = *from;
            let result = engine.transition(&occ, *to, "ana");

            if from.is_terminal() {
                assert!(
                    matches!(result, Err(TransitionError::Closed { .. })),
                    "{} → {} should be Closed",
                    from,
                    to
                );
            } else if !engine.is_valid_transition(*from, *to) {
                assert!(
                    matches!(
                        result,
                        Err(TransitionError::IllegalTransition {
                            reason: GuardFailure::NotInTable,
                            ..
                        })
                    ),
                    "{} → {} should be illegal",
                    from,
                    to
                );
            }
        }
    }
}

#[test]
fn test_self_transitions_are_illegal() {
    let engine = WorkflowEngine::default();
    let occ = sample_occurrence();
    let err = engine
        .transition(&occ, OccurrenceStatus::Registrada, "ana")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalTransition);
}

#[test]
fn test_triage_required_before_leaving_registrada() {
    let engine = WorkflowEngine::default();
    let err = engine
        .transition(&sample_occurrence(), OccurrenceStatus::EmTriagem, "ana")
        .unwrap_err();
    assert_eq!(
        err,
        TransitionError::IllegalTransition {
            from: OccurrenceStatus::Registrada,
            to: OccurrenceStatus::EmTriagem,
            reason: GuardFailure::TriageMissing,
        }
    );
}

#[test]
fn test_skip_forward_to_analysis() {
    let engine = WorkflowEngine::default();
    let (occ, _) = assign_triage(
        &sample_occurrence(),
        TriageClassification::IncidenteSemDano,
        "ana",
    )
    .unwrap();
    let occ = engine
        .transition(&occ, OccurrenceStatus::EmAnalise, "ana")
        .unwrap();
    assert_eq!(occ.status, OccurrenceStatus::EmAnalise);
}

#[test]
fn test_failed_transition_leaves_input_untouched() {
    let engine = WorkflowEngine::default();
    let occ = sample_occurrence();
    let before = occ.clone();
    let _ = engine.transition(&occ, OccurrenceStatus::Concluida, "ana");
    assert_eq!(occ, before);
}

// ============================================================================
// Audit trail
// ============================================================================

#[test]
fn test_audit_grows_by_one_per_transition() {
    let svc = service();
    let protocolo = in_analysis(&svc, TriageClassification::IncidenteSemDano);
    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::AlteracaoProcesso], "Fluxo revisto").with_capa(sample_capa()),
        "qualidade",
    )
    .unwrap();
    svc.transition(&protocolo, OccurrenceStatus::AcaoEmAndamento, "qualidade")
        .unwrap();
    svc.transition(&protocolo, OccurrenceStatus::EmAnalise, "qualidade")
        .unwrap();

    let occ = svc.load(&protocolo).unwrap();
    assert_eq!(occ.auditoria.len(), 4);

    let path: Vec<_> = occ.auditoria.iter().map(|a| a.to_status).collect();
    assert_eq!(
        path,
        vec![
            OccurrenceStatus::EmTriagem,
            OccurrenceStatus::EmAnalise,
            OccurrenceStatus::AcaoEmAndamento,
            OccurrenceStatus::EmAnalise,
        ]
    );
    for pair in occ.auditoria.windows(2) {
        assert!(pair[0].at <= pair[1].at);
        assert_eq!(pair[0].to_status, pair[1].from_status);
    }
}

#[test]
fn test_rejected_transition_writes_no_audit() {
    let svc = service();
    let protocolo = in_analysis(&svc, TriageClassification::NearMiss);
    assert!(svc
        .transition(&protocolo, OccurrenceStatus::Concluida, "qualidade")
        .is_err());
    assert_eq!(svc.load(&protocolo).unwrap().auditoria.len(), 2);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_outcome_without_capa_closes_directly() {
    let svc = service();
    let occ = Occurrence::new(
        OccurrenceType::Assistencial,
        OccurrenceSubtype::QuedasTraumas,
        "Paciente escorregou ao sair da maca",
    )
    .unwrap();
    let protocolo = svc.register(occ).unwrap().protocolo.unwrap();

    svc.classify(&protocolo, TriageClassification::NearMiss, "enfermeira")
        .unwrap();
    svc.transition(&protocolo, OccurrenceStatus::EmTriagem, "enfermeira")
        .unwrap();
    svc.transition(&protocolo, OccurrenceStatus::EmAnalise, "qualidade")
        .unwrap();
    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::Orientacao], "Treinamento realizado"),
        "qualidade",
    )
    .unwrap();

    let err = svc
        .transition(&protocolo, OccurrenceStatus::AcaoEmAndamento, "qualidade")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalTransition);

    let occ = svc
        .transition(&protocolo, OccurrenceStatus::Concluida, "qualidade")
        .unwrap();
    assert_eq!(occ.status, OccurrenceStatus::Concluida);
    assert!(occ.finalizada_em.is_some());
}

#[test]
fn test_scenario_b_sentinel_needs_capa_to_close() {
    let svc = service();
    let protocolo = in_analysis(&svc, TriageClassification::EventoSentinela);
    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::Orientacao], "Equipe orientada"),
        "qualidade",
    )
    .unwrap();

    let err = svc
        .transition(&protocolo, OccurrenceStatus::Concluida, "qualidade")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalTransition);

    let capa = sample_capa();
    let id = capa.id.clone();
    svc.add_capa(&protocolo, capa, "qualidade").unwrap();
    svc.advance_capa(&protocolo, &id, CapaStatus::EmAndamento, "enfermagem")
        .unwrap();
    svc.record_capa_evidence(&protocolo, &id, "POP revisado e publicado")
        .unwrap();
    svc.advance_capa(&protocolo, &id, CapaStatus::Concluida, "enfermagem")
        .unwrap();
    svc.record_capa_verification(&protocolo, &id, "Sem recorrência em 60 dias", "qualidade")
        .unwrap();
    svc.advance_capa(&protocolo, &id, CapaStatus::Verificada, "qualidade")
        .unwrap();

    let occ = svc
        .transition(&protocolo, OccurrenceStatus::Concluida, "qualidade")
        .unwrap();
    assert_eq!(occ.status, OccurrenceStatus::Concluida);
}

// ============================================================================
// Closure gates
// ============================================================================

#[test]
fn test_open_capas_block_closure() {
    let svc = service();
    let protocolo = in_analysis(&svc, TriageClassification::EventoAdverso);
    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::Treinamento], "Capacitação").with_capa(sample_capa()),
        "qualidade",
    )
    .unwrap();
    svc.transition(&protocolo, OccurrenceStatus::AcaoEmAndamento, "qualidade")
        .unwrap();

    let occ = svc.load(&protocolo).unwrap();
    let err = svc
        .engine()
        .transition(&occ, OccurrenceStatus::Concluida, "qualidade")
        .unwrap_err();
    assert_eq!(
        err,
        TransitionError::IllegalTransition {
            from: OccurrenceStatus::AcaoEmAndamento,
            to: OccurrenceStatus::Concluida,
            reason: GuardFailure::OpenCapas { count: 1 },
        }
    );
}

#[test]
fn test_configured_capa_requirement() {
    let svc = service();
    let protocolo = in_analysis(&svc, TriageClassification::IncidenteSemDano);
    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::ManutencaoCorretiva], "Equipamento reparado"),
        "qualidade",
    )
    .unwrap();
    assert!(svc
        .transition(&protocolo, OccurrenceStatus::Concluida, "qualidade")
        .is_err());

    let relaxed = service_with(WorkflowConfig {
        capa_required_for: vec![],
        ..WorkflowConfig::default()
    });
    let protocolo = in_analysis(&relaxed, TriageClassification::IncidenteSemDano);
    relaxed
        .attach_outcome(
            &protocolo,
            OutcomeDraft::new([OutcomeType::ManutencaoCorretiva], "Equipamento reparado"),
            "qualidade",
        )
        .unwrap();
    assert!(relaxed
        .transition(&protocolo, OccurrenceStatus::Concluida, "qualidade")
        .is_ok());
}

#[test]
fn test_sentinel_acknowledgement_when_configured() {
    let svc = service_with(WorkflowConfig {
        require_sentinel_acknowledgement: true,
        sentinel_requires_capa: false,
        ..WorkflowConfig::default()
    });
    let protocolo = in_analysis(&svc, TriageClassification::EventoSentinela);
    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::Orientacao], "Equipe orientada"),
        "qualidade",
    )
    .unwrap();

    let occ = svc.load(&protocolo).unwrap();
    assert!(matches!(
        svc.engine().transition(&occ, OccurrenceStatus::Concluida, "q"),
        Err(TransitionError::IllegalTransition {
            reason: GuardFailure::SentinelNotAcknowledged,
            ..
        })
    ));

    // Acknowledgement does not need the triage statuses
    svc.acknowledge_sentinel(&protocolo, "diretoria").unwrap();
    assert!(svc
        .transition(&protocolo, OccurrenceStatus::Concluida, "qualidade")
        .is_ok());
}

#[test]
fn test_unfounded_closure() {
    let svc = service();
    let protocolo = in_analysis(&svc, TriageClassification::CircunstanciaRisco);
    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::Improcedente, OutcomeType::Orientacao], "Misto"),
        "qualidade",
    )
    .unwrap();
    assert!(svc
        .transition(&protocolo, OccurrenceStatus::Improcedente, "qualidade")
        .is_err());

    svc.attach_outcome(
        &protocolo,
        OutcomeDraft::new([OutcomeType::Improcedente], "Relato não procede"),
        "qualidade",
    )
    .unwrap();
    let occ = svc
        .transition(&protocolo, OccurrenceStatus::Improcedente, "qualidade")
        .unwrap();
    assert!(occ.is_closed());

    let err = svc
        .transition(&protocolo, OccurrenceStatus::EmAnalise, "qualidade")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Closed);
}

#[test]
fn test_triage_rejected_once_in_analysis() {
    let svc = service();
    let protocolo = in_analysis(&svc, TriageClassification::NearMiss);
    let err = svc
        .classify(&protocolo, TriageClassification::EventoAdverso, "ana")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_available_transitions_follow_guards() {
    let svc = service();
    let protocolo = register(&svc);
    let occ = svc.load(&protocolo).unwrap();
    assert!(svc.engine().available_transitions(&occ).is_empty());

    svc.classify(&protocolo, TriageClassification::NearMiss, "ana")
        .unwrap();
    let occ = svc.load(&protocolo).unwrap();
    assert_eq!(
        svc.engine().available_transitions(&occ),
        vec![OccurrenceStatus::EmTriagem, OccurrenceStatus::EmAnalise]
    );
}
