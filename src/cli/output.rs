//! Human-readable rendering of occurrences

use console::style;

use crate::cli::helpers::{styled_status, styled_triage};
use crate::entities::capa::{Capa, CapaStatus};
use crate::entities::occurrence::Occurrence;
use crate::entities::outcome::OccurrenceOutcome;

pub fn print_occurrence(occ: &Occurrence) {
    println!(
        "{} {}",
        style(occ.display_id()).cyan(),
        style(format!("{} / {}", occ.tipo.label(), occ.subtipo.label())).bold()
    );
    println!();
    println!("  Status:      {}", styled_status(occ.status));
    println!("  Triage:      {}", styled_triage(occ.triage));
    if let Some(ack) = &occ.sentinela_reconhecida {
        println!(
            "  Sentinel:    acknowledged by {} at {}",
            ack.reconhecido_por,
            ack.reconhecido_em.format("%Y-%m-%d %H:%M")
        );
    } else if occ.is_sentinel() {
        println!("  Sentinel:    {}", style("not acknowledged").red());
    }
    println!("  Created:     {}", occ.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(at) = occ.finalizada_em {
        println!("  Closed:      {}", at.format("%Y-%m-%d %H:%M"));
    }
    println!("  Version:     {}", occ.versao);

    if let Some(p) = &occ.patient_data {
        println!("  Patient:     {}", p.nome);
        if let Some(prontuario) = &p.prontuario {
            println!("  Record:      {}", prontuario);
        }
    }
    if let Some(r) = &occ.registrador_data {
        println!("  Reporter:    {} ({})", r.nome, r.setor);
    }
    if let Some(medico) = &occ.medico_destino {
        println!("  Forwarded:   {}", medico);
    }

    println!();
    println!("  {}", style("Description:").dim());
    for line in occ.descricao.lines() {
        println!("    {}", line);
    }

    if let Some(msg) = &occ.mensagem_medico {
        println!();
        println!("  {}", style("Message to physician:").dim());
        for line in msg.lines() {
            println!("    {}", line);
        }
    }

    if !occ.pessoas_comunicadas.is_empty() {
        println!();
        println!("  {}", style("Informed:").dim());
        for p in &occ.pessoas_comunicadas {
            match &p.vinculo {
                Some(v) => println!("    {} ({})", p.nome, v),
                None => println!("    {}", p.nome),
            }
        }
    }

    if let Some(outcome) = &occ.outcome {
        println!();
        print_outcome(outcome);
    }
}

fn print_outcome(outcome: &OccurrenceOutcome) {
    let tipos: Vec<&str> = outcome.tipos().iter().map(|t| t.as_str()).collect();
    println!("  {}", style("Outcome:").dim());
    println!("    Types:     {}", tipos.join(", "));
    if let Some(p) = outcome.content.desfecho_principal {
        println!("    Primary:   {}", p);
    }
    println!(
        "    Defined:   {} at {}",
        outcome.definido_por,
        outcome.definido_em.format("%Y-%m-%d %H:%M")
    );
    if let Some(n) = &outcome.content.notificacao_externa {
        println!("    Notified:  {} on {} by {}", n.orgao_notificado, n.data, n.responsavel);
    }
    println!("    {}", outcome.content.justificativa);

    for capa in outcome.capas() {
        print_capa(capa);
    }
}

pub fn print_capa(capa: &Capa) {
    let status = match capa.status {
        CapaStatus::Verificada => style(capa.status.as_str()).green(),
        CapaStatus::Concluida => style(capa.status.as_str()).cyan(),
        _ => style(capa.status.as_str()).yellow(),
    };
    println!();
    println!("    {} [{}]", style(&capa.id).cyan(), status);
    println!("      Root cause:  {}", capa.causa_raiz);
    println!("      Action:      {}", capa.acao);
    println!("      Owner:       {} (due {})", capa.responsavel, capa.prazo);
    if let Some(e) = &capa.evidencia {
        println!("      Evidence:    {}", e);
    }
    if let (Some(v), Some(por)) = (&capa.verificacao_eficacia, &capa.verificado_por) {
        println!("      Verified:    {} ({})", v, por);
    }
}
