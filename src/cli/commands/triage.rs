//! `occ triage` and `occ ack-sentinel` commands

use console::style;
use miette::Result;

use crate::cli::helpers::{actor, open_service, print_json, report, resolve_protocolo, styled_triage};
use crate::cli::GlobalOpts;
use crate::core::triage::TriageChange;
use crate::entities::classification::TriageClassification;

#[derive(clap::Args, Debug)]
pub struct TriageArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// Classification (circunstancia_risco, near_miss, incidente_sem_dano,
    /// evento_adverso, evento_sentinela)
    pub classificacao: TriageClassification,
}

#[derive(clap::Args, Debug)]
pub struct AckArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,
}

pub fn run(args: TriageArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let (occ, assignment) = service
        .classify(&protocolo, args.classificacao, &actor(global))
        .map_err(report)?;

    if global.json {
        return print_json(&assignment);
    }

    let change = match assignment.mudanca {
        TriageChange::Escalation => style("escalated").red().to_string(),
        TriageChange::DeEscalation => style("de-escalated").green().to_string(),
        other => other.to_string(),
    };
    println!(
        "{} {} classified as {} ({})",
        style("✓").green(),
        style(occ.display_id()).cyan(),
        styled_triage(occ.triage),
        change
    );
    if assignment.is_sentinel_escalation() {
        println!(
            "{} Sentinel event: acknowledge with `occ ack-sentinel {}`",
            style("!").red().bold(),
            occ.display_id()
        );
    }
    Ok(())
}

pub fn run_ack(args: AckArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let occ = service
        .acknowledge_sentinel(&protocolo, &actor(global))
        .map_err(report)?;

    if global.json {
        return print_json(&occ.sentinela_reconhecida);
    }
    println!(
        "{} Sentinel event {} acknowledged",
        style("✓").green(),
        style(occ.display_id()).cyan()
    );
    Ok(())
}
