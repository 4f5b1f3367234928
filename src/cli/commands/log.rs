//! `occ log` command - Audit trail and triage history
//!
//! Without a protocol, shows status changes across every occurrence in
//! chronological order.

use chrono::{DateTime, Utc};
use console::style;
use miette::Result;

use crate::cli::helpers::{open_service, print_json, report, resolve_protocolo};
use crate::cli::GlobalOpts;
use crate::entities::occurrence::Occurrence;
use crate::store::OccurrenceStore;

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Protocol (or unique prefix); all occurrences when omitted
    pub protocolo: Option<String>,

    /// Filter by actor
    #[arg(long, short = 'a')]
    pub by: Option<String>,

    /// Limit number of events (most recent kept)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// One line of the log
#[derive(Debug, Clone, serde::Serialize)]
struct LogEntry {
    at: DateTime<Utc>,
    protocolo: String,
    event: String,
    detail: String,
    actor: String,
}

fn entries_for(occ: &Occurrence) -> Vec<LogEntry> {
    let protocolo = occ.display_id();
    let transitions = occ.auditoria.iter().map(|a| LogEntry {
        at: a.at,
        protocolo: protocolo.clone(),
        event: "status".to_string(),
        detail: format!("{} → {}", a.from_status, a.to_status),
        actor: a.actor.clone(),
    });
    let triage = occ.historico_triagem.iter().map(|t| LogEntry {
        at: t.atribuido_em,
        protocolo: protocolo.clone(),
        event: "triage".to_string(),
        detail: format!("{} ({})", t.classificacao, t.mudanca),
        actor: t.atribuido_por.clone(),
    });
    transitions.chain(triage).collect()
}

pub fn run(args: LogArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;

    let occurrences = match &args.protocolo {
        Some(query) => {
            let protocolo = resolve_protocolo(service.store(), query)?;
            vec![service.load(&protocolo).map_err(report)?]
        }
        None => service.store().list().map_err(report)?,
    };

    let mut entries: Vec<LogEntry> = occurrences
        .iter()
        .flat_map(entries_for)
        .filter(|e| {
            args.by
                .as_ref()
                .map_or(true, |by| e.actor.eq_ignore_ascii_case(by))
        })
        .collect();
    entries.sort_by(|a, b| a.at.cmp(&b.at));
    if let Some(limit) = args.limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }

    if global.json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No events recorded.");
        return Ok(());
    }
    for e in &entries {
        println!(
            "{}  {:<32} {:<7} {:<40} {}",
            style(e.at.format("%Y-%m-%d %H:%M:%S")).dim(),
            style(&e.protocolo).cyan(),
            e.event,
            e.detail,
            style(&e.actor).yellow()
        );
    }
    Ok(())
}
