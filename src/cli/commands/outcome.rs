//! `occ outcome` command - Attach or replace an occurrence's outcome

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{actor, open_service, print_json, report, resolve_protocolo};
use crate::cli::GlobalOpts;
use crate::entities::classification::OutcomeType;
use crate::entities::outcome::{ExternalNotification, OutcomeDraft};
use crate::yaml::parse_yaml;

#[derive(clap::Args, Debug)]
pub struct OutcomeArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// Read the outcome from a YAML or JSON file
    #[arg(long, short = 'f', conflicts_with_all = ["tipo", "justificativa"])]
    pub file: Option<PathBuf>,

    /// Outcome type (repeatable)
    #[arg(long = "tipo", short = 't')]
    pub tipo: Vec<OutcomeType>,

    /// Rationale for the outcome
    #[arg(long, short = 'j')]
    pub justificativa: Option<String>,

    /// Primary outcome among the selected types
    #[arg(long)]
    pub principal: Option<OutcomeType>,

    /// External body that was notified
    #[arg(long, requires_all = ["data_notificacao", "responsavel_notificacao"])]
    pub orgao: Option<String>,

    /// Notification date (YYYY-MM-DD)
    #[arg(long, requires = "orgao")]
    pub data_notificacao: Option<NaiveDate>,

    /// Person who sent the notification
    #[arg(long, requires = "orgao")]
    pub responsavel_notificacao: Option<String>,
}

/// The submitted draft, and whether it states its own CAPA list
///
/// Inline flags never carry CAPAs. A file carries them only when it has a
/// `capas` key, so an explicit `capas: []` clears pending CAPAs.
fn draft_from_args(args: &OutcomeArgs) -> Result<(OutcomeDraft, bool)> {
    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path).into_diagnostic()?;
        let filename = path.display().to_string();
        let raw: serde_yml::Value = parse_yaml(&content, &filename)?;
        let draft: OutcomeDraft = parse_yaml(&content, &filename)?;
        return Ok((draft, raw.get("capas").is_some()));
    }

    let mut draft = OutcomeDraft::new(
        args.tipo.iter().copied(),
        args.justificativa.clone().unwrap_or_default(),
    );
    if let Some(p) = args.principal {
        draft = draft.with_primary(p);
    }
    if let (Some(orgao), Some(data), Some(resp)) = (
        &args.orgao,
        args.data_notificacao,
        &args.responsavel_notificacao,
    ) {
        draft = draft.with_notification(ExternalNotification::new(orgao, data, resp));
    }
    Ok((draft, false))
}

pub fn run(args: OutcomeArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let (draft, lists_capas) = draft_from_args(&args)?;

    let occ = if lists_capas {
        service.attach_outcome(&protocolo, draft, &actor(global))
    } else {
        service.attach_outcome_keeping_capas(&protocolo, draft, &actor(global))
    }
    .map_err(report)?;

    if global.json {
        return print_json(&occ.outcome);
    }
    println!(
        "{} Outcome recorded for {}",
        style("✓").green(),
        style(occ.display_id()).cyan()
    );
    Ok(())
}
