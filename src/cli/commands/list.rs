//! `occ list` command - List occurrences

use console::style;
use miette::Result;

use crate::cli::helpers::{
    open_service, print_json, report, styled_status, styled_triage, truncate_str,
};
use crate::cli::GlobalOpts;
use crate::core::status::OccurrenceStatus;
use crate::entities::classification::{OccurrenceType, TriageClassification};
use crate::store::OccurrenceStore;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<OccurrenceStatus>,

    /// Filter by type
    #[arg(long, short = 't')]
    pub tipo: Option<OccurrenceType>,

    /// Show only occurrences classified at least this severe
    #[arg(long)]
    pub min_triage: Option<TriageClassification>,

    /// Show only occurrences that are not closed
    #[arg(long)]
    pub open: bool,

    /// Maximum number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let all = service.store().list().map_err(report)?;

    let mut filtered: Vec<_> = all
        .into_iter()
        .filter(|o| args.status.map_or(true, |s| o.status == s))
        .filter(|o| args.tipo.map_or(true, |t| o.tipo == t))
        .filter(|o| {
            args.min_triage
                .map_or(true, |min| o.triage.is_some_and(|t| t >= min))
        })
        .filter(|o| !args.open || !o.is_closed())
        .collect();
    if let Some(limit) = args.limit {
        filtered.truncate(limit);
    }

    if global.json {
        return print_json(&filtered);
    }

    if filtered.is_empty() {
        println!("No occurrences found.");
        return Ok(());
    }

    println!(
        "{:<14} {:<20} {:<24} {:<20} {}",
        style("PROTOCOL").bold(),
        style("STATUS").bold(),
        style("SUBTYPE").bold(),
        style("TRIAGE").bold(),
        style("DESCRIPTION").bold()
    );
    for occ in &filtered {
        let id = occ
            .protocolo
            .as_ref()
            .map(|p| p.short())
            .unwrap_or_else(|| occ.display_id());
        println!(
            "{:<14} {:<20} {:<24} {:<20} {}",
            id,
            styled_status(occ.status),
            occ.subtipo.as_str(),
            styled_triage(occ.triage),
            truncate_str(occ.descricao.lines().next().unwrap_or(""), 40)
        );
    }
    println!();
    println!("{} occurrence(s)", filtered.len());
    Ok(())
}
