//! `occ transition` command - Move an occurrence through the workflow

use console::style;
use miette::Result;

use crate::cli::helpers::{actor, open_service, print_json, report, resolve_protocolo, styled_status};
use crate::cli::GlobalOpts;
use crate::core::status::OccurrenceStatus;

#[derive(clap::Args, Debug)]
pub struct TransitionArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// Target status; omit to list the transitions available now
    pub status: Option<OccurrenceStatus>,
}

pub fn run(args: TransitionArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;

    let Some(target) = args.status else {
        let occ = service.load(&protocolo).map_err(report)?;
        let available = service.engine().available_transitions(&occ);
        if global.json {
            return print_json(&available);
        }
        if available.is_empty() {
            println!("No transitions available from {}", styled_status(occ.status));
        } else {
            println!("From {}:", styled_status(occ.status));
            for to in available {
                println!("  → {}", styled_status(to));
            }
        }
        return Ok(());
    };

    let before = service.load(&protocolo).map_err(report)?.status;
    let occ = service
        .transition(&protocolo, target, &actor(global))
        .map_err(report)?;

    if global.json {
        return print_json(&occ);
    }
    println!(
        "{} {} {} → {}",
        style("✓").green(),
        style(occ.display_id()).cyan(),
        styled_status(before),
        styled_status(occ.status)
    );
    Ok(())
}
