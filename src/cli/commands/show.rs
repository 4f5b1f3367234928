//! `occ show` command - Show an occurrence

use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_service, print_json, report, resolve_protocolo};
use crate::cli::output::print_occurrence;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// Print the stored YAML record
    #[arg(long)]
    pub yaml: bool,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let occ = service.load(&protocolo).map_err(report)?;

    if global.json {
        print_json(&occ)
    } else if args.yaml {
        print!("{}", serde_yml::to_string(&occ).into_diagnostic()?);
        Ok(())
    } else {
        print_occurrence(&occ);
        Ok(())
    }
}
