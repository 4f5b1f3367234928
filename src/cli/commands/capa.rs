//! `occ capa` command - Corrective and preventive actions

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{actor, open_service, print_json, report, resolve_protocolo};
use crate::cli::output::print_capa;
use crate::cli::GlobalOpts;
use crate::core::identity::CapaId;
use crate::entities::capa::{Capa, CapaStatus};
use crate::entities::occurrence::Occurrence;

#[derive(Subcommand, Debug)]
pub enum CapaCommands {
    /// Add a CAPA to the outcome
    Add(AddArgs),

    /// Record evidence that the action was carried out
    Evidence(EvidenceArgs),

    /// Record the effectiveness check
    Verify(VerifyArgs),

    /// Advance a CAPA to its next status
    Advance(AdvanceArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// Root cause being addressed
    #[arg(long)]
    pub causa: String,

    /// Action to be taken
    #[arg(long)]
    pub acao: String,

    /// Person accountable for the action
    #[arg(long)]
    pub responsavel: String,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub prazo: NaiveDate,
}

#[derive(clap::Args, Debug)]
pub struct EvidenceArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// CAPA id
    pub capa: CapaId,

    /// Evidence text or reference
    pub evidencia: String,
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// CAPA id
    pub capa: CapaId,

    /// Effectiveness check notes
    #[arg(long)]
    pub eficacia: String,

    /// Person who verified (defaults to the actor)
    #[arg(long)]
    pub por: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AdvanceArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// CAPA id
    pub capa: CapaId,

    /// Target status (em_andamento, concluida, verificada)
    pub status: CapaStatus,
}

pub fn run(cmd: CapaCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CapaCommands::Add(args) => run_add(args, global),
        CapaCommands::Evidence(args) => run_evidence(args, global),
        CapaCommands::Verify(args) => run_verify(args, global),
        CapaCommands::Advance(args) => run_advance(args, global),
    }
}

fn finish(occ: &Occurrence, id: &CapaId, message: &str, global: &GlobalOpts) -> Result<()> {
    let capa = occ.outcome.as_ref().and_then(|o| o.capa(id));
    if global.json {
        return print_json(&capa);
    }
    println!("{} {}", style("✓").green(), message);
    if let Some(capa) = capa {
        print_capa(capa);
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let capa = Capa::new(args.causa, args.acao, args.responsavel, args.prazo);
    let id = capa.id.clone();

    let occ = service
        .add_capa(&protocolo, capa, &actor(global))
        .map_err(report)?;
    finish(&occ, &id, &format!("CAPA {} added", id), global)
}

fn run_evidence(args: EvidenceArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let occ = service
        .record_capa_evidence(&protocolo, &args.capa, &args.evidencia)
        .map_err(report)?;
    finish(&occ, &args.capa, "Evidence recorded", global)
}

fn run_verify(args: VerifyArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let por = args.por.unwrap_or_else(|| actor(global));
    let occ = service
        .record_capa_verification(&protocolo, &args.capa, &args.eficacia, &por)
        .map_err(report)?;
    finish(&occ, &args.capa, "Verification recorded", global)
}

fn run_advance(args: AdvanceArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let occ = service
        .advance_capa(&protocolo, &args.capa, args.status, &actor(global))
        .map_err(report)?;
    finish(
        &occ,
        &args.capa,
        &format!("CAPA {} is now {}", args.capa, args.status),
        global,
    )
}
