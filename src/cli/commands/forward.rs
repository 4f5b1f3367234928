//! `occ forward` and `occ inform` commands

use chrono::Utc;
use console::style;
use miette::Result;

use crate::cli::helpers::{actor, open_service, print_json, report, resolve_protocolo};
use crate::cli::GlobalOpts;
use crate::entities::occurrence::PessoaComunicada;

#[derive(clap::Args, Debug)]
pub struct ForwardArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// Physician receiving the occurrence
    #[arg(long)]
    pub medico: String,

    /// Message for the physician
    #[arg(long, short = 'm')]
    pub mensagem: String,
}

#[derive(clap::Args, Debug)]
pub struct InformArgs {
    /// Protocol (or unique prefix)
    pub protocolo: String,

    /// Name of the person informed
    #[arg(long)]
    pub nome: String,

    /// Relationship to the patient (e.g. mãe, cônjuge)
    #[arg(long)]
    pub vinculo: Option<String>,
}

pub fn run(args: ForwardArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let occ = service
        .forward_to_physician(&protocolo, &args.medico, &args.mensagem, &actor(global))
        .map_err(report)?;

    if global.json {
        return print_json(&occ);
    }
    println!(
        "{} {} forwarded to {}",
        style("✓").green(),
        style(occ.display_id()).cyan(),
        args.medico
    );
    Ok(())
}

pub fn run_inform(args: InformArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let protocolo = resolve_protocolo(service.store(), &args.protocolo)?;
    let pessoa = PessoaComunicada {
        nome: args.nome,
        vinculo: args.vinculo,
        comunicado_em: Some(Utc::now()),
    };
    let occ = service
        .add_pessoa_comunicada(&protocolo, pessoa)
        .map_err(report)?;

    if global.json {
        return print_json(&occ.pessoas_comunicadas);
    }
    println!(
        "{} {} person(s) informed about {}",
        style("✓").green(),
        occ.pessoas_comunicadas.len(),
        style(occ.display_id()).cyan()
    );
    Ok(())
}
