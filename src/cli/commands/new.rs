//! `occ new` command - Register an occurrence

use chrono::NaiveDate;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_service, print_json, report};
use crate::cli::GlobalOpts;
use crate::entities::classification::{OccurrenceSubtype, OccurrenceType};
use crate::entities::occurrence::{Occurrence, PatientData, RegistradorData};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Occurrence type (assistencial, administrativa, tecnica, revisao_exame)
    #[arg(long, short = 't')]
    pub tipo: OccurrenceType,

    /// Occurrence subtype (must belong to the type)
    #[arg(long, short = 's')]
    pub subtipo: OccurrenceSubtype,

    /// What happened
    #[arg(long, short = 'd')]
    pub descricao: String,

    /// Patient name
    #[arg(long)]
    pub paciente: Option<String>,

    /// Patient medical record number
    #[arg(long, requires = "paciente")]
    pub prontuario: Option<String>,

    /// Patient date of birth (YYYY-MM-DD)
    #[arg(long, requires = "paciente")]
    pub nascimento: Option<NaiveDate>,

    /// Sector where the patient was
    #[arg(long, requires = "paciente")]
    pub setor_paciente: Option<String>,

    /// Name of the person reporting
    #[arg(long, requires = "setor")]
    pub registrador: Option<String>,

    /// Sector of the person reporting
    #[arg(long, requires = "registrador")]
    pub setor: Option<String>,

    /// Role of the person reporting
    #[arg(long, requires = "registrador")]
    pub funcao: Option<String>,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;

    let mut occurrence =
        Occurrence::new(args.tipo, args.subtipo, args.descricao).map_err(report)?;

    if let Some(nome) = args.paciente {
        occurrence = occurrence.with_patient(PatientData {
            nome,
            prontuario: args.prontuario,
            data_nascimento: args.nascimento,
            setor: args.setor_paciente,
        });
    }
    if let (Some(nome), Some(setor)) = (args.registrador, args.setor) {
        occurrence = occurrence.with_registrador(RegistradorData {
            nome,
            setor,
            funcao: args.funcao,
            contato: None,
        });
    }

    let saved = service.register(occurrence).map_err(report)?;

    if global.json {
        return print_json(&saved);
    }
    println!(
        "{} Registered {}",
        style("✓").green(),
        style(saved.display_id()).cyan()
    );
    Ok(())
}
