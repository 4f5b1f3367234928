//! `occ validate` command - Check stored occurrence files

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{open_service, report};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files to validate (default: every record in the store)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let store = service.store();

    let files = if args.paths.is_empty() {
        store.record_paths()
    } else {
        args.paths.clone()
    };

    println!(
        "{} Validating {} file(s)...\n",
        style("→").blue(),
        files.len()
    );

    let mut stats = ValidationStats::default();
    for path in &files {
        stats.files_checked += 1;
        let result = store
            .read_path(path)
            .map_err(report)
            .and_then(|occ| occ.validate().map_err(report));

        match result {
            Ok(()) => {
                stats.files_passed += 1;
                if !args.summary {
                    println!("{} {}", style("✓").green(), path.display());
                }
            }
            Err(e) => {
                stats.files_failed += 1;
                if !args.summary {
                    println!("{} {}", style("✗").red(), path.display());
                    println!("    {}", e);
                }
            }
        }
    }

    println!();
    println!(
        "Checked {} file(s): {} passed, {} failed",
        stats.files_checked,
        style(stats.files_passed).green(),
        style(stats.files_failed).red()
    );

    if stats.files_failed > 0 {
        Err(miette::miette!(
            code = "occ::invalid_value",
            "{} file(s) failed validation",
            stats.files_failed
        ))
    } else {
        Ok(())
    }
}
