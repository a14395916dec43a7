//! Gridcalc - command-line front end for the grid calculation engine

mod cli;
mod config;

use anyhow::Context;
use gridcalc_core::{CellRef, CellSnapshot, Document};
use serde::Serialize;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::env;

/// One cell in `--json` output.
#[derive(Serialize)]
struct CellReport {
    cell: String,
    #[serde(flatten)]
    snapshot: CellSnapshot,
    references: Vec<String>,
}

fn main() {
    let options = match cli::parse_args(env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            cli::print_usage();
            return;
        }
        Err(msg) => {
            eprintln!("Error: {}", msg);
            cli::print_usage();
            std::process::exit(1);
        }
    };

    let (settings, mut warnings) = if options.no_config {
        (config::Settings::default(), Vec::new())
    } else {
        config::load_settings(options.config.as_deref())
    };
    let level = settings.level_filter(options.verbose, &mut warnings);
    if TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .is_err()
    {
        eprintln!("Warning: logger already initialised");
    }
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut doc = Document::with_options(settings.engine);
    if let Err(e) = run(&options, &mut doc) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: &cli::Options, doc: &mut Document) -> anyhow::Result<()> {
    if let Some(path) = &options.file {
        doc.load_csv(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }

    for edit in &options.edits {
        log::debug!("applying {:?}", edit);
        for failure in edit.apply(doc) {
            eprintln!("Warning: {}", failure);
        }
    }
    log::info!(
        "applied {} edit(s), {} cell(s) in use",
        options.edits.len(),
        doc.used_cells().len()
    );

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report(doc))?);
    } else if let Some(path) = &options.output {
        doc.save_csv(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Exported to {}", path.display());
    } else {
        println!("{}", doc.export_csv());
    }
    Ok(())
}

fn report(doc: &Document) -> Vec<CellReport> {
    doc.used_cells()
        .into_iter()
        .map(|cell: CellRef| CellReport {
            cell: cell.to_string(),
            snapshot: doc.read_cell(cell.row, cell.col),
            references: doc
                .references_of(cell.row, cell.col)
                .iter()
                .map(CellRef::to_string)
                .collect(),
        })
        .collect()
}
