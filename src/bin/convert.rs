//! Process plan converter
//!
//! Converts a process plan workbook into MES documents on disk, one JSON file
//! per sheet and line name, or a single zip bundle.
//!
//! Usage:
//!   `cargo run --bin convert -- plans/HAND.xlsx --output out --zip HAND`

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use process_plan_api::config::{ExcelLayout, MetadataPolicy};
use process_plan_api::services::processing::bundle::{build_zip, bundle_file_name, write_documents};
use process_plan_api::services::processing::structure::load_workbook;
use process_plan_api::services::processing::{ConversionReport, ProcessPlanConverter};
use std::path::PathBuf;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Process Plan Converter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts process plan workbooks into MES operation route documents")
        .arg(
            Arg::new("workbook")
                .value_name("WORKBOOK")
                .help("Process plan .xlsx file")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory the documents are written to")
                .default_value("output"),
        )
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("Fill missing metadata with defaults instead of rejecting the sheet")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("zip")
                .short('z')
                .long("zip")
                .value_name("MATERIAL")
                .help("Write a single {MATERIAL}_jsons.zip instead of loose files"),
        )
        .get_matches();

    let workbook = PathBuf::from(
        matches
            .get_one::<String>("workbook")
            .context("Missing workbook argument")?,
    );
    let output = PathBuf::from(
        matches
            .get_one::<String>("output")
            .context("Missing output argument")?,
    );
    let policy = if matches.get_flag("lenient") {
        MetadataPolicy::Lenient
    } else {
        MetadataPolicy::Strict
    };
    let zip_material = matches.get_one::<String>("zip");

    println!("{}", style("Process Plan Converter").bold());
    println!("{}", style("━".repeat(40)).dim());
    println!("Workbook: {}", style(workbook.display()).cyan());
    println!("Metadata: {}", style(format!("{policy:?}").to_lowercase()).cyan());

    let bytes = std::fs::read(&workbook)
        .with_context(|| format!("Failed to read {}", workbook.display()))?;
    let sheets = load_workbook(&bytes)?;

    let converter = ProcessPlanConverter::new(ExcelLayout::default(), policy);
    let pb = ProgressBar::new(sheets.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = converter.convert_sheets_with(&sheets, |grid| {
        pb.set_message(grid.name.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    if report.is_empty() {
        print_failures(&report);
        anyhow::bail!("No valid sheets found in {}", workbook.display());
    }

    if let Some(material) = zip_material {
        std::fs::create_dir_all(&output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        let path = output.join(bundle_file_name(material));
        std::fs::write(&path, build_zip(&report.documents)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "{} Bundled {} document(s) into {}",
            style("✔").green(),
            style(report.documents.len()).bold().green(),
            style(path.display()).cyan()
        );
    } else {
        for path in write_documents(&output, &report.documents)? {
            println!("  {} {}", style("•").dim(), path.display());
        }
        println!(
            "{} Wrote {} document(s) to {}",
            style("✔").green(),
            style(report.documents.len()).bold().green(),
            style(output.display()).cyan()
        );
    }

    for sheet in &report.skipped {
        println!("{} Skipped empty sheet '{sheet}'", style("-").dim());
    }
    print_failures(&report);

    Ok(())
}

fn print_failures(report: &ConversionReport) {
    for failure in &report.failures {
        println!(
            "{} {}: {}",
            style("✘").red(),
            style(&failure.sheet_name).bold(),
            failure.message
        );
    }
}
