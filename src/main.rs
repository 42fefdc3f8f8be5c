//! annostat command line.
//!
//! `scan` runs a full statistics scan over a project dump and writes the
//! report; `demo` writes a synthetic project dump to scan.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use annostat::catalog::{generate_project, SyntheticOptions};
use annostat::{run_scan, MemoryCatalog, ProjectDump, Result, ScanConfig};

#[derive(Parser, Debug)]
#[command(name = "annostat")]
#[command(version = "0.1.0")]
#[command(about = "Per-image and per-dataset statistics over image annotations", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a project dump and write the report
    Scan {
        /// Project dump (JSON)
        dump: String,

        /// Project to scan (defaults to the dump's project)
        #[arg(short, long)]
        project: Option<u64>,

        /// Scan config (JSON); missing fields keep their defaults
        #[arg(short, long)]
        config: Option<String>,

        /// Where to write the report
        #[arg(short, long, default_value = "report.json")]
        out: String,
    },

    /// Write a synthetic project dump
    Demo {
        /// Output path
        out: String,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Images per dataset
        #[arg(long, default_value = "40")]
        images: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    if let Err(e) = annostat::logging::init(level) {
        eprintln!("{}", e);
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Scan { dump, project, config, out } => {
            let dump = ProjectDump::load_json(&dump)?;
            let project_id = project.unwrap_or(dump.project.id);
            let config = match config {
                Some(path) => ScanConfig::load_json(&path)?,
                None => ScanConfig::default(),
            };

            let catalog = MemoryCatalog::from_dump(dump);
            let report = run_scan(&catalog, project_id, &config)?;
            report.save_json(&out)?;
            info!("Report for {} images written to {}", report.table.len(), out);
        }
        Commands::Demo { out, seed, images } => {
            let options = SyntheticOptions { seed, images_per_dataset: images, ..Default::default() };
            let dump = generate_project(&options);
            dump.save_json(&out)?;
            info!("Synthetic project with {} images written to {}", dump.image_count(), out);
        }
    }
    Ok(())
}
