//! Title block filler CLI
//!
//! Usage:
//!   titleblock fill <MANIFEST> [--settings FILE] [--out DIR] [--dry-run] [--open]
//!   titleblock populate <MANIFEST> [--page NAME] [-o FILE]
//!   titleblock cell <REF>

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use titleblock_filler::launch::open_file;
use titleblock_filler::notify::{output_path, ConsoleNotifier, Notifier};
use titleblock_filler::sheet::a1_from_r1c1;
use titleblock_filler::{
    fill_title_block_with, populate_spreadsheet, CellAddress, Document, Error, FillOptions,
    FillReport, Project, Settings,
};

#[derive(Parser)]
#[command(name = "titleblock")]
#[command(about = "Fill drawing title blocks from a spreadsheet")]
struct Cli {
    /// Log every row that is read
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill the editable texts of every page from the TitleBlock spreadsheet
    Fill {
        /// Project manifest (TOML)
        manifest: PathBuf,

        /// Settings file (TOML)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Write filled templates to this directory instead of in place
        #[arg(long)]
        out: Option<PathBuf>,

        /// Show the result without writing any file
        #[arg(long)]
        dry_run: bool,

        /// Open the written templates with the default application
        #[arg(long)]
        open: bool,
    },

    /// Create a TitleBlock spreadsheet from the editable texts of a page
    Populate {
        /// Project manifest (TOML)
        manifest: PathBuf,

        /// Page to read the fields from (asked for when the project has several)
        #[arg(short, long)]
        page: Option<String>,

        /// Output CSV file (prints to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize a cell reference given in A1 or R1C1 form
    Cell {
        /// Cell reference, e.g. B7 or R7C2
        reference: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut notifier = ConsoleNotifier::new();
    let result = match cli.command {
        Command::Fill {
            manifest,
            settings,
            out,
            dry_run,
            open,
        } => fill(
            &manifest,
            settings.as_deref(),
            out.as_deref(),
            dry_run,
            open,
            &mut notifier,
        ),
        Command::Populate {
            manifest,
            page,
            output,
        } => populate(&manifest, page.as_deref(), output.as_deref(), &mut notifier),
        Command::Cell { reference } => cell(&reference),
    };

    match result {
        Ok(()) => {}
        // Already shown to the user
        Err(Error::Fill(_)) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn fill(
    manifest: &Path,
    settings: Option<&Path>,
    out: Option<&Path>,
    dry_run: bool,
    open: bool,
    notifier: &mut dyn Notifier,
) -> Result<(), Error> {
    let settings = match settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let mut project = Project::load(manifest)?;
    if let Some(source) = settings.external_source() {
        log::info!("reading {} from {}", settings.sheet_name, source.display());
        project.load_spreadsheet(&settings.sheet_name, source, &settings.sheet_name)?;
    }

    let options = FillOptions::new().with_sheet_name(settings.sheet_name.clone());
    let report = fill_title_block_with(project.document_mut(), notifier, &options)?;
    print_report(&report, dry_run);

    if dry_run {
        return Ok(());
    }

    let written = project.save(out)?;
    if open {
        for path in &written {
            open_file(path)?;
        }
    }
    Ok(())
}

fn print_report(report: &FillReport, show_values: bool) {
    for page in &report.pages {
        println!(
            "{}: {} rows, offset {}",
            page.name,
            page.rows.len(),
            page.offset
        );
        if show_values {
            for (key, value) in &page.texts {
                println!("  {} = {}", key, value);
            }
        }
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
}

fn populate(
    manifest: &Path,
    page: Option<&str>,
    output: Option<&Path>,
    notifier: &mut dyn Notifier,
) -> Result<(), Error> {
    let project = Project::load(manifest)?;
    let doc = project.document();

    let Some(id) = project.select_page(page, notifier)? else {
        return Ok(());
    };
    let texts = doc.editable_texts(id).unwrap_or_default();
    let grid = populate_spreadsheet(&texts);

    match output {
        Some(path) => {
            let Some(path) = output_path(notifier, path) else {
                return Ok(());
            };
            grid.write_csv(&path)?;
            log::info!("wrote {} fields to {}", texts.len(), path.display());
        }
        None => print!("{}", grid.to_csv_string()?),
    }
    Ok(())
}

fn cell(reference: &str) -> Result<(), Error> {
    let normalized = match a1_from_r1c1(reference) {
        Some(a1) => a1,
        None => reference.parse::<CellAddress>()?.to_string(),
    };
    println!("{}", normalized);
    Ok(())
}
