//! Listing export CLI
//!
//! Command-line tool for building, inspecting and configuring listing
//! syndication exports.

use clap::{Parser, Subcommand};
use listing_core::{
    load_rules, read_export, read_rule_sheet, run_job, ExportLayout, JobFile, PathIndex,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "listing-export")]
#[command(about = "Listing feed to syndication export converter", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full export described by a job file and/or flags
    Run {
        /// Job file (JSON); flags below override its fields
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Feed location (file path or http(s) URL)
        #[arg(long)]
        feed: Option<String>,

        /// Mapping rule sheet (.csv, .xlsx, .xls, .ods)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Path index JSON
        #[arg(long)]
        path_index: Option<PathBuf>,

        /// Output directory for the export bundle
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the unmerged primary and photo tables
        #[arg(long)]
        dump_intermediate: bool,
    },

    /// Load a rule sheet and print the resolved mapping
    Rules {
        /// Mapping rule sheet
        #[arg(short, long)]
        rules: PathBuf,

        /// Path index JSON, to show the pointer each rule resolves to
        #[arg(short, long)]
        path_index: Option<PathBuf>,
    },

    /// Parse an export file and display a summary
    Inspect {
        /// Path to export file
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Create a job file template
    CreateJob {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,

        /// Feed location to put in the template
        #[arg(long, default_value = "https://example.com/feed.xml")]
        feed: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        error!(error = %e, "command failed");
        println!("{}", json!({ "status": "error", "message": e.to_string() }));
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> listing_core::Result<()> {
    match command {
        Commands::Run {
            job,
            feed,
            rules,
            path_index,
            output,
            dump_intermediate,
        } => cmd_run(job, feed, rules, path_index, output, dump_intermediate),
        Commands::Rules { rules, path_index } => cmd_rules(&rules, path_index.as_ref()),
        Commands::Inspect { file, limit } => cmd_inspect(&file, limit),
        Commands::CreateJob { output, feed } => cmd_create_job(&output, feed),
    }
}

fn cmd_run(
    job: Option<PathBuf>,
    feed: Option<String>,
    rules: Option<PathBuf>,
    path_index: Option<PathBuf>,
    output: Option<PathBuf>,
    dump_intermediate: bool,
) -> listing_core::Result<()> {
    let mut job = match job {
        Some(path) => JobFile::load(path)?,
        None => {
            let missing = |flag: &str| {
                listing_core::Error::MissingInput(format!("--{} is required without --job", flag))
            };
            JobFile {
                feed: feed.clone().ok_or_else(|| missing("feed"))?,
                rules: rules.clone().ok_or_else(|| missing("rules"))?,
                path_index: path_index.clone().ok_or_else(|| missing("path-index"))?,
                output_dir: output.clone().ok_or_else(|| missing("output"))?,
                dump_intermediate,
                layout: ExportLayout::default(),
            }
        }
    };

    if let Some(feed) = feed {
        job.feed = feed;
    }
    if let Some(rules) = rules {
        job.rules = rules;
    }
    if let Some(path_index) = path_index {
        job.path_index = path_index;
    }
    if let Some(output) = output {
        job.output_dir = output;
    }
    job.dump_intermediate |= dump_intermediate;
    info!(feed = %job.feed, output = %job.output_dir.display(), "starting export");

    let report = run_job(&job)?;

    println!(
        "{}",
        json!({
            "status": "success",
            "listings": report.listings,
            "merged": report.merge.matched,
            "files": report.files,
        })
    );

    Ok(())
}

fn cmd_rules(rules_path: &PathBuf, index_path: Option<&PathBuf>) -> listing_core::Result<()> {
    let grid = read_rule_sheet(rules_path)?;
    let rules = load_rules(&grid)?;
    let index = index_path.map(PathIndex::load).transpose()?;

    println!("File: {}", rules_path.display());
    println!("Rules: {}", rules.len());
    if let Some(last) = rules.last() {
        println!("Highest rank: {}", last.rank);
    }
    println!();

    println!("Rank\tType\tPath\tPointer");
    println!("{}", "-".repeat(48));
    for rule in &rules {
        let path = rule.source_path.as_deref().unwrap_or("-");
        let pointer = match (&index, rule.source_path.as_deref()) {
            (Some(index), Some(path)) => index
                .resolve(path)
                .map(|p| p.join("/"))
                .unwrap_or_else(|| "(unresolved)".to_string()),
            _ => String::new(),
        };
        println!("{}\t{}\t{}\t{}", rule.rank, rule.field_type, path, pointer);
    }

    Ok(())
}

fn cmd_inspect(file: &PathBuf, limit: usize) -> listing_core::Result<()> {
    let table = read_export(file)?;

    println!("File: {}", file.display());
    println!("Columns: {}", table.width);
    println!("Rows: {}", table.row_count());
    println!();

    for (i, row) in table.rows.iter().take(limit).enumerate() {
        let filled = row.cells.iter().filter(|c| !c.is_empty()).count();
        let id = row.get(0).unwrap_or_default();
        println!("{:>4}  {:<20} {} filled cells", i + 1, id, filled);
    }

    if table.row_count() > limit {
        println!("... ({} more rows)", table.row_count() - limit);
    }

    Ok(())
}

fn cmd_create_job(output: &PathBuf, feed: String) -> listing_core::Result<()> {
    let job = JobFile {
        feed,
        rules: PathBuf::from("mapping.xlsx"),
        path_index: PathBuf::from("xml_map.json"),
        output_dir: PathBuf::from("export"),
        dump_intermediate: false,
        layout: ExportLayout::default(),
    };

    job.save(output)?;
    println!("Created job file: {}", output.display());
    println!();
    println!("Edit the file to point at your inputs, then run:");
    println!("  listing-export run --job {}", output.display());

    Ok(())
}
