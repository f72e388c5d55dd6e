use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

use pgx_extract::{
    AppConfig, CliOverrides, FileConfig, FileDiscovery, FileExtraction, FileParser, ReportFormat,
    ReportGenerator, TARGET_GENES,
};

/// Pharmacogenomic variant extraction from VCF files
#[derive(Parser, Debug)]
#[command(
    name = "pgx-extract",
    version,
    about = "Extract pharmacogenomic variants (gene, rsID) from VCF files",
    long_about = r#"
Scans VCF data lines for GENE= annotations naming one of the six supported
pharmacogenes (CYP2D6, CYP2C19, CYP2C9, SLCO1B1, TPMT, DPYD) and reports each
distinct rsID once, in file order.

A file that cannot be read as text is reported as "could not parse file";
a file with no matching variants is a successful, empty result.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// VCF files or directories containing them
    #[arg(value_name = "PATHS", value_hint = ValueHint::AnyPath)]
    inputs: Vec<PathBuf>,

    /// Recursively search directories
    #[arg(short, long, env = "PGX_EXTRACT_RECURSIVE")]
    recursive: bool,

    /// Number of threads (0 = auto)
    #[arg(short, long, env = "PGX_EXTRACT_THREADS")]
    threads: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, env = "PGX_EXTRACT_FORMAT")]
    format: Option<ReportFormat>,

    /// Write a timestamped report into this directory instead of stdout
    #[arg(short, long, value_name = "DIR", env = "PGX_EXTRACT_OUTPUT", value_hint = ValueHint::DirPath)]
    output: Option<PathBuf>,

    /// TOML file with default settings
    #[arg(short, long, value_name = "FILE", env = "PGX_EXTRACT_CONFIG", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Exit successfully even when some files could not be parsed
    #[arg(long)]
    allow_failures: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions { shell: Shell },
    /// List the pharmacogenes that are reported
    Genes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            return Ok(());
        }
        Some(Commands::Genes) => {
            list_genes();
            return Ok(());
        }
        None => {}
    }

    init_logging(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = AppConfig::resolve(
        CliOverrides {
            inputs: cli.inputs,
            recursive: cli.recursive,
            threads: cli.threads,
            format: cli.format,
            output: cli.output,
            allow_failures: cli.allow_failures,
        },
        file_config,
    );

    init_thread_pool(config.threads)?;
    info!("Using {} threads", rayon::current_num_threads());

    run(config)
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn list_genes() {
    println!("{}", style("Reported Pharmacogenes:").bold().cyan());
    println!();

    for gene in TARGET_GENES {
        println!("  {}", style(gene.symbol()).green().bold());
        println!("         {}", style(gene.description()).dim());
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("pgx_extract={}", level))
        .with_writer(io::stderr)
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}

fn run(config: AppConfig) -> Result<()> {
    let discovery = FileDiscovery::new(config.recursive);
    let files = discovery.discover(&config.inputs)?;
    if files.is_empty() {
        bail!("No VCF files found in the given paths");
    }
    info!("Found {} files to extract", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Extracting variants...");

    let parser = FileParser::new();
    let outcomes: Vec<Result<FileExtraction, String>> = files
        .par_iter()
        .map(|path| {
            let outcome = parser.parse(path).map_err(|e| {
                warn!("Failed to read {}: {:#}", path.display(), e);
                path.display().to_string()
            });
            pb.inc(1);
            outcome
        })
        .collect();
    pb.finish_and_clear();

    let mut results = Vec::with_capacity(outcomes.len());
    let mut unreadable = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(extraction) => results.push(extraction),
            Err(path) => unreadable.push(path),
        }
    }

    let generator = match &config.output {
        Some(dir) => ReportGenerator::new(dir)?,
        None => ReportGenerator::stdout(),
    };
    if let Some(path) = generator.generate(&results, config.format)? {
        eprintln!(
            "{} Report saved to: {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        );
    }

    let unparseable: Vec<&FileExtraction> =
        results.iter().filter(|r| !r.result.success).collect();
    for extraction in &unparseable {
        eprintln!(
            "{} {}: could not parse file",
            style("✗").red(),
            extraction.source_file
        );
    }
    for path in &unreadable {
        eprintln!("{} {}: could not read file", style("✗").red(), path);
    }

    let failures = unparseable.len() + unreadable.len();
    if failures > 0 && !config.allow_failures {
        bail!("{} of {} files could not be parsed", failures, files.len());
    }

    Ok(())
}
