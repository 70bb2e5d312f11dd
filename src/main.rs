use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use searchdeadscripts::report::TerminalReporter;
use searchdeadscripts::{AnalysisPipeline, Config, ReportFormat, Reporter, UnityProject};

/// SearchDeadScripts - Fast unused script detection for Unity projects
#[derive(Parser, Debug)]
#[command(name = "searchdeadscripts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Unity project (must contain Assets and ProjectSettings)
    project: PathBuf,

    /// Directory the report and hierarchy dumps are written to
    output: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directories under Assets to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Script name patterns never reported as unused (can be specified multiple times)
    #[arg(short, long)]
    retain: Vec<String>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip the per-scene hierarchy dumps
    #[arg(long)]
    no_dump: bool,

    /// Number of scenes parsed at once
    #[arg(long, value_name = "N")]
    scene_jobs: Option<usize>,

    /// Number of threads parsing scripts (0 = one per core)
    #[arg(long, value_name = "N")]
    script_jobs: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only write the report files
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("SearchDeadScripts v{}", env!("CARGO_PKG_VERSION"));

    // Validate before reading any configuration from the project
    let project = UnityProject::open(&cli.project).into_diagnostic()?;

    let config = load_config(&cli)?;

    run_analysis(&project, &config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&cli.project)?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if !cli.retain.is_empty() {
        config.retain_patterns.extend(cli.retain.clone());
    }
    if let Some(format) = cli.format {
        config.report.format = match format {
            OutputFormat::Text => "text".to_string(),
            OutputFormat::Json => "json".to_string(),
        };
    }
    if cli.no_dump {
        config.report.dump_hierarchy = false;
    }
    if let Some(jobs) = cli.scene_jobs {
        config.pipeline.scene_concurrency = jobs;
    }
    if let Some(jobs) = cli.script_jobs {
        config.pipeline.script_threads = jobs;
    }

    Ok(config)
}

fn run_analysis(project: &UnityProject, config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    let format = ReportFormat::from_name(&config.report.format).ok_or_else(|| {
        miette::miette!(
            "Unknown report format '{}' (expected text or json)",
            config.report.format
        )
    })?;

    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scenes ({eta})")
                .into_diagnostic()?
                .progress_chars("#>-"),
        );
        pb
    };

    let outcome = AnalysisPipeline::new(config)
        .with_progress(progress)
        .run(project)
        .into_diagnostic()?;

    let written = Reporter::new(format, cli.output.clone())
        .with_hierarchy_dumps(config.report.dump_hierarchy)
        .report(&outcome)?;

    if !cli.quiet {
        TerminalReporter::new()
            .with_failures(cli.verbose)
            .report(&outcome);

        println!();
        println!(
            "{}",
            format!(
                "Analyzed {} scenes in {:.2}s, {} files written to {}",
                outcome.summary.scenes_parsed,
                start_time.elapsed().as_secs_f64(),
                written.len(),
                cli.output.display()
            )
            .green()
        );
    }

    Ok(())
}
