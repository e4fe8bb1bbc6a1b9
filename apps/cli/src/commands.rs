//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use prelytics_core::{AnalysisRun, ProgressReporter, export_run, run_analysis};
use prelytics_report::{SectionHeader, compose};
use prelytics_shared::{
    AppConfig, ParsedReport, SwotCategory, Target, expand_home, init_config, load_config,
    resolve_api_key,
};
use prelytics_stages::build_stages;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Prelytics: structured pre-sales intelligence for a target organization.
#[derive(Parser)]
#[command(
    name = "prelytics",
    version,
    about = "Build a sectioned intelligence report for an organization and parse it into JSON.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run every stage for an organization and export the report.
    Analyze {
        /// Organization name.
        name: String,

        /// Organization website URL.
        url: String,

        /// Output root for exported runs (defaults to `[report].output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the parsed report as JSON instead of a summary.
        #[arg(long)]
        json: bool,

        /// Also gather the KEY DECISION MAKERS section.
        #[arg(long)]
        with_leadership: bool,
    },

    /// Parse a saved report document and print it as JSON.
    Parse {
        /// Path to a rendered report (e.g. a run's report.txt).
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "prelytics=info",
        1 => "prelytics=debug",
        _ => "prelytics=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr; stdout carries report output.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            name,
            url,
            out,
            json,
            with_leadership,
        } => cmd_analyze(&name, &url, out, json, with_leadership).await,
        Command::Parse { file } => cmd_parse(&file),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_analyze(
    name: &str,
    url: &str,
    out: Option<PathBuf>,
    json: bool,
    with_leadership: bool,
) -> Result<()> {
    let config: AppConfig = load_config()?;
    let api_key = resolve_api_key(&config)?;
    let target = Target::new(name, url)?;

    let include_leadership = with_leadership || config.report.include_key_decision_makers;
    let stages = build_stages(&config, &api_key, include_leadership)?;

    let output_root = match out {
        Some(dir) => dir,
        None => expand_home(&config.report.output_dir)?,
    };

    info!(
        name = %target.name,
        url = %target.url,
        stages = stages.len(),
        "starting analysis"
    );

    let reporter = CliProgress::new(json);
    let run = run_analysis(&target, &stages, &reporter).await;
    let exported = export_run(&run, &output_root, env!("CARGO_PKG_VERSION"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    } else {
        print_summary(&run);
        println!("  Saved:       {}", exported.run_dir.display());
        println!();
    }

    Ok(())
}

fn cmd_parse(file: &Path) -> Result<()> {
    let document = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;

    let report: ParsedReport = compose(&document);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_summary(run: &AnalysisRun) {
    let report = &run.report;
    let filled = |text: &str, header: SectionHeader| {
        if text.is_empty() || text == header.placeholder() {
            "-"
        } else {
            "yes"
        }
    };

    println!();
    println!("  Report for {}", run.target.name);
    println!("  Run:         {}", run.run_id);
    println!("  Metrics:     {}", report.financial_metrics.len());
    let swot_items: usize = SwotCategory::ALL
        .into_iter()
        .map(|c| report.swot_analysis.items(c).len())
        .sum();
    println!("  SWOT items:  {swot_items}");
    println!("  Signals:     {}", report.operational_signals.len());
    println!("  Competitors: {} lines", report.competitor_analysis.len());
    println!(
        "  Client:      {}",
        filled(&report.client_intelligence, SectionHeader::ClientIntelligence)
    );
    println!(
        "  Product:     {}",
        filled(&report.product_analysis, SectionHeader::ProductAnalysis)
    );
    println!(
        "  Leaders:     {}",
        filled(&report.key_decision_makers, SectionHeader::KeyDecisionMakers)
    );
    println!("  Time:        {:.1}s", run.elapsed.as_secs_f64());
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(quiet: bool) -> Self {
        if quiet {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage_started(&self, section: SectionHeader, index: usize, total: usize) {
        self.spinner
            .set_message(format!("[{index}/{total}] {}", section.label().to_lowercase()));
    }

    fn stage_finished(&self, section: SectionHeader, produced: bool) {
        if !produced {
            self.spinner
                .println(format!("  {section}: nothing found, using placeholder"));
        }
    }

    fn done(&self, _run: &AnalysisRun) {
        self.spinner.finish_and_clear();
    }
}
