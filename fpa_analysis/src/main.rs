//! # fpa
//!
//! Builds the fault propagation analysis for one instance model file and
//! prints its path records plus the forward reach of every participating
//! node's outgoing points.
//!
//! Settings come from an optional `--config` TOML file; flags override it.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use fpa_analysis::config::{AnalysisConfig, load_config};
use fpa_analysis::summary::AnalysisSummary;
use fpa_analysis::{AnalysisMode, AnalysisModel, PopulationPolicy};
use fpa_common::config::{ConfigLoader, LogLevel};
use fpa_common::consts::DEFAULT_CONFIG_FILE;
use fpa_common::model::{InstanceModel, ModelConfig};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// fpa: fault propagation path analysis
#[derive(Parser, Debug)]
#[command(name = "fpa")]
#[command(version)]
#[command(about = "Derive and query fault propagation paths of an instance model")]
struct Args {
    /// Instance model description (TOML).
    #[arg(long, value_name = "FILE")]
    model: PathBuf,

    /// Driver configuration (TOML). Defaults to `fpa.toml` when present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Dotted path of the analysis root (default: the model root).
    #[arg(long, value_name = "PATH")]
    root: Option<String>,

    /// Endpoint selection policy. "shortest" implies --restricted.
    #[arg(long, value_parser = parse_policy)]
    policy: Option<PopulationPolicy>,

    /// Skip binding synthesis.
    #[arg(long)]
    restricted: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json_logs: bool,
}

fn parse_policy(s: &str) -> Result<PopulationPolicy, String> {
    s.parse()
}

fn main() {
    let args = Args::parse();
    let config_path = args.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    });
    let config = config_path.as_deref().map(load_config).transpose();
    let log_level = match &config {
        Ok(Some(config)) => config.shared.log_level,
        _ => LogLevel::default(),
    };
    setup_tracing(&args, log_level);

    info!("fpa v{} starting", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config.unwrap_or_default()));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }
}

fn run(args: &Args, config: AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
    let description = ModelConfig::load(&args.model)?;
    let model = InstanceModel::from_config(&description)?;
    info!(
        "Model loaded from {}: {} nodes, {} connections",
        args.model.display(),
        model.node_count(),
        model.connection_count()
    );

    let root = match args.root.as_deref().or(config.analysis.root.as_deref()) {
        Some(path) => model
            .node_by_path(path)
            .ok_or_else(|| format!("root '{path}' not found in model"))?,
        None => model.root().ok_or("model has no root component")?,
    };

    let analysis = match resolve_mode(args, &config) {
        AnalysisMode::Default => AnalysisModel::new(&model, root),
        AnalysisMode::Restricted(policy) => AnalysisModel::with_policy(&model, root, policy),
    };
    info!(
        "Analysis built ({}): {} paths over {} nodes",
        analysis.mode(),
        analysis.len(),
        analysis.nodes().len()
    );

    let summary = AnalysisSummary::from_analysis(&analysis);
    match args.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

/// Flags override the config file.
fn resolve_mode(args: &Args, config: &AnalysisConfig) -> AnalysisMode {
    let mut mode = config.analysis_mode();
    if let Some(policy) = args.policy {
        mode = match (mode, policy) {
            (AnalysisMode::Default, PopulationPolicy::Deepest) => AnalysisMode::Default,
            _ => AnalysisMode::Restricted(policy),
        };
    }
    if args.restricted {
        mode = AnalysisMode::Restricted(mode.policy());
    }
    mode
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match log_level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
