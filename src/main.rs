use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use core_types::{Journey, ValueMetric};
use markov::{MarkovConfig, MarkovEngine};
use shapley::{ShapleyConfig, ShapleyEngine};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// The main entry point for the mta attribution application.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Markov(args) => {
            let journeys = load_journeys(&args.input)?;
            run_markov(&journeys, &args.options)
        }
        Commands::Shapley(args) => {
            let journeys = load_journeys(&args.input)?;
            run_shapley(&journeys, &args.options)
        }
        Commands::Report(args) => {
            let journeys = load_journeys(&args.input)?;
            run_markov(&journeys, &args.markov)?;
            run_shapley(&journeys, &args.shapley)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Multi-touch attribution over customer journeys: an absorbing-Markov-chain
/// engine and an exact Shapley-value engine.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Markov removal-effect attribution.
    Markov(MarkovCommand),
    /// Exact Shapley-value attribution.
    Shapley(ShapleyCommand),
    /// Run both engines over the same journey file.
    Report(ReportCommand),
}

#[derive(Args)]
struct MarkovCommand {
    /// Path to a JSON array of journeys.
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    options: MarkovOptions,
}

#[derive(Args)]
struct ShapleyCommand {
    /// Path to a JSON array of journeys.
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    options: ShapleyOptions,
}

#[derive(Args)]
struct ReportCommand {
    /// Path to a JSON array of journeys.
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    markov: MarkovOptions,

    #[command(flatten)]
    shapley: ShapleyOptions,
}

#[derive(Args)]
struct MarkovOptions {
    /// Record repeated identical touches as self-transitions instead of
    /// collapsing them.
    #[arg(long)]
    transition_to_same_state: bool,

    /// Weight graph edges by unit counts instead of monetary conversion
    /// value.
    #[arg(long)]
    unit_count: bool,

    /// Print the normalized transition matrix.
    #[arg(long)]
    show_matrix: bool,
}

#[derive(Args)]
struct ShapleyOptions {
    /// Cap on combination size; enumeration is exponential above it.
    #[arg(long, default_value_t = 4)]
    max_coalition_size: usize,

    /// Truncate oversized combinations to their most recent channels
    /// instead of failing.
    #[arg(long)]
    truncate: bool,

    /// Distinguish combinations by channel order.
    #[arg(long)]
    order_sensitive: bool,

    /// Which conversion-table column plays the characteristic function.
    #[arg(long, value_enum, default_value_t = MetricArg::ConversionRate)]
    value_metric: MetricArg,

    /// JSON object mapping combination keys (e.g. "Organic > Direct") to
    /// custom values; implies --value-metric custom.
    #[arg(long)]
    custom_values: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    ConversionRate,
    ConversionCount,
    ConversionValue,
    Custom,
}

impl From<MetricArg> for ValueMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::ConversionRate => ValueMetric::ConversionRate,
            MetricArg::ConversionCount => ValueMetric::ConversionCount,
            MetricArg::ConversionValue => ValueMetric::ConversionValue,
            MetricArg::Custom => ValueMetric::Custom,
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_journeys(path: &Path) -> anyhow::Result<Vec<Journey>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read journey file {}", path.display()))?;
    let journeys: Vec<Journey> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse journeys from {}", path.display()))?;
    Ok(journeys)
}

fn run_markov(journeys: &[Journey], options: &MarkovOptions) -> anyhow::Result<()> {
    let engine = MarkovEngine::new(MarkovConfig {
        transition_to_same_state: options.transition_to_same_state,
        conversion_value_as_frequency: !options.unit_count,
    });
    let report = engine.attribute(journeys)?;

    println!(
        "Markov attribution over {} journeys (baseline conversion probability {:.6})",
        journeys.len(),
        report.baseline_conversion
    );

    let mut table = Table::new();
    table.set_header(vec![
        "Channel",
        "Removal effect",
        "Weight",
        "Attributed value",
    ]);
    for (channel, effect) in &report.removal_effects {
        table.add_row(vec![
            channel.clone(),
            format!("{effect:.6}"),
            format!("{:.6}", report.weights[channel]),
            format!("{:.4}", report.attributed_value[channel]),
        ]);
    }
    println!("{table}");

    if options.show_matrix {
        let matrix = &report.transition_matrix;
        let mut rendered = Table::new();
        let mut header = vec!["from \\ to".to_string()];
        header.extend(matrix.states.iter().cloned());
        rendered.set_header(header);
        for (state, row) in matrix.states.iter().zip(&matrix.rows) {
            let mut cells = vec![state.clone()];
            cells.extend(row.iter().map(|p| format!("{p:.4}")));
            rendered.add_row(cells);
        }
        println!("{rendered}");
    }

    for diagnostic in &report.diagnostics {
        tracing::warn!("markov diagnostic: {diagnostic}");
    }
    Ok(())
}

fn run_shapley(journeys: &[Journey], options: &ShapleyOptions) -> anyhow::Result<()> {
    let custom_values: Option<BTreeMap<String, f64>> = match &options.custom_values {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read custom value file {}", path.display()))?;
            Some(serde_json::from_str(&raw)?)
        }
        None => None,
    };
    let value_metric = if custom_values.is_some() {
        ValueMetric::Custom
    } else {
        options.value_metric.into()
    };

    let engine = ShapleyEngine::new(ShapleyConfig {
        max_coalition_size: options.max_coalition_size,
        truncate_oversized: options.truncate,
        order_sensitive: options.order_sensitive,
        value_metric,
        custom_values,
    });
    let report = engine.attribute(journeys)?;

    println!(
        "Shapley attribution over {} journeys, {} converted combinations",
        journeys.len(),
        report.combinations.len()
    );

    let mut combinations = Table::new();
    combinations.set_header(vec![
        "Combination",
        "Journeys",
        "Conversions",
        "Rate",
        "Value",
    ]);
    for (key, stats) in &report.conversion_table.combinations {
        combinations.add_row(vec![
            key.clone(),
            stats.total_journeys.to_string(),
            stats.conversions.to_string(),
            format!("{:.4}", stats.conversion_rate()),
            format!("{:.4}", stats.conversion_value),
        ]);
    }
    println!("{combinations}");

    let mut channels = Table::new();
    channels.set_header(vec!["Channel", "Shapley value"]);
    for (channel, value) in &report.channel_values {
        channels.add_row(vec![channel.clone(), format!("{value:.4}")]);
    }
    println!("{channels}");

    Ok(())
}
