use analytics::AnalyticsEngine;
use anyhow::{Context, Result};
use backtester::{BacktestOutcome, Backtester, SimulationParams};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, LogLevel, init_logging, load_config_from};
use core_types::MarketData;
use optimizer::HyperparamTuner;
use std::path::PathBuf;
use strategies::{HyperparamGrid, Olmar, OlmarHyperparams};
use uuid::Uuid;

mod results;

/// The main entry point for the OLMAR portfolio simulator.
fn main() -> Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::Grid(args) => handle_grid(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Online portfolio selection with moving average reversion.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the strategy over a price history.
    Run(RunArgs),
    /// Print the hyperparameter candidates the tuner searches.
    Grid(GridArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// JSON file with the live opens and closes.
    #[arg(long)]
    data: PathBuf,

    /// JSON file with training prices that precede the live series.
    #[arg(long)]
    train: Option<PathBuf>,

    /// Directory holding the hyperparams.json of a previous run to start from.
    #[arg(long)]
    past_results: Option<PathBuf>,

    /// Directory to write hyperparams.json and report.json into.
    #[arg(long)]
    new_results: Option<PathBuf>,

    /// Keep the starting hyperparameters for the whole run.
    #[arg(long)]
    no_tune: bool,

    /// Overrides the configured log level.
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Show a progress bar while simulating.
    #[arg(long)]
    progress: bool,
}

#[derive(Parser)]
struct GridArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = load(&args.config)?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    // Held until exit so the file appender flushes.
    let _log_guard = init_logging(&config.logging).context("Failed to initialise logging")?;

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id);
    let _entered = span.enter();

    let live = results::load_price_series(&args.data)?;
    let train = args
        .train
        .as_deref()
        .map(results::load_price_series)
        .transpose()?;
    let data = MarketData::new(live, train).context("Training and live data do not line up")?;
    tracing::info!(
        num_days = data.num_days(),
        num_assets = data.num_assets(),
        training = data.train().is_some(),
        "Loaded market data"
    );

    let hyperparams = match &args.past_results {
        Some(dir) => {
            let record = results::read_hyperparams(dir)?;
            let hyperparams = OlmarHyperparams::try_from(&record)
                .with_context(|| format!("Invalid hyperparameters in {}", dir.display()))?;
            tracing::info!(
                window = hyperparams.window(),
                eps = hyperparams.eps(),
                "Starting from previous run's hyperparameters"
            );
            hyperparams
        }
        None => OlmarHyperparams::new(config.olmar.window, config.olmar.eps)?,
    };
    let grid = HyperparamGrid::from_config(&config.olmar)?;
    let strategy = Olmar::new(data.num_assets(), hyperparams, grid)?;

    let params = SimulationParams::from_config(&config.simulation, data.num_days());
    let mut backtester =
        Backtester::new(strategy, params, AnalyticsEngine::new()).with_progress(args.progress);
    if config.simulation.tuning_enabled && !args.no_tune {
        backtester = backtester.with_retuner(
            Box::new(HyperparamTuner::new()),
            config.simulation.tune_interval,
        )?;
    } else {
        tracing::warn!("Hyperparameter tuning is disabled for this run");
    }

    let outcome = backtester.run(&data).context("Simulation failed")?;
    print_report(&outcome);

    if let Some(dir) = &args.new_results {
        results::write_results(dir, run_id, &outcome)?;
        println!("Results written to {}", dir.display());
    }

    Ok(())
}

fn print_report(outcome: &BacktestOutcome) {
    let report = &outcome.report;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Periods".to_string(), report.num_periods.to_string()]);
    table.add_row(vec!["Initial wealth".to_string(), format!("{:.4}", report.initial_wealth)]);
    table.add_row(vec!["Final wealth".to_string(), format!("{:.4}", report.final_wealth)]);
    table.add_row(vec!["Total return".to_string(), format!("{:.2}%", report.total_return_pct)]);
    table.add_row(vec!["Max drawdown".to_string(), format!("{:.2}%", report.max_drawdown_pct)]);
    table.add_row(vec!["Sharpe ratio".to_string(), format!("{:.4}", report.sharpe_ratio)]);
    table.add_row(vec!["Window".to_string(), outcome.hyperparams.window().to_string()]);
    table.add_row(vec!["Epsilon".to_string(), outcome.hyperparams.eps().to_string()]);
    table.add_row(vec![
        "Retunes".to_string(),
        (outcome.history.windows().len() - 1).to_string(),
    ]);
    println!("{table}");
}

// ==============================================================================
// Grid Command Logic
// ==============================================================================

fn handle_grid(args: GridArgs) -> Result<()> {
    let config = load(&args.config)?;
    let grid = HyperparamGrid::from_config(&config.olmar)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Parameter", "Candidates"]);
    table.add_row(vec![
        "window".to_string(),
        join(grid.windows().iter().map(ToString::to_string)),
    ]);
    table.add_row(vec![
        "eps".to_string(),
        join(grid.epsilons().iter().map(ToString::to_string)),
    ]);
    println!("{table}");
    println!("{} combinations per tuning step", grid.len());
    Ok(())
}

fn load(path: &std::path::Path) -> Result<Config> {
    load_config_from(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn join(values: impl Iterator<Item = String>) -> String {
    values.collect::<Vec<_>>().join(", ")
}
