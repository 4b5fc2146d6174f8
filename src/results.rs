//! Reading price files and persisting the outcome of a run.

use analytics::PerformanceReport;
use anyhow::{Context, Result};
use backtester::BacktestOutcome;
use core_types::{PriceFrame, PriceSeries};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strategies::HyperparamsRecord;
use uuid::Uuid;

pub const HYPERPARAMS_FILE: &str = "hyperparams.json";
pub const REPORT_FILE: &str = "report.json";

/// Everything `report.json` records about a run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub report: PerformanceReport,
    pub hyperparams: HyperparamsRecord,
    pub window_history: Vec<usize>,
    pub eps_history: Vec<f64>,
    pub final_allocation: Vec<f64>,
}

pub fn load_price_series(path: &Path) -> Result<PriceSeries> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read price data from {}", path.display()))?;
    let frame: PriceFrame = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed price data in {}", path.display()))?;
    PriceSeries::from_frame(&frame)
        .with_context(|| format!("Invalid price data in {}", path.display()))
}

pub fn read_hyperparams(dir: &Path) -> Result<HyperparamsRecord> {
    let path = dir.join(HYPERPARAMS_FILE);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed {}", path.display()))
}

pub fn write_results(dir: &Path, run_id: Uuid, outcome: &BacktestOutcome) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create results directory {}", dir.display()))?;

    let record = HyperparamsRecord::from(outcome.hyperparams);
    write_json(&dir.join(HYPERPARAMS_FILE), &record)?;

    let summary = RunSummary {
        run_id,
        report: outcome.report.clone(),
        hyperparams: record,
        window_history: outcome.history.windows().to_vec(),
        eps_history: outcome.history.epsilons().to_vec(),
        final_allocation: outcome
            .simulation
            .allocations
            .last()
            .map(|b| b.to_vec())
            .unwrap_or_default(),
    };
    write_json(&dir.join(REPORT_FILE), &summary)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsEngine;
    use backtester::{Backtester, SimulationParams};
    use core_types::MarketData;
    use strategies::{Olmar, OlmarHyperparams};

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("olmar-{}-{}", name, Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_row_major_price_files() {
        let dir = scratch_dir("prices");
        let path = dir.join("live.json");
        fs::write(&path, r#"{"opens":[[1.0,2.0],[1.5,2.5]],"closes":[[1.1,2.1],[1.4,2.6]]}"#)
            .unwrap();

        let series = load_price_series(&path).unwrap();
        assert_eq!(series.num_days(), 2);
        assert_eq!(series.num_assets(), 2);
        assert_eq!(series.open(1).unwrap()[0], 1.5);
    }

    #[test]
    fn ragged_price_files_are_rejected() {
        let dir = scratch_dir("ragged");
        let path = dir.join("live.json");
        fs::write(&path, r#"{"opens":[[1.0,2.0],[1.5]],"closes":[[1.1,2.1],[1.4,2.6]]}"#).unwrap();
        assert!(load_price_series(&path).is_err());
    }

    #[test]
    fn hyperparams_use_the_string_map_format() {
        let dir = scratch_dir("past");
        fs::write(dir.join(HYPERPARAMS_FILE), r#"{"Window": "7", "Epsilon": "2.5"}"#).unwrap();

        let record = read_hyperparams(&dir).unwrap();
        let params = OlmarHyperparams::try_from(&record).unwrap();
        assert_eq!(params.window(), 7);
        assert_eq!(params.eps(), 2.5);
    }

    #[test]
    fn missing_hyperparams_file_names_the_path() {
        let dir = scratch_dir("empty");
        let err = read_hyperparams(&dir).unwrap_err();
        assert!(format!("{err:#}").contains(HYPERPARAMS_FILE));
    }

    #[test]
    fn writes_hyperparams_and_report() {
        let series = PriceSeries::new(
            ndarray::array![[10.0, 20.0], [11.0, 19.0], [10.5, 19.5]],
            ndarray::array![[11.0, 19.0], [10.5, 19.5], [10.8, 19.8]],
        )
        .unwrap();
        let data = MarketData::live_only(series);
        let strategy = Olmar::fixed(2, OlmarHyperparams::new(2, 1.4).unwrap()).unwrap();
        let params = SimulationParams {
            start: 0,
            stop: 3,
            rebal_interval: 1,
            initial_capital: 1.0,
            init_b: None,
        };
        let outcome = Backtester::new(strategy, params, AnalyticsEngine::new())
            .run(&data)
            .unwrap();

        let dir = scratch_dir("new").join("nested");
        let run_id = Uuid::new_v4();
        write_results(&dir, run_id, &outcome).unwrap();

        let record = read_hyperparams(&dir).unwrap();
        assert_eq!(record.window, "2");
        assert_eq!(record.epsilon, "1.4");

        let summary: RunSummary =
            serde_json::from_str(&fs::read_to_string(dir.join(REPORT_FILE)).unwrap()).unwrap();
        assert_eq!(summary.run_id, run_id);
        assert_eq!(summary.report.num_periods, 3);
        assert_eq!(summary.window_history, vec![2]);
        assert_eq!(summary.final_allocation.len(), 2);
    }
}
