use analytics::AnalyticsEngine;
use backtester::{
    BacktestError, Backtester, Retuner, SimulationParams, TuneContext, TuneFailure, simulate,
};
use core_types::{MarketData, PriceSeries};
use ndarray::{Array2, array};
use std::sync::Mutex;
use strategies::{Olmar, OlmarHyperparams};

fn trending_data(num_days: usize) -> MarketData {
    let mut opens = Array2::zeros((num_days, 3));
    let mut closes = Array2::zeros((num_days, 3));
    for day in 0..num_days {
        let t = day as f64;
        let row = [10.0 + (t * 0.7).sin(), 20.0 + (t * 0.3).cos() * 2.0, 5.0 + t * 0.05];
        for (asset, &price) in row.iter().enumerate() {
            opens[[day, asset]] = price;
            closes[[day, asset]] = price * (1.0 + 0.01 * ((t + asset as f64) * 1.3).sin());
        }
    }
    MarketData::live_only(PriceSeries::new(opens, closes).unwrap())
}

fn params(stop: usize) -> SimulationParams {
    SimulationParams {
        start: 0,
        stop,
        rebal_interval: 1,
        initial_capital: 100.0,
        init_b: None,
    }
}

/// Records every invocation and switches to a fixed pair.
struct RecordingRetuner {
    calls: Mutex<Vec<(usize, usize)>>,
    target: OlmarHyperparams,
}

impl Retuner for RecordingRetuner {
    fn retune(&self, strategy: &mut Olmar, ctx: &TuneContext<'_>) -> Result<bool, TuneFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((ctx.cur_day, ctx.allocations.len()));
        strategy.adopt_hyperparams(self.target);
        Ok(true)
    }
}

struct FailingRetuner;

impl Retuner for FailingRetuner {
    fn retune(&self, _: &mut Olmar, _: &TuneContext<'_>) -> Result<bool, TuneFailure> {
        Err("trial exploded".into())
    }
}

#[test]
fn backtester_matches_pure_simulation_without_tuning() {
    let data = trending_data(20);
    let hp = OlmarHyperparams::new(4, 1.6).unwrap();
    let expected = simulate(&data, hp, &params(20)).unwrap();

    let strategy = Olmar::fixed(3, hp).unwrap();
    let mut backtester = Backtester::new(strategy, params(20), AnalyticsEngine::new());
    let outcome = backtester.run(&data).unwrap();

    assert_eq!(outcome.simulation, expected);
    assert_eq!(outcome.report.num_periods, 20);
    assert_eq!(outcome.history.windows(), &[4]);
}

#[test]
fn every_recorded_allocation_has_unit_norm() {
    let data = trending_data(30);
    let hp = OlmarHyperparams::new(5, 2.0).unwrap();
    let result = simulate(&data, hp, &params(30)).unwrap();
    assert_eq!(result.allocations.len(), 30);
    for b in &result.allocations {
        let norm: f64 = b.iter().map(|w| w.abs()).sum();
        assert!((norm - 1.0).abs() < 1e-9);
    }
}

#[test]
fn retuner_runs_on_its_cadence_and_updates_history() {
    let data = trending_data(25);
    let target = OlmarHyperparams::new(2, 1.2).unwrap();
    let retuner = RecordingRetuner {
        calls: Mutex::new(Vec::new()),
        target,
    };
    let strategy = Olmar::fixed(3, OlmarHyperparams::new(5, 1.5).unwrap()).unwrap();
    let mut backtester = Backtester::new(strategy, params(25), AnalyticsEngine::new())
        .with_retuner(Box::new(retuner), 10)
        .unwrap();

    let outcome = backtester.run(&data).unwrap();

    assert_eq!(outcome.hyperparams, target);
    assert_eq!(outcome.history.windows(), &[5, 2, 2]);
    assert_eq!(outcome.history.epsilons(), &[1.5, 1.2, 1.2]);
}

#[test]
fn retuner_sees_the_allocations_so_far() {
    let data = trending_data(12);
    let retuner = std::sync::Arc::new(RecordingRetuner {
        calls: Mutex::new(Vec::new()),
        target: OlmarHyperparams::new(3, 1.3).unwrap(),
    });

    struct Shared(std::sync::Arc<RecordingRetuner>);
    impl Retuner for Shared {
        fn retune(&self, s: &mut Olmar, ctx: &TuneContext<'_>) -> Result<bool, TuneFailure> {
            self.0.retune(s, ctx)
        }
    }

    let strategy = Olmar::fixed(3, OlmarHyperparams::new(5, 1.5).unwrap()).unwrap();
    let mut backtester = Backtester::new(strategy, params(12), AnalyticsEngine::new())
        .with_retuner(Box::new(Shared(retuner.clone())), 5)
        .unwrap();
    backtester.run(&data).unwrap();

    assert_eq!(*retuner.calls.lock().unwrap(), vec![(5, 5), (10, 10)]);
}

#[test]
fn a_failing_retuner_aborts_the_run() {
    let data = trending_data(12);
    let strategy = Olmar::fixed(3, OlmarHyperparams::new(5, 1.5).unwrap()).unwrap();
    let mut backtester = Backtester::new(strategy, params(12), AnalyticsEngine::new())
        .with_retuner(Box::new(FailingRetuner), 3)
        .unwrap();
    assert!(matches!(
        backtester.run(&data),
        Err(BacktestError::Tuning { day: 3, .. })
    ));
}

#[test]
fn a_day_with_no_tradable_asset_is_signalled() {
    let data = MarketData::live_only(
        PriceSeries::new(
            array![[10.0, 20.0], [10.0, 20.0], [0.0, 0.0]],
            array![[10.0, 20.0], [11.0, 19.0], [0.0, 0.0]],
        )
        .unwrap(),
    );
    let hp = OlmarHyperparams::new(2, 1.5).unwrap();
    let err = simulate(&data, hp, &params(3)).unwrap_err();
    assert!(matches!(
        err,
        BacktestError::Strategy(strategies::StrategyError::DegenerateAllocation { day: 2, .. })
    ));
}

#[test]
fn zero_tune_interval_is_rejected() {
    let strategy = Olmar::fixed(3, OlmarHyperparams::new(5, 1.5).unwrap()).unwrap();
    let result = Backtester::new(strategy, params(5), AnalyticsEngine::new())
        .with_retuner(Box::new(FailingRetuner), 0);
    assert!(matches!(result, Err(BacktestError::InvalidParameters(_))));
}
