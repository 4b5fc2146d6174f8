//! # OLMAR Analytics
//!
//! Performance statistics over a portfolio's wealth series. This is the "unbiased judge"
//! both for reporting a finished run and for scoring hyperparameter trials.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no knowledge of strategies, configuration or I/O.
//! - **Stateless calculation:** `AnalyticsEngine` takes a wealth series and produces a
//!   `PerformanceReport`.
//!
//! ## Public API
//!
//! - `empirical_sharpe_ratio`: the score the tuner maximises.
//! - `AnalyticsEngine` / `PerformanceReport`: end-of-run summary.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::{AnalyticsEngine, empirical_sharpe_ratio};
pub use error::AnalyticsError;
pub use report::PerformanceReport;
