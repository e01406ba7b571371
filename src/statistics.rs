//! # Run Statistics
//!
//! Accumulates cost, trial count and time of every run and reports them once
//! the search is over.

use tracing::info;

use crate::engine::options::LogLevel;
use crate::problem::{Cost, MINUS_INFINITY, PLUS_INFINITY};

/// Relative gap of `cost` to `optimum` in percent.
///
/// Returns `None` when the optimum is unknown or zero.
pub fn gap(cost: Cost, optimum: Cost) -> Option<f64> {
    if optimum == MINUS_INFINITY || optimum == 0 {
        return None;
    }
    Some(100.0 * (cost - optimum) as f64 / optimum as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    runs: usize,
    successes: usize,
    optimum: Cost,
    cost_min: Cost,
    cost_max: Cost,
    cost_sum: i128,
    finite_runs: usize,
    trials_min: usize,
    trials_max: usize,
    trials_sum: usize,
    time_min: f64,
    time_max: f64,
    time_sum: f64,
}

/// Snapshot of [`Statistics`] once runs are over.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatisticsSummary {
    pub runs: usize,
    pub successes: usize,
    pub cost_min: Option<Cost>,
    pub cost_avg: Option<f64>,
    pub cost_max: Option<Cost>,
    pub gap_min: Option<f64>,
    pub gap_avg: Option<f64>,
    pub trials_min: usize,
    pub trials_avg: f64,
    pub trials_max: usize,
    pub time_min: f64,
    pub time_avg: f64,
    pub time_max: f64,
}

impl Statistics {
    pub fn new(optimum: Cost) -> Self {
        Self {
            runs: 0,
            successes: 0,
            optimum,
            cost_min: PLUS_INFINITY,
            cost_max: MINUS_INFINITY,
            cost_sum: 0,
            finite_runs: 0,
            trials_min: usize::MAX,
            trials_max: 0,
            trials_sum: 0,
            time_min: f64::INFINITY,
            time_max: 0.0,
            time_sum: 0.0,
        }
    }

    /// Adds one run. A run succeeds when its cost reaches `optimum`.
    ///
    /// Runs that found no tour (`PLUS_INFINITY`) count towards runs, trials
    /// and time but not towards the cost figures.
    pub fn update(&mut self, cost: Cost, trials: usize, seconds: f64, optimum: Cost) {
        self.runs += 1;
        self.optimum = optimum;
        if cost != PLUS_INFINITY {
            if cost <= optimum {
                self.successes += 1;
            }
            self.cost_min = self.cost_min.min(cost);
            self.cost_max = self.cost_max.max(cost);
            self.cost_sum += i128::from(cost);
            self.finite_runs += 1;
        }
        self.trials_min = self.trials_min.min(trials);
        self.trials_max = self.trials_max.max(trials);
        self.trials_sum += trials;
        self.time_min = self.time_min.min(seconds);
        self.time_max = self.time_max.max(seconds);
        self.time_sum += seconds;
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    pub fn summary(&self) -> StatisticsSummary {
        let runs = self.runs.max(1) as f64;
        let (cost_min, cost_avg, cost_max) = if self.finite_runs == 0 {
            (None, None, None)
        } else {
            (
                Some(self.cost_min),
                Some(self.cost_sum as f64 / self.finite_runs as f64),
                Some(self.cost_max),
            )
        };
        let gap_avg = match cost_avg {
            Some(avg) if self.optimum != MINUS_INFINITY && self.optimum != 0 => {
                Some(100.0 * (avg - self.optimum as f64) / self.optimum as f64)
            }
            _ => None,
        };
        StatisticsSummary {
            runs: self.runs,
            successes: self.successes,
            cost_min,
            cost_avg,
            cost_max,
            gap_min: cost_min.and_then(|c| gap(c, self.optimum)),
            gap_avg,
            trials_min: if self.runs == 0 { 0 } else { self.trials_min },
            trials_avg: self.trials_sum as f64 / runs,
            trials_max: self.trials_max,
            time_min: if self.runs == 0 { 0.0 } else { self.time_min },
            time_avg: self.time_sum / runs,
            time_max: self.time_max,
        }
    }

    /// Logs the summary unless logging is off.
    pub fn report(&self, log_level: &LogLevel) {
        if matches!(log_level, LogLevel::None) {
            return;
        }
        let summary = self.summary();
        info!(
            event = "statistics",
            runs = summary.runs,
            successes = summary.successes,
            cost_min = ?summary.cost_min,
            cost_avg = ?summary.cost_avg,
            cost_max = ?summary.cost_max,
            gap_min = ?summary.gap_min,
            gap_avg = ?summary.gap_avg,
            trials_min = summary.trials_min,
            trials_avg = summary.trials_avg,
            trials_max = summary.trials_max,
            time_min = summary.time_min,
            time_avg = summary.time_avg,
            time_max = summary.time_max,
        );
    }
}
