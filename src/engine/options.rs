//! # SearchOptions
//!
//! The `SearchOptions` struct holds the configuration of a multi-run search:
//! how many runs to make, the trial and time budget of each run, the archive
//! used for diversification, the seed and where improved tours are written.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use lkrun::engine::options::{LogLevel, SearchOptions};
//!
//! // Defaults: 10 runs, one trial per node, no archive
//! let default_options = SearchOptions::default();
//!
//! let options = SearchOptions::builder()
//!     .runs(5)
//!     .max_trials(200)
//!     .time_limit(Duration::from_secs(30))
//!     .max_population_size(4)
//!     .log_level(LogLevel::Minimal)
//!     .build();
//! assert_eq!(options.get_runs(), 5);
//! ```
//!
//! ## `LogLevel`
//!
//! - `Verbose`: run-level events plus one event per trial.
//! - `Minimal`: run-level events only.
//! - `None`: no events.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SearchError};
use crate::population::Replacement;
use crate::problem::{Cost, MINUS_INFINITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    Verbose,
    Minimal,
    #[default]
    None,
}

impl LogLevel {
    /// Whether run-level events are emitted.
    pub fn runs(&self) -> bool {
        !matches!(self, LogLevel::None)
    }

    /// Whether trial-level events are emitted.
    pub fn trials(&self) -> bool {
        matches!(self, LogLevel::Verbose)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    runs: usize,
    /// Trials per run; the problem dimension when unset.
    max_trials: Option<usize>,
    /// Wall clock budget of one run.
    time_limit: Duration,
    stop_at_optimum: bool,
    optimum: Option<Cost>,
    max_population_size: usize,
    backbone_trials: usize,
    seed: u64,
    log_level: LogLevel,
    output_tour_file: Option<PathBuf>,
    tour_file: Option<PathBuf>,
    replacement: Replacement,
}

impl SearchOptions {
    pub fn get_runs(&self) -> usize {
        self.runs
    }

    pub fn get_max_trials(&self) -> Option<usize> {
        self.max_trials
    }

    /// The trial budget for a problem of `dimension` nodes.
    pub fn max_trials_for(&self, dimension: usize) -> usize {
        self.max_trials.unwrap_or(dimension)
    }

    pub fn get_time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn get_stop_at_optimum(&self) -> bool {
        self.stop_at_optimum
    }

    pub fn get_optimum(&self) -> Option<Cost> {
        self.optimum
    }

    /// The known optimum, or `MINUS_INFINITY` when none is configured.
    pub fn optimum_or_unknown(&self) -> Cost {
        self.optimum.unwrap_or(MINUS_INFINITY)
    }

    pub fn get_max_population_size(&self) -> usize {
        self.max_population_size
    }

    pub fn get_backbone_trials(&self) -> usize {
        self.backbone_trials
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    pub fn get_log_level(&self) -> &LogLevel {
        &self.log_level
    }

    pub fn get_output_tour_file(&self) -> Option<&Path> {
        self.output_tour_file.as_deref()
    }

    pub fn get_tour_file(&self) -> Option<&Path> {
        self.tour_file.as_deref()
    }

    pub fn get_replacement(&self) -> Replacement {
        self.replacement
    }

    /// Sets the number of runs.
    pub fn set_runs(&mut self, runs: usize) {
        self.runs = runs;
    }

    /// Sets the trial budget of a run.
    pub fn set_max_trials(&mut self, max_trials: usize) {
        self.max_trials = Some(max_trials);
    }

    pub fn set_time_limit(&mut self, time_limit: Duration) {
        self.time_limit = time_limit;
    }

    pub fn set_stop_at_optimum(&mut self, stop_at_optimum: bool) {
        self.stop_at_optimum = stop_at_optimum;
    }

    pub fn set_optimum(&mut self, optimum: Cost) {
        self.optimum = Some(optimum);
    }

    pub fn set_max_population_size(&mut self, size: usize) {
        self.max_population_size = size;
    }

    pub fn set_backbone_trials(&mut self, trials: usize) {
        self.backbone_trials = trials;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Sets the log level.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    pub fn set_output_tour_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.output_tour_file = Some(path.into());
    }

    pub fn set_tour_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.tour_file = Some(path.into());
    }

    pub fn set_replacement(&mut self, replacement: Replacement) {
        self.replacement = replacement;
    }

    /// Checks the options against a problem of `dimension` nodes.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Configuration` if no run is requested or the
    /// problem has fewer than three nodes.
    pub fn validate(&self, dimension: usize) -> Result<()> {
        if self.runs == 0 {
            return Err(SearchError::Configuration(
                "Number of runs must be greater than 0".to_string(),
            ));
        }
        if dimension < 3 {
            return Err(SearchError::Configuration(format!(
                "Problem dimension must be at least 3, got {}",
                dimension
            )));
        }
        Ok(())
    }

    /// Returns a builder for creating a `SearchOptions` instance.
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::default()
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            runs: 10,
            max_trials: None,
            time_limit: Duration::MAX,
            stop_at_optimum: true,
            optimum: None,
            max_population_size: 0,
            backbone_trials: 0,
            seed: 1,
            log_level: LogLevel::None,
            output_tour_file: None,
            tour_file: None,
            replacement: Replacement::Worst,
        }
    }
}

/// Builder for `SearchOptions`.
///
/// Unset fields take the values of `SearchOptions::default()`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptionsBuilder {
    options: SearchOptions,
}

impl SearchOptionsBuilder {
    pub fn runs(mut self, value: usize) -> Self {
        self.options.runs = value;
        self
    }

    pub fn max_trials(mut self, value: usize) -> Self {
        self.options.max_trials = Some(value);
        self
    }

    pub fn time_limit(mut self, value: Duration) -> Self {
        self.options.time_limit = value;
        self
    }

    pub fn stop_at_optimum(mut self, value: bool) -> Self {
        self.options.stop_at_optimum = value;
        self
    }

    pub fn optimum(mut self, value: Cost) -> Self {
        self.options.optimum = Some(value);
        self
    }

    pub fn max_population_size(mut self, value: usize) -> Self {
        self.options.max_population_size = value;
        self
    }

    pub fn backbone_trials(mut self, value: usize) -> Self {
        self.options.backbone_trials = value;
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.options.seed = value;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.options.log_level = value;
        self
    }

    pub fn output_tour_file<P: Into<PathBuf>>(mut self, value: P) -> Self {
        self.options.output_tour_file = Some(value.into());
        self
    }

    pub fn tour_file<P: Into<PathBuf>>(mut self, value: P) -> Self {
        self.options.tour_file = Some(value.into());
        self
    }

    pub fn replacement(mut self, value: Replacement) -> Self {
        self.options.replacement = value;
        self
    }

    /// Builds the `SearchOptions` instance.
    pub fn build(self) -> SearchOptions {
        self.options
    }
}
