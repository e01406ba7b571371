//! # lkrun
//!
//! Multi-run iterated local search for the Traveling Salesman Problem.
//!
//! A search is a number of independent runs. Each run performs a number of
//! trials that build a start tour, improve it with a local search and merge
//! it with the best tour of the run. Between runs the best distinct tours are
//! kept in a bounded archive and recombined to seed later runs.
//!
//! The problem, the candidate edges and every search primitive are traits with
//! simple defaults, so the orchestration can be used with other move searches
//! or cost functions.

pub mod candidates;
pub mod duplicate;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod population;
pub mod problem;
pub mod rng;
pub mod search;
pub mod statistics;
pub mod tour;

// Re-export commonly used types for convenience
pub use engine::{
    LogLevel, RunController, RunControllerBuilder, SearchContext, SearchOptions, SearchOutcome,
    Strategies, TrialEngine,
};
pub use error::{OptionExt, Result, ResultExt, SearchError};
pub use problem::{Cost, EuclideanProblem, MatrixProblem, Problem, MINUS_INFINITY, PLUS_INFINITY};
pub use tour::Tour;
