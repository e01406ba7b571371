//! # Engine
//!
//! Orchestration of a multi-run search. [`RunController`] drives the runs and
//! the tour archive, [`TrialEngine`] performs the trials of one run and
//! [`SearchContext`] carries the state both of them work on. The search
//! primitives they call are collected in [`Strategies`].
//!
//! ## Example
//!
//! ```rust
//! use lkrun::engine::{RunController, SearchOptions};
//! use lkrun::problem::EuclideanProblem;
//!
//! let points = vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (5.0, -3.0)];
//! let problem = EuclideanProblem::new("pentagon", points);
//! let options = SearchOptions::builder().runs(2).seed(7).build();
//!
//! let controller = RunController::builder().build();
//! let mut ctx = controller.prepare(problem, options).unwrap();
//! let outcome = controller.solve(&mut ctx).unwrap();
//! assert!(outcome.best_tour.is_some());
//! ```

use crate::candidates::{CandidateAdapter, TourEdgeAdapter};
use crate::problem::Problem;
use crate::search::{
    Crossover, EdgeRecombination, InitialTour, KeepBetter, LocalSearch, RandomWalk, TourMerger,
    TwoOpt,
};

pub mod builder;
pub mod context;
pub mod controller;
pub mod options;
pub mod trial;

pub use builder::RunControllerBuilder;
pub use context::SearchContext;
pub use controller::{RunController, RunRecord, SearchOutcome};
pub use options::{LogLevel, SearchOptions, SearchOptionsBuilder};
pub use trial::TrialEngine;

/// The search primitives used by the trial engine and the run controller.
#[derive(Debug)]
pub struct Strategies<P>
where
    P: Problem,
{
    pub initial_tour: Box<dyn InitialTour<P>>,
    pub local_search: Box<dyn LocalSearch<P>>,
    pub merger: Box<dyn TourMerger<P>>,
    pub crossover: Box<dyn Crossover<P>>,
    pub candidate_adapter: Box<dyn CandidateAdapter<P>>,
}

impl<P> Default for Strategies<P>
where
    P: Problem,
{
    fn default() -> Self {
        Self {
            initial_tour: Box::new(RandomWalk),
            local_search: Box::new(TwoOpt::default()),
            merger: Box::new(KeepBetter),
            crossover: Box::new(EdgeRecombination),
            candidate_adapter: Box::new(TourEdgeAdapter),
        }
    }
}
