//! # Search Primitives
//!
//! The trial engine and run controller drive four interchangeable primitives:
//!
//! - [`InitialTour`] builds the start tour of a trial,
//! - [`LocalSearch`] improves it,
//! - [`TourMerger`] combines the live tour with a tour staged in `Tour::next`,
//! - [`Crossover`] recombines two archived tours into a new live tour.
//!
//! Every primitive leaves the live chain of the [`Tour`] as a single
//! Hamiltonian cycle and returns the cost of that cycle.

use std::fmt::Debug;

use crate::candidates::CandidateSet;
use crate::duplicate::DuplicateDetector;
use crate::problem::{Cost, Problem};
use crate::rng::RandomNumberGenerator;
use crate::tour::Tour;

pub mod crossover;
pub mod initial;
pub mod merge;
pub mod two_opt;

pub use crossover::EdgeRecombination;
pub use initial::RandomWalk;
pub use merge::KeepBetter;
pub use two_opt::TwoOpt;

/// Builds the start tour of a trial.
pub trait InitialTour<P>: Debug + Send + Sync
where
    P: Problem,
{
    /// Links a new tour into the live chain, starting from `tour.first`, and
    /// returns its cost.
    fn build(
        &self,
        problem: &P,
        tour: &mut Tour,
        candidates: &CandidateSet,
        trial: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Cost;
}

/// Improves the live tour.
///
/// Implementations may stop as soon as the live tour is already recorded in
/// `duplicates`, since that tour has been optimized before.
pub trait LocalSearch<P>: Debug + Send + Sync
where
    P: Problem,
{
    fn optimize(
        &self,
        problem: &P,
        tour: &mut Tour,
        candidates: &CandidateSet,
        duplicates: &DuplicateDetector,
    ) -> Cost;
}

/// Merges the chain staged in `tour.next` with the live tour.
pub trait TourMerger<P>: Debug + Send + Sync
where
    P: Problem,
{
    /// Leaves the merged tour in the live chain and returns its cost.
    fn merge(&self, problem: &P, tour: &mut Tour) -> Cost;
}

/// Recombines two parent tours, given as successor arrays, into the live chain.
pub trait Crossover<P>: Debug + Send + Sync
where
    P: Problem,
{
    fn apply(
        &self,
        problem: &P,
        tour: &mut Tour,
        first_parent: &[usize],
        second_parent: &[usize],
        rng: &mut RandomNumberGenerator,
    ) -> Cost;
}
