//! # Candidate Set Construction
//!
//! Candidate sets are built once, before the first run. The default builder
//! keeps the `k` cheapest neighbours of each node; ranking of the nodes is
//! independent, so it runs in parallel with rayon.

use std::fmt::Debug;

use rayon::prelude::*;

use super::{Candidate, CandidateSet};
use crate::error::{Result, SearchError};
use crate::problem::Problem;

/// Builds the initial candidate set of a problem.
pub trait CandidateBuilder<P>: Debug + Send + Sync
where
    P: Problem,
{
    fn build(&self, problem: &P) -> CandidateSet;
}

/// Keeps the `k` cheapest neighbours of every node.
///
/// The alpha value of a candidate is its cost minus the cost of the node's
/// cheapest neighbour, so each list starts at alpha zero.
#[derive(Debug, Clone)]
pub struct NearestNeighbourCandidates {
    k: usize,
}

impl NearestNeighbourCandidates {
    /// # Errors
    ///
    /// Returns an error if `k` is 0.
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(SearchError::Configuration(
                "Number of candidates per node must be greater than 0".to_string(),
            ));
        }
        Ok(Self { k })
    }
}

impl Default for NearestNeighbourCandidates {
    fn default() -> Self {
        Self { k: 5 }
    }
}

impl<P> CandidateBuilder<P> for NearestNeighbourCandidates
where
    P: Problem,
{
    fn build(&self, problem: &P) -> CandidateSet {
        let n = problem.dimension();
        let lists = (0..n)
            .into_par_iter()
            .map(|from| {
                let mut neighbours: Vec<Candidate> = (0..n)
                    .filter(|&to| to != from)
                    .map(|to| Candidate {
                        to,
                        cost: problem.cost(from, to),
                        alpha: 0,
                    })
                    .collect();
                neighbours.sort_by_key(|c| (c.cost, c.to));
                neighbours.truncate(self.k);
                let nearest = neighbours.first().map_or(0, |c| c.cost);
                neighbours.iter_mut().for_each(|c| c.alpha = c.cost - nearest);
                neighbours
            })
            .collect();
        CandidateSet::from_lists(lists)
    }
}
