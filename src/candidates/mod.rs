//! # Candidate Edges
//!
//! Every node keeps a ranked list of candidate edges the move search is allowed
//! to try. Lists are ranked ascending by `alpha` (lower is more promising) and
//! then by cost. Edges taken over from tours rather than computed by the
//! candidate builder carry [`ALPHA_MAX`].

use std::fmt;

use crate::problem::Cost;

pub mod adapter;
pub mod builder;

pub use adapter::{CandidateAdapter, TourEdgeAdapter};
pub use builder::{CandidateBuilder, NearestNeighbourCandidates};

/// Priority of candidate edges injected from tours.
pub const ALPHA_MAX: i64 = i64::MAX;

/// A candidate edge leaving some node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub to: usize,
    pub cost: Cost,
    pub alpha: i64,
}

/// The candidate lists of all nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateSet {
    lists: Vec<Vec<Candidate>>,
}

impl CandidateSet {
    /// A set with an empty list for each of `dimension` nodes.
    pub fn empty(dimension: usize) -> Self {
        Self {
            lists: vec![Vec::new(); dimension],
        }
    }

    pub fn from_lists(lists: Vec<Vec<Candidate>>) -> Self {
        Self { lists }
    }

    pub fn dimension(&self) -> usize {
        self.lists.len()
    }

    pub fn candidates(&self, node: usize) -> &[Candidate] {
        &self.lists[node]
    }

    pub fn candidates_mut(&mut self, node: usize) -> &mut Vec<Candidate> {
        &mut self.lists[node]
    }

    pub fn get(&self, from: usize, to: usize) -> Option<&Candidate> {
        self.lists[from].iter().find(|c| c.to == to)
    }

    pub fn contains(&self, from: usize, to: usize) -> bool {
        self.get(from, to).is_some()
    }

    /// Appends the edge `from → to` unless it is already a candidate of `from`.
    ///
    /// Returns `true` if the edge was added.
    pub fn add(&mut self, from: usize, to: usize, cost: Cost, alpha: i64) -> bool {
        if self.contains(from, to) {
            return false;
        }
        self.lists[from].push(Candidate { to, cost, alpha });
        true
    }

    /// Summary of the list sizes.
    pub fn report(&self) -> CandidateReport {
        let sizes = self.lists.iter().map(Vec::len);
        let total: usize = sizes.clone().sum();
        CandidateReport {
            min: sizes.clone().min().unwrap_or(0),
            max: sizes.max().unwrap_or(0),
            avg: if self.lists.is_empty() {
                0.0
            } else {
                total as f64 / self.lists.len() as f64
            },
            edges: self.undirected_edges(),
        }
    }

    fn undirected_edges(&self) -> usize {
        self.lists
            .iter()
            .enumerate()
            .flat_map(|(from, list)| list.iter().map(move |c| (from, c.to)))
            .filter(|&(from, to)| from < to || !self.contains(to, from))
            .count()
    }
}

/// Candidate list statistics, as printed for backbone candidate sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateReport {
    pub min: usize,
    pub avg: f64,
    pub max: usize,
    pub edges: usize,
}

impl fmt::Display for CandidateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cand.min = {}, Cand.avg = {:.1}, Cand.max = {}, Edges.fixed = {}",
            self.min, self.avg, self.max, self.edges
        )
    }
}
