//! # Tour
//!
//! Index-based representation of the live tour plus the named snapshot chains
//! the search keeps next to it. Every chain is a successor array indexed by
//! node: `chain[n]` is the node that follows `n`.
//!
//! The live chain (`suc` / `pred`) is always a single Hamiltonian cycle once a
//! search has started. The snapshot chains are cleared or overwritten at well
//! defined points of a run:
//!
//! - `old_suc` / `old_pred`: neighbours of each node when the move search last
//!   finished, cleared at the start of every run.
//! - `best_suc` / `next_best_suc`: the best and second best tour of the
//!   current run, cleared at the start of every run.
//! - `next`: scratch chain staging a tour for merging.
//! - `input_suc`: chain of the input tour, refreshed on every new optimum.
//! - `initial_suc`: crossover offspring, consumed by the initial tour builder.

use crate::error::{Result, SearchError};
use crate::problem::{Cost, Problem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub suc: Vec<usize>,
    pub pred: Vec<usize>,
    pub old_suc: Vec<Option<usize>>,
    pub old_pred: Vec<Option<usize>>,
    pub best_suc: Option<Vec<usize>>,
    pub next_best_suc: Option<Vec<usize>>,
    pub next: Vec<usize>,
    pub input_suc: Option<Vec<usize>>,
    pub initial_suc: Option<Vec<usize>>,
    /// Node the current trial starts from.
    pub first: usize,
}

impl Tour {
    /// The node-index-ordered tour `0 → 1 → … → n-1 → 0`.
    pub fn ordinal(dimension: usize) -> Self {
        let order: Vec<usize> = (0..dimension).collect();
        let mut tour = Self::empty(dimension);
        tour.link_order(&order);
        tour
    }

    /// Creates a tour that visits the nodes in `order`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidTour` if `order` is not a permutation of
    /// `0..order.len()`.
    pub fn from_order(order: &[usize]) -> Result<Self> {
        let mut seen = vec![false; order.len()];
        for &node in order {
            if node >= order.len() || std::mem::replace(&mut seen[node], true) {
                return Err(SearchError::InvalidTour(format!(
                    "Order is not a permutation: node {} repeated or out of range",
                    node
                )));
            }
        }
        let mut tour = Self::empty(order.len());
        tour.link_order(order);
        Ok(tour)
    }

    fn empty(dimension: usize) -> Self {
        Self {
            suc: vec![0; dimension],
            pred: vec![0; dimension],
            old_suc: vec![None; dimension],
            old_pred: vec![None; dimension],
            best_suc: None,
            next_best_suc: None,
            next: vec![0; dimension],
            input_suc: None,
            initial_suc: None,
            first: 0,
        }
    }

    pub fn dimension(&self) -> usize {
        self.suc.len()
    }

    /// Relinks the live chain to visit the nodes in `order`.
    pub fn link_order(&mut self, order: &[usize]) {
        let n = order.len();
        for (i, &node) in order.iter().enumerate() {
            let succ = order[(i + 1) % n];
            self.suc[node] = succ;
            self.pred[succ] = node;
        }
    }

    /// Relinks the live chain from a successor array.
    pub fn link_successors(&mut self, successors: &[usize]) {
        self.suc.copy_from_slice(successors);
        for (node, &succ) in successors.iter().enumerate() {
            self.pred[succ] = node;
        }
    }

    /// The live tour as a node sequence starting at `start`.
    pub fn order_from(&self, start: usize) -> Vec<usize> {
        chain_order(&self.suc, start)
    }

    pub fn cost<P: Problem + ?Sized>(&self, problem: &P) -> Cost {
        chain_cost(problem, &self.suc)
    }

    /// Clears the four snapshots that only live for one run.
    pub fn clear_run_snapshots(&mut self) {
        self.old_suc.iter_mut().for_each(|s| *s = None);
        self.old_pred.iter_mut().for_each(|p| *p = None);
        self.next_best_suc = None;
        self.best_suc = None;
    }

    /// Copies `chain` into the scratch `next` chain.
    pub fn stage_next(&mut self, chain: &[usize]) {
        self.next.copy_from_slice(chain);
    }

    /// Stages the node-index-ordered tour into the scratch `next` chain.
    pub fn stage_ordinal_next(&mut self) {
        let n = self.dimension();
        for (node, next) in self.next.iter_mut().enumerate() {
            *next = (node + 1) % n;
        }
    }

    /// Checks that `suc` and `pred` agree and form a single cycle over all nodes.
    pub fn validate(&self) -> Result<()> {
        if let Some(node) = (0..self.dimension()).find(|&n| self.pred[self.suc[n]] != n) {
            return Err(SearchError::InvalidTour(format!(
                "Predecessor of successor of node {} is not the node itself",
                node
            )));
        }
        if !is_cycle(&self.suc) {
            return Err(SearchError::InvalidTour(
                "Successor chain does not form a single cycle".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cost of the cycle described by a successor array.
pub fn chain_cost<P: Problem + ?Sized>(problem: &P, successors: &[usize]) -> Cost {
    successors
        .iter()
        .enumerate()
        .map(|(node, &succ)| problem.cost(node, succ))
        .sum()
}

/// Node sequence of a successor array starting at `start`.
pub fn chain_order(successors: &[usize], start: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(successors.len());
    let mut node = start;
    loop {
        order.push(node);
        node = successors[node];
        if node == start || order.len() > successors.len() {
            break;
        }
    }
    order
}

/// Whether a successor array is one cycle through every node.
pub fn is_cycle(successors: &[usize]) -> bool {
    let n = successors.len();
    if n == 0 || successors.iter().any(|&s| s >= n) {
        return false;
    }
    let mut visited = vec![false; n];
    let mut node = 0;
    for _ in 0..n {
        if visited[node] {
            return false;
        }
        visited[node] = true;
        node = successors[node];
    }
    node == 0
}

/// Number of undirected edges two successor arrays have in common.
pub fn shared_edges(a: &[usize], b: &[usize]) -> usize {
    a.iter()
        .enumerate()
        .filter(|&(node, &succ)| b[node] == succ || b[succ] == node)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::MatrixProblem;

    fn square() -> MatrixProblem {
        // 0-1-2-3 square with unit sides and diagonals of 5
        MatrixProblem::new(vec![
            vec![0, 1, 5, 1],
            vec![1, 0, 1, 5],
            vec![5, 1, 0, 1],
            vec![1, 5, 1, 0],
        ])
        .unwrap()
    }

    #[test]
    fn test_ordinal_tour() {
        let tour = Tour::ordinal(4);
        assert_eq!(tour.suc, vec![1, 2, 3, 0]);
        assert_eq!(tour.pred, vec![3, 0, 1, 2]);
        assert!(tour.validate().is_ok());
        assert_eq!(tour.cost(&square()), 4);
    }

    #[test]
    fn test_from_order_rejects_duplicates() {
        assert!(Tour::from_order(&[0, 1, 1, 3]).is_err());
        assert!(Tour::from_order(&[0, 1, 4, 3]).is_err());
        assert!(Tour::from_order(&[2, 0, 3, 1]).is_ok());
    }

    #[test]
    fn test_link_successors_sets_predecessors() {
        let mut tour = Tour::ordinal(4);
        tour.link_successors(&[2, 3, 1, 0]);
        assert_eq!(tour.pred, vec![3, 2, 0, 1]);
        assert!(tour.validate().is_ok());
        assert_eq!(tour.order_from(0), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_validate_detects_subtours() {
        let mut tour = Tour::ordinal(4);
        tour.suc = vec![1, 0, 3, 2];
        tour.pred = vec![1, 0, 3, 2];
        assert!(matches!(tour.validate(), Err(SearchError::InvalidTour(_))));
    }

    #[test]
    fn test_clear_run_snapshots() {
        let mut tour = Tour::ordinal(3);
        tour.old_suc[1] = Some(2);
        tour.old_pred[1] = Some(0);
        tour.best_suc = Some(vec![1, 2, 0]);
        tour.next_best_suc = Some(vec![2, 0, 1]);
        tour.initial_suc = Some(vec![1, 2, 0]);

        tour.clear_run_snapshots();

        assert!(tour.old_suc.iter().all(Option::is_none));
        assert!(tour.old_pred.iter().all(Option::is_none));
        assert!(tour.best_suc.is_none());
        assert!(tour.next_best_suc.is_none());
        // crossover offspring survives into the next run
        assert!(tour.initial_suc.is_some());
    }

    #[test]
    fn test_shared_edges_ignores_direction() {
        let forward = vec![1, 2, 3, 0];
        let backward = vec![3, 0, 1, 2];
        assert_eq!(shared_edges(&forward, &backward), 4);
        let crossed = vec![2, 3, 1, 0];
        assert_eq!(shared_edges(&forward, &crossed), 2);
    }

    #[test]
    fn test_stage_ordinal_next() {
        let mut tour = Tour::from_order(&[0, 2, 1, 3]).unwrap();
        tour.stage_ordinal_next();
        assert_eq!(tour.next, vec![1, 2, 3, 0]);
        assert!(is_cycle(&tour.next));
    }
}
