use std::collections::VecDeque;

use super::LocalSearch;
use crate::candidates::CandidateSet;
use crate::duplicate::DuplicateDetector;
use crate::error::{Result, SearchError};
use crate::problem::{Cost, Problem};
use crate::tour::Tour;

/// First-improvement 2-opt restricted to candidate edges.
///
/// Only nodes whose neighbours changed since the previous call (tracked in
/// `Tour::old_suc` / `Tour::old_pred`) start out active. A node is re-activated
/// whenever a move touches it. The search ends when no active node is left,
/// after `max_moves` moves, or as soon as it reaches the tour recorded in the
/// duplicate detector.
#[derive(Debug, Clone)]
pub struct TwoOpt {
    max_moves: usize,
}

impl TwoOpt {
    /// # Errors
    ///
    /// Returns an error if `max_moves` is 0.
    pub fn new(max_moves: usize) -> Result<Self> {
        if max_moves == 0 {
            return Err(SearchError::Configuration(
                "Maximum moves must be greater than 0".to_string(),
            ));
        }
        Ok(Self { max_moves })
    }
}

impl Default for TwoOpt {
    fn default() -> Self {
        Self {
            max_moves: 1_000_000,
        }
    }
}

/// Array form of a tour for segment reversal.
struct Sequence {
    order: Vec<usize>,
    position: Vec<usize>,
}

impl Sequence {
    fn new(order: Vec<usize>) -> Self {
        let mut position = vec![0; order.len()];
        for (i, &node) in order.iter().enumerate() {
            position[node] = i;
        }
        Self { order, position }
    }

    fn next(&self, node: usize) -> usize {
        self.order[(self.position[node] + 1) % self.order.len()]
    }

    fn prev(&self, node: usize) -> usize {
        let n = self.order.len();
        self.order[(self.position[node] + n - 1) % n]
    }

    /// Reverses the path running from `from` to `to` in tour direction, or
    /// the complementary path when that one is shorter.
    fn reverse(&mut self, from: usize, to: usize) {
        let n = self.order.len();
        let mut i = self.position[from];
        let mut j = self.position[to];
        let mut len = (j + n - i) % n + 1;
        if 2 * len > n {
            i = (self.position[to] + 1) % n;
            j = (self.position[from] + n - 1) % n;
            len = n - len;
        }
        for _ in 0..len / 2 {
            self.order.swap(i, j);
            self.position[self.order[i]] = i;
            self.position[self.order[j]] = j;
            i = (i + 1) % n;
            j = (j + n - 1) % n;
        }
    }

    fn successors(&self) -> Vec<usize> {
        let mut successors = vec![0; self.order.len()];
        for &node in &self.order {
            successors[node] = self.next(node);
        }
        successors
    }
}

impl TwoOpt {
    /// Applies the first improving move around `a`, returning its gain and the
    /// four endpoints.
    fn improve<P: Problem>(
        &self,
        problem: &P,
        sequence: &mut Sequence,
        candidates: &CandidateSet,
        a: usize,
    ) -> Option<(Cost, [usize; 4])> {
        for forward in [true, false] {
            let b = if forward { sequence.next(a) } else { sequence.prev(a) };
            let ab = problem.cost(a, b);
            for candidate in candidates.candidates(a) {
                let c = candidate.to;
                let ac = problem.cost(a, c);
                if ac >= ab || c == b {
                    continue;
                }
                let d = if forward { sequence.next(c) } else { sequence.prev(c) };
                if d == a {
                    continue;
                }
                let gain = ab + problem.cost(c, d) - ac - problem.cost(b, d);
                if gain > 0 {
                    if forward {
                        sequence.reverse(b, c);
                    } else {
                        sequence.reverse(a, d);
                    }
                    return Some((gain, [a, b, c, d]));
                }
            }
        }
        None
    }
}

impl<P> LocalSearch<P> for TwoOpt
where
    P: Problem,
{
    fn optimize(
        &self,
        problem: &P,
        tour: &mut Tour,
        candidates: &CandidateSet,
        duplicates: &DuplicateDetector,
    ) -> Cost {
        let n = tour.dimension();
        let mut cost = tour.cost(problem);

        if n >= 4 {
            let mut sequence = Sequence::new(tour.order_from(tour.first));
            let mut queue = VecDeque::with_capacity(n);
            let mut queued = vec![false; n];
            for node in 0..n {
                if tour.old_suc[node] != Some(tour.suc[node])
                    || tour.old_pred[node] != Some(tour.pred[node])
                {
                    queue.push_back(node);
                    queued[node] = true;
                }
            }

            let mut moves = 0;
            while let Some(a) = queue.pop_front() {
                queued[a] = false;
                let Some((gain, touched)) = self.improve(problem, &mut sequence, candidates, a)
                else {
                    continue;
                };
                cost -= gain;
                moves += 1;
                for node in touched {
                    if !queued[node] {
                        queued[node] = true;
                        queue.push_back(node);
                    }
                }
                if moves >= self.max_moves {
                    break;
                }
                if !duplicates.is_empty()
                    && duplicates.contains(duplicates.signature(&sequence.successors()), cost)
                {
                    break;
                }
            }
            tour.link_order(&sequence.order);
            debug_assert_eq!(cost, tour.cost(problem));
        }

        for node in 0..n {
            tour.old_suc[node] = Some(tour.suc[node]);
            tour.old_pred[node] = Some(tour.pred[node]);
        }
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{CandidateBuilder, NearestNeighbourCandidates};
    use crate::problem::{EuclideanProblem, MatrixProblem};
    use crate::rng::RandomNumberGenerator;

    fn square() -> MatrixProblem {
        MatrixProblem::new(vec![
            vec![0, 1, 5, 1],
            vec![1, 0, 1, 5],
            vec![5, 1, 0, 1],
            vec![1, 5, 1, 0],
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_moves_rejected() {
        assert!(TwoOpt::new(0).is_err());
    }

    #[test]
    fn test_uncrosses_square() {
        let problem = square();
        let candidates = NearestNeighbourCandidates::default().build(&problem);
        let duplicates = DuplicateDetector::new(4, &mut RandomNumberGenerator::from_seed(1));
        let mut tour = Tour::from_order(&[0, 2, 1, 3]).unwrap();
        assert_eq!(tour.cost(&problem), 12);

        let cost = TwoOpt::default().optimize(&problem, &mut tour, &candidates, &duplicates);

        assert_eq!(cost, 4);
        assert_eq!(tour.cost(&problem), 4);
        assert!(tour.validate().is_ok());
        assert_eq!(tour.old_suc[0], Some(tour.suc[0]));
    }

    #[test]
    fn test_improves_ordinal_tour() {
        let points = (0..40)
            .map(|i| (((i * 37) % 101) as f64, ((i * 59) % 97) as f64))
            .collect();
        let problem = EuclideanProblem::new("forty", points);
        let candidates = NearestNeighbourCandidates::new(8).unwrap().build(&problem);
        let duplicates = DuplicateDetector::new(40, &mut RandomNumberGenerator::from_seed(1));
        let mut tour = Tour::ordinal(40);
        let before = tour.cost(&problem);

        let cost = TwoOpt::default().optimize(&problem, &mut tour, &candidates, &duplicates);

        assert!(cost <= before);
        assert_eq!(cost, tour.cost(&problem));
        assert!(tour.validate().is_ok());
    }

    #[test]
    fn test_unchanged_tour_is_not_searched_again() {
        let problem = square();
        let candidates = NearestNeighbourCandidates::default().build(&problem);
        let duplicates = DuplicateDetector::new(4, &mut RandomNumberGenerator::from_seed(1));
        let mut tour = Tour::from_order(&[0, 2, 1, 3]).unwrap();
        for node in 0..4 {
            tour.old_suc[node] = Some(tour.suc[node]);
            tour.old_pred[node] = Some(tour.pred[node]);
        }

        let cost = TwoOpt::default().optimize(&problem, &mut tour, &candidates, &duplicates);

        assert_eq!(cost, 12);
    }

    #[test]
    fn test_reverse_keeps_positions_consistent() {
        let mut sequence = Sequence::new(vec![0, 1, 2, 3, 4, 5]);
        sequence.reverse(1, 3);
        assert_eq!(sequence.order, vec![0, 3, 2, 1, 4, 5]);
        sequence.reverse(4, 2);
        for (i, &node) in sequence.order.iter().enumerate() {
            assert_eq!(sequence.position[node], i);
        }
        assert!(crate::tour::is_cycle(&sequence.successors()));
    }
}
