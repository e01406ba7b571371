//! # Tour Archive
//!
//! A bounded archive of good, distinct tours kept across runs. Members are
//! ordered by fitness (tour cost, lower is better). Membership is decided by the
//! run controller from exact-fitness collision checks and eviction of a member
//! that is worse than the incoming tour.
//!
//! Parents for crossover are drawn with [`linear_selection`], which favours the
//! front of the archive.

use std::fmt::Debug;

use crate::error::{OptionExt, Result, SearchError};
use crate::problem::Cost;
use crate::rng::RandomNumberGenerator;
use crate::tour::shared_edges;

/// Bias used when drawing crossover parents.
pub const SELECTION_BIAS: f64 = 1.25;

/// Storage for archived tours.
pub trait Archive: Debug + Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of members.
    fn capacity(&self) -> usize;

    /// Whether a member has exactly this fitness.
    fn has_fitness(&self, cost: Cost) -> bool;

    /// Inserts a tour. Callers only add while the archive is under capacity.
    fn add(&mut self, successors: &[usize], cost: Cost);

    /// Index of the member to evict in favour of a tour of cost `cost`.
    fn replacement_index(&self, successors: &[usize], cost: Cost) -> usize;

    fn replace(&mut self, index: usize, successors: &[usize], cost: Cost);

    fn fitness(&self, index: usize) -> Cost;

    /// Successor array of a member.
    fn tour(&self, index: usize) -> &[usize];

    /// Fitness of every member, best first.
    fn fitnesses(&self) -> Vec<Cost> {
        (0..self.len()).map(|i| self.fitness(i)).collect()
    }
}

/// Which member a better tour evicts once the archive is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Replacement {
    /// The member with the worst fitness.
    #[default]
    Worst,
    /// Among members worse than the new tour, the one sharing the most edges
    /// with it; the worst member on ties.
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Individual {
    successors: Vec<usize>,
    fitness: Cost,
}

/// The default archive: a fitness-ordered vector of tours.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Individual>,
    capacity: usize,
    replacement: Replacement,
}

impl Population {
    pub fn new(capacity: usize, replacement: Replacement) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            capacity,
            replacement,
        }
    }

    fn sort(&mut self) {
        self.members.sort_by_key(|m| m.fitness);
    }
}

impl Archive for Population {
    fn len(&self) -> usize {
        self.members.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn has_fitness(&self, cost: Cost) -> bool {
        self.members.iter().any(|m| m.fitness == cost)
    }

    fn add(&mut self, successors: &[usize], cost: Cost) {
        self.members.push(Individual {
            successors: successors.to_vec(),
            fitness: cost,
        });
        self.sort();
        self.members.truncate(self.capacity);
    }

    fn replacement_index(&self, successors: &[usize], cost: Cost) -> usize {
        let worst = self.members.len().saturating_sub(1);
        match self.replacement {
            Replacement::Worst => worst,
            Replacement::Nearest => {
                let mut chosen = worst;
                let mut min_distance = usize::MAX;
                for (i, member) in self.members.iter().enumerate().rev() {
                    if member.fitness <= cost {
                        break;
                    }
                    let distance = successors.len() - shared_edges(successors, &member.successors);
                    if distance < min_distance {
                        chosen = i;
                        min_distance = distance;
                    }
                }
                chosen
            }
        }
    }

    fn replace(&mut self, index: usize, successors: &[usize], cost: Cost) {
        self.members[index] = Individual {
            successors: successors.to_vec(),
            fitness: cost,
        };
        self.sort();
    }

    fn fitness(&self, index: usize) -> Cost {
        self.members[index].fitness
    }

    fn tour(&self, index: usize) -> &[usize] {
        &self.members[index].successors
    }
}

/// Draws an index in `0..size`, biased towards small indices.
///
/// With `bias` in `(1, 2]` the probability of index `i` decreases linearly in
/// `i`; a bias of 1 is uniform.
///
/// # Errors
///
/// Returns `SearchError::EmptyArchive` if `size` is 0 and a
/// `SearchError::Configuration` if `bias` is outside `[1, 2]`.
pub fn linear_selection(size: usize, bias: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
    let last = size
        .checked_sub(1)
        .ok_or_else_search(|| SearchError::EmptyArchive)?;
    if !(1.0..=2.0).contains(&bias) {
        return Err(SearchError::Configuration(
            "Selection bias must be in the range [1.0, 2.0]".to_string(),
        ));
    }
    if bias == 1.0 {
        return Ok(rng.gen_index(size));
    }
    let u = rng.gen_unit();
    let index = size as f64 * (bias - (bias * bias - 4.0 * (bias - 1.0) * u).sqrt())
        / 2.0
        / (bias - 1.0);
    Ok((index as usize).min(last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tour(order: &[usize]) -> Vec<usize> {
        crate::tour::Tour::from_order(order).unwrap().suc
    }

    #[test]
    fn test_members_sorted_by_fitness() {
        let mut population = Population::new(3, Replacement::Worst);
        population.add(&tour(&[0, 1, 2, 3]), 30);
        population.add(&tour(&[0, 2, 1, 3]), 10);
        population.add(&tour(&[0, 1, 3, 2]), 20);

        assert_eq!(population.fitnesses(), vec![10, 20, 30]);
        assert!(population.has_fitness(20));
        assert!(!population.has_fitness(25));
        assert_eq!(population.tour(0), tour(&[0, 2, 1, 3]).as_slice());
    }

    #[test]
    fn test_add_never_exceeds_capacity() {
        let mut population = Population::new(2, Replacement::Worst);
        population.add(&tour(&[0, 1, 2]), 3);
        population.add(&tour(&[0, 1, 2]), 2);
        population.add(&tour(&[0, 1, 2]), 1);
        assert_eq!(population.len(), 2);
        assert_eq!(population.fitnesses(), vec![1, 2]);
    }

    #[test]
    fn test_worst_replacement() {
        let mut population = Population::new(2, Replacement::Worst);
        population.add(&tour(&[0, 1, 2, 3]), 10);
        population.add(&tour(&[0, 2, 1, 3]), 20);

        let incoming = tour(&[0, 1, 3, 2]);
        let index = population.replacement_index(&incoming, 5);
        assert_eq!(index, 1);

        population.replace(index, &incoming, 5);
        assert_eq!(population.fitnesses(), vec![5, 10]);
    }

    #[test]
    fn test_nearest_replacement_prefers_similar_worse_member() {
        let mut population = Population::new(3, Replacement::Nearest);
        let near = tour(&[0, 1, 2, 3, 5, 4]);
        population.add(&tour(&[0, 1, 2, 3, 4, 5]), 8);
        population.add(&near, 12);
        population.add(&tour(&[0, 3, 1, 4, 2, 5]), 15);

        let incoming = tour(&[0, 1, 2, 3, 4, 5]);
        // member 0 is better than the incoming tour and is never evicted
        assert_eq!(population.replacement_index(&incoming, 9), 1);
    }

    #[test]
    fn test_linear_selection_bounds() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        for _ in 0..200 {
            let index = linear_selection(4, SELECTION_BIAS, &mut rng).unwrap();
            assert!(index < 4);
        }
        assert!(matches!(
            linear_selection(0, SELECTION_BIAS, &mut rng),
            Err(SearchError::EmptyArchive)
        ));
        assert!(linear_selection(3, 2.5, &mut rng).is_err());
    }

    #[test]
    fn test_linear_selection_favours_front() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            counts[linear_selection(4, 2.0, &mut rng).unwrap()] += 1;
        }
        assert!(counts[0] > counts[3]);
    }
}
