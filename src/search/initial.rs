use super::InitialTour;
use crate::candidates::CandidateSet;
use crate::problem::{Cost, Problem};
use crate::rng::RandomNumberGenerator;
use crate::tour::Tour;

/// Random walk over candidate edges.
///
/// From the first node the walk moves to a random unvisited candidate
/// neighbour, or to a random unvisited node when all candidates are used up.
/// On the first trial of a run a pending crossover offspring (`initial_suc`)
/// is used as the start tour instead.
#[derive(Debug, Clone, Default)]
pub struct RandomWalk;

impl<P> InitialTour<P> for RandomWalk
where
    P: Problem,
{
    fn build(
        &self,
        problem: &P,
        tour: &mut Tour,
        candidates: &CandidateSet,
        trial: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Cost {
        if trial == 1 {
            if let Some(initial) = tour.initial_suc.take() {
                tour.link_successors(&initial);
                tour.initial_suc = Some(initial);
                return tour.cost(problem);
            }
        }

        let n = tour.dimension();
        let mut order = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        // unvisited nodes and where each sits in that list, for O(1) removal
        let mut unvisited: Vec<usize> = (0..n).collect();
        let mut position: Vec<usize> = (0..n).collect();

        let mut current = tour.first;
        loop {
            visited[current] = true;
            order.push(current);
            let at = position[current];
            unvisited.swap_remove(at);
            if let Some(&moved) = unvisited.get(at) {
                position[moved] = at;
            }
            if unvisited.is_empty() {
                break;
            }

            let options: Vec<usize> = candidates
                .candidates(current)
                .iter()
                .map(|c| c.to)
                .filter(|&to| !visited[to])
                .collect();
            current = if options.is_empty() {
                unvisited[rng.gen_index(unvisited.len())]
            } else {
                options[rng.gen_index(options.len())]
            };
        }

        tour.link_order(&order);
        tour.cost(problem)
    }
}
