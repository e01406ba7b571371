use super::Crossover;
use crate::problem::{Cost, Problem};
use crate::rng::RandomNumberGenerator;
use crate::tour::Tour;

/// Edge recombination crossover.
///
/// The offspring is built from the union of the parents' edges. Starting at a
/// random node, it repeatedly moves to the unvisited neighbour (in the union)
/// with the fewest remaining neighbours, breaking ties by edge cost. When the
/// current node has no unvisited neighbour left the nearest unvisited node is
/// taken instead.
#[derive(Debug, Clone, Default)]
pub struct EdgeRecombination;

impl<P> Crossover<P> for EdgeRecombination
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
    ) -> Cost {
        let n = tour.dimension();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::with_capacity(4); n];
        for parent in [first_parent, second_parent] {
            for (node, &succ) in parent.iter().enumerate() {
                if !adjacency[node].contains(&succ) {
                    adjacency[node].push(succ);
                }
                if !adjacency[succ].contains(&node) {
                    adjacency[succ].push(node);
                }
            }
        }

        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut current = rng.gen_index(n);
        loop {
            visited[current] = true;
            order.push(current);
            if order.len() == n {
                break;
            }

            let neighbours = std::mem::take(&mut adjacency[current]);
            for &neighbour in &neighbours {
                adjacency[neighbour].retain(|&other| other != current);
            }

            let next = neighbours
                .iter()
                .copied()
                .min_by_key(|&v| (adjacency[v].len(), problem.cost(current, v)))
                .or_else(|| {
                    (0..n)
                        .filter(|&v| !visited[v])
                        .min_by_key(|&v| problem.cost(current, v))
                });
            let Some(next) = next else {
                break;
            };
            current = next;
        }

        tour.link_order(&order);
        tour.cost(problem)
    }
}
