use super::TourMerger;
use crate::problem::{Cost, Problem};
use crate::tour::{chain_cost, Tour};

/// Keeps whichever of the live tour and the staged `next` chain is cheaper.
///
/// Ties keep the live tour.
#[derive(Debug, Clone, Default)]
pub struct KeepBetter;

impl<P> TourMerger<P> for KeepBetter
where
    P: Problem,
{
    fn merge(&self, problem: &P, tour: &mut Tour) -> Cost {
        let live = tour.cost(problem);
        let staged = chain_cost(problem, &tour.next);
        if staged < live {
            let next = tour.next.clone();
            tour.link_successors(&next);
            staged
        } else {
            live
        }
    }
}
