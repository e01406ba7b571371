use crate::candidates::{CandidateAdapter, CandidateBuilder, NearestNeighbourCandidates};
use crate::problem::Problem;
use crate::search::{Crossover, InitialTour, LocalSearch, TourMerger};

use super::{RunController, Strategies};

/// Builder for [`RunController`].
///
/// Every primitive that is not set explicitly falls back to the default of
/// [`Strategies`] and to [`NearestNeighbourCandidates`].
#[derive(Debug)]
pub struct RunControllerBuilder<P>
where
    P: Problem,
{
    strategies: Strategies<P>,
    candidate_builder: Box<dyn CandidateBuilder<P>>,
}

impl<P> RunControllerBuilder<P>
where
    P: Problem,
{
    pub fn new() -> Self {
        Self {
            strategies: Strategies::default(),
            candidate_builder: Box::new(NearestNeighbourCandidates::default()),
        }
    }

    pub fn with_initial_tour<T>(mut self, initial_tour: T) -> Self
    where
        T: InitialTour<P> + 'static,
    {
        self.strategies.initial_tour = Box::new(initial_tour);
        self
    }

    pub fn with_local_search<T>(mut self, local_search: T) -> Self
    where
        T: LocalSearch<P> + 'static,
    {
        self.strategies.local_search = Box::new(local_search);
        self
    }

    pub fn with_merger<T>(mut self, merger: T) -> Self
    where
        T: TourMerger<P> + 'static,
    {
        self.strategies.merger = Box::new(merger);
        self
    }

    pub fn with_crossover<T>(mut self, crossover: T) -> Self
    where
        T: Crossover<P> + 'static,
    {
        self.strategies.crossover = Box::new(crossover);
        self
    }

    pub fn with_candidate_adapter<T>(mut self, adapter: T) -> Self
    where
        T: CandidateAdapter<P> + 'static,
    {
        self.strategies.candidate_adapter = Box::new(adapter);
        self
    }

    pub fn with_candidate_builder<T>(mut self, builder: T) -> Self
    where
        T: CandidateBuilder<P> + 'static,
    {
        self.candidate_builder = Box::new(builder);
        self
    }

    pub fn build(self) -> RunController<P> {
        RunController::new(self.strategies, self.candidate_builder)
    }
}

impl<P> Default for RunControllerBuilder<P>
where
    P: Problem,
{
    fn default() -> Self {
        Self::new()
    }
}
