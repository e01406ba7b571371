//! # SearchContext
//!
//! All state of a multi-run search: the problem, the live tour and its
//! snapshot chains, both candidate sets, the duplicate detector, the tour
//! archive, the best tours and costs, the random stream and the statistics.
//! The run controller and the trial engine borrow it mutably for the whole
//! search; storage is allocated once here and mutated in place afterwards.

use crate::candidates::CandidateSet;
use crate::duplicate::DuplicateDetector;
use crate::engine::options::SearchOptions;
use crate::error::{Result, SearchError};
use crate::persistence::{TourTarget, TourWriter, TsplibTourWriter};
use crate::population::{Archive, Population};
use crate::problem::{Cost, Problem, PLUS_INFINITY};
use crate::rng::RandomNumberGenerator;
use crate::statistics::Statistics;
use crate::tour::{chain_order, Tour};

#[derive(Debug)]
pub struct SearchContext<P>
where
    P: Problem,
{
    pub(crate) problem: P,
    pub(crate) options: SearchOptions,
    pub(crate) tour: Tour,
    pub(crate) candidates: CandidateSet,
    /// Candidate set swapped in during backbone trials.
    pub(crate) backbone: Option<CandidateSet>,
    pub(crate) duplicates: DuplicateDetector,
    pub(crate) archive: Box<dyn Archive>,
    /// Global best tour.
    pub(crate) best_tour: Option<Vec<usize>>,
    /// Most recently recorded improving tour.
    pub(crate) better_tour: Option<Vec<usize>>,
    pub(crate) best_cost: Cost,
    /// Best cost of the current run.
    pub(crate) better_cost: Cost,
    pub(crate) optimum: Cost,
    /// Cost of the node-index-ordered tour, computed on the first run.
    pub(crate) ordinal_tour_cost: Option<Cost>,
    pub(crate) rng: RandomNumberGenerator,
    pub(crate) seed: u64,
    pub(crate) trial: usize,
    pub(crate) statistics: Statistics,
    pub(crate) writer: Box<dyn TourWriter>,
    pub(crate) crossovers: usize,
}

impl<P> SearchContext<P>
where
    P: Problem,
{
    /// Creates the context of a search over `problem`.
    ///
    /// The live tour starts as the node-index-ordered tour, the archive is a
    /// [`Population`] sized by the options and tours are written with a
    /// [`TsplibTourWriter`] configured from the options.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Configuration` if the options are invalid for the
    /// problem or `candidates` does not cover every node.
    pub fn new(problem: P, options: SearchOptions, candidates: CandidateSet) -> Result<Self> {
        let dimension = problem.dimension();
        options.validate(dimension)?;
        if candidates.dimension() != dimension {
            return Err(SearchError::Configuration(format!(
                "Candidate set covers {} nodes, problem has {}",
                candidates.dimension(),
                dimension
            )));
        }

        let seed = options.get_seed();
        let mut rng = RandomNumberGenerator::from_seed(seed);
        let duplicates = DuplicateDetector::new(dimension, &mut rng);
        let optimum = options.optimum_or_unknown();

        Ok(Self {
            tour: Tour::ordinal(dimension),
            candidates,
            backbone: None,
            duplicates,
            archive: Box::new(Population::new(
                options.get_max_population_size(),
                options.get_replacement(),
            )),
            best_tour: None,
            better_tour: None,
            best_cost: PLUS_INFINITY,
            better_cost: PLUS_INFINITY,
            optimum,
            ordinal_tour_cost: None,
            rng,
            seed,
            trial: 0,
            statistics: Statistics::new(optimum),
            writer: Box::new(TsplibTourWriter::from_options(&options)),
            crossovers: 0,
            problem,
            options,
        })
    }

    /// Replaces the tour archive.
    pub fn with_archive(mut self, archive: Box<dyn Archive>) -> Self {
        self.archive = archive;
        self
    }

    /// Replaces the tour writer.
    pub fn with_writer(mut self, writer: Box<dyn TourWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Starts from the tour visiting the nodes in `order` and keeps it as the
    /// input tour, refreshed whenever a new optimum is found.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidTour` if `order` is not a permutation of
    /// the problem's nodes.
    pub fn with_initial_order(mut self, order: &[usize]) -> Result<Self> {
        if order.len() != self.problem.dimension() {
            return Err(SearchError::InvalidTour(format!(
                "Initial tour has {} nodes, problem has {}",
                order.len(),
                self.problem.dimension()
            )));
        }
        let input = Tour::from_order(order)?;
        self.tour.link_successors(&input.suc);
        self.tour.input_suc = Some(input.suc);
        Ok(self)
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn archive(&self) -> &dyn Archive {
        self.archive.as_ref()
    }

    pub fn best_cost(&self) -> Cost {
        self.best_cost
    }

    /// Successor array of the global best tour.
    pub fn best_tour(&self) -> Option<&[usize]> {
        self.best_tour.as_deref()
    }

    /// The global best tour as a node sequence starting at node 0.
    pub fn best_order(&self) -> Option<Vec<usize>> {
        self.best_tour.as_deref().map(|suc| chain_order(suc, 0))
    }

    pub fn better_cost(&self) -> Cost {
        self.better_cost
    }

    pub fn optimum(&self) -> Cost {
        self.optimum
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Trials used by the last run.
    pub fn trial(&self) -> usize {
        self.trial
    }

    pub fn crossovers(&self) -> usize {
        self.crossovers
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Trial budget of a run.
    pub fn max_trials(&self) -> usize {
        self.options.max_trials_for(self.problem.dimension())
    }

    /// Records the live tour as the best tour of the run. The previous best of
    /// the run becomes the second best.
    pub(crate) fn record_better_tour(&mut self) {
        self.tour.next_best_suc = self.tour.best_suc.take();
        self.tour.best_suc = Some(self.tour.suc.clone());
        self.better_tour = Some(self.tour.suc.clone());
    }

    pub(crate) fn record_best_tour(&mut self) {
        self.best_tour = self.better_tour.clone();
    }

    /// Exchanges the main and the backbone candidate sets.
    pub(crate) fn swap_candidate_sets(&mut self) {
        let dimension = self.candidates.dimension();
        let backbone = self
            .backbone
            .get_or_insert_with(|| CandidateSet::empty(dimension));
        std::mem::swap(&mut self.candidates, backbone);
    }

    pub(crate) fn persist_better_tour(&mut self, target: TourTarget) -> Result<()> {
        match &self.better_tour {
            Some(tour) => {
                self.writer
                    .write_tour(target, self.problem.name(), tour, self.better_cost)
            }
            None => Ok(()),
        }
    }

    pub(crate) fn persist_best_tour(&mut self, target: TourTarget) -> Result<()> {
        match &self.best_tour {
            Some(tour) => self
                .writer
                .write_tour(target, self.problem.name(), tour, self.best_cost),
            None => Ok(()),
        }
    }
}
