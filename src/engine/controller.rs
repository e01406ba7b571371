use std::time::Instant;

use tracing::info;

use super::context::SearchContext;
use super::options::SearchOptions;
use super::trial::TrialEngine;
use super::{RunControllerBuilder, Strategies};
use crate::candidates::{CandidateBuilder, ALPHA_MAX};
use crate::error::Result;
use crate::persistence::TourTarget;
use crate::population::{linear_selection, SELECTION_BIAS};
use crate::problem::{Cost, Problem, PLUS_INFINITY};
use crate::statistics::{gap, StatisticsSummary};

/// Cost and optimum after one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunRecord {
    pub run: usize,
    pub cost: Cost,
    pub optimum: Cost,
}

/// Represents the result of a search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOutcome {
    pub best_cost: Cost,
    /// The best tour as a node sequence starting at node 0.
    pub best_tour: Option<Vec<usize>>,
    pub optimum: Cost,
    /// Number of runs executed.
    pub runs: usize,
    pub crossovers: usize,
    pub history: Vec<RunRecord>,
    pub statistics: StatisticsSummary,
}

/// Drives the runs of a search and the tour archive between them.
#[derive(Debug)]
pub struct RunController<P>
where
    P: Problem,
{
    strategies: Strategies<P>,
    candidate_builder: Box<dyn CandidateBuilder<P>>,
}

impl<P> RunController<P>
where
    P: Problem,
{
    pub fn new(strategies: Strategies<P>, candidate_builder: Box<dyn CandidateBuilder<P>>) -> Self {
        Self {
            strategies,
            candidate_builder,
        }
    }

    pub fn builder() -> RunControllerBuilder<P> {
        RunControllerBuilder::new()
    }

    pub fn strategies(&self) -> &Strategies<P> {
        &self.strategies
    }

    /// Builds the candidate set of `problem` and the context of a search over it.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Configuration` if the options are invalid for the
    /// problem.
    pub fn prepare(&self, problem: P, options: SearchOptions) -> Result<SearchContext<P>> {
        options.validate(problem.dimension())?;
        let candidates = self.candidate_builder.build(&problem);
        SearchContext::new(problem, options, candidates)
    }

    /// Runs the search to completion.
    ///
    /// When the problem's lower bound is known to be optimal the live tour is
    /// recorded and persisted as it is and no run is made. Otherwise up to
    /// `runs` runs are made; the search ends early once a run reproduces the
    /// known optimum and `stop_at_optimum` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if a tour cannot be persisted or the archive cannot
    /// deliver crossover parents.
    pub fn solve(&self, ctx: &mut SearchContext<P>) -> Result<SearchOutcome> {
        let started = Instant::now();
        let log_level = *ctx.options.get_log_level();
        let max_population_size = ctx.options.get_max_population_size();
        let stop_at_optimum = ctx.options.get_stop_at_optimum();
        let runs = ctx.options.get_runs();
        let engine = TrialEngine::new(&self.strategies);
        let mut history = Vec::new();
        let mut executed = 0;

        let runs = if ctx.problem.bound_is_optimal() {
            let bound = ctx.problem.lower_bound();
            ctx.optimum = bound;
            ctx.best_cost = bound;
            ctx.statistics
                .update(bound, ctx.trial, started.elapsed().as_secs_f64(), bound);
            ctx.record_better_tour();
            ctx.record_best_tour();
            ctx.persist_best_tour(TourTarget::Output)?;
            ctx.persist_best_tour(TourTarget::Working)?;
            0
        } else {
            ctx.best_cost = PLUS_INFINITY;
            runs
        };

        for run in 1..=runs {
            let run_started = Instant::now();
            let mut cost = engine.find_tour(ctx, run)?;

            if max_population_size > 1 {
                for i in 0..ctx.archive.len() {
                    let old_cost = cost;
                    cost = self.merge_with_individual(ctx, i);
                    if log_level.runs() && cost < old_cost {
                        info!(
                            event = "merged",
                            individual = i + 1,
                            cost = cost,
                            gap = ?gap(cost, ctx.optimum),
                        );
                    }
                }
                if cost != PLUS_INFINITY && !ctx.archive.has_fitness(cost) {
                    let size = ctx.archive.len();
                    if size < max_population_size {
                        ctx.archive.add(&ctx.tour.suc, cost);
                        self.log_population(ctx);
                    } else if size > 0 && cost < ctx.archive.fitness(size - 1) {
                        let index = ctx.archive.replacement_index(&ctx.tour.suc, cost);
                        ctx.archive.replace(index, &ctx.tour.suc, cost);
                        self.log_population(ctx);
                    }
                }
            } else if run > 1 {
                if let Some(merged) = self.merge_with_best_tour(ctx) {
                    cost = merged;
                }
            }

            if cost < ctx.best_cost {
                ctx.best_cost = cost;
                ctx.record_better_tour();
                ctx.record_best_tour();
                ctx.persist_best_tour(TourTarget::Output)?;
                ctx.persist_best_tour(TourTarget::Working)?;
            }

            let old_optimum = ctx.optimum;
            if cost < ctx.optimum {
                if ctx.tour.input_suc.is_some() {
                    ctx.tour.input_suc = Some(ctx.tour.suc.clone());
                }
                ctx.optimum = cost;
                if log_level.runs() {
                    info!(event = "new_optimum", optimum = cost);
                }
            }

            let seconds = run_started.elapsed().as_secs_f64();
            ctx.statistics.update(cost, ctx.trial, seconds, ctx.optimum);
            history.push(RunRecord {
                run,
                cost,
                optimum: ctx.optimum,
            });
            executed = run;
            if log_level.runs() && cost != PLUS_INFINITY {
                info!(
                    event = "run",
                    run = run,
                    cost = cost,
                    gap = ?gap(cost, ctx.optimum),
                    time = seconds,
                );
            }
            debug_assert!(ctx.tour.validate().is_ok());

            if stop_at_optimum && cost == old_optimum && max_population_size >= 1 {
                break;
            }

            let size = ctx.archive.len();
            if size >= 2 && (size == max_population_size || run >= 2 * max_population_size) && run < runs
            {
                self.diversify(ctx)?;
            }

            ctx.seed += 1;
            ctx.rng.reseed(ctx.seed);
        }

        ctx.statistics.report(&log_level);

        Ok(SearchOutcome {
            best_cost: ctx.best_cost,
            best_tour: ctx.best_order(),
            optimum: ctx.optimum,
            runs: executed,
            crossovers: ctx.crossovers,
            history,
            statistics: ctx.statistics.summary(),
        })
    }

    /// Merges the live tour with archive member `index` and returns the cost
    /// of the result, which is left in the live tour.
    pub fn merge_with_individual(&self, ctx: &mut SearchContext<P>, index: usize) -> Cost {
        ctx.tour.stage_next(ctx.archive.tour(index));
        self.strategies.merger.merge(&ctx.problem, &mut ctx.tour)
    }

    /// Merges the live tour with the global best tour.
    ///
    /// Returns `None` when no best tour has been recorded yet.
    pub fn merge_with_best_tour(&self, ctx: &mut SearchContext<P>) -> Option<Cost> {
        let best = ctx.best_tour.as_deref()?;
        ctx.tour.stage_next(best);
        Some(self.strategies.merger.merge(&ctx.problem, &mut ctx.tour))
    }

    /// Recombines two archive members into the live tour, makes the edges of
    /// the offspring candidates and keeps it as the start tour of the next run.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::EmptyArchive` if the archive is empty.
    pub fn diversify(&self, ctx: &mut SearchContext<P>) -> Result<()> {
        let size = ctx.archive.len();
        let first = linear_selection(size, SELECTION_BIAS, &mut ctx.rng)?;
        let mut second = first;
        if size > 1 {
            while second == first {
                second = linear_selection(size, SELECTION_BIAS, &mut ctx.rng)?;
            }
        }

        let cost = self.strategies.crossover.apply(
            &ctx.problem,
            &mut ctx.tour,
            ctx.archive.tour(first),
            ctx.archive.tour(second),
            &mut ctx.rng,
        );
        ctx.crossovers += 1;

        if ctx.problem.problem_type().accepts_offspring_candidates() {
            for node in 0..ctx.tour.dimension() {
                let succ = ctx.tour.suc[node];
                let d = ctx.problem.cost(node, succ);
                ctx.candidates.add(node, succ, d, ALPHA_MAX);
                ctx.candidates.add(succ, node, d, ALPHA_MAX);
            }
        }
        ctx.tour.initial_suc = Some(ctx.tour.suc.clone());

        if ctx.options.get_log_level().runs() {
            info!(
                event = "crossover",
                first_parent = first + 1,
                second_parent = second + 1,
                cost = cost,
            );
        }
        Ok(())
    }

    fn log_population(&self, ctx: &SearchContext<P>) {
        if ctx.options.get_log_level().runs() {
            info!(event = "population", fitness = ?ctx.archive.fitnesses());
        }
    }
}

impl<P> Default for RunController<P>
where
    P: Problem,
{
    fn default() -> Self {
        RunControllerBuilder::new().build()
    }
}
