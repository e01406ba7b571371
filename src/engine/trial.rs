//! # TrialEngine
//!
//! One run of the search: up to `max_trials` trials, each building an initial
//! tour, improving it with the local search and merging it with the best tour
//! of the run. Improvements are recorded, bias the candidate set and are
//! remembered by the duplicate detector.

use std::time::Instant;

use tracing::{debug, info, trace};

use super::context::SearchContext;
use super::Strategies;
use crate::error::Result;
use crate::persistence::TourTarget;
use crate::problem::{Cost, Problem, PLUS_INFINITY};
use crate::statistics::gap;

/// Cost of the node-index-ordered tour `0 → 1 → … → n-1 → 0`.
///
/// Potentials are removed from the scaled edge costs before dividing by the
/// precision.
pub fn ordinal_tour_cost<P: Problem + ?Sized>(problem: &P) -> Cost {
    let n = problem.dimension();
    let scaled: Cost = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            problem.scaled_cost(i, j) - problem.pi(i) - problem.pi(j)
        })
        .sum();
    scaled / problem.precision()
}

#[derive(Debug)]
pub struct TrialEngine<'a, P>
where
    P: Problem,
{
    strategies: &'a Strategies<P>,
}

impl<'a, P> TrialEngine<'a, P>
where
    P: Problem,
{
    pub fn new(strategies: &'a Strategies<P>) -> Self {
        Self { strategies }
    }

    /// Performs run `run` and returns the best cost it found, or
    /// `PLUS_INFINITY` when no trial completed.
    ///
    /// On return the live tour is the best tour of the run (or the last tour
    /// built when no trial improved), `ctx.trial()` holds the number of trials
    /// used, and the candidate set is back to its ranked form.
    ///
    /// # Errors
    ///
    /// Returns an error if an improved tour cannot be persisted.
    pub fn find_tour(&self, ctx: &mut SearchContext<P>, run: usize) -> Result<Cost> {
        let entry = Instant::now();
        let log_level = *ctx.options.get_log_level();
        let dimension = ctx.problem.dimension();
        let max_trials = ctx.max_trials();
        let backbone_trials = ctx.options.get_backbone_trials();
        let stop_at_optimum = ctx.options.get_stop_at_optimum();
        let time_limit = ctx.options.get_time_limit();
        let auxiliary = ctx.problem.auxiliary_nodes() > 0;

        ctx.tour.clear_run_snapshots();
        if run == 1 && !auxiliary {
            ctx.ordinal_tour_cost = Some(ordinal_tour_cost(&ctx.problem));
        }
        ctx.better_cost = PLUS_INFINITY;
        if max_trials > 0 {
            ctx.duplicates.clear();
        } else {
            self.strategies
                .initial_tour
                .build(&ctx.problem, &mut ctx.tour, &ctx.candidates, 1, &mut ctx.rng);
        }

        let mut backbone_active = false;
        ctx.trial = 1;
        while ctx.trial <= max_trials {
            let trial = ctx.trial;
            if entry.elapsed() >= time_limit {
                if log_level.runs() {
                    info!(event = "time_limit_exceeded", run = run, trial = trial);
                }
                break;
            }

            if auxiliary {
                for _ in 0..ctx.rng.gen_index(dimension) {
                    ctx.tour.first = ctx.tour.suc[ctx.tour.first];
                }
            } else {
                ctx.tour.first = ctx.rng.gen_index(dimension);
            }

            self.strategies.initial_tour.build(
                &ctx.problem,
                &mut ctx.tour,
                &ctx.candidates,
                trial,
                &mut ctx.rng,
            );
            let mut cost = self.strategies.local_search.optimize(
                &ctx.problem,
                &mut ctx.tour,
                &ctx.candidates,
                &ctx.duplicates,
            );
            if let Some(best) = ctx.tour.best_suc.take() {
                ctx.tour.stage_next(&best);
                ctx.tour.best_suc = Some(best);
                cost = self.strategies.merger.merge(&ctx.problem, &mut ctx.tour);
            }
            if let Some(ordinal) = ctx.ordinal_tour_cost.filter(|_| !auxiliary) {
                if cost >= ordinal && ctx.better_cost > ordinal {
                    ctx.tour.stage_ordinal_next();
                    cost = self.strategies.merger.merge(&ctx.problem, &mut ctx.tour);
                }
            }

            if cost < ctx.better_cost {
                if log_level.trials() {
                    debug!(
                        event = "trial",
                        trial = trial,
                        cost = cost,
                        gap = ?gap(cost, ctx.optimum),
                        time = entry.elapsed().as_secs_f64(),
                        improved = true,
                    );
                }
                ctx.better_cost = cost;
                ctx.record_better_tour();
                if !auxiliary && ctx.better_cost < ctx.best_cost {
                    ctx.persist_better_tour(TourTarget::Output)?;
                }
                if stop_at_optimum && ctx.better_cost == ctx.optimum {
                    break;
                }
                self.strategies
                    .candidate_adapter
                    .adjust(&mut ctx.candidates, &ctx.problem, &ctx.tour);
                ctx.duplicates.clear();
                let signature = ctx.duplicates.signature(&ctx.tour.suc);
                ctx.duplicates.insert(signature, cost);
            } else if log_level.trials() {
                trace!(
                    event = "trial",
                    trial = trial,
                    cost = cost,
                    time = entry.elapsed().as_secs_f64(),
                    improved = false,
                );
            }

            if trial <= backbone_trials && backbone_trials < max_trials {
                ctx.swap_candidate_sets();
                self.strategies
                    .candidate_adapter
                    .adjust(&mut ctx.candidates, &ctx.problem, &ctx.tour);
                if trial == backbone_trials {
                    backbone_active = true;
                    if log_level.trials() {
                        debug!(
                            event = "backbone_candidates",
                            trial = trial,
                            report = %ctx.candidates.report(),
                        );
                    }
                } else {
                    ctx.swap_candidate_sets();
                }
            }

            ctx.trial += 1;
        }

        if backbone_trials > 0 && backbone_trials < max_trials {
            if backbone_active {
                ctx.swap_candidate_sets();
            }
            ctx.backbone = None;
        }

        if ctx.problem.bound_is_optimal() {
            ctx.tour.best_suc = Some(ctx.tour.suc.clone());
        }
        if let Some(best) = ctx.tour.best_suc.take() {
            ctx.tour.link_successors(&best);
            ctx.tour.best_suc = Some(best);
        }
        ctx.trial = ctx.trial.min(max_trials);
        self.strategies
            .candidate_adapter
            .reset(&mut ctx.candidates, &ctx.tour);

        Ok(ctx.better_cost)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::candidates::{
        CandidateAdapter, CandidateBuilder, CandidateSet, NearestNeighbourCandidates,
        TourEdgeAdapter, ALPHA_MAX,
    };
    use crate::duplicate::DuplicateDetector;
    use crate::engine::options::SearchOptions;
    use crate::problem::{EuclideanProblem, MatrixProblem};
    use crate::search::LocalSearch;
    use crate::tour::Tour;

    /// 0-2-1-3 is the only optimal cycle; the ordinal tour costs 12.
    fn crossed() -> MatrixProblem {
        MatrixProblem::new(vec![
            vec![0, 5, 1, 1],
            vec![5, 0, 1, 1],
            vec![1, 1, 0, 5],
            vec![1, 1, 5, 0],
        ])
        .unwrap()
    }

    /// Only tour edges, all with `ALPHA_MAX`, make up the backbone set.
    fn is_backbone(candidates: &CandidateSet) -> bool {
        (0..candidates.dimension()).all(|node| {
            candidates
                .candidates(node)
                .iter()
                .all(|c| c.alpha == ALPHA_MAX)
        })
    }

    fn targets(candidates: &CandidateSet, node: usize) -> Vec<usize> {
        let mut to: Vec<usize> = candidates.candidates(node).iter().map(|c| c.to).collect();
        to.sort_unstable();
        to
    }

    /// Links its tours in turn, repeating the last one, and records for every
    /// call whether it was handed the backbone set.
    #[derive(Debug)]
    struct Scripted {
        orders: Vec<Vec<usize>>,
        calls: AtomicUsize,
        backbone: Arc<Mutex<Vec<bool>>>,
    }

    impl Scripted {
        fn new(orders: Vec<Vec<usize>>) -> (Self, Arc<Mutex<Vec<bool>>>) {
            let backbone = Arc::new(Mutex::new(Vec::new()));
            let search = Self {
                orders,
                calls: AtomicUsize::new(0),
                backbone: backbone.clone(),
            };
            (search, backbone)
        }
    }

    impl<P: Problem> LocalSearch<P> for Scripted {
        fn optimize(
            &self,
            problem: &P,
            tour: &mut Tour,
            candidates: &CandidateSet,
            _duplicates: &DuplicateDetector,
        ) -> Cost {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tour.link_order(&self.orders[call.min(self.orders.len() - 1)]);
            self.backbone.lock().unwrap().push(is_backbone(candidates));
            tour.cost(problem)
        }
    }

    /// Records which set every `adjust` and `reset` call works on.
    #[derive(Debug, Default)]
    struct RecordingAdapter {
        adjusted: Arc<Mutex<Vec<bool>>>,
        reset: Arc<Mutex<Vec<bool>>>,
    }

    impl<P: Problem> CandidateAdapter<P> for RecordingAdapter {
        fn adjust(&self, candidates: &mut CandidateSet, problem: &P, tour: &Tour) {
            self.adjusted.lock().unwrap().push(is_backbone(candidates));
            TourEdgeAdapter.adjust(candidates, problem, tour);
        }

        fn reset(&self, candidates: &mut CandidateSet, tour: &Tour) {
            self.reset.lock().unwrap().push(is_backbone(candidates));
            <TourEdgeAdapter as CandidateAdapter<P>>::reset(&TourEdgeAdapter, candidates, tour);
        }
    }

    fn scripted<P: Problem>(
        orders: Vec<Vec<usize>>,
    ) -> (Strategies<P>, Arc<Mutex<Vec<bool>>>, RecordingLogs) {
        let (search, searched) = Scripted::new(orders);
        let adapter = RecordingAdapter::default();
        let logs = RecordingLogs {
            adjusted: adapter.adjusted.clone(),
            reset: adapter.reset.clone(),
        };
        let strategies = Strategies {
            local_search: Box::new(search),
            candidate_adapter: Box::new(adapter),
            ..Strategies::default()
        };
        (strategies, searched, logs)
    }

    struct RecordingLogs {
        adjusted: Arc<Mutex<Vec<bool>>>,
        reset: Arc<Mutex<Vec<bool>>>,
    }

    fn square() -> MatrixProblem {
        MatrixProblem::new(vec![
            vec![0, 1, 5, 1],
            vec![1, 0, 1, 5],
            vec![5, 1, 0, 1],
            vec![1, 5, 1, 0],
        ])
        .unwrap()
    }

    fn context<P: Problem>(problem: P, options: SearchOptions) -> SearchContext<P> {
        let candidates = NearestNeighbourCandidates::default().build(&problem);
        SearchContext::new(problem, options, candidates).unwrap()
    }

    #[test]
    fn test_ordinal_tour_cost_removes_potentials() {
        let plain = square();
        assert_eq!(ordinal_tour_cost(&plain), 4);
        let scaled = square().with_potentials(vec![3, -1, 2, 0], 10).unwrap();
        assert_eq!(ordinal_tour_cost(&scaled), 4);
    }

    #[test]
    fn test_find_tour_reaches_square_optimum() {
        let strategies = Strategies::default();
        let mut ctx = context(square(), SearchOptions::builder().max_trials(4).build());

        let cost = TrialEngine::new(&strategies).find_tour(&mut ctx, 1).unwrap();

        assert_eq!(cost, 4);
        assert!(ctx.tour().validate().is_ok());
        assert_eq!(ctx.tour().cost(ctx.problem()), 4);
        assert!(ctx.trial() <= 4);
    }

    #[test]
    fn test_zero_trials_returns_infinity() {
        let strategies = Strategies::default();
        let mut ctx = context(square(), SearchOptions::builder().max_trials(0).build());

        let cost = TrialEngine::new(&strategies).find_tour(&mut ctx, 1).unwrap();

        assert_eq!(cost, PLUS_INFINITY);
        assert_eq!(ctx.trial(), 0);
        assert!(ctx.tour().validate().is_ok());
    }

    #[test]
    fn test_stops_at_known_optimum() {
        let points = (0..30)
            .map(|i| (((i * 13) % 31) as f64, ((i * 17) % 29) as f64))
            .collect();
        let problem = EuclideanProblem::new("thirty", points);
        let strategies = Strategies::default();
        let mut probe = context(problem.clone(), SearchOptions::builder().max_trials(10).build());
        let target = TrialEngine::new(&strategies).find_tour(&mut probe, 1).unwrap();

        let options = SearchOptions::builder()
            .max_trials(10)
            .optimum(target)
            .build();
        let mut ctx = context(problem, options);
        let cost = TrialEngine::new(&strategies).find_tour(&mut ctx, 1).unwrap();

        assert_eq!(cost, target);
        assert!(ctx.trial() <= 10);
    }

    #[test]
    fn test_backbone_set_released_and_main_restored() {
        let strategies = Strategies::default();
        let options = SearchOptions::builder()
            .max_trials(4)
            .backbone_trials(2)
            .stop_at_optimum(false)
            .build();
        let mut ctx = context(square(), options);

        TrialEngine::new(&strategies).find_tour(&mut ctx, 1).unwrap();

        assert!(ctx.backbone.is_none());
        assert!(!is_backbone(&ctx.candidates));
        // the main set keeps its computed candidates
        for node in 0..4 {
            assert!(ctx.candidates().candidates(node).len() >= 2);
        }
    }

    #[test]
    fn test_non_improving_trials_leave_run_state_alone() {
        let ordinal = vec![0, 1, 2, 3];
        let crossed_order = vec![0, 2, 1, 3];
        let (one, _, _) = scripted(vec![ordinal.clone(), crossed_order.clone()]);
        let (four, searched, logs) = scripted(vec![ordinal, crossed_order]);
        let mut after_first = context(square(), SearchOptions::builder().max_trials(1).build());
        let mut ctx = context(square(), SearchOptions::builder().max_trials(4).build());

        TrialEngine::new(&one).find_tour(&mut after_first, 1).unwrap();
        let cost = TrialEngine::new(&four).find_tour(&mut ctx, 1).unwrap();

        assert_eq!(cost, 4);
        assert_eq!(ctx.trial(), 4);
        assert_eq!(searched.lock().unwrap().len(), 4);
        // only the first trial improved
        assert_eq!(logs.adjusted.lock().unwrap().len(), 1);
        assert_eq!(ctx.tour.best_suc, after_first.tour.best_suc);
        assert_eq!(ctx.tour.next_best_suc, None);
        assert_eq!(ctx.candidates, after_first.candidates);
        assert_eq!(ctx.duplicates, after_first.duplicates);
        assert_eq!(ctx.duplicates.len(), 1);
    }

    #[test]
    fn test_trials_after_backbone_window_search_backbone_set() {
        let (strategies, searched, logs) =
            scripted(vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3], vec![0, 2, 1, 3]]);
        let options = SearchOptions::builder()
            .max_trials(5)
            .backbone_trials(2)
            .stop_at_optimum(false)
            .build();
        let mut ctx = context(crossed(), options);
        let main: Vec<Vec<usize>> = (0..4).map(|n| targets(&ctx.candidates, n)).collect();

        let cost = TrialEngine::new(&strategies).find_tour(&mut ctx, 1).unwrap();

        assert_eq!(cost, 4);
        assert_eq!(*searched.lock().unwrap(), vec![false, false, true, true, true]);
        // trial 1 improves on the main set, trials 1 and 2 feed the backbone
        // set, trial 3 improves while the backbone set is live
        assert_eq!(*logs.adjusted.lock().unwrap(), vec![false, true, true, true]);
        assert_eq!(*logs.reset.lock().unwrap(), vec![false]);
        assert!(ctx.backbone.is_none());
        assert!(!is_backbone(&ctx.candidates));
        for node in 0..4 {
            assert_eq!(targets(&ctx.candidates, node), main[node]);
            assert!(ctx.candidates.candidates(node).iter().all(|c| c.alpha < ALPHA_MAX));
        }
    }

    #[test]
    fn test_optimum_on_last_backbone_trial_keeps_main_set() {
        let (strategies, searched, logs) = scripted(vec![vec![0, 2, 1, 3]]);
        let options = SearchOptions::builder()
            .max_trials(3)
            .backbone_trials(1)
            .optimum(4)
            .stop_at_optimum(true)
            .build();
        let mut ctx = context(crossed(), options);
        let main: Vec<Vec<usize>> = (0..4).map(|n| targets(&ctx.candidates, n)).collect();

        let cost = TrialEngine::new(&strategies).find_tour(&mut ctx, 1).unwrap();

        assert_eq!(cost, 4);
        assert_eq!(ctx.trial(), 1);
        assert_eq!(*searched.lock().unwrap(), vec![false]);
        // the break comes before the backbone set is ever built
        assert!(logs.adjusted.lock().unwrap().is_empty());
        assert_eq!(*logs.reset.lock().unwrap(), vec![false]);
        assert!(ctx.backbone.is_none());
        for node in 0..4 {
            assert_eq!(targets(&ctx.candidates, node), main[node]);
        }
    }

    #[test]
    fn test_optimum_after_backbone_window_restores_main_set() {
        let (strategies, searched, logs) =
            scripted(vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3], vec![0, 2, 1, 3]]);
        let options = SearchOptions::builder()
            .max_trials(5)
            .backbone_trials(1)
            .optimum(4)
            .stop_at_optimum(true)
            .build();
        let mut ctx = context(crossed(), options);
        let main: Vec<Vec<usize>> = (0..4).map(|n| targets(&ctx.candidates, n)).collect();

        let cost = TrialEngine::new(&strategies).find_tour(&mut ctx, 1).unwrap();

        assert_eq!(cost, 4);
        assert_eq!(ctx.trial(), 3);
        assert_eq!(*searched.lock().unwrap(), vec![false, true, true]);
        assert_eq!(*logs.reset.lock().unwrap(), vec![false]);
        assert!(ctx.backbone.is_none());
        assert!(!is_backbone(&ctx.candidates));
        for node in 0..4 {
            assert_eq!(targets(&ctx.candidates, node), main[node]);
        }
    }
}
