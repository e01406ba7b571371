//! # Candidate Set Adaptation
//!
//! After every improving trial the candidate lists are biased towards the
//! edges of the best tours of the run; at the end of the run the lists are
//! restored to their computed ranking.

use std::fmt::Debug;

use super::{CandidateSet, ALPHA_MAX};
use crate::problem::Problem;
use crate::tour::Tour;

/// Keeps a candidate set in step with the tours found during a run.
pub trait CandidateAdapter<P>: Debug + Send + Sync
where
    P: Problem,
{
    /// Called after an improving trial, with the live tour equal to the new
    /// best tour of the run.
    fn adjust(&self, candidates: &mut CandidateSet, problem: &P, tour: &Tour);

    /// Called once at the end of every run.
    fn reset(&self, candidates: &mut CandidateSet, tour: &Tour);
}

/// Extends the candidate lists with tour edges and gives precedence to edges
/// shared by the best and second best tour of the run.
#[derive(Debug, Clone, Default)]
pub struct TourEdgeAdapter;

fn in_chain(chain: Option<&Vec<usize>>, a: usize, b: usize) -> bool {
    chain.map_or(false, |c| c[a] == b || c[b] == a)
}

impl<P> CandidateAdapter<P> for TourEdgeAdapter
where
    P: Problem,
{
    fn adjust(&self, candidates: &mut CandidateSet, problem: &P, tour: &Tour) {
        for from in 0..tour.dimension() {
            for to in [tour.pred[from], tour.suc[from]] {
                candidates.add(from, to, problem.cost(from, to), ALPHA_MAX);
            }
        }

        let best = tour.best_suc.as_ref();
        let next_best = tour.next_best_suc.as_ref();
        for from in 0..candidates.dimension() {
            let list = candidates.candidates_mut(from);
            for idx in 1..list.len() {
                let to = list[idx].to;
                if in_chain(best, from, to) && in_chain(next_best, from, to) {
                    let edge = list.remove(idx);
                    list.insert(0, edge);
                }
            }
        }
    }

    fn reset(&self, candidates: &mut CandidateSet, _tour: &Tour) {
        for from in 0..candidates.dimension() {
            let list = candidates.candidates_mut(from);
            list.sort_by_key(|c| (c.alpha, c.cost));
            while list.len() > 2 && list.last().map_or(false, |c| c.alpha == ALPHA_MAX) {
                list.pop();
            }
        }
    }
}
