//! # Duplicate Detection
//!
//! The duplicate detector remembers the signature and cost of the best tour of
//! the current run. The move search consults it to stop early once it reaches
//! a tour that has already been recorded, instead of verifying it again.
//!
//! A tour signature is the XOR over its undirected edges of the product of the
//! two endpoint keys. Keys are drawn once per search, so the signature does not
//! depend on the start node or the direction of the tour.

use std::collections::HashMap;

use crate::problem::Cost;
use crate::rng::RandomNumberGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateDetector {
    /// Random key of each node.
    keys: Vec<u64>,
    /// Cost of each recorded signature.
    entries: HashMap<u64, Cost>,
}

impl DuplicateDetector {
    /// Creates an empty detector for `dimension` nodes, drawing node keys from `rng`.
    pub fn new(dimension: usize, rng: &mut RandomNumberGenerator) -> Self {
        Self {
            keys: (0..dimension).map(|_| rng.gen_key()).collect(),
            entries: HashMap::new(),
        }
    }

    /// Signature of the tour given by a successor array.
    pub fn signature(&self, successors: &[usize]) -> u64 {
        successors
            .iter()
            .enumerate()
            .fold(0, |hash, (node, &succ)| {
                hash ^ self.keys[node].wrapping_mul(self.keys[succ])
            })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, signature: u64, cost: Cost) {
        self.entries.insert(signature, cost);
    }

    /// Whether a tour with this signature and cost has been recorded.
    pub fn contains(&self, signature: u64, cost: Cost) -> bool {
        self.entries.get(&signature) == Some(&cost)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tour::Tour;

    fn detector() -> DuplicateDetector {
        DuplicateDetector::new(5, &mut RandomNumberGenerator::from_seed(3))
    }

    #[test]
    fn test_signature_ignores_rotation_and_direction() {
        let detector = detector();
        let a = Tour::from_order(&[0, 1, 2, 3, 4]).unwrap();
        let rotated = Tour::from_order(&[2, 3, 4, 0, 1]).unwrap();
        let reversed = Tour::from_order(&[4, 3, 2, 1, 0]).unwrap();
        let other = Tour::from_order(&[0, 2, 1, 3, 4]).unwrap();

        let sig = detector.signature(&a.suc);
        assert_eq!(sig, detector.signature(&rotated.suc));
        assert_eq!(sig, detector.signature(&reversed.suc));
        assert_ne!(sig, detector.signature(&other.suc));
    }

    #[test]
    fn test_contains_requires_matching_cost() {
        let mut detector = detector();
        detector.insert(42, 10);
        assert!(detector.contains(42, 10));
        assert!(!detector.contains(42, 11));
        assert!(!detector.contains(41, 10));
    }

    #[test]
    fn test_reinsert_after_clear_is_idempotent() {
        let mut once = detector();
        once.clear();
        once.insert(7, 100);

        let mut twice = detector();
        twice.clear();
        twice.insert(7, 100);
        twice.clear();
        twice.insert(7, 100);

        assert_eq!(once.len(), twice.len());
        assert_eq!(once.contains(7, 100), twice.contains(7, 100));
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_clear_empties() {
        let mut detector = detector();
        detector.insert(1, 1);
        detector.clear();
        assert!(detector.is_empty());
    }
}
