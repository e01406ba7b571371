//! # Problem
//!
//! The `Problem` trait is the read-only view of an instance that the search
//! consumes: node count, edge costs, node potentials with their precision
//! scale, and what the lower-bound computation established before any run.
//!
//! Two implementations are provided: [`MatrixProblem`] for explicit cost
//! matrices and [`EuclideanProblem`] for rounded planar distances.

use std::fmt::Debug;

use crate::error::{Result, SearchError};

/// Tour cost. Costs are integral, as in TSPLIB instances.
pub type Cost = i64;

/// Cost of "no tour yet".
pub const PLUS_INFINITY: Cost = Cost::MAX;

/// Value of an unknown optimum.
pub const MINUS_INFINITY: Cost = Cost::MIN;

/// The kind of instance being solved.
///
/// Hamiltonian cycle and path instances never get crossover offspring edges
/// injected into their candidate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProblemType {
    #[default]
    Tsp,
    Hcp,
    Hpp,
}

impl ProblemType {
    /// Whether tour edges of crossover offspring are added as candidates.
    pub fn accepts_offspring_candidates(&self) -> bool {
        !matches!(self, ProblemType::Hcp | ProblemType::Hpp)
    }
}

/// A symmetric instance over nodes `0..dimension()`.
pub trait Problem: Debug + Send + Sync {
    /// Number of nodes.
    fn dimension(&self) -> usize;

    /// Cost of the edge `(a, b)`.
    fn cost(&self, a: usize, b: usize) -> Cost;

    /// Name written into persisted tours.
    fn name(&self) -> &str {
        "problem"
    }

    /// Node potential from the lower-bound ascent.
    fn pi(&self, _node: usize) -> Cost {
        0
    }

    /// Scale applied to costs before potentials are added.
    fn precision(&self) -> Cost {
        1
    }

    /// Transformed edge cost `cost * precision + pi(a) + pi(b)`.
    fn scaled_cost(&self, a: usize, b: usize) -> Cost {
        self.cost(a, b) * self.precision() + self.pi(a) + self.pi(b)
    }

    /// A-priori lower bound on the tour cost.
    fn lower_bound(&self) -> Cost {
        MINUS_INFINITY
    }

    /// Whether the lower bound is attained by the initial tour, i.e. is optimal.
    fn bound_is_optimal(&self) -> bool {
        false
    }

    fn problem_type(&self) -> ProblemType {
        ProblemType::Tsp
    }

    /// Number of auxiliary nodes added by a problem transformation.
    fn auxiliary_nodes(&self) -> usize {
        0
    }
}

/// An instance given by an explicit symmetric cost matrix.
#[derive(Debug, Clone)]
pub struct MatrixProblem {
    name: String,
    matrix: Vec<Vec<Cost>>,
    pi: Vec<Cost>,
    precision: Cost,
    lower_bound: Cost,
    bound_is_optimal: bool,
    problem_type: ProblemType,
    auxiliary_nodes: usize,
}

impl MatrixProblem {
    /// Creates a problem from a square cost matrix.
    ///
    /// # Errors
    ///
    /// Returns a `SearchError::Configuration` if the matrix is not square or
    /// not symmetric.
    pub fn new(matrix: Vec<Vec<Cost>>) -> Result<Self> {
        let dimension = matrix.len();
        if let Some((row, len)) = matrix
            .iter()
            .enumerate()
            .map(|(i, row)| (i, row.len()))
            .find(|&(_, len)| len != dimension)
        {
            return Err(SearchError::Configuration(format!(
                "Cost matrix row {} has {} entries, expected {}",
                row, len, dimension
            )));
        }
        for i in 0..dimension {
            if let Some(j) = (i + 1..dimension).find(|&j| matrix[i][j] != matrix[j][i]) {
                return Err(SearchError::Configuration(format!(
                    "Cost matrix is not symmetric: cost({}, {}) = {}, cost({}, {}) = {}",
                    i, j, matrix[i][j], j, i, matrix[j][i]
                )));
            }
        }

        Ok(Self {
            name: "matrix".to_string(),
            matrix,
            pi: vec![0; dimension],
            precision: 1,
            lower_bound: MINUS_INFINITY,
            bound_is_optimal: false,
            problem_type: ProblemType::Tsp,
            auxiliary_nodes: 0,
        })
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the lower bound and whether it is known to be optimal.
    pub fn with_lower_bound(mut self, bound: Cost, optimal: bool) -> Self {
        self.lower_bound = bound;
        self.bound_is_optimal = optimal;
        self
    }

    /// Sets node potentials and the precision scale.
    ///
    /// # Errors
    ///
    /// Returns a `SearchError::Configuration` if the number of potentials does
    /// not match the dimension or the precision is not positive.
    pub fn with_potentials(mut self, pi: Vec<Cost>, precision: Cost) -> Result<Self> {
        if pi.len() != self.matrix.len() {
            return Err(SearchError::Configuration(format!(
                "Expected {} node potentials, got {}",
                self.matrix.len(),
                pi.len()
            )));
        }
        if precision <= 0 {
            return Err(SearchError::Configuration(
                "Precision must be positive".to_string(),
            ));
        }
        self.pi = pi;
        self.precision = precision;
        Ok(self)
    }

    pub fn with_problem_type(mut self, problem_type: ProblemType) -> Self {
        self.problem_type = problem_type;
        self
    }

    pub fn with_auxiliary_nodes(mut self, count: usize) -> Self {
        self.auxiliary_nodes = count;
        self
    }
}

impl Problem for MatrixProblem {
    fn dimension(&self) -> usize {
        self.matrix.len()
    }

    fn cost(&self, a: usize, b: usize) -> Cost {
        self.matrix[a][b]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn pi(&self, node: usize) -> Cost {
        self.pi[node]
    }

    fn precision(&self) -> Cost {
        self.precision
    }

    fn lower_bound(&self) -> Cost {
        self.lower_bound
    }

    fn bound_is_optimal(&self) -> bool {
        self.bound_is_optimal
    }

    fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    fn auxiliary_nodes(&self) -> usize {
        self.auxiliary_nodes
    }
}

/// An instance of points in the plane with costs rounded to the nearest
/// integer (TSPLIB `EUC_2D`).
#[derive(Debug, Clone)]
pub struct EuclideanProblem {
    name: String,
    points: Vec<(f64, f64)>,
}

impl EuclideanProblem {
    pub fn new<S: Into<String>>(name: S, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

impl Problem for EuclideanProblem {
    fn dimension(&self) -> usize {
        self.points.len()
    }

    fn cost(&self, a: usize, b: usize) -> Cost {
        let (xa, ya) = self.points[a];
        let (xb, yb) = self.points[b];
        ((xa - xb).hypot(ya - yb) + 0.5) as Cost
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        let result = MatrixProblem::new(vec![vec![0, 1], vec![1]]);
        assert!(matches!(result, Err(SearchError::Configuration(_))));
    }

    #[test]
    fn test_matrix_rejects_asymmetric_costs() {
        let result = MatrixProblem::new(vec![
            vec![0, 1, 9],
            vec![2, 0, 1],
            vec![9, 1, 0],
        ]);
        match result {
            Err(SearchError::Configuration(message)) => {
                assert!(message.contains("cost(0, 1) = 1"));
            }
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_matrix_accepts_symmetric_costs() {
        let problem = MatrixProblem::new(vec![
            vec![0, 2, 9],
            vec![2, 0, 1],
            vec![9, 1, 0],
        ])
        .unwrap();
        assert_eq!(problem.cost(0, 1), problem.cost(1, 0));
        assert_eq!(problem.dimension(), 3);
    }

    #[test]
    fn test_scaled_cost_includes_potentials() {
        let problem = MatrixProblem::new(vec![vec![0, 3], vec![3, 0]])
            .unwrap()
            .with_potentials(vec![5, -2], 100)
            .unwrap();
        assert_eq!(problem.scaled_cost(0, 1), 300 + 5 - 2);
    }

    #[test]
    fn test_potentials_length_checked() {
        let result = MatrixProblem::new(vec![vec![0, 3], vec![3, 0]])
            .unwrap()
            .with_potentials(vec![1], 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_euclidean_rounding() {
        let problem = EuclideanProblem::new("square", vec![(0.0, 0.0), (3.0, 4.0), (1.0, 1.0)]);
        assert_eq!(problem.cost(0, 1), 5);
        // sqrt(2) = 1.414.. rounds down
        assert_eq!(problem.cost(0, 2), 1);
        assert_eq!(problem.dimension(), 3);
    }

    #[test]
    fn test_offspring_candidates_by_type() {
        assert!(ProblemType::Tsp.accepts_offspring_candidates());
        assert!(!ProblemType::Hcp.accepts_offspring_candidates());
        assert!(!ProblemType::Hpp.accepts_offspring_candidates());
    }
}
