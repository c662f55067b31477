//! Engine-facing solution representation.

use crate::bitset::BitSet;

/// Optimization direction of an objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectiveSense {
    Minimize,
    Maximize,
}

/// A candidate solution: one bitset variable per service, objective values
/// with their senses, and equality-constraint values with their targets.
///
/// Solutions are created by [`Problem::new_solution`](crate::problem::Problem),
/// mutated by variation operators and filled in by `evaluate`.
#[derive(Clone, Debug)]
pub struct Solution {
    variables: Vec<BitSet>,
    objectives: Vec<f64>,
    senses: Vec<ObjectiveSense>,
    constraints: Vec<f64>,
    constraint_targets: Vec<f64>,
}

impl Solution {
    /// Creates a blank solution. `constraint_targets` holds the required
    /// value of each equality constraint; an empty slice means the problem
    /// is unconstrained.
    pub fn new(
        variable_lengths: &[usize],
        senses: Vec<ObjectiveSense>,
        constraint_targets: Vec<f64>,
    ) -> Self {
        Self {
            variables: variable_lengths.iter().map(|&len| BitSet::new(len)).collect(),
            objectives: vec![0.0; senses.len()],
            senses,
            constraints: vec![0.0; constraint_targets.len()],
            constraint_targets,
        }
    }

    pub fn number_of_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variable(&self, index: usize) -> &BitSet {
        &self.variables[index]
    }

    pub fn variable_mut(&mut self, index: usize) -> &mut BitSet {
        &mut self.variables[index]
    }

    pub fn objective(&self, index: usize) -> f64 {
        self.objectives[index]
    }

    pub fn set_objective(&mut self, index: usize, value: f64) {
        self.objectives[index] = value;
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn senses(&self) -> &[ObjectiveSense] {
        &self.senses
    }

    /// Objective value mapped into minimize-space, so dominance checks can
    /// compare uniformly regardless of sense.
    pub fn minimized_objective(&self, index: usize) -> f64 {
        match self.senses[index] {
            ObjectiveSense::Minimize => self.objectives[index],
            ObjectiveSense::Maximize => -self.objectives[index],
        }
    }

    pub fn constraint(&self, index: usize) -> f64 {
        self.constraints[index]
    }

    pub fn set_constraint(&mut self, index: usize, value: f64) {
        self.constraints[index] = value;
    }

    pub fn constraint_targets(&self) -> &[f64] {
        &self.constraint_targets
    }

    /// Aggregate constraint violation. Zero for unconstrained problems.
    pub fn violation(&self) -> f64 {
        self.constraints
            .iter()
            .zip(self.constraint_targets.iter())
            .map(|(value, target)| (value - target).abs())
            .sum()
    }

    pub fn is_feasible(&self) -> bool {
        self.violation() == 0.0
    }
}
