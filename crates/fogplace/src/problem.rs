//! Capability set an evolutionary engine needs to drive the core.

use rand_pcg::Pcg64;

use crate::solution::Solution;

/// A multi-objective problem over bitset-encoded solutions.
///
/// Problem objects are immutable after construction; `evaluate` keeps all
/// scratch state on the stack so distinct solutions may be evaluated
/// concurrently against one instance. All randomness flows through the
/// engine-owned RNG, so seeded runs are reproducible.
pub trait Problem {
    fn number_of_variables(&self) -> usize;

    fn number_of_objectives(&self) -> usize;

    fn number_of_constraints(&self) -> usize;

    /// Returns a blank solution with correctly sized variables, objective
    /// senses and constraint targets attached.
    fn new_solution(&self) -> Solution;

    /// Fills in the objective and constraint values of `solution`. May
    /// repair the variables in place first.
    fn evaluate(&self, solution: &mut Solution, rng: &mut Pcg64);
}

/// Custom population seeding strategy.
pub trait Initialization {
    fn initialize(&self, population_size: usize, rng: &mut Pcg64) -> Vec<Solution>;
}
