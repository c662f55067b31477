//! Replica-aware population seeding for the local assignment problem.

use rand::Rng;
use rand_pcg::Pcg64;

use crate::assignment::AssignmentProblem;
use crate::problem::{Initialization, Problem};
use crate::solution::Solution;

/// Seeds each individual with one draw per requested replica.
///
/// Draws are independent and uniform over the feasible list, with
/// replacement; hitting an already set bit is a no-op, so the seeded
/// cardinality may fall short of the replica count. The evaluator's
/// cardinality repair raises it back on first evaluation.
pub struct ReplicaAwareInitialization<'a> {
    problem: &'a AssignmentProblem,
}

impl<'a> ReplicaAwareInitialization<'a> {
    pub fn new(problem: &'a AssignmentProblem) -> Self {
        Self { problem }
    }
}

impl Initialization for ReplicaAwareInitialization<'_> {
    fn initialize(&self, population_size: usize, rng: &mut Pcg64) -> Vec<Solution> {
        let mut population = Vec::with_capacity(population_size);
        for _ in 0..population_size {
            let mut solution = self.problem.new_solution();
            for (k, service) in self.problem.services().iter().enumerate() {
                let feasible = self.problem.feasible_resources()[k].len();
                if feasible == 0 {
                    continue;
                }
                for _ in 0..service.replicas() {
                    let bit = rng.gen_range(0..feasible);
                    solution.variable_mut(k).set(bit, true);
                }
            }
            population.push(solution);
        }
        population
    }
}
