//! Marshalling of local solutions into the global stage's candidate lists.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::assignment::{AssignmentProblem, COST_OBJECTIVE};
use crate::cluster::Candidate;
use crate::solution::Solution;

/// Expands a local solution into one candidate per (service, resource)
/// pair: whether the solver chose the resource, and the precomputed
/// per-pair cost. This is the hand-off format the global stage consumes.
pub fn solution_to_candidates(
    solution: &Solution,
    problem: &AssignmentProblem,
) -> Vec<Vec<Candidate>> {
    let n = problem.services().len();
    let m = problem.resources().len();
    let costs = problem.assignment_costs();

    let mut candidates = Vec::with_capacity(n);
    for k in 0..n {
        let mut assigned = vec![false; m];
        for x in solution.variable(k).iter_ones() {
            assigned[problem.feasible_resources()[k][x]] = true;
        }
        candidates.push(
            (0..m)
                .map(|i| Candidate::new(assigned[i], costs[k][i]))
                .collect(),
        );
    }
    candidates
}

/// Compact summary of a local solution: the set-bit positions of each
/// variable plus the cost operating point, in a JSON-stable shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateAssignments {
    assignments: IndexMap<usize, Vec<usize>>,
    cost: f64,
}

impl CandidateAssignments {
    pub fn new(assignments: IndexMap<usize, Vec<usize>>, cost: f64) -> Self {
        Self { assignments, cost }
    }

    pub fn from_solution(solution: &Solution) -> Self {
        let mut assignments = IndexMap::new();
        for k in 0..solution.number_of_variables() {
            assignments.insert(k, solution.variable(k).iter_ones().collect());
        }
        Self {
            assignments,
            cost: solution.objective(COST_OBJECTIVE),
        }
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Selected bit positions of variable `index`; empty if unknown.
    pub fn candidates(&self, index: usize) -> &[usize] {
        self.assignments
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristics::Characteristics;
    use crate::local_state::LocalState;
    use crate::problem::Problem;
    use crate::resource::Resource;
    use crate::service::Service;
    use indexmap::{indexmap, IndexMap as Map};

    fn state() -> LocalState {
        LocalState::new(
            vec![
                Resource::new("small", Characteristics::new(1.0, 1.0, 1.0, 0.0)),
                Resource::new("big", Characteristics::new(2.0, 2.0, 2.0, 0.0)),
            ],
            vec![
                Service::new(
                    "s0",
                    "img",
                    Map::new(),
                    0.0,
                    1,
                    Characteristics::new(1.0, 1.0, 1.0, 0.0),
                ),
                Service::new(
                    "s1",
                    "img",
                    Map::new(),
                    0.0,
                    1,
                    Characteristics::new(2.0, 2.0, 2.0, 0.0),
                ),
            ],
        )
    }

    #[test]
    fn marshals_every_pair_with_precomputed_costs() {
        let state = state();
        let problem = AssignmentProblem::new(&state, 2.0);
        let mut solution = problem.new_solution();
        // s0 selects its second feasible slot, which is resource 1.
        solution.variable_mut(0).set(1, true);
        // s1 selects its only feasible slot, also resource 1.
        solution.variable_mut(1).set(0, true);

        let candidates = solution_to_candidates(&solution, &problem);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].len(), 2);
        assert!(!candidates[0][0].assigned);
        assert!(candidates[0][1].assigned);
        assert!(!candidates[1][0].assigned);
        assert!(candidates[1][1].assigned);
        // Costs are carried for unassigned pairs too.
        for k in 0..2 {
            for i in 0..2 {
                assert_eq!(candidates[k][i].cost, problem.assignment_costs()[k][i]);
            }
        }
    }

    #[test]
    fn summary_round_trips_as_json() {
        let summary = CandidateAssignments::new(
            indexmap! { 0 => vec![1, 3], 1 => vec![] },
            2.25,
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["cost"], 2.25);
        assert_eq!(json["assignments"]["0"][1], 3);
        let back: CandidateAssignments = serde_json::from_value(json).unwrap();
        assert_eq!(back.candidates(0), &[1, 3]);
        assert!(back.candidates(1).is_empty());
        assert!(back.candidates(7).is_empty());
    }

    #[test]
    fn summary_from_solution_records_set_bits_and_cost() {
        let state = state();
        let problem = AssignmentProblem::new(&state, 2.0);
        let mut solution = problem.new_solution();
        solution.variable_mut(0).set(0, true);
        solution.set_objective(COST_OBJECTIVE, 1.5);
        let summary = CandidateAssignments::from_solution(&solution);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.candidates(0), &[0]);
        assert_eq!(summary.cost(), 1.5);
    }
}
