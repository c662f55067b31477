//! Local assignment problem: place service replicas onto the resources of
//! one cluster, minimizing cost while maximizing the fairness proxy.

use log::debug;
use rand::seq::SliceRandom;
use rand_pcg::Pcg64;

use crate::bitset::BitSet;
use crate::local_state::LocalState;
use crate::problem::Problem;
use crate::resource::Resource;
use crate::service::Service;
use crate::solution::{ObjectiveSense, Solution};

pub const COST_OBJECTIVE: usize = 0;
pub const FAIRNESS_OBJECTIVE: usize = 1;

/// The per-cluster placement problem.
///
/// Variable `k` is a bitset over the feasible-resource list of service `k`;
/// a set bit selects a feasible slot. Feasibility lists and per-pair
/// assignment costs are precomputed once; evaluation runs millions of
/// times inside the engine loop and allocates only per-call scratch.
pub struct AssignmentProblem {
    resources: Vec<Resource>,
    services: Vec<Service>,
    fairness_exponent: f64,
    feasible: Vec<Vec<usize>>,
    costs: Vec<Vec<f64>>,
}

impl AssignmentProblem {
    /// Builds the problem from a local state snapshot and the Lp-norm
    /// fairness exponent `p >= 1`.
    pub fn new(state: &LocalState, fairness_exponent: f64) -> Self {
        assert!(fairness_exponent >= 1.0, "fairness exponent must be >= 1");

        let resources: Vec<Resource> = state.resources().cloned().collect();
        let services: Vec<Service> = state.services().cloned().collect();
        let graph = state.service_graph();

        let feasible: Vec<Vec<usize>> = services
            .iter()
            .map(|service| {
                (0..resources.len())
                    .filter(|&i| service.requirements().leq(resources[i].characteristics()))
                    .collect()
            })
            .collect();

        let mut costs = vec![vec![0.0; resources.len()]; services.len()];
        for (k, service) in services.iter().enumerate() {
            let out_edges = graph.outgoing(service.name());
            let in_edges = graph.incoming(service.name());
            for (i, resource) in resources.iter().enumerate() {
                let price = resource.cost();
                let mut cost = price.fixed + service.data() * price.data;
                for edge in &out_edges {
                    cost += edge.data_transfer * price.output;
                }
                for edge in &in_edges {
                    cost += edge.data_transfer * price.input;
                }
                costs[k][i] = cost;
            }
        }

        debug!(
            "assignment problem: {} services x {} resources, {} feasible pairs",
            services.len(),
            resources.len(),
            feasible.iter().map(Vec::len).sum::<usize>()
        );

        Self {
            resources,
            services,
            fairness_exponent,
            feasible,
            costs,
        }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Feasible resource indices per service, ascending.
    pub fn feasible_resources(&self) -> &[Vec<usize>] {
        &self.feasible
    }

    /// Precomputed assignment cost per (service, resource) pair.
    pub fn assignment_costs(&self) -> &[Vec<f64>] {
        &self.costs
    }

    pub fn fairness_exponent(&self) -> f64 {
        self.fairness_exponent
    }

    /// Repair target for variable `k`.
    pub fn target_cardinality(&self, k: usize) -> usize {
        self.services[k].replicas().min(self.feasible[k].len())
    }
}

impl Problem for AssignmentProblem {
    fn number_of_variables(&self) -> usize {
        self.services.len()
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn number_of_constraints(&self) -> usize {
        0
    }

    fn new_solution(&self) -> Solution {
        let lengths: Vec<usize> = self.feasible.iter().map(Vec::len).collect();
        Solution::new(
            &lengths,
            vec![ObjectiveSense::Minimize, ObjectiveSense::Maximize],
            vec![],
        )
    }

    fn evaluate(&self, solution: &mut Solution, rng: &mut Pcg64) {
        let n = self.services.len();
        let m = self.resources.len();

        // Per-call scratch keeps the problem shareable across evaluation
        // threads.
        let mut assignments = vec![false; n * m];

        for k in 0..n {
            adjust_cardinality(solution.variable_mut(k), self.target_cardinality(k), rng);
            for x in solution.variable(k).iter_ones() {
                assignments[k * m + self.feasible[k][x]] = true;
            }
        }

        let mut cost = 0.0;
        for k in 0..n {
            for i in 0..m {
                if assignments[k * m + i] {
                    cost += self.costs[k][i];
                }
            }
        }
        solution.set_objective(COST_OBJECTIVE, cost);

        let mut max_utilization = vec![0.0; m];
        for (i, resource) in self.resources.iter().enumerate() {
            let mut total = None;
            for (k, service) in self.services.iter().enumerate() {
                if assignments[k * m + i] {
                    let utilization = service.requirements().div(resource.characteristics());
                    total = Some(match total {
                        None => utilization,
                        Some(accumulated) => utilization.add(&accumulated),
                    });
                }
            }
            max_utilization[i] = total.map(|t| t.max()).unwrap_or(0.0);
        }
        solution.set_objective(
            FAIRNESS_OBJECTIVE,
            lp_norm(&max_utilization, self.fairness_exponent),
        );
    }
}

/// Brings the cardinality of `variable` to `target` in place, clearing or
/// setting uniformly drawn bits as needed. No-op when already on target.
pub fn adjust_cardinality(variable: &mut BitSet, target: usize, rng: &mut Pcg64) {
    let current = variable.cardinality();
    if current == target {
        return;
    }

    let mut set_bits = Vec::new();
    let mut clear_bits = Vec::new();
    for index in 0..variable.len() {
        if variable.get(index) {
            set_bits.push(index);
        } else {
            clear_bits.push(index);
        }
    }

    if current > target {
        set_bits.shuffle(rng);
        for &index in set_bits.iter().take(current - target) {
            variable.set(index, false);
        }
    } else {
        clear_bits.shuffle(rng);
        for &index in clear_bits.iter().take(target - current) {
            variable.set(index, true);
        }
    }
}

fn lp_norm(values: &[f64], p: f64) -> f64 {
    values.iter().map(|v| v.powf(p)).sum::<f64>().powf(1.0 / p)
}
