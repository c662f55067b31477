//! Global composition problem: pick pre-assigned cluster slots per service
//! across the federation, minimizing cost and inter-cluster latency.

use log::warn;
use rand_pcg::Pcg64;

use crate::cluster::Cluster;
use crate::cluster_graph::ClusterGraph;
use crate::global_state::GlobalState;
use crate::problem::Problem;
use crate::service::Service;
use crate::solution::{ObjectiveSense, Solution};

pub const COST_OBJECTIVE: usize = 0;
pub const LATENCY_OBJECTIVE: usize = 1;

/// Identifies resource `resource` within cluster `cluster`, the unit the
/// global stage switches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterResourceIndex {
    pub cluster: usize,
    pub resource: usize,
}

/// The cross-cluster placement problem.
///
/// Variable `k` is a bitset over the slots whose local stage marked them
/// assigned for service `k`, enumerated cluster-major then resource-minor.
/// Each service carries an equality constraint pinning the selected slot
/// count to its replica count.
pub struct CompositionProblem {
    clusters: Vec<Cluster>,
    services: Vec<Service>,
    cluster_graph: ClusterGraph,
    cluster_resource_indices: Vec<Vec<ClusterResourceIndex>>,
}

impl CompositionProblem {
    pub fn new(state: &GlobalState) -> Self {
        let clusters: Vec<Cluster> = state.clusters().cloned().collect();
        let services: Vec<Service> = state.services().cloned().collect();

        let cluster_resource_indices: Vec<Vec<ClusterResourceIndex>> = (0..services.len())
            .map(|k| {
                let mut indices = Vec::new();
                for (u, cluster) in clusters.iter().enumerate() {
                    let candidates = &cluster.candidates()[k];
                    for (i, candidate) in candidates.iter().enumerate() {
                        if candidate.assigned {
                            indices.push(ClusterResourceIndex {
                                cluster: u,
                                resource: i,
                            });
                        }
                    }
                }
                indices
            })
            .collect();

        if let Some(k) = cluster_resource_indices.iter().position(Vec::is_empty) {
            warn!(
                "composition problem is incomplete: no assigned candidate for service {}",
                services[k].name()
            );
        }

        Self {
            clusters,
            services,
            cluster_graph: state.cluster_graph().clone(),
            cluster_resource_indices,
        }
    }

    /// Whether every service has at least one selectable slot. A false
    /// result leaves the problem usable, but every solution will violate
    /// at least one replica constraint.
    pub fn is_complete(&self) -> bool {
        self.cluster_resource_indices.iter().all(|indices| !indices.is_empty())
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Selectable slots for service `k`, cluster-major order.
    pub fn cluster_resource_indices(&self, k: usize) -> &[ClusterResourceIndex] {
        &self.cluster_resource_indices[k]
    }
}

impl Problem for CompositionProblem {
    fn number_of_variables(&self) -> usize {
        self.services.len()
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn number_of_constraints(&self) -> usize {
        self.services.len()
    }

    fn new_solution(&self) -> Solution {
        let lengths: Vec<usize> = self
            .cluster_resource_indices
            .iter()
            .map(Vec::len)
            .collect();
        Solution::new(
            &lengths,
            vec![ObjectiveSense::Minimize, ObjectiveSense::Minimize],
            self.services.iter().map(|s| s.replicas() as f64).collect(),
        )
    }

    fn evaluate(&self, solution: &mut Solution, _rng: &mut Pcg64) {
        let mut touched_clusters: Vec<usize> = Vec::new();

        let mut cost = 0.0;
        for k in 0..self.services.len() {
            let mut assigned = 0usize;
            for x in solution.variable(k).iter_ones() {
                let index = self.cluster_resource_indices[k][x];
                let candidate = self.clusters[index.cluster].candidates()[k][index.resource];
                debug_assert!(candidate.assigned);
                cost += candidate.cost;
                if !touched_clusters.contains(&index.cluster) {
                    touched_clusters.push(index.cluster);
                }
                assigned += 1;
            }
            solution.set_constraint(k, assigned as f64);
        }

        // Every ordered pair including the diagonal: using many clusters is
        // quadratically penalized.
        let mut latency = 0.0;
        for &u in &touched_clusters {
            for &v in &touched_clusters {
                latency += self
                    .cluster_graph
                    .latency(self.clusters[u].name(), self.clusters[v].name())
                    .unwrap_or(0.0);
            }
        }

        solution.set_objective(COST_OBJECTIVE, cost);
        solution.set_objective(LATENCY_OBJECTIVE, latency);
    }
}
