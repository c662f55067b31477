//! Result graph of a selected global composition.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::characteristics::Characteristics;
use crate::cluster::Cluster;
use crate::composition::CompositionProblem;
use crate::graphml::GraphMlWriter;
use crate::service::Service;
use crate::solution::Solution;

/// A vertex is a service or one concrete resource of one cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositionVertex {
    Service(usize),
    ClusterResource { cluster: usize, resource: usize },
}

/// Directed multigraph with one edge per selected slot, for inspection
/// and export.
pub struct CompositionGraph {
    graph: DiGraph<CompositionVertex, ()>,
    clusters: Vec<Cluster>,
    services: Vec<Service>,
}

impl CompositionGraph {
    /// Builds the graph for a solution of the given problem. Every
    /// resource of every cluster becomes a vertex whether selected or not.
    pub fn build(solution: &Solution, problem: &CompositionProblem) -> Self {
        let clusters: Vec<Cluster> = problem.clusters().to_vec();
        let services: Vec<Service> = problem.services().to_vec();

        let mut graph = DiGraph::new();
        let mut slot_vertices: HashMap<(usize, usize), NodeIndex> = HashMap::new();
        for (u, cluster) in clusters.iter().enumerate() {
            for i in 0..cluster.resources().len() {
                let vertex = graph.add_node(CompositionVertex::ClusterResource {
                    cluster: u,
                    resource: i,
                });
                slot_vertices.insert((u, i), vertex);
            }
        }
        let service_vertices: Vec<NodeIndex> = (0..services.len())
            .map(|k| graph.add_node(CompositionVertex::Service(k)))
            .collect();

        for k in 0..services.len() {
            for x in solution.variable(k).iter_ones() {
                let index = problem.cluster_resource_indices(k)[x];
                graph.add_edge(
                    service_vertices[k],
                    slot_vertices[&(index.cluster, index.resource)],
                    (),
                );
            }
        }

        Self {
            graph,
            clusters,
            services,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fixed cost of every resource that received at least one replica,
    /// keyed by resource name.
    pub fn fixed_cost_per_resource(&self) -> HashMap<String, f64> {
        let mut costs = HashMap::new();
        for edge in self.graph.edge_indices() {
            let (_, target) = self.graph.edge_endpoints(edge).unwrap();
            if let CompositionVertex::ClusterResource { cluster, resource } = self.graph[target] {
                let resource = &self.clusters[cluster].resources()[resource];
                costs.insert(resource.name().to_string(), resource.cost().fixed);
            }
        }
        costs
    }

    /// Worst-dimension utilization of every resource that received at
    /// least one replica: utilization vectors are summed per resource and
    /// reduced by `max`. Keyed by resource name.
    pub fn utilization_per_resource(&self) -> HashMap<String, f64> {
        let mut totals: HashMap<String, Characteristics> = HashMap::new();
        for edge in self.graph.edge_indices() {
            let (source, target) = self.graph.edge_endpoints(edge).unwrap();
            if let (
                CompositionVertex::Service(k),
                CompositionVertex::ClusterResource { cluster, resource },
            ) = (self.graph[source], self.graph[target])
            {
                let resource = &self.clusters[cluster].resources()[resource];
                let utilization = self.services[k]
                    .requirements()
                    .div(resource.characteristics());
                totals
                    .entry(resource.name().to_string())
                    .and_modify(|total| *total = total.add(&utilization))
                    .or_insert(utilization);
            }
        }
        totals
            .into_iter()
            .map(|(name, total)| (name, total.max()))
            .collect()
    }

    pub fn to_graphml(&self) -> String {
        let mut writer = GraphMlWriter::new(true);
        writer.register_node_key("type", "string");
        writer.register_node_key("label", "string");
        writer.register_node_key("cluster", "string");
        writer.register_node_key("resource", "string");
        writer.register_node_key("cpu", "double");
        writer.register_node_key("memory", "double");
        writer.register_node_key("disk", "double");
        writer.register_node_key("gpu", "double");
        writer.register_node_key("cost", "double");

        for index in self.graph.node_indices() {
            let id = format!("n{}", index.index());
            match self.graph[index] {
                CompositionVertex::Service(k) => {
                    let service = &self.services[k];
                    let requirements = service.requirements();
                    writer.add_node(
                        &id,
                        &[
                            ("type", "service".to_string()),
                            ("label", service.name().to_string()),
                            ("cpu", requirements.cpu().to_string()),
                            ("memory", requirements.memory().to_string()),
                            ("disk", requirements.disk().to_string()),
                            ("gpu", requirements.gpu().to_string()),
                        ],
                    );
                }
                CompositionVertex::ClusterResource { cluster, resource } => {
                    let cluster = &self.clusters[cluster];
                    let resource = &cluster.resources()[resource];
                    let characteristics = resource.characteristics();
                    writer.add_node(
                        &id,
                        &[
                            ("type", "cluster-resource".to_string()),
                            ("label", resource.name().to_string()),
                            ("cluster", cluster.name().to_string()),
                            ("resource", resource.name().to_string()),
                            ("cpu", characteristics.cpu().to_string()),
                            ("memory", characteristics.memory().to_string()),
                            ("disk", characteristics.disk().to_string()),
                            ("gpu", characteristics.gpu().to_string()),
                            ("cost", resource.cost().fixed.to_string()),
                        ],
                    );
                }
            }
        }
        for edge in self.graph.edge_indices() {
            let (source, target) = self.graph.edge_endpoints(edge).unwrap();
            writer.add_edge(
                &format!("n{}", source.index()),
                &format!("n{}", target.index()),
                &[],
            );
        }
        writer.finish()
    }

    /// Cluster x resource matrix of replica counts. The first header cell
    /// is empty, rows and columns are sorted by name.
    pub fn to_csv(&self) -> String {
        let mut cluster_names: BTreeSet<&str> = BTreeSet::new();
        let mut resource_names: BTreeSet<&str> = BTreeSet::new();
        for index in self.graph.node_indices() {
            if let CompositionVertex::ClusterResource { cluster, resource } = self.graph[index] {
                cluster_names.insert(self.clusters[cluster].name());
                resource_names.insert(self.clusters[cluster].resources()[resource].name());
            }
        }

        let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for edge in self.graph.edge_indices() {
            let (_, target) = self.graph.edge_endpoints(edge).unwrap();
            if let CompositionVertex::ClusterResource { cluster, resource } = self.graph[target] {
                let cluster_name = self.clusters[cluster].name();
                let resource_name = self.clusters[cluster].resources()[resource].name();
                *counts.entry((cluster_name, resource_name)).or_insert(0) += 1;
            }
        }

        let mut out = String::new();
        out.push(',');
        out.push_str(&resource_names.iter().join(","));
        out.push('\n');
        for cluster in &cluster_names {
            out.push_str(cluster);
            for resource in &resource_names {
                out.push(',');
                let count = counts.get(&(*cluster, *resource)).copied().unwrap_or(0);
                out.push_str(&count.to_string());
            }
            out.push('\n');
        }
        out
    }
}
