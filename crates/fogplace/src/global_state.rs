//! Federation-wide input state for the global composition stage.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;
use crate::cluster_graph::ClusterGraph;
use crate::service::Service;

/// Clusters, services and the pairwise latency table of the federation.
///
/// Collections are insertion-ordered and keyed by name with first write
/// winning on duplicates. Construction fails fast on structural
/// violations: every latency key must name a known cluster and every
/// cluster must carry exactly one candidate list per service. The derived
/// cluster graph is built once and is not serialized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "GlobalStateRaw", into = "GlobalStateRaw")]
pub struct GlobalState {
    clusters: IndexMap<String, Cluster>,
    services: IndexMap<String, Service>,
    latency: IndexMap<String, IndexMap<String, f64>>,
    cluster_graph: ClusterGraph,
}

impl GlobalState {
    pub fn new(
        clusters: Vec<Cluster>,
        services: Vec<Service>,
        latency: IndexMap<String, IndexMap<String, f64>>,
    ) -> Self {
        let mut cluster_map: IndexMap<String, Cluster> = IndexMap::new();
        for cluster in clusters {
            cluster_map.entry(cluster.name().to_string()).or_insert(cluster);
        }
        let mut service_map: IndexMap<String, Service> = IndexMap::new();
        for service in services {
            service_map.entry(service.name().to_string()).or_insert(service);
        }

        for cluster in cluster_map.values() {
            assert!(
                cluster.candidates().len() == service_map.len(),
                "cluster {}: expected {} candidate lists, got {}",
                cluster.name(),
                service_map.len(),
                cluster.candidates().len()
            );
        }
        for (row, columns) in &latency {
            assert!(
                cluster_map.contains_key(row),
                "latency row {} does not name a known cluster",
                row
            );
            for column in columns.keys() {
                assert!(
                    cluster_map.contains_key(column),
                    "latency column {} does not name a known cluster",
                    column
                );
            }
        }

        let cluster_graph = ClusterGraph::build(cluster_map.keys().map(String::as_str), &latency);
        Self {
            clusters: cluster_map,
            services: service_map,
            latency,
            cluster_graph,
        }
    }

    /// Clusters in insertion order.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    /// Services in insertion order.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn latency(&self) -> &IndexMap<String, IndexMap<String, f64>> {
        &self.latency
    }

    pub fn cluster_graph(&self) -> &ClusterGraph {
        &self.cluster_graph
    }
}

#[derive(Serialize, Deserialize)]
struct GlobalStateRaw {
    clusters: Vec<Cluster>,
    services: Vec<Service>,
    latency: IndexMap<String, IndexMap<String, f64>>,
}

impl From<GlobalStateRaw> for GlobalState {
    fn from(raw: GlobalStateRaw) -> Self {
        GlobalState::new(raw.clusters, raw.services, raw.latency)
    }
}

impl From<GlobalState> for GlobalStateRaw {
    fn from(state: GlobalState) -> Self {
        GlobalStateRaw {
            clusters: state.clusters.into_values().collect(),
            services: state.services.into_values().collect(),
            latency: state.latency,
        }
    }
}
