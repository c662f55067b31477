//! Directed weighted pseudograph of inter-cluster latencies.

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graphml::GraphMlWriter;

/// Pairwise latency lookup between clusters.
///
/// Vertices are cluster names; every latency cell whose row and column
/// both name known clusters becomes an edge (self-loops included).
#[derive(Clone)]
pub struct ClusterGraph {
    graph: DiGraph<String, f64>,
    indices: HashMap<String, NodeIndex>,
}

impl ClusterGraph {
    /// Builds the graph from the cluster names and the latency table of a
    /// global state. Cells naming unknown clusters are skipped.
    pub fn build<'a, I>(cluster_names: I, latency: &IndexMap<String, IndexMap<String, f64>>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for name in cluster_names {
            let index = graph.add_node(name.to_string());
            indices.insert(name.to_string(), index);
        }
        for (row, columns) in latency {
            for (column, &value) in columns {
                if let (Some(&from), Some(&to)) = (indices.get(row), indices.get(column)) {
                    graph.add_edge(from, to, value);
                }
            }
        }
        Self { graph, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Latency from one cluster to another, if recorded.
    pub fn latency(&self, from: &str, to: &str) -> Option<f64> {
        let from = *self.indices.get(from)?;
        let to = *self.indices.get(to)?;
        self.graph.find_edge(from, to).map(|edge| self.graph[edge])
    }

    pub fn to_graphml(&self) -> String {
        let mut writer = GraphMlWriter::new(true);
        writer.register_node_key("label", "string");
        writer.register_edge_key("latency", "double");
        for index in self.graph.node_indices() {
            writer.add_node(
                &format!("n{}", index.index()),
                &[("label", self.graph[index].clone())],
            );
        }
        for edge in self.graph.edge_indices() {
            let (source, target) = self.graph.edge_endpoints(edge).unwrap();
            writer.add_edge(
                &format!("n{}", source.index()),
                &format!("n{}", target.index()),
                &[("latency", self.graph[edge].to_string())],
            );
        }
        writer.finish()
    }
}
