//! Directed weighted multigraph of service interactions.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::graphml::GraphMlWriter;
use crate::service::Service;

/// Edge payload: the interaction weight and the amount of data exchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionEdge {
    pub weight: f64,
    pub data_transfer: f64,
}

/// Graph of inter-service interactions within one locality.
///
/// Vertices are service names; an edge `(from, to)` mirrors an entry of
/// `from`'s interaction map whose target exists in the input collection.
/// Read-only after construction and freely shareable.
#[derive(Clone)]
pub struct ServiceGraph {
    graph: DiGraph<String, InteractionEdge>,
    indices: HashMap<String, NodeIndex>,
}

impl ServiceGraph {
    /// Builds the graph from a collection of services. Interaction targets
    /// not present in the collection are ignored without error.
    pub fn build<'a, I>(services: I) -> Self
    where
        I: IntoIterator<Item = &'a Service>,
    {
        let services: Vec<&Service> = services.into_iter().collect();
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for service in &services {
            let index = graph.add_node(service.name().to_string());
            indices.insert(service.name().to_string(), index);
        }
        for service in &services {
            let from = indices[service.name()];
            for (target, interaction) in service.interactions() {
                if let Some(&to) = indices.get(target.as_str()) {
                    graph.add_edge(
                        from,
                        to,
                        InteractionEdge {
                            weight: interaction.weight,
                            data_transfer: interaction.data_transfer,
                        },
                    );
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

    /// Data transferred on the interaction from `from` to `to`, if the
    /// edge exists.
    pub fn data_transfer(&self, from: &str, to: &str) -> Option<f64> {
        let from = *self.indices.get(from)?;
        let to = *self.indices.get(to)?;
        self.graph
            .find_edge(from, to)
            .map(|edge| self.graph[edge].data_transfer)
    }

    /// Outgoing interaction edges of a service.
    pub fn outgoing(&self, service: &str) -> Vec<InteractionEdge> {
        self.neighbors(service, Direction::Outgoing)
    }

    /// Incoming interaction edges of a service.
    pub fn incoming(&self, service: &str) -> Vec<InteractionEdge> {
        self.neighbors(service, Direction::Incoming)
    }

    fn neighbors(&self, service: &str, direction: Direction) -> Vec<InteractionEdge> {
        match self.indices.get(service) {
            Some(&index) => self
                .graph
                .edges_directed(index, direction)
                .map(|edge| *edge.weight())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn to_graphml(&self) -> String {
        let mut writer = GraphMlWriter::new(true);
        writer.register_node_key("label", "string");
        writer.register_edge_key("weight", "double");
        writer.register_edge_key("dataTransfer", "double");
        for index in self.graph.node_indices() {
            writer.add_node(
                &format!("n{}", index.index()),
                &[("label", self.graph[index].clone())],
            );
        }
        for edge in self.graph.edge_indices() {
            let (source, target) = self.graph.edge_endpoints(edge).unwrap();
            let payload = &self.graph[edge];
            writer.add_edge(
                &format!("n{}", source.index()),
                &format!("n{}", target.index()),
                &[
                    ("weight", payload.weight.to_string()),
                    ("dataTransfer", payload.data_transfer.to_string()),
                ],
            );
        }
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristics::Characteristics;
    use crate::service::Interaction;
    use indexmap::indexmap;

    fn service(name: &str, interactions: indexmap::IndexMap<String, Interaction>) -> Service {
        Service::new(
            name,
            "img",
            interactions,
            0.0,
            1,
            Characteristics::new(1.0, 1.0, 1.0, 0.0),
        )
    }

    #[test]
    fn edges_mirror_resolvable_interactions() {
        let services = vec![
            service(
                "a",
                indexmap! {
                    "b".to_string() => Interaction::new(2.0, 30.0),
                    "ghost".to_string() => Interaction::new(1.0, 99.0),
                },
            ),
            service("b", indexmap! { "a".to_string() => Interaction::new(1.0, 5.0) }),
            service("c", indexmap! {}),
        ];
        let graph = ServiceGraph::build(&services);
        assert_eq!(graph.vertex_count(), 3);
        // The interaction pointing at the unknown target is dropped.
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.data_transfer("a", "b"), Some(30.0));
        assert_eq!(graph.data_transfer("b", "a"), Some(5.0));
        assert_eq!(graph.data_transfer("a", "c"), None);
        assert_eq!(graph.data_transfer("a", "ghost"), None);
    }

    #[test]
    fn directional_edge_views() {
        let services = vec![
            service("a", indexmap! { "b".to_string() => Interaction::new(1.0, 10.0) }),
            service("b", indexmap! {}),
        ];
        let graph = ServiceGraph::build(&services);
        assert_eq!(graph.outgoing("a").len(), 1);
        assert_eq!(graph.incoming("a").len(), 0);
        assert_eq!(graph.incoming("b")[0].data_transfer, 10.0);
        assert!(graph.outgoing("ghost").is_empty());
    }

    #[test]
    fn graphml_contains_labels_and_payload() {
        let services = vec![
            service("a", indexmap! { "b".to_string() => Interaction::new(1.5, 10.0) }),
            service("b", indexmap! {}),
        ];
        let xml = ServiceGraph::build(&services).to_graphml();
        assert!(xml.contains("<data key=\"d0\">a</data>"));
        assert!(xml.contains("attr.name=\"dataTransfer\""));
        assert!(xml.contains("1.5"));
    }
}
