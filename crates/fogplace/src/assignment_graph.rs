//! Result graph of a selected local assignment.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::Undirected;

use crate::assignment::AssignmentProblem;
use crate::graphml::GraphMlWriter;
use crate::resource::Resource;
use crate::service::Service;
use crate::solution::Solution;

/// A vertex is either a service or a resource of the local problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentVertex {
    Service(usize),
    Resource(usize),
}

/// Edge annotation: the selected solution's objective values.
#[derive(Clone, Copy, Debug)]
pub struct AssignmentEdge {
    pub cost: f64,
    pub latency: f64,
}

/// Undirected pseudograph with one edge per decoded assignment, for
/// inspection and export.
pub struct AssignmentGraph {
    graph: Graph<AssignmentVertex, AssignmentEdge, Undirected>,
    services: Vec<Service>,
    resources: Vec<Resource>,
}

impl AssignmentGraph {
    /// Builds the graph for a solution of the given problem. All services
    /// and resources become vertices whether or not they are used.
    pub fn build(solution: &Solution, problem: &AssignmentProblem) -> Self {
        let services: Vec<Service> = problem.services().to_vec();
        let resources: Vec<Resource> = problem.resources().to_vec();

        let mut graph = Graph::new_undirected();
        let resource_vertices: Vec<NodeIndex> = (0..resources.len())
            .map(|i| graph.add_node(AssignmentVertex::Resource(i)))
            .collect();
        let service_vertices: Vec<NodeIndex> = (0..services.len())
            .map(|k| graph.add_node(AssignmentVertex::Service(k)))
            .collect();

        let edge = AssignmentEdge {
            cost: solution.objective(0),
            latency: solution.objective(1),
        };
        for k in 0..services.len() {
            for x in solution.variable(k).iter_ones() {
                let i = problem.feasible_resources()[k][x];
                graph.add_edge(service_vertices[k], resource_vertices[i], edge);
            }
        }

        Self {
            graph,
            services,
            resources,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn to_graphml(&self) -> String {
        let mut writer = GraphMlWriter::new(false);
        writer.register_node_key("type", "string");
        writer.register_node_key("label", "string");
        writer.register_node_key("cpu", "double");
        writer.register_node_key("memory", "double");
        writer.register_node_key("disk", "double");
        writer.register_node_key("gpu", "double");
        writer.register_node_key("cost", "double");
        writer.register_edge_key("latency", "double");

        for index in self.graph.node_indices() {
            let id = format!("n{}", index.index());
            match self.graph[index] {
                AssignmentVertex::Service(k) => {
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
                AssignmentVertex::Resource(i) => {
                    let resource = &self.resources[i];
                    let characteristics = resource.characteristics();
                    writer.add_node(
                        &id,
                        &[
                            ("type", "resource".to_string()),
                            ("label", resource.name().to_string()),
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
                &[("latency", self.graph[edge].latency.to_string())],
            );
        }
        writer.finish()
    }

    /// Service x resource matrix of assignment counts. The first header
    /// cell is empty, rows and columns are sorted by name.
    pub fn to_csv(&self) -> String {
        let service_names: BTreeSet<&str> = self.services.iter().map(|s| s.name()).collect();
        let resource_names: BTreeSet<&str> = self.resources.iter().map(|r| r.name()).collect();

        let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for edge in self.graph.edge_indices() {
            let (source, target) = self.graph.edge_endpoints(edge).unwrap();
            if let (AssignmentVertex::Service(k), AssignmentVertex::Resource(i)) =
                (self.graph[source], self.graph[target])
            {
                *counts
                    .entry((self.services[k].name(), self.resources[i].name()))
                    .or_insert(0) += 1;
            }
        }

        let mut out = String::new();
        out.push(',');
        out.push_str(&resource_names.iter().join(","));
        out.push('\n');
        for service in &service_names {
            out.push_str(service);
            for resource in &resource_names {
                out.push(',');
                let count = counts.get(&(*service, *resource)).copied().unwrap_or(0);
                out.push_str(&count.to_string());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristics::Characteristics;
    use crate::local_state::LocalState;
    use crate::problem::Problem;
    use indexmap::IndexMap;

    fn problem() -> AssignmentProblem {
        let state = LocalState::new(
            vec![
                Resource::new("alpha", Characteristics::new(2.0, 2.0, 2.0, 0.0)),
                Resource::new("beta", Characteristics::new(2.0, 2.0, 2.0, 0.0)),
            ],
            vec![
                Service::new(
                    "web",
                    "img",
                    IndexMap::new(),
                    0.0,
                    2,
                    Characteristics::new(1.0, 1.0, 1.0, 0.0),
                ),
                Service::new(
                    "db",
                    "img",
                    IndexMap::new(),
                    0.0,
                    1,
                    Characteristics::new(1.0, 1.0, 1.0, 0.0),
                ),
            ],
        );
        AssignmentProblem::new(&state, 2.0)
    }

    fn selected_solution(problem: &AssignmentProblem) -> Solution {
        let mut solution = problem.new_solution();
        solution.variable_mut(0).set(0, true);
        solution.variable_mut(0).set(1, true);
        solution.variable_mut(1).set(1, true);
        solution.set_objective(0, 1.25);
        solution.set_objective(1, 0.75);
        solution
    }

    #[test]
    fn one_edge_per_decoded_assignment() {
        let problem = problem();
        let graph = AssignmentGraph::build(&selected_solution(&problem), &problem);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn csv_matrix_is_sorted_with_counts() {
        let problem = problem();
        let graph = AssignmentGraph::build(&selected_solution(&problem), &problem);
        let csv = graph.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], ",alpha,beta");
        assert_eq!(lines[1], "db,0,1");
        assert_eq!(lines[2], "web,1,1");
    }

    #[test]
    fn graphml_carries_the_attribute_schema() {
        let problem = problem();
        let graph = AssignmentGraph::build(&selected_solution(&problem), &problem);
        let xml = graph.to_graphml();
        assert!(xml.contains("edgedefault=\"undirected\""));
        assert!(xml.contains(">service</data>"));
        assert!(xml.contains(">resource</data>"));
        assert!(xml.contains("attr.name=\"latency\""));
        assert!(xml.contains(">0.75</data>"));
    }
}
