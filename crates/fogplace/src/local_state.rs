//! Per-cluster input state for the local assignment stage.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::resource::Resource;
use crate::service::Service;
use crate::service_graph::ServiceGraph;

/// Resources and services of a single cluster.
///
/// Both collections are insertion-ordered and keyed by name; on duplicate
/// names the first entry wins. The derived service graph is built once at
/// construction and is not serialized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "LocalStateRaw", into = "LocalStateRaw")]
pub struct LocalState {
    resources: IndexMap<String, Resource>,
    services: IndexMap<String, Service>,
    service_graph: ServiceGraph,
}

impl LocalState {
    pub fn new(resources: Vec<Resource>, services: Vec<Service>) -> Self {
        let mut resource_map = IndexMap::new();
        for resource in resources {
            resource_map.entry(resource.name().to_string()).or_insert(resource);
        }
        let mut service_map: IndexMap<String, Service> = IndexMap::new();
        for service in services {
            service_map.entry(service.name().to_string()).or_insert(service);
        }
        let service_graph = ServiceGraph::build(service_map.values());
        Self {
            resources: resource_map,
            services: service_map,
            service_graph,
        }
    }

    /// Resources in insertion order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Services in insertion order.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn service_graph(&self) -> &ServiceGraph {
        &self.service_graph
    }
}

#[derive(Serialize, Deserialize)]
struct LocalStateRaw {
    resources: Vec<Resource>,
    services: Vec<Service>,
}

impl From<LocalStateRaw> for LocalState {
    fn from(raw: LocalStateRaw) -> Self {
        LocalState::new(raw.resources, raw.services)
    }
}

impl From<LocalState> for LocalStateRaw {
    fn from(state: LocalState) -> Self {
        LocalStateRaw {
            resources: state.resources.into_values().collect(),
            services: state.services.into_values().collect(),
        }
    }
}
