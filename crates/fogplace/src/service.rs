//! Service model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::characteristics::Characteristics;

/// A directed interaction between two services.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Interaction intensity, carried as the service-graph edge weight.
    pub weight: f64,
    /// Amount of data exchanged, the cost-relevant quantity.
    pub data_transfer: f64,
}

impl Interaction {
    pub fn new(weight: f64, data_transfer: f64) -> Self {
        Self {
            weight,
            data_transfer,
        }
    }
}

/// A replicated service to be placed onto resources.
///
/// Outgoing interactions are keyed by target service name; targets that do
/// not exist in the owning state are dropped silently when the service
/// graph is built.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    service_name: String,
    image_name: String,
    interactions: IndexMap<String, Interaction>,
    data: f64,
    replicas: usize,
    requirements: Characteristics,
}

impl Service {
    pub fn new(
        service_name: &str,
        image_name: &str,
        interactions: IndexMap<String, Interaction>,
        data: f64,
        replicas: usize,
        requirements: Characteristics,
    ) -> Self {
        Self {
            service_name: service_name.to_string(),
            image_name: image_name.to_string(),
            interactions,
            data,
            replicas,
            requirements,
        }
    }

    pub fn name(&self) -> &str {
        &self.service_name
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn interactions(&self) -> &IndexMap<String, Interaction> {
        &self.interactions
    }

    /// Amount of data stored by the service.
    pub fn data(&self) -> f64 {
        self.data
    }

    /// Number of replicas that must be placed.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn requirements(&self) -> &Characteristics {
        &self.requirements
    }
}
