//! Resource model.

use serde::{Deserialize, Serialize};

use crate::characteristics::Characteristics;

/// A resource offered by a cluster, described by its capacity vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    resource_name: String,
    characteristics: Characteristics,
}

impl Resource {
    pub fn new(resource_name: &str, characteristics: Characteristics) -> Self {
        Self {
            resource_name: resource_name.to_string(),
            characteristics,
        }
    }

    pub fn name(&self) -> &str {
        &self.resource_name
    }

    pub fn characteristics(&self) -> &Characteristics {
        &self.characteristics
    }

    /// Derives the price model of the resource from its capacity vector.
    ///
    /// The coefficients are part of the cost contract shared with the
    /// global stage and must not be altered.
    pub fn cost(&self) -> ResourceCost {
        ResourceCost {
            fixed: 0.0366 * self.characteristics.cpu()
                + 0.0043 * self.characteristics.memory()
                + 0.0001 * self.characteristics.disk()
                + 1.6760 * self.characteristics.gpu(),
            data: 0.0,
            input: 0.05,
            output: 0.09,
        }
    }
}

/// Per-resource price components: a fixed share plus rates for stored
/// data, incoming transfer and outgoing transfer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceCost {
    pub fixed: f64,
    pub data: f64,
    pub input: f64,
    pub output: f64,
}

impl ResourceCost {
    pub fn sum(&self) -> f64 {
        self.fixed + self.data + self.input + self.output
    }
}
