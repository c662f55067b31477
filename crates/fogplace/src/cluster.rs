//! Cluster model.

use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// Outcome of the local stage for one (service, resource) slot: whether the
/// local solver chose the resource and the precomputed per-slot cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub assigned: bool,
    pub cost: f64,
}

impl Candidate {
    pub fn new(assigned: bool, cost: f64) -> Self {
        Self { assigned, cost }
    }
}

/// A set of resources offered by one site, together with the candidate
/// lists exported by its local stage.
///
/// `candidates` is indexed by service position (outer) and resource
/// position (inner); both orders come from the owning global state. Every
/// inner list must have exactly one entry per resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ClusterRaw")]
pub struct Cluster {
    cluster_name: String,
    resources: Vec<Resource>,
    candidates: Vec<Vec<Candidate>>,
}

impl Cluster {
    pub fn new(cluster_name: &str, resources: Vec<Resource>, candidates: Vec<Vec<Candidate>>) -> Self {
        assert!(
            candidates.iter().all(|per_service| per_service.len() == resources.len()),
            "cluster {}: each candidate list must have one entry per resource",
            cluster_name
        );
        Self {
            cluster_name: cluster_name.to_string(),
            resources,
            candidates,
        }
    }

    pub fn name(&self) -> &str {
        &self.cluster_name
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Candidate lists, one per service in global state order.
    pub fn candidates(&self) -> &[Vec<Candidate>] {
        &self.candidates
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterRaw {
    cluster_name: String,
    resources: Vec<Resource>,
    candidates: Vec<Vec<Candidate>>,
}

impl From<ClusterRaw> for Cluster {
    fn from(raw: ClusterRaw) -> Self {
        Cluster::new(&raw.cluster_name, raw.resources, raw.candidates)
    }
}
