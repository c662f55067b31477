//! Wiring of the two optimization stages.

use log::info;
use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentProblem;
use crate::candidates::solution_to_candidates;
use crate::cluster::Candidate;
use crate::composition::CompositionProblem;
use crate::composition_graph::CompositionGraph;
use crate::global_state::GlobalState;
use crate::initialization::ReplicaAwareInitialization;
use crate::local_state::LocalState;
use crate::moea::Nsga2;
use crate::selection::{KneenessSelector, PreferenceSelector, Selector};
use crate::solution::Solution;

/// Engine and selector parameters shared by both stages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub population_size: usize,
    pub max_evaluations: usize,
    pub seed: u64,
    /// Lp-norm exponent of the local fairness objective.
    pub fairness_exponent: f64,
    /// Position on the cost-sorted local front handed to the global stage.
    pub preference: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_evaluations: 10_000,
            seed: 123,
            fairness_exponent: 2.0,
            preference: 0.5,
        }
    }
}

/// Runs the local stage and returns the problem with its final front.
pub fn solve_local(state: &LocalState, config: &PipelineConfig) -> (AssignmentProblem, Vec<Solution>) {
    let problem = AssignmentProblem::new(state, config.fairness_exponent);
    let mut engine = Nsga2::new(config.population_size, config.max_evaluations, config.seed);
    let initialization = ReplicaAwareInitialization::new(&problem);
    let front = engine.optimize(&problem, Some(&initialization));
    info!(
        "local stage: front of {} over {} services",
        front.len(),
        problem.services().len()
    );
    (problem, front)
}

/// Runs the local stage and marshals the preferred operating point into
/// the candidate lists consumed by the global stage. `None` when the front
/// holds no feasible solution.
pub fn local_candidates(state: &LocalState, config: &PipelineConfig) -> Option<Vec<Vec<Candidate>>> {
    let (problem, front) = solve_local(state, config);
    let selector = PreferenceSelector::new(config.preference);
    selector
        .select(&front)
        .map(|solution| solution_to_candidates(solution, &problem))
}

/// Runs the global stage and returns the problem with its final front.
pub fn solve_global(state: &GlobalState, config: &PipelineConfig) -> (CompositionProblem, Vec<Solution>) {
    let problem = CompositionProblem::new(state);
    let mut engine = Nsga2::new(config.population_size, config.max_evaluations, config.seed);
    let front = engine.optimize(&problem, None);
    info!(
        "global stage: front of {}, complete = {}",
        front.len(),
        problem.is_complete()
    );
    (problem, front)
}

/// Full global stage: solve, select the knee, build the result graph.
/// `None` when no feasible composition exists.
pub fn compose(state: &GlobalState, config: &PipelineConfig) -> Option<CompositionGraph> {
    let (problem, front) = solve_global(state, config);
    KneenessSelector
        .select(&front)
        .map(|solution| CompositionGraph::build(solution, &problem))
}
