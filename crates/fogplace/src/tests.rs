use indexmap::IndexMap;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::assignment::{AssignmentProblem, COST_OBJECTIVE, FAIRNESS_OBJECTIVE};
use crate::candidates::solution_to_candidates;
use crate::characteristics::Characteristics;
use crate::cluster::{Candidate, Cluster};
use crate::composition::CompositionProblem;
use crate::global_state::GlobalState;
use crate::initialization::ReplicaAwareInitialization;
use crate::local_state::LocalState;
use crate::moea::Nsga2;
use crate::pipeline::{self, PipelineConfig};
use crate::problem::{Initialization, Problem};
use crate::resource::Resource;
use crate::selection::{KneenessSelector, PreferenceSelector, Selector};
use crate::service::Service;

fn resource(name: &str, cpu: f64, memory: f64, disk: f64) -> Resource {
    Resource::new(name, Characteristics::new(cpu, memory, disk, 0.0))
}

fn service(name: &str, replicas: usize, cpu: f64, memory: f64, disk: f64) -> Service {
    Service::new(
        name,
        "img",
        IndexMap::new(),
        0.0,
        replicas,
        Characteristics::new(cpu, memory, disk, 0.0),
    )
}

#[test]
fn trivial_feasibility_survives_initialization_and_evaluation() {
    let state = LocalState::new(
        vec![resource("r0", 1.0, 1.0, 1.0), resource("r1", 2.0, 2.0, 2.0)],
        vec![service("s0", 1, 1.0, 1.0, 1.0), service("s1", 1, 2.0, 2.0, 2.0)],
    );
    let problem = AssignmentProblem::new(&state, 2.0);
    assert_eq!(problem.feasible_resources()[0], vec![0, 1]);
    assert_eq!(problem.feasible_resources()[1], vec![1]);

    let mut rng = Pcg64::seed_from_u64(5);
    let initialization = ReplicaAwareInitialization::new(&problem);
    for mut solution in initialization.initialize(30, &mut rng) {
        problem.evaluate(&mut solution, &mut rng);
        for k in 0..2 {
            assert_eq!(solution.variable(k).cardinality(), 1);
            // Every decoded assignment is feasible by construction.
            for x in solution.variable(k).iter_ones() {
                let i = problem.feasible_resources()[k][x];
                assert!(problem.services()[k]
                    .requirements()
                    .leq(problem.resources()[i].characteristics()));
            }
        }
    }
}

#[test]
fn local_cost_decomposes_over_decoded_assignments() {
    let mut interactions = IndexMap::new();
    interactions.insert("db".to_string(), crate::service::Interaction::new(1.0, 4.0));
    let state = LocalState::new(
        vec![resource("r0", 4.0, 4.0, 4.0), resource("r1", 8.0, 8.0, 8.0)],
        vec![
            Service::new(
                "web",
                "img",
                interactions,
                10.0,
                2,
                Characteristics::new(1.0, 1.0, 1.0, 0.0),
            ),
            service("db", 1, 2.0, 2.0, 2.0),
        ],
    );
    let problem = AssignmentProblem::new(&state, 2.0);
    let mut solution = problem.new_solution();
    solution.variable_mut(0).set(0, true);
    solution.variable_mut(0).set(1, true);
    solution.variable_mut(1).set(1, true);
    let mut rng = Pcg64::seed_from_u64(0);
    problem.evaluate(&mut solution, &mut rng);

    let costs = problem.assignment_costs();
    let expected = costs[0][0] + costs[0][1] + costs[1][1];
    assert!((solution.objective(COST_OBJECTIVE) - expected).abs() < 1e-12);
}

#[test]
fn fairness_front_separates_stacked_from_spread_load() {
    // Two identical resources, four identical services at half capacity.
    let state = LocalState::new(
        vec![resource("r0", 2.0, 2.0, 2.0), resource("r1", 2.0, 2.0, 2.0)],
        (0..4).map(|i| service(&format!("s{}", i), 1, 1.0, 1.0, 1.0)).collect(),
    );
    let problem = AssignmentProblem::new(&state, 2.0);
    let mut rng = Pcg64::seed_from_u64(3);

    // A 2-2 split spreads load, a 4-0 split concentrates it.
    let mut spread = problem.new_solution();
    let mut stacked = problem.new_solution();
    for k in 0..4 {
        spread.variable_mut(k).set(k % 2, true);
        stacked.variable_mut(k).set(0, true);
    }
    problem.evaluate(&mut spread, &mut rng);
    problem.evaluate(&mut stacked, &mut rng);
    assert!((spread.objective(FAIRNESS_OBJECTIVE) - 2f64.sqrt()).abs() < 1e-9);
    assert!((stacked.objective(FAIRNESS_OBJECTIVE) - 2.0).abs() < 1e-9);
    assert!(stacked.objective(FAIRNESS_OBJECTIVE) > spread.objective(FAIRNESS_OBJECTIVE));

    // Costs tie, so the front converges on the concentrated extreme of
    // the maximize sense.
    let mut engine = Nsga2::new(20, 2_000, 17);
    let initialization = ReplicaAwareInitialization::new(&problem);
    let front = engine.optimize(&problem, Some(&initialization));
    assert!(!front.is_empty());
    let best_fairness = front
        .iter()
        .map(|s| s.objective(FAIRNESS_OBJECTIVE))
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((best_fairness - 2.0).abs() < 1e-9);
}

#[test]
fn marshalled_candidates_reconstruct_local_costs_globally() {
    let state = LocalState::new(
        vec![resource("r0", 4.0, 4.0, 4.0), resource("r1", 4.0, 4.0, 4.0)],
        vec![service("s0", 1, 1.0, 1.0, 1.0), service("s1", 2, 1.0, 1.0, 1.0)],
    );
    let problem = AssignmentProblem::new(&state, 2.0);
    let mut solution = problem.new_solution();
    solution.variable_mut(0).set(0, true);
    solution.variable_mut(1).set(0, true);
    solution.variable_mut(1).set(1, true);
    let mut rng = Pcg64::seed_from_u64(1);
    problem.evaluate(&mut solution, &mut rng);

    let candidates = solution_to_candidates(&solution, &problem);
    let cluster = Cluster::new(
        "c0",
        problem.resources().to_vec(),
        candidates,
    );
    let global = GlobalState::new(
        vec![cluster],
        problem.services().to_vec(),
        IndexMap::new(),
    );
    let composition = CompositionProblem::new(&global);
    assert!(composition.is_complete());

    // Select exactly the locally assigned slots.
    let mut global_solution = composition.new_solution();
    for k in 0..2 {
        for x in 0..composition.cluster_resource_indices(k).len() {
            global_solution.variable_mut(k).set(x, true);
        }
    }
    composition.evaluate(&mut global_solution, &mut rng);
    assert!(global_solution.is_feasible());
    assert!(
        (global_solution.objective(0) - solution.objective(COST_OBJECTIVE)).abs() < 1e-12
    );
}

#[test]
fn global_composition_rejects_unsatisfiable_replica_counts() {
    // One service with two replicas, but only one assigned slot in the
    // whole federation.
    let make_cluster = |name: &str, assigned: bool| {
        Cluster::new(
            name,
            vec![resource(&format!("{}-r0", name), 4.0, 4.0, 4.0)],
            vec![vec![Candidate::new(assigned, 1.0)]],
        )
    };
    let state = GlobalState::new(
        vec![make_cluster("c0", true), make_cluster("c1", false)],
        vec![service("s0", 2, 1.0, 1.0, 1.0)],
        IndexMap::new(),
    );
    let problem = CompositionProblem::new(&state);
    assert!(problem.is_complete());

    let mut engine = Nsga2::new(10, 500, 11);
    let front = engine.optimize(&problem, None);
    for solution in &front {
        assert!(solution.constraint(0) <= 1.0);
        assert!(!solution.is_feasible());
    }
    assert!(PreferenceSelector::new(0.5).select(&front).is_none());
    assert!(KneenessSelector.select(&front).is_none());
}

#[test]
fn engine_runs_are_reproducible_under_a_fixed_seed() {
    let state = LocalState::new(
        (0..3).map(|i| resource(&format!("r{}", i), 4.0, 4.0, 4.0)).collect(),
        (0..3).map(|i| service(&format!("s{}", i), 2, 1.0, 1.0, 1.0)).collect(),
    );
    let problem = AssignmentProblem::new(&state, 2.0);
    let run = |seed: u64| {
        let mut engine = Nsga2::new(16, 800, seed);
        let initialization = ReplicaAwareInitialization::new(&problem);
        let mut objectives: Vec<(f64, f64)> = engine
            .optimize(&problem, Some(&initialization))
            .iter()
            .map(|s| (s.objective(0), s.objective(1)))
            .collect();
        objectives.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        objectives
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn parallel_evaluation_matches_sequential() {
    let state = LocalState::new(
        (0..4).map(|i| resource(&format!("r{}", i), 4.0, 4.0, 4.0)).collect(),
        (0..4).map(|i| service(&format!("s{}", i), 2, 1.0, 1.0, 1.0)).collect(),
    );
    let problem = AssignmentProblem::new(&state, 2.0);

    let mut seed_rng = Pcg64::seed_from_u64(21);
    let initialization = ReplicaAwareInitialization::new(&problem);
    let population = initialization.initialize(16, &mut seed_rng);

    // Each solution gets its own deterministic repair stream, so thread
    // interleaving cannot change the outcome.
    let sequential: Vec<(f64, f64)> = population
        .iter()
        .enumerate()
        .map(|(index, solution)| {
            let mut solution = solution.clone();
            let mut rng = Pcg64::seed_from_u64(index as u64);
            problem.evaluate(&mut solution, &mut rng);
            (solution.objective(0), solution.objective(1))
        })
        .collect();

    let parallel: Vec<(f64, f64)> = std::thread::scope(|scope| {
        let handles: Vec<_> = population
            .iter()
            .enumerate()
            .map(|(index, solution)| {
                let problem = &problem;
                let mut solution = solution.clone();
                scope.spawn(move || {
                    let mut rng = Pcg64::seed_from_u64(index as u64);
                    problem.evaluate(&mut solution, &mut rng);
                    (solution.objective(0), solution.objective(1))
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn two_stage_pipeline_produces_a_composition() {
    let config = PipelineConfig {
        population_size: 20,
        max_evaluations: 600,
        seed: 7,
        fairness_exponent: 2.0,
        preference: 0.0,
    };

    let local_states: Vec<LocalState> = (0..2)
        .map(|u| {
            LocalState::new(
                (0..3)
                    .map(|i| resource(&format!("c{}-r{}", u, i), 4.0, 4.0, 4.0))
                    .collect(),
                vec![
                    service("web", 2, 1.0, 1.0, 1.0),
                    service("db", 1, 2.0, 2.0, 2.0),
                ],
            )
        })
        .collect();

    let mut clusters = Vec::new();
    for (u, local) in local_states.iter().enumerate() {
        let candidates = pipeline::local_candidates(local, &config).unwrap();
        clusters.push(Cluster::new(
            &format!("c{}", u),
            local.resources().cloned().collect(),
            candidates,
        ));
    }

    let mut latency = IndexMap::new();
    for u in 0..2 {
        let mut row = IndexMap::new();
        for v in 0..2 {
            row.insert(format!("c{}", v), if u == v { 0.0 } else { 4.0 });
        }
        latency.insert(format!("c{}", u), row);
    }
    let global = GlobalState::new(
        clusters,
        vec![
            service("web", 2, 1.0, 1.0, 1.0),
            service("db", 1, 2.0, 2.0, 2.0),
        ],
        latency,
    );

    let graph = pipeline::compose(&global, &config).expect("feasible composition");
    // One edge per placed replica.
    assert_eq!(graph.edge_count(), 3);
    let csv = graph.to_csv();
    assert!(csv.starts_with(','));
}

#[test]
fn global_state_json_round_trip_drives_the_global_stage() {
    let cluster = Cluster::new(
        "c0",
        vec![resource("r0", 4.0, 4.0, 4.0)],
        vec![vec![Candidate::new(true, 2.5)]],
    );
    let state = GlobalState::new(
        vec![cluster],
        vec![service("s0", 1, 1.0, 1.0, 1.0)],
        IndexMap::new(),
    );
    let json = serde_json::to_string(&state).unwrap();
    let restored: GlobalState = serde_json::from_str(&json).unwrap();

    let problem = CompositionProblem::new(&restored);
    let mut solution = problem.new_solution();
    solution.variable_mut(0).set(0, true);
    let mut rng = Pcg64::seed_from_u64(2);
    problem.evaluate(&mut solution, &mut rng);
    assert!(solution.is_feasible());
    assert!((solution.objective(0) - 2.5).abs() < 1e-12);
}
