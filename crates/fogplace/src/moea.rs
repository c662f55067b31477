//! NSGA-II reference engine over bitset-encoded problems.
//!
//! A small, self-contained driver for the two placement problems. It only
//! uses the problem capability set (`new_solution`, `evaluate`, optional
//! initializer), so any other engine honoring that contract can replace it.

use std::cmp::Ordering;

use log::debug;
use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::problem::{Initialization, Problem};
use crate::solution::Solution;

/// Rounds `x` down to a multiple of `n`, never below `n`.
pub fn round_down_to_multiple(x: usize, n: usize) -> usize {
    assert!(n > 0, "n must be > 0");
    ((x / n) * n).max(n)
}

/// Seeded NSGA-II with binary tournament, uniform crossover and bit-flip
/// mutation. Variation is generic; feasibility recovery is the problem's
/// business (cardinality repair for local, constraints for global).
pub struct Nsga2 {
    population_size: usize,
    max_evaluations: usize,
    crossover_rate: f64,
    mutation_rate: Option<f64>,
    rng: Pcg64,
}

impl Nsga2 {
    pub fn new(population_size: usize, max_evaluations: usize, seed: u64) -> Self {
        Self {
            // Parents are consumed in pairs.
            population_size: round_down_to_multiple(population_size, 2),
            max_evaluations,
            crossover_rate: 0.9,
            mutation_rate: None,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Overrides the default rates (crossover 0.9 per pair, mutation
    /// `1 / len` per bit of each variable).
    pub fn with_rates(mut self, crossover_rate: f64, mutation_rate: f64) -> Self {
        self.crossover_rate = crossover_rate;
        self.mutation_rate = Some(mutation_rate);
        self
    }

    /// Runs the search and returns the final first non-dominated front.
    pub fn optimize<P: Problem>(
        &mut self,
        problem: &P,
        initialization: Option<&dyn Initialization>,
    ) -> Vec<Solution> {
        let mut population = match initialization {
            Some(initialization) => {
                initialization.initialize(self.population_size, &mut self.rng)
            }
            None => (0..self.population_size)
                .map(|_| self.random_solution(problem))
                .collect(),
        };
        for solution in &mut population {
            problem.evaluate(solution, &mut self.rng);
        }
        let mut evaluations = population.len();

        let mut generation = 0;
        while evaluations < self.max_evaluations {
            let offspring = self.evolve(problem, &population);
            evaluations += offspring.len();
            let mut combined = offspring;
            combined.extend(population.iter().cloned());
            population = select_population(combined, self.population_size);
            generation += 1;
            debug!(
                "generation {}: {} evaluations, best cost {}",
                generation,
                evaluations,
                population
                    .iter()
                    .map(|s| s.objective(0))
                    .fold(f64::INFINITY, f64::min)
            );
        }

        let fronts = fast_non_dominated_sort(&population);
        fronts[0]
            .iter()
            .map(|&index| population[index].clone())
            .collect()
    }

    fn random_solution<P: Problem>(&mut self, problem: &P) -> Solution {
        let mut solution = problem.new_solution();
        for k in 0..solution.number_of_variables() {
            for bit in 0..solution.variable(k).len() {
                solution.variable_mut(k).set(bit, self.rng.gen_bool(0.5));
            }
        }
        solution
    }

    fn evolve<P: Problem>(&mut self, problem: &P, population: &[Solution]) -> Vec<Solution> {
        let (ranks, crowding) = rank_and_crowding(population);

        // Binary tournament over a shuffled permutation: each index meets
        // its successor, the better one becomes a parent.
        let mut permutation: Vec<usize> = (0..population.len()).collect();
        permutation.shuffle(&mut self.rng);
        let mut parents = Vec::with_capacity(population.len());
        for i in 0..population.len() {
            let a = permutation[i];
            let b = permutation[(i + 1) % population.len()];
            parents.push(if better(a, b, &ranks, &crowding) { a } else { b });
        }
        parents.shuffle(&mut self.rng);

        let mut offspring = Vec::with_capacity(population.len());
        for pair in parents.chunks_exact(2) {
            let mut first = population[pair[0]].clone();
            let mut second = population[pair[1]].clone();
            if self.rng.gen_range(0.0..1.0) < self.crossover_rate {
                self.uniform_crossover(&mut first, &mut second);
            }
            self.bit_flip(&mut first);
            self.bit_flip(&mut second);
            offspring.push(first);
            offspring.push(second);
        }
        for solution in &mut offspring {
            problem.evaluate(solution, &mut self.rng);
        }
        offspring
    }

    fn uniform_crossover(&mut self, first: &mut Solution, second: &mut Solution) {
        for k in 0..first.number_of_variables() {
            for bit in 0..first.variable(k).len() {
                if self.rng.gen_bool(0.5) {
                    let a = first.variable(k).get(bit);
                    let b = second.variable(k).get(bit);
                    first.variable_mut(k).set(bit, b);
                    second.variable_mut(k).set(bit, a);
                }
            }
        }
    }

    fn bit_flip(&mut self, solution: &mut Solution) {
        for k in 0..solution.number_of_variables() {
            let length = solution.variable(k).len();
            if length == 0 {
                continue;
            }
            let rate = self.mutation_rate.unwrap_or(1.0 / length as f64);
            for bit in 0..length {
                if self.rng.gen_range(0.0..1.0) < rate {
                    solution.variable_mut(k).flip(bit);
                }
            }
        }
    }
}

fn better(a: usize, b: usize, ranks: &[usize], crowding: &[f64]) -> bool {
    match ranks[a].cmp(&ranks[b]) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => crowding[a] > crowding[b],
    }
}

/// Constraint-dominating Pareto comparison: any difference in aggregate
/// violation decides outright, feasible ties fall through to dominance in
/// minimize-space.
pub fn dominates(a: &Solution, b: &Solution) -> bool {
    let violation_a = a.violation();
    let violation_b = b.violation();
    if violation_a != violation_b {
        return violation_a < violation_b;
    }
    let mut strictly_better = false;
    for i in 0..a.objectives().len() {
        let x = a.minimized_objective(i);
        let y = b.minimized_objective(i);
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Partitions indices into non-dominated fronts, best first.
pub fn fast_non_dominated_sort(solutions: &[Solution]) -> Vec<Vec<usize>> {
    let mut fronts = Vec::new();
    let mut dominated = vec![Vec::new(); solutions.len()];
    let mut counters = vec![0usize; solutions.len()];
    let mut front = Vec::new();
    for (i, p) in solutions.iter().enumerate() {
        for (j, q) in solutions.iter().enumerate() {
            if dominates(p, q) {
                dominated[i].push(j);
            } else if dominates(q, p) {
                counters[i] += 1;
            }
        }
        if counters[i] == 0 {
            front.push(i);
        }
    }
    while !front.is_empty() {
        fronts.push(front.clone());
        let mut next_front = Vec::new();
        for i in front.into_iter() {
            for &j in &dominated[i] {
                counters[j] -= 1;
                if counters[j] == 0 {
                    next_front.push(j);
                }
            }
        }
        front = next_front;
    }
    fronts
}

fn rank_and_crowding(solutions: &[Solution]) -> (Vec<usize>, Vec<f64>) {
    let mut ranks = vec![0; solutions.len()];
    let mut crowding = vec![0.0; solutions.len()];
    for (rank, front) in fast_non_dominated_sort(solutions).into_iter().enumerate() {
        for &index in &front {
            ranks[index] = rank;
        }
        crowding_distance_assignment(solutions, front, &mut crowding);
    }
    (ranks, crowding)
}

/// Accumulates crowding distances of one front into `out`.
fn crowding_distance_assignment(solutions: &[Solution], mut front: Vec<usize>, out: &mut [f64]) {
    if front.len() <= 2 {
        for &index in &front {
            out[index] = f64::INFINITY;
        }
        return;
    }
    let objective_count = solutions[front[0]].objectives().len();
    for objective in 0..objective_count {
        front.sort_by(|&a, &b| {
            solutions[a]
                .minimized_objective(objective)
                .total_cmp(&solutions[b].minimized_objective(objective))
        });
        let minimum = solutions[front[0]].minimized_objective(objective);
        let maximum = solutions[*front.last().unwrap()].minimized_objective(objective);
        out[front[0]] = f64::INFINITY;
        out[*front.last().unwrap()] = f64::INFINITY;
        if maximum == minimum {
            continue;
        }
        for i in 1..front.len() - 1 {
            out[front[i]] += (solutions[front[i + 1]].minimized_objective(objective)
                - solutions[front[i - 1]].minimized_objective(objective))
                / (maximum - minimum);
        }
    }
}

/// NSGA-II survivor selection: fill whole fronts while they fit, truncate
/// the boundary front by crowding distance.
fn select_population(candidates: Vec<Solution>, target: usize) -> Vec<Solution> {
    if candidates.len() <= target {
        return candidates;
    }
    let fronts = fast_non_dominated_sort(&candidates);
    let mut crowding = vec![0.0; candidates.len()];
    let mut selected = Vec::with_capacity(target);
    for mut front in fronts {
        crowding_distance_assignment(&candidates, front.clone(), &mut crowding);
        if selected.len() + front.len() <= target {
            for &index in &front {
                selected.push(candidates[index].clone());
            }
            if selected.len() == target {
                break;
            }
        } else {
            front.sort_by(|&a, &b| crowding[b].total_cmp(&crowding[a]));
            for &index in front.iter().take(target - selected.len()) {
                selected.push(candidates[index].clone());
            }
            break;
        }
    }
    selected
}
