//! Selection of one operating point from a non-dominated front.

use crate::kneeness;
use crate::solution::Solution;

/// Strategy choosing a single solution from a non-dominated population.
/// Infeasible solutions are ignored; an empty (or fully infeasible)
/// population selects nothing.
pub trait Selector {
    fn select<'a>(&self, population: &'a [Solution]) -> Option<&'a Solution>;
}

/// Picks by position along the cost-sorted front: preference 0 is the
/// cheapest solution, 1 the most expensive, values in between interpolate.
pub struct PreferenceSelector {
    preference: f64,
}

impl PreferenceSelector {
    pub fn new(preference: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&preference),
            "preference must be within [0, 1], got {}",
            preference
        );
        Self { preference }
    }
}

impl Selector for PreferenceSelector {
    fn select<'a>(&self, population: &'a [Solution]) -> Option<&'a Solution> {
        let mut feasible: Vec<&Solution> = population.iter().filter(|s| s.is_feasible()).collect();
        if feasible.is_empty() {
            return None;
        }
        if feasible.len() == 1 {
            return Some(feasible[0]);
        }
        feasible.sort_by(|a, b| a.objective(0).total_cmp(&b.objective(0)));
        let index = (self.preference * (feasible.len() - 1) as f64).round() as usize;
        Some(feasible[index])
    }
}

/// Picks the knee: the interior point farthest from the line through the
/// first and last point of the front in 2-objective space.
pub struct KneenessSelector;

impl Selector for KneenessSelector {
    fn select<'a>(&self, population: &'a [Solution]) -> Option<&'a Solution> {
        let feasible: Vec<&Solution> = population.iter().filter(|s| s.is_feasible()).collect();
        if feasible.is_empty() {
            return None;
        }
        if feasible.len() < 3 {
            return Some(feasible[0]);
        }

        let objectives = |s: &Solution| (s.objective(0), s.objective(1));
        let first = objectives(feasible[0]);
        let last = objectives(feasible[feasible.len() - 1]);

        let mut best = feasible[1];
        let mut best_distance = kneeness::compute(first, last, objectives(best));
        for &candidate in &feasible[2..feasible.len() - 1] {
            let distance = kneeness::compute(first, last, objectives(candidate));
            // Ties keep the earliest interior point.
            if distance > best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        Some(best)
    }
}
