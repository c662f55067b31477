//! Resource-vector algebra.

use serde::{Deserialize, Serialize};

/// Tolerance used for fuzzy equality of characteristic vectors.
pub const EPSILON: f64 = 1e-5;

/// Guard added to divisors so that empty dimensions (e.g. no GPU) divide
/// cleanly instead of producing infinities that poison downstream sums.
const DIV_GUARD: f64 = 1e-10;

/// Capacity or requirement vector over the four resource dimensions
/// (cpu, memory, disk, gpu). Immutable after construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Characteristics {
    values: [f64; 4],
}

impl Characteristics {
    pub fn new(cpu: f64, memory: f64, disk: f64, gpu: f64) -> Self {
        Self {
            values: [cpu, memory, disk, gpu],
        }
    }

    pub fn cpu(&self) -> f64 {
        self.values[0]
    }

    pub fn memory(&self) -> f64 {
        self.values[1]
    }

    pub fn disk(&self) -> f64 {
        self.values[2]
    }

    pub fn gpu(&self) -> f64 {
        self.values[3]
    }

    /// Component-wise less-or-equal, the feasibility test for placing a
    /// requirement vector onto a capacity vector.
    pub fn leq(&self, other: &Characteristics) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| a <= b)
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Characteristics) -> Characteristics {
        let mut values = [0.0; 4];
        for (i, v) in values.iter_mut().enumerate() {
            *v = self.values[i] + other.values[i];
        }
        Self { values }
    }

    /// Component-wise division with a small additive guard on the divisor.
    /// The guarded value participates in downstream sums, so callers must
    /// not special-case zero divisors themselves.
    pub fn div(&self, other: &Characteristics) -> Characteristics {
        let mut values = [0.0; 4];
        for (i, v) in values.iter_mut().enumerate() {
            *v = self.values[i] / (other.values[i] + DIV_GUARD);
        }
        Self { values }
    }

    /// Largest component.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sum of all components.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Component-wise equality within `epsilon`.
    pub fn fuzzy_eq(&self, other: &Characteristics, epsilon: f64) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl PartialEq for Characteristics {
    fn eq(&self, other: &Self) -> bool {
        self.fuzzy_eq(other, EPSILON)
    }
}
