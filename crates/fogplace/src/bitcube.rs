//! Dense 3D bit array.

use serde::{Deserialize, Serialize};

use crate::bitset::BitSet;

/// A cube of bits with linear layout `x * (Y * Z) + y * Z + z`.
///
/// Coordinates are validated on every access; serialization carries the
/// dimensions plus the raw backing words (little-endian bit order).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BitCubeRaw", into = "BitCubeRaw")]
pub struct BitCube {
    x: usize,
    y: usize,
    z: usize,
    data: BitSet,
}

impl BitCube {
    /// Creates an empty cube with the given dimensions.
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self {
            x,
            y,
            z,
            data: BitSet::new(x * y * z),
        }
    }

    /// Restores a cube from its dimensions and raw words.
    pub fn from_raw(x: usize, y: usize, z: usize, words: &[u64]) -> Self {
        Self {
            x,
            y,
            z,
            data: BitSet::from_words(x * y * z, words),
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn z(&self) -> usize {
        self.z
    }

    /// Raw backing words, little-endian bit order.
    pub fn raw_data(&self) -> &[u64] {
        self.data.words()
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        self.data.get(self.index(x, y, z))
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, value: bool) {
        let index = self.index(x, y, z);
        self.data.set(index, value);
    }

    pub fn flip(&mut self, x: usize, y: usize, z: usize) {
        let index = self.index(x, y, z);
        self.data.flip(index);
    }

    pub fn clear(&mut self) {
        self.data.clear_all();
    }

    /// The line along the x axis at fixed `(y, z)`.
    pub fn x_line(&self, y: usize, z: usize) -> BitSet {
        self.check(y, self.y, "y");
        self.check(z, self.z, "z");
        let mut line = BitSet::new(self.x);
        for i in 0..self.x {
            if self.get(i, y, z) {
                line.set(i, true);
            }
        }
        line
    }

    /// The line along the y axis at fixed `(x, z)`.
    pub fn y_line(&self, x: usize, z: usize) -> BitSet {
        self.check(x, self.x, "x");
        self.check(z, self.z, "z");
        let mut line = BitSet::new(self.y);
        for i in 0..self.y {
            if self.get(x, i, z) {
                line.set(i, true);
            }
        }
        line
    }

    /// The line along the z axis at fixed `(x, y)`.
    pub fn z_line(&self, x: usize, y: usize) -> BitSet {
        self.check(x, self.x, "x");
        self.check(y, self.y, "y");
        let mut line = BitSet::new(self.z);
        for i in 0..self.z {
            if self.get(x, y, i) {
                line.set(i, true);
            }
        }
        line
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        self.check(x, self.x, "x");
        self.check(y, self.y, "y");
        self.check(z, self.z, "z");
        x * (self.y * self.z) + y * self.z + z
    }

    fn check(&self, value: usize, limit: usize, axis: &str) {
        assert!(
            value < limit,
            "bit cube coordinate {} = {} out of range 0..{}",
            axis,
            value,
            limit
        );
    }
}

#[derive(Serialize, Deserialize)]
struct BitCubeRaw {
    x: usize,
    y: usize,
    z: usize,
    data: Vec<u64>,
}

impl From<BitCubeRaw> for BitCube {
    fn from(raw: BitCubeRaw) -> Self {
        BitCube::from_raw(raw.x, raw.y, raw.z, &raw.data)
    }
}

impl From<BitCube> for BitCubeRaw {
    fn from(cube: BitCube) -> Self {
        BitCubeRaw {
            x: cube.x,
            y: cube.y,
            z: cube.z,
            data: cube.data.words().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_flip_clear() {
        let mut cube = BitCube::new(3, 4, 5);
        cube.set(2, 3, 4, true);
        assert!(cube.get(2, 3, 4));
        assert!(!cube.get(0, 0, 0));
        cube.flip(2, 3, 4);
        assert!(!cube.get(2, 3, 4));
        cube.set(1, 1, 1, true);
        cube.clear();
        assert!(!cube.get(1, 1, 1));
    }

    #[test]
    fn raw_word_round_trip() {
        let mut cube = BitCube::new(4, 4, 4);
        for i in 0..4 {
            cube.set(i, i, i, true);
        }
        let restored = BitCube::from_raw(cube.x(), cube.y(), cube.z(), cube.raw_data());
        assert_eq!(restored, cube);
    }

    #[test]
    fn line_extraction_matches_pointwise_access() {
        let mut cube = BitCube::new(3, 3, 3);
        cube.set(0, 1, 2, true);
        cube.set(1, 1, 2, true);
        cube.set(1, 1, 0, true);

        let x_line = cube.x_line(1, 2);
        let y_line = cube.y_line(1, 2);
        let z_line = cube.z_line(1, 1);
        for i in 0..3 {
            assert_eq!(x_line.get(i), cube.get(i, 1, 2));
            assert_eq!(y_line.get(i), cube.get(1, i, 2));
            assert_eq!(z_line.get(i), cube.get(1, 1, i));
        }
    }

    #[test]
    fn serde_round_trip() {
        let mut cube = BitCube::new(2, 5, 7);
        cube.set(1, 4, 6, true);
        cube.set(0, 0, 0, true);
        let json = serde_json::to_value(&cube).unwrap();
        assert_eq!(json["x"], 2);
        assert!(json["data"].is_array());
        let back: BitCube = serde_json::from_value(json).unwrap();
        assert_eq!(back, cube);
    }

    #[test]
    #[should_panic(expected = "coordinate y")]
    fn out_of_range_coordinate_panics() {
        BitCube::new(2, 2, 2).get(1, 2, 0);
    }

    #[test]
    #[should_panic(expected = "coordinate z")]
    fn line_extraction_validates_fixed_coordinates() {
        BitCube::new(2, 2, 2).x_line(0, 5);
    }
}
