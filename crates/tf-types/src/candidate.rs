use serde::{Deserialize, Serialize};

/// Concrete component triple for one astable circuit (ohms, ohms, farads).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub r1: f64,
    pub r2: f64,
    pub c: f64,
}

impl Components {
    pub fn new(r1: f64, r2: f64, c: f64) -> Self {
        Self { r1, r2, c }
    }
}

/// Position of a candidate in the discrete search space.
///
/// R1 and R2 both index the resistor set, C indexes the capacitor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexCandidate {
    pub r1_index: usize,
    pub r2_index: usize,
    pub c_index: usize,
}

impl IndexCandidate {
    pub fn new(r1_index: usize, r2_index: usize, c_index: usize) -> Self {
        Self {
            r1_index,
            r2_index,
            c_index,
        }
    }

    /// Decode a composite index `k = (r1 * n_r + r2) * n_c + c`.
    ///
    /// Ascending `k` enumerates ascending r1, then r2, then c.
    pub fn from_composite(k: usize, n_r: usize, n_c: usize) -> Self {
        Self {
            r1_index: k / (n_r * n_c),
            r2_index: (k / n_c) % n_r,
            c_index: k % n_c,
        }
    }

    pub fn composite(&self, n_r: usize, n_c: usize) -> usize {
        (self.r1_index * n_r + self.r2_index) * n_c + self.c_index
    }
}
