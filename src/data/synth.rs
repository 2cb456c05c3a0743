use super::model::{Table, TableError};
use crate::selection::event::DatasetId;

// ---------------------------------------------------------------------------
// Deterministic PRNG
// ---------------------------------------------------------------------------

/// 2^-53, maps the top 53 bits of a `u64` onto `[0, 1)`.
const UNIT_F64: f64 = 1.0 / (1u64 << 53) as f64;

/// Seeded xoshiro256** generator for reproducible demo tracts and test data.
///
/// The same seed always yields the same dataset, so a regenerated demo keeps
/// row indices (and therefore selections) meaningful.
pub struct DemoRng {
    s: [u64; 4],
    /// Second value of the last Box-Muller pair.
    spare_normal: Option<f64>,
}

impl DemoRng {
    /// Expand `seed` into the 256-bit state with splitmix64.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let mut split = || {
            sm = sm.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = sm;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^ (z >> 31)
        };
        let s = [split(), split(), split(), split()];
        Self {
            s,
            spare_normal: None,
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = &mut self.s;
        let out = s1.wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let shifted = *s1 << 17;
        *s2 ^= *s0;
        *s3 ^= *s1;
        *s1 ^= *s2;
        *s0 ^= *s3;
        *s2 ^= shifted;
        *s3 = s3.rotate_left(45);
        out
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * UNIT_F64
    }

    /// Uniform in `[lo, hi)`.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Normal draw; Box-Muller pairs are used in full.
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z = match self.spare_normal.take() {
            Some(z) => z,
            None => {
                let radius = (-2.0 * (1.0 - self.next_f64()).ln()).sqrt();
                let angle = std::f64::consts::TAU * self.next_f64();
                self.spare_normal = Some(radius * angle.sin());
                radius * angle.cos()
            }
        };
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Demo dataset
// ---------------------------------------------------------------------------

/// Rook contiguity on a `side × side` grid stored row-major.
pub fn grid_neighbors(side: usize) -> Vec<Vec<usize>> {
    let mut neighbors = Vec::with_capacity(side * side);
    for r in 0..side {
        for c in 0..side {
            let mut nbrs = Vec::with_capacity(4);
            if r > 0 {
                nbrs.push((r - 1) * side + c);
            }
            if r + 1 < side {
                nbrs.push((r + 1) * side + c);
            }
            if c > 0 {
                nbrs.push(r * side + c - 1);
            }
            if c + 1 < side {
                nbrs.push(r * side + c + 1);
            }
            neighbors.push(nbrs);
        }
    }
    neighbors
}

/// Synthetic tracts on a grid: `lon`, `lat`, `income`, `crime`, `density`.
///
/// Income varies smoothly over space, so it is spatially autocorrelated.
/// Crime depends on income with a different slope in the eastern half, which
/// gives the Chow test something to find when that half is brushed.
pub fn demo_table(id: DatasetId, side: usize, seed: u64) -> Result<Table, TableError> {
    let mut rng = DemoRng::new(seed);
    let n = side * side;
    let mut lon = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);
    let mut income = Vec::with_capacity(n);
    let mut crime = Vec::with_capacity(n);
    let mut density = Vec::with_capacity(n);

    for r in 0..side {
        for c in 0..side {
            let u = c as f64 / side.max(1) as f64;
            let v = r as f64 / side.max(1) as f64;
            lon.push(-87.9 + 0.4 * u + rng.uniform(-0.004, 0.004));
            lat.push(41.6 + 0.4 * v + rng.uniform(-0.004, 0.004));

            let inc = 40.0 + 25.0 * (3.0 * u).sin() + 15.0 * v + rng.gauss(0.0, 4.0);
            let east = u >= 0.5;
            let slope = if east { -0.9 } else { -0.2 };
            income.push(inc);
            crime.push(80.0 + slope * inc + rng.gauss(0.0, 3.0));
            density.push(12.0 * inc + rng.gauss(0.0, 30.0));
        }
    }

    Table::new(id, n)
        .with_column("lon", lon)?
        .with_column("lat", lat)?
        .with_column("income", income)?
        .with_column("crime", crime)?
        .with_column("density", density)?
        .with_neighbors(grid_neighbors(side))
}
