//! The Debevec-Malik linear system for recovering a log-domain inverse
//! response curve.
//!
//! Unknowns are `g(z)` for the 256 device codes, followed by one log
//! irradiance `ln(E_i)` per sample.  Each observation of code `z` for
//! sample `i` at exposure `j` contributes the weighted equation
//! `g(z) - ln(E_i) = ln(t_j)`.  One unweighted row pins `g(128)` to
//! remove the scale ambiguity, and 254 rows penalize the second
//! derivative of `g`.

use tracing::debug;

use crate::{
    error::Result,
    histogram::CODE_COUNT,
    solver::{LeastSquaresSolver, LinearSystem},
    weight::WeightTable,
};

/// The code whose log response is pinned to zero.
pub const GAUGE_CODE: usize = 128;

/// Number of second-derivative smoothness rows.
pub const SMOOTHNESS_ROWS: usize = CODE_COUNT - 2;

/// Builds the system for one channel.
///
/// `codes` is laid out as `[sample][exposure]` and must hold
/// `samples * log_exposures.len()` entries.
pub fn build_system(
    codes: &[u8],
    samples: usize,
    log_exposures: &[f64],
    weights: &WeightTable,
    lambda: f64,
) -> LinearSystem {
    let exposures = log_exposures.len();
    assert_eq!(codes.len(), samples * exposures);

    let rows = samples * exposures + 1 + SMOOTHNESS_ROWS;
    let cols = CODE_COUNT + samples;
    let mut system = LinearSystem::new(rows, cols);

    let mut k = 0;
    for i in 0..samples {
        for j in 0..exposures {
            let z = codes[i * exposures + j];
            let w = weights.get(z) as f64;
            system.push(k, z as usize, w);
            system.push(k, CODE_COUNT + i, -w);
            system.rhs[k] = w * log_exposures[j];
            k += 1;
        }
    }

    // Gauge.
    system.push(k, GAUGE_CODE, 1.0);
    k += 1;

    // Smoothness.
    for c in 0..SMOOTHNESS_ROWS {
        let w = lambda * weights.get((c + 1) as u8) as f64;
        system.push(k, c, w);
        system.push(k, c + 1, -2.0 * w);
        system.push(k, c + 2, w);
        k += 1;
    }
    debug_assert_eq!(k, rows);

    system
}

/// Solves one channel and returns the unnormalized inverse response,
/// i.e. `exp(g(z))` for every code.
pub fn solve_channel(
    codes: &[u8],
    samples: usize,
    log_exposures: &[f64],
    weights: &WeightTable,
    lambda: f64,
    solver: &dyn LeastSquaresSolver,
) -> Result<[f32; CODE_COUNT]> {
    let system = build_system(codes, samples, log_exposures, weights, lambda);
    debug!(rows = system.rows, cols = system.cols, "solving response system");

    let x = solver.solve(&system)?;

    let mut curve = [0.0f32; CODE_COUNT];
    for (v, g) in curve.iter_mut().zip(x.iter()) {
        *v = g.exp() as f32;
    }
    Ok(curve)
}
