//! A crate for estimating and applying camera response functions.
//!
//! The main entry points are `estimate()`, which recovers an inverse
//! response from a stack of differently exposed images using the
//! Debevec-Malik method, and `estimate_from_raw_jpeg()`, which derives
//! one from an aligned RAW/JPEG pair.  The resulting `CrfModel` is used
//! with `linearize()` and `apply_response()` to move images between the
//! device and linear domains.

mod apply;
mod config;
mod crf;
mod error;
mod histogram;
mod image;
mod poisson;
mod raw_jpeg;
mod weight;

pub mod debevec;
pub mod sampling;
pub mod solver;
pub mod utils;

use tracing::{info, instrument};

pub use apply::{apply_response, linearize, Response, GAMMA};
pub use config::{EstimateConfig, EstimateConfigBuilder};
pub use crf::CrfModel;
pub use error::{CrfError, Result};
pub use histogram::{Histogram, CODE_COUNT};
pub use image::{to_code, Image};
pub use poisson::{PointSampler, PoissonDiskSampler};
pub use raw_jpeg::{estimate_from_raw_jpeg, joint_histograms, JointHistogram, RawJpegConfig};
pub use sampling::{SampleSet, SamplingStrategy};
pub use solver::{default_solver, LeastSquaresSolver, LinearSystem, MissingBackend};
pub use weight::{WeightFunction, WeightTable};

#[cfg(feature = "svd")]
pub use solver::SvdSolver;

/// Estimates the inverse camera response of an exposure stack with the
/// Debevec-Malik method, using the best available solver.
///
/// Every image must share dimensions and channel count, and carry a
/// positive exposure time.  Each channel is calibrated independently.
pub fn estimate(stack: &[Image], config: &EstimateConfig) -> Result<CrfModel> {
    let solver = default_solver();
    estimate_with_solver(stack, config, solver.as_ref())
}

/// Same as `estimate()`, but with a caller-provided least-squares solver.
#[instrument(skip_all, fields(exposures = stack.len(), weight = ?config.weight))]
pub fn estimate_with_solver(
    stack: &[Image],
    config: &EstimateConfig,
    solver: &dyn LeastSquaresSolver,
) -> Result<CrfModel> {
    if stack.len() < 2 {
        return Err(CrfError::InsufficientData);
    }
    sampling::check_stack(stack)?;
    if let Some(img) = stack
        .iter()
        .find(|img| !(img.exposure > 0.0 && img.exposure.is_finite()))
    {
        return Err(CrfError::InvalidParameter(format!(
            "exposure time must be positive, got {}",
            img.exposure
        )));
    }
    if !(config.lambda >= 0.0 && config.lambda.is_finite()) {
        return Err(CrfError::InvalidParameter(format!(
            "smoothness strength must be non-negative, got {}",
            config.lambda
        )));
    }

    // Subsample the stack.
    let samples = match config.sampling {
        SamplingStrategy::Percentile => sampling::subsample_percentile(stack, config.samples)?,
        SamplingStrategy::Spatial => {
            let mut sampler = PoissonDiskSampler::new(config.seed);
            sampling::subsample_spatial(stack, config.samples, &mut sampler)?
        }
    };

    let weights = WeightTable::new(config.weight);
    let log_exposures: Vec<f64> = stack.iter().map(|img| (img.exposure as f64).ln()).collect();

    let mut channels = Vec::with_capacity(samples.channels);
    for chan in 0..samples.channels {
        let mut curve = debevec::solve_channel(
            samples.channel(chan),
            samples.samples,
            &log_exposures,
            &weights,
            config.lambda as f64,
            solver,
        )?;
        crf::finish_curve(&mut curve, config.enforce_monotonic);
        info!(channel = chan, samples = samples.samples, "estimated response");
        channels.push(curve);
    }

    Ok(CrfModel::new(channels))
}
