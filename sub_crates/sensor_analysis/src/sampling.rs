//! Reduction of a full exposure stack to a small set of device code
//! observations.

use tracing::debug;

use crate::{
    error::{CrfError, Result},
    histogram::{first_greater, stack_histograms, CODE_COUNT},
    image::{to_code, Image},
    poisson::PointSampler,
};

/// Sample count used when the requested count isn't positive.
pub const DEFAULT_SAMPLE_COUNT: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Grossberg-Nayar sampling by cumulative distribution rank.  Does
    /// not require the exposures to be registered.
    Percentile,
    /// Poisson-disk sampling of pixel locations.  Requires pixel
    /// registered exposures.
    Spatial,
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        SamplingStrategy::Percentile
    }
}

/// Device codes laid out as `[channel][sample][exposure]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub channels: usize,
    pub samples: usize,
    pub exposures: usize,
    pub codes: Vec<u8>,
}

impl SampleSet {
    #[inline(always)]
    pub fn get(&self, channel: usize, sample: usize, exposure: usize) -> u8 {
        self.codes[(channel * self.samples + sample) * self.exposures + exposure]
    }

    /// All codes of one channel, laid out as `[sample][exposure]`.
    pub fn channel(&self, channel: usize) -> &[u8] {
        let stride = self.samples * self.exposures;
        &self.codes[(channel * stride)..((channel + 1) * stride)]
    }
}

/// Replaces a non-positive sample count with the default.
#[inline]
pub fn effective_sample_count(requested: usize) -> usize {
    if requested < 1 {
        DEFAULT_SAMPLE_COUNT
    } else {
        requested
    }
}

/// Checks that the stack is non-empty and that all images share
/// dimensions and channel count.
pub(crate) fn check_stack(stack: &[Image]) -> Result<()> {
    let first = stack.first().ok_or(CrfError::InsufficientData)?;
    if !first.is_valid() {
        return Err(CrfError::InsufficientData);
    }
    if stack.iter().any(|img| !img.similar_type(first)) {
        return Err(CrfError::DimensionMismatch);
    }
    Ok(())
}

/// Grossberg-Nayar subsampling.
///
/// For each channel and exposure, sample `i` is the smallest code whose
/// cumulative distribution value exceeds `i / samples`.  The same rank
/// is used across exposures, so rows correlate by intensity rank rather
/// than by location.
pub fn subsample_percentile(stack: &[Image], samples: usize) -> Result<SampleSet> {
    check_stack(stack)?;
    let samples = effective_sample_count(samples);
    let channels = stack[0].channels;
    let exposures = stack.len();

    let cumulative: Vec<Vec<f32>> = stack_histograms(stack)
        .iter()
        .map(|h| h.cumulative())
        .collect();

    let mut codes = Vec::with_capacity(channels * samples * exposures);
    for chan in 0..channels {
        for i in 0..samples {
            let u = i as f32 / samples as f32;
            for exp in 0..exposures {
                let offset = first_greater(&cumulative[chan * exposures + exp], u);
                codes.push(offset.min(CODE_COUNT - 1) as u8);
            }
        }
    }

    debug!(channels, samples, exposures, "percentile subsampling done");

    Ok(SampleSet {
        channels: channels,
        samples: samples,
        exposures: exposures,
        codes: codes,
    })
}

/// Spatial subsampling at locations chosen by `sampler`.
///
/// The achieved sample count is reported in the returned set's
/// `samples` field and may differ from the request.
pub fn subsample_spatial(
    stack: &[Image],
    samples: usize,
    sampler: &mut dyn PointSampler,
) -> Result<SampleSet> {
    check_stack(stack)?;
    let requested = effective_sample_count(samples);
    let (width, height) = (stack[0].width, stack[0].height);
    let channels = stack[0].channels;
    let exposures = stack.len();

    let points = sampler.sample_points(width, height, requested);
    if points.is_empty() {
        return Err(CrfError::InsufficientData);
    }
    debug!(requested, achieved = points.len(), "spatial subsampling");

    let mut codes = Vec::with_capacity(channels * points.len() * exposures);
    for chan in 0..channels {
        for &(x, y) in points.iter() {
            for img in stack.iter() {
                codes.push(to_code(img.get(x, y, chan)));
            }
        }
    }

    Ok(SampleSet {
        channels: channels,
        samples: points.len(),
        exposures: exposures,
        codes: codes,
    })
}
