use crate::{
    histogram::CODE_COUNT,
    utils::{self, lerp_curve_at_y, Curve},
};

/// A per-channel inverse camera response: device code -> relative
/// linear irradiance.
///
/// Each channel is a 256-entry table indexed by 8-bit device code.
/// Debevec-Malik estimates are relative, so each of their channels is
/// normalized to a maximum of 1.0.  RAW/JPEG estimates keep the RAW
/// scale.
#[derive(Debug, Clone, PartialEq)]
pub struct CrfModel {
    channels: Vec<[f32; CODE_COUNT]>,
}

impl CrfModel {
    pub fn new(channels: Vec<[f32; CODE_COUNT]>) -> CrfModel {
        CrfModel { channels: channels }
    }

    /// A model whose curves are `(code / 255)^gamma` in every channel.
    pub fn from_gamma(channel_count: usize, gamma: f32) -> CrfModel {
        let mut curve = [0.0f32; CODE_COUNT];
        for (i, v) in curve.iter_mut().enumerate() {
            *v = (i as f32 / (CODE_COUNT - 1) as f32).powf(gamma);
        }
        CrfModel {
            channels: vec![curve; channel_count],
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, channel: usize) -> &[f32; CODE_COUNT] {
        &self.channels[channel]
    }

    pub fn channels(&self) -> &[[f32; CODE_COUNT]] {
        &self.channels
    }

    /// Whether every channel is non-decreasing in code.
    pub fn is_monotonic(&self) -> bool {
        self.channels
            .iter()
            .all(|c| c.windows(2).all(|pair| pair[1] >= pair[0]))
    }

    /// The inverse of a channel: linear irradiance -> normalized code,
    /// sampled at 256 evenly spaced irradiance values in [0.0, 1.0].
    ///
    /// Non-monotonic stretches of the channel are flattened first.
    pub fn forward_curve(&self, channel: usize) -> Vec<f32> {
        let table = &self.channels[channel];

        let mut curve: Curve = Vec::with_capacity(CODE_COUNT);
        let mut prev_y = 0.0f32;
        for (i, &v) in table.iter().enumerate() {
            let x = i as f32 / (CODE_COUNT - 1) as f32;
            let y = v.max(prev_y);
            curve.push((x, y));
            prev_y = y;
        }

        let mut flipped = Vec::with_capacity(CODE_COUNT);
        let mut prev_x = 0.0f32;
        for i in 0..CODE_COUNT {
            let y = i as f32 / (CODE_COUNT - 1) as f32;
            let x = lerp_curve_at_y(&curve, y).max(prev_x).min(1.0);
            flipped.push(x);
            prev_x = x;
        }

        flipped
    }
}

/// Normalizes a freshly solved curve to a maximum of 1.0 and,
/// optionally, makes it strictly increasing.
pub(crate) fn finish_curve(curve: &mut [f32; CODE_COUNT], enforce_monotonic: bool) {
    utils::normalize_by_max(curve);
    if enforce_monotonic {
        utils::make_monotonic(curve);
        utils::normalize_by_max(curve);
    }
}
