use crate::{sampling::SamplingStrategy, weight::WeightFunction};

/// Settings for Debevec-Malik response estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateConfig {
    pub weight: WeightFunction,
    /// Requested number of samples per channel.  0 means the default
    /// of 256.
    pub samples: usize,
    /// Strength of the smoothness term.
    pub lambda: f32,
    pub sampling: SamplingStrategy,
    /// Seed for the spatial sampler.
    pub seed: u64,
    pub enforce_monotonic: bool,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            weight: WeightFunction::Triangular,
            samples: 256,
            lambda: 20.0,
            sampling: SamplingStrategy::Percentile,
            seed: 0,
            enforce_monotonic: true,
        }
    }
}

impl EstimateConfig {
    pub fn builder() -> EstimateConfigBuilder {
        EstimateConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct EstimateConfigBuilder {
    weight: Option<WeightFunction>,
    samples: Option<usize>,
    lambda: Option<f32>,
    sampling: Option<SamplingStrategy>,
    seed: Option<u64>,
    enforce_monotonic: Option<bool>,
}

impl EstimateConfigBuilder {
    pub fn weight(mut self, weight: WeightFunction) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn lambda(mut self, lambda: f32) -> Self {
        self.lambda = Some(lambda);
        self
    }

    pub fn sampling(mut self, sampling: SamplingStrategy) -> Self {
        self.sampling = Some(sampling);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn enforce_monotonic(mut self, enforce: bool) -> Self {
        self.enforce_monotonic = Some(enforce);
        self
    }

    pub fn build(self) -> EstimateConfig {
        let default = EstimateConfig::default();
        EstimateConfig {
            weight: self.weight.unwrap_or(default.weight),
            samples: self.samples.unwrap_or(default.samples),
            lambda: self.lambda.unwrap_or(default.lambda),
            sampling: self.sampling.unwrap_or(default.sampling),
            seed: self.seed.unwrap_or(default.seed),
            enforce_monotonic: self.enforce_monotonic.unwrap_or(default.enforce_monotonic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = EstimateConfig::builder()
            .weight(WeightFunction::Hat)
            .lambda(5.0)
            .build();
        assert_eq!(config.weight, WeightFunction::Hat);
        assert_eq!(config.lambda, 5.0);
        assert_eq!(config.samples, 256);
        assert_eq!(config.sampling, SamplingStrategy::Percentile);
        assert!(config.enforce_monotonic);
    }
}
