use crate::histogram::CODE_COUNT;

/// Confidence weighting families for device codes.
///
/// All functions take a normalized code `x` in [0.0, 1.0].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WeightFunction {
    /// Constant 1.
    Uniform,
    /// Symmetric quartic falloff: `1 - ((2x - 1)^2)^4`.
    Hat,
    /// Raw Gaussian centered on 0.5 with sigma 0.5.
    Gaussian,
    /// Gaussian shifted and rescaled so the tails reach exactly zero at
    /// the extremes and the center is exactly one.
    GaussianClamped,
    /// Debevec-Malik triangle over [0, 1].
    Triangular,
    /// Debevec-Malik triangle over [0.01, 0.99], folded back up outside
    /// that range so codes 0 and 255 keep a small positive weight.
    TriangularPadded,
}

impl Default for WeightFunction {
    fn default() -> Self {
        WeightFunction::Triangular
    }
}

impl WeightFunction {
    pub fn eval(self, x: f32) -> f32 {
        match self {
            WeightFunction::Uniform => 1.0,

            WeightFunction::Hat => {
                let v = 2.0 * x - 1.0;
                let v2 = v * v;
                let v4 = v2 * v2;
                1.0 - v4 * v4
            }

            WeightFunction::Gaussian => gaussian(x),

            WeightFunction::GaussianClamped => {
                let shift = gaussian(0.0);
                let scale = gaussian(0.5);
                ((gaussian(x) - shift) / (scale - shift)).max(0.0).min(1.0)
            }

            WeightFunction::Triangular => triangle(x, 0.0, 1.0),

            WeightFunction::TriangularPadded => triangle(x, 0.01, 0.99).abs(),
        }
    }

    /// Parses the names used on the command line.
    pub fn from_name(name: &str) -> Option<WeightFunction> {
        match name.to_ascii_lowercase().as_str() {
            "uniform" | "all" => Some(WeightFunction::Uniform),
            "hat" => Some(WeightFunction::Hat),
            "gaussian" | "gauss" => Some(WeightFunction::Gaussian),
            "gaussian-clamped" | "robertson" => Some(WeightFunction::GaussianClamped),
            "triangular" | "deb97" => Some(WeightFunction::Triangular),
            "triangular-padded" | "deb97p01" => Some(WeightFunction::TriangularPadded),
            _ => None,
        }
    }
}

#[inline(always)]
fn gaussian(x: f32) -> f32 {
    const SIGMA: f32 = 0.5;
    const MU: f32 = 0.5;
    let d = x - MU;
    (-4.0 * (d * d) / (2.0 * SIGMA * SIGMA)).exp()
}

#[inline(always)]
fn triangle(x: f32, z_min: f32, z_max: f32) -> f32 {
    if x <= (z_min + z_max) * 0.5 {
        x - z_min
    } else {
        z_max - x
    }
}

/// A weight function evaluated at every device code.
#[derive(Debug, Clone)]
pub struct WeightTable {
    pub function: WeightFunction,
    weights: [f32; CODE_COUNT],
}

impl WeightTable {
    pub fn new(function: WeightFunction) -> WeightTable {
        let mut weights = [0.0f32; CODE_COUNT];
        for (i, w) in weights.iter_mut().enumerate() {
            *w = function.eval(i as f32 / (CODE_COUNT - 1) as f32);
        }
        WeightTable {
            function: function,
            weights: weights,
        }
    }

    #[inline(always)]
    pub fn get(&self, code: u8) -> f32 {
        self.weights[code as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }
}
