//! Conversion of pixel values between the device code domain and the
//! linear irradiance domain.

use rayon::prelude::*;
use tracing::warn;

use crate::{
    crf::CrfModel,
    error::{CrfError, Result},
    histogram::CODE_COUNT,
    image::{to_code, Image},
};

/// Exponent of the analytic gamma fallback.
pub const GAMMA: f32 = 2.2;

/// How device values relate to linear values.
#[derive(Debug, Copy, Clone)]
pub enum Response<'a> {
    /// Values are already linear.
    Identity,
    /// Device = linear^(1/2.2).
    Gamma,
    /// Device codes index into an estimated inverse response.
    Lookup(&'a CrfModel),
}

impl<'a> Response<'a> {
    /// Device value -> linear value.
    #[inline]
    pub fn linearize_value(&self, x: f32, channel: usize) -> f32 {
        match self {
            Response::Identity => x,
            Response::Gamma => x.powf(GAMMA),
            Response::Lookup(model) => model.channel(channel)[to_code(x) as usize],
        }
    }

    /// Linear value -> device value.
    ///
    /// In lookup mode this is the first code whose table entry is at
    /// least `x`.  The search assumes the table is non-decreasing; on a
    /// flat stretch it lands on the first code of the stretch.
    #[inline]
    pub fn apply_value(&self, x: f32, channel: usize) -> f32 {
        match self {
            Response::Identity => x,
            Response::Gamma => x.powf(1.0 / GAMMA),
            Response::Lookup(model) => {
                let table = model.channel(channel);
                let code = table[..(CODE_COUNT - 1)].partition_point(|&v| v < x);
                code.min(CODE_COUNT - 1) as f32 / (CODE_COUNT - 1) as f32
            }
        }
    }

    /// Checks that the response can be used on an image with the given
    /// number of channels.
    fn check_channels(&self, image_channels: usize) -> Result<()> {
        match self {
            Response::Lookup(model) if model.channel_count() != image_channels => {
                Err(CrfError::ChannelCountMismatch {
                    model: model.channel_count(),
                    image: image_channels,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Converts an image from device values to linear values, in place.
///
/// If the response can't be used with the image, the image is left
/// untouched, a warning is logged, and the error is returned.
pub fn linearize(image: &mut Image, response: Response) -> Result<()> {
    if let Err(e) = response.check_channels(image.channels) {
        warn!("image cannot be linearized: {}", e);
        return Err(e);
    }
    map_in_place(image, |x, c| response.linearize_value(x, c));
    Ok(())
}

/// Converts an image from linear values to device values, in place.
///
/// If the response can't be used with the image, the image is left
/// untouched, a warning is logged, and the error is returned.
pub fn apply_response(image: &mut Image, response: Response) -> Result<()> {
    if let Err(e) = response.check_channels(image.channels) {
        warn!("response cannot be applied to the image: {}", e);
        return Err(e);
    }
    map_in_place(image, |x, c| response.apply_value(x, c));
    Ok(())
}

fn map_in_place<F>(image: &mut Image, f: F)
where
    F: Fn(f32, usize) -> f32 + Sync,
{
    let channels = image.channels;
    if channels == 0 {
        return;
    }
    image.data.par_chunks_mut(channels).for_each(|pixel| {
        for (c, v) in pixel.iter_mut().enumerate() {
            *v = f(*v, c);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_values() -> Vec<f32> {
        (0..=1000).map(|i| i as f32 / 1000.0).collect()
    }

    #[test]
    fn identity_round_trip_is_exact() {
        for x in test_values() {
            let r = Response::Identity;
            assert_eq!(r.apply_value(r.linearize_value(x, 0), 0), x);
        }
    }

    #[test]
    fn gamma_round_trip() {
        for x in test_values() {
            let r = Response::Gamma;
            assert!((r.apply_value(r.linearize_value(x, 0), 0) - x).abs() < 1.0e-5);
        }
    }

    #[test]
    fn lookup_round_trip_within_one_code() {
        let model = CrfModel::from_gamma(2, 2.2);
        let r = Response::Lookup(&model);
        for x in test_values() {
            for c in 0..2 {
                let y = r.apply_value(r.linearize_value(x, c), c);
                assert!((y - x).abs() <= 1.0 / 255.0, "{} -> {}", x, y);
            }
        }
    }

    #[test]
    fn lookup_inverse_clamps() {
        let model = CrfModel::from_gamma(1, 1.0);
        let r = Response::Lookup(&model);
        assert_eq!(r.apply_value(-1.0, 0), 0.0);
        assert_eq!(r.apply_value(2.0, 0), 1.0);
        assert_eq!(r.linearize_value(7.0, 0), 1.0);
    }

    #[test]
    fn lookup_on_flat_table_snaps_to_first_code() {
        // Codes 100..=150 share a value.
        let mut curve = [0.0f32; 256];
        for (i, v) in curve.iter_mut().enumerate() {
            *v = (i.min(100).max(i.saturating_sub(50))) as f32 / 205.0;
        }
        let model = CrfModel::new(vec![curve]);
        let r = Response::Lookup(&model);
        let x = 120.0 / 255.0;
        let y = r.apply_value(r.linearize_value(x, 0), 0);
        assert_eq!(y, 100.0 / 255.0);
    }

    #[test]
    fn image_round_trip() {
        let model = CrfModel::from_gamma(3, 2.2);
        let original = Image::from_fn(16, 8, 3, 1.0, |x, y, c| {
            ((x * 8 + y + c * 3) % 256) as f32 / 255.0
        });
        let mut img = original.clone();
        linearize(&mut img, Response::Lookup(&model)).unwrap();
        assert_ne!(img, original);
        apply_response(&mut img, Response::Lookup(&model)).unwrap();
        for (a, b) in img.data.iter().zip(original.data.iter()) {
            assert!((a - b).abs() <= 1.0 / 255.0);
        }
    }

    #[test]
    fn channel_mismatch_is_a_no_op() {
        let model = CrfModel::from_gamma(1, 2.2);
        let original = Image::from_fn(4, 4, 3, 1.0, |x, _, _| x as f32 / 4.0);
        let mut img = original.clone();
        assert_eq!(
            linearize(&mut img, Response::Lookup(&model)).unwrap_err(),
            CrfError::ChannelCountMismatch { model: 1, image: 3 }
        );
        assert_eq!(
            apply_response(&mut img, Response::Lookup(&model)).unwrap_err(),
            CrfError::ChannelCountMismatch { model: 1, image: 3 }
        );
        assert_eq!(img, original);

        // Analytic modes don't care about channel counts.
        assert!(linearize(&mut img, Response::Gamma).is_ok());
    }
}
