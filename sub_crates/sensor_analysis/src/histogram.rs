use rayon::prelude::*;

use crate::image::{to_code, Image};

/// Number of buckets used for 8-bit device codes.
pub const CODE_COUNT: usize = 256;

#[derive(Debug, Clone)]
pub struct Histogram {
    pub total_samples: usize,
    pub buckets: Vec<usize>,
}

impl Histogram {
    /// Builds a histogram from any iterator yielding items than can be converted to `usize`.
    ///
    /// The values yielded by the iterator are used to directly index
    /// into the histogram buckets, so `bucket_count` should be large
    /// enough to accommodate any yielded values.
    pub fn from_iter<T, Itr>(values: Itr, bucket_count: usize) -> Self
    where
        T: Into<usize>,
        Itr: std::iter::Iterator<Item = T>,
    {
        let mut hist = Histogram {
            total_samples: 0,
            buckets: vec![0; bucket_count],
        };
        for v in values {
            hist.total_samples += 1;
            hist.buckets[v.into()] += 1;
        }
        hist
    }

    /// Builds a device code histogram of one channel of an image.
    pub fn from_image_channel(image: &Image, channel: usize) -> Self {
        Histogram::from_iter(image.channel_values(channel).map(to_code), CODE_COUNT)
    }

    /// The cumulative distribution, normalized so the last entry is 1.0.
    ///
    /// An empty histogram yields all zeros.
    pub fn cumulative(&self) -> Vec<f32> {
        let norm = if self.total_samples > 0 {
            1.0 / self.total_samples as f64
        } else {
            0.0
        };
        let mut sum = 0usize;
        self.buckets
            .iter()
            .map(|&n| {
                sum += n;
                (sum as f64 * norm) as f32
            })
            .collect()
    }
}

/// Index of the first entry of an ascending cumulative distribution
/// that is strictly greater than `u`.
///
/// Only the first `len - 1` entries are searched, so the result is
/// always a valid index even when nothing exceeds `u`.
pub fn first_greater(cumulative: &[f32], u: f32) -> usize {
    let last = cumulative.len().saturating_sub(1);
    cumulative[..last].partition_point(|&v| v <= u)
}

/// Builds the per-(channel, exposure) code histograms of a whole stack.
///
/// The result is indexed as `[channel * stack.len() + exposure]`.
pub fn stack_histograms(stack: &[Image]) -> Vec<Histogram> {
    let channels = stack[0].channels;
    let exposures = stack.len();
    (0..(channels * exposures))
        .into_par_iter()
        .map(|i| Histogram::from_image_channel(&stack[i % exposures], i / exposures))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_ends_at_one() {
        let h = Histogram::from_iter([0u8, 1, 1, 3].iter().copied(), 4);
        assert_eq!(h.cumulative(), vec![0.25, 0.75, 0.75, 1.0]);
    }

    #[test]
    fn first_greater_is_upper_bound() {
        let cum = [0.25, 0.75, 0.75, 1.0];
        assert_eq!(first_greater(&cum, 0.0), 0);
        assert_eq!(first_greater(&cum, 0.25), 1);
        assert_eq!(first_greater(&cum, 0.5), 1);
        assert_eq!(first_greater(&cum, 0.75), 3);
        assert_eq!(first_greater(&cum, 2.0), 3);
    }

    #[test]
    fn stack_histograms_layout() {
        let a = Image::from_fn(4, 4, 2, 1.0, |_, _, c| c as f32);
        let b = Image::from_fn(4, 4, 2, 2.0, |_, _, _| 0.5);
        let hists = stack_histograms(&[a, b]);
        assert_eq!(hists.len(), 4);
        assert_eq!(hists[0].buckets[0], 16); // Channel 0, exposure 0.
        assert_eq!(hists[1].buckets[128], 16); // Channel 0, exposure 1.
        assert_eq!(hists[2].buckets[255], 16); // Channel 1, exposure 0.
        assert_eq!(hists[3].total_samples, 16);
    }
}
