//! Solver-free response estimation from an aligned RAW/JPEG pair.
//!
//! For every JPEG code the median of the RAW codes that co-occur with
//! it is taken as the linear value of that code.  The result stays on
//! the RAW scale and is not rescaled.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    crf::CrfModel,
    error::{CrfError, Result},
    histogram::CODE_COUNT,
    image::{to_code, Image},
    utils::{make_monotonic, mean_filter},
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawJpegConfig {
    /// Moving average window applied to the recovered curves.  0
    /// disables smoothing.
    pub filter_window: usize,
    pub enforce_monotonic: bool,
}

impl Default for RawJpegConfig {
    fn default() -> Self {
        Self {
            filter_window: 11,
            enforce_monotonic: true,
        }
    }
}

/// Occurrence counts of (RAW code, JPEG code) pairs for one channel,
/// indexed as `[raw * 256 + jpeg]`.
#[derive(Debug, Clone)]
pub struct JointHistogram {
    pub counts: Vec<u32>,
}

impl JointHistogram {
    #[inline(always)]
    pub fn get(&self, raw: usize, jpeg: usize) -> u32 {
        self.counts[raw * CODE_COUNT + jpeg]
    }

    /// The upper median RAW code of each JPEG column, or `None` for
    /// columns without observations.
    pub fn column_medians(&self) -> Vec<Option<u8>> {
        let mut coords = Vec::with_capacity(CODE_COUNT);
        (0..CODE_COUNT)
            .map(|j| {
                coords.clear();
                coords.extend((0..CODE_COUNT).filter(|&i| self.get(i, j) > 0));
                // Already ascending, since it was built in order.
                coords.get(coords.len() / 2).map(|&i| i as u8)
            })
            .collect()
    }
}

/// Builds one joint histogram per channel.
pub fn joint_histograms(raw: &Image, jpeg: &Image) -> Result<Vec<JointHistogram>> {
    if !raw.similar_type(jpeg) {
        return Err(CrfError::DimensionMismatch);
    }

    let channels = raw.channels;
    let table_size = CODE_COUNT * CODE_COUNT;
    let row_len = raw.width * channels;
    if row_len == 0 || raw.height == 0 {
        return Err(CrfError::InsufficientData);
    }

    let counts = raw
        .data
        .par_chunks(row_len)
        .zip(jpeg.data.par_chunks(row_len))
        .fold(
            || vec![0u32; table_size * channels],
            |mut acc, (raw_row, jpeg_row)| {
                for (i, (&r, &j)) in raw_row.iter().zip(jpeg_row.iter()).enumerate() {
                    let c = i % channels;
                    let addr = c * table_size + to_code(r) as usize * CODE_COUNT + to_code(j) as usize;
                    acc[addr] += 1;
                }
                acc
            },
        )
        .reduce(
            || vec![0u32; table_size * channels],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += *y;
                }
                a
            },
        );

    Ok(counts
        .chunks(table_size)
        .map(|c| JointHistogram { counts: c.to_vec() })
        .collect())
}

/// Estimates an inverse response from a RAW image and a JPEG image of
/// the same scene.  Both must be pixel aligned and share dimensions and
/// channel count.
#[instrument(skip_all, fields(window = config.filter_window))]
pub fn estimate_from_raw_jpeg(raw: &Image, jpeg: &Image, config: &RawJpegConfig) -> Result<CrfModel> {
    let histograms = joint_histograms(raw, jpeg)?;

    let mut channels = Vec::with_capacity(histograms.len());
    for (chan, hist) in histograms.iter().enumerate() {
        let medians = hist.column_medians();
        let observed = medians.iter().filter(|m| m.is_some()).count();
        debug!(channel = chan, observed, "collected column medians");

        let filled = fill_gaps(&medians).ok_or(CrfError::InsufficientData)?;
        let smoothed = mean_filter(&filled, config.filter_window);

        let mut curve = [0.0f32; CODE_COUNT];
        curve.copy_from_slice(&smoothed);
        if config.enforce_monotonic {
            make_monotonic(&mut curve);
        }
        channels.push(curve);
    }

    Ok(CrfModel::new(channels))
}

/// Converts column medians to normalized values, linearly interpolating
/// across unobserved columns and holding the ends flat.
///
/// Returns `None` if no column was observed.
fn fill_gaps(medians: &[Option<u8>]) -> Option<Vec<f32>> {
    let known: Vec<(usize, f32)> = medians
        .iter()
        .enumerate()
        .filter_map(|(j, m)| m.map(|i| (j, i as f32 / (CODE_COUNT - 1) as f32)))
        .collect();
    let first = *known.first()?;
    let last = *known.last()?;

    let mut out = vec![0.0f32; medians.len()];
    for v in out[..first.0].iter_mut() {
        *v = first.1;
    }
    for v in out[last.0..].iter_mut() {
        *v = last.1;
    }
    for pair in known.windows(2) {
        let (j0, v0) = pair[0];
        let (j1, v1) = pair[1];
        for j in j0..j1 {
            let alpha = (j - j0) as f32 / (j1 - j0) as f32;
            out[j] = v0 + (v1 - v0) * alpha;
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_from_mapping<F: Fn(usize) -> usize>(f: F) -> (Image, Image) {
        // One pixel per JPEG code, with the RAW code given by `f`.
        let raw = Image::from_fn(256, 1, 1, 1.0, |x, _, _| f(x) as f32 / 255.0);
        let jpeg = Image::from_fn(256, 1, 1, 1.0, |x, _, _| x as f32 / 255.0);
        (raw, jpeg)
    }

    #[test]
    fn single_raw_code_per_column_is_exact() {
        let (raw, jpeg) = pair_from_mapping(|j| (j * j) / 255);
        let config = RawJpegConfig {
            filter_window: 0,
            enforce_monotonic: false,
        };
        let model = estimate_from_raw_jpeg(&raw, &jpeg, &config).unwrap();
        for j in 0..256 {
            assert_eq!(model.channel(0)[j], ((j * j) / 255) as f32 / 255.0);
        }
    }

    #[test]
    fn raw_scale_is_kept_below_white() {
        // RAW tops out at code 127, so nothing should be stretched to 1.0.
        let (raw, jpeg) = pair_from_mapping(|j| j / 2);
        let config = RawJpegConfig {
            filter_window: 0,
            enforce_monotonic: false,
        };
        let model = estimate_from_raw_jpeg(&raw, &jpeg, &config).unwrap();
        for j in 0..256 {
            assert_eq!(model.channel(0)[j], (j / 2) as f32 / 255.0);
        }

        let config = RawJpegConfig {
            filter_window: 0,
            enforce_monotonic: true,
        };
        let chan = *estimate_from_raw_jpeg(&raw, &jpeg, &config).unwrap().channel(0);
        assert!(chan.windows(2).all(|p| p[1] > p[0]));
        assert!((chan[100] - 50.0 / 255.0).abs() < 0.005);
        assert!((chan[255] - 127.0 / 255.0).abs() < 0.005);
    }

    #[test]
    fn median_rejects_outliers() {
        // JPEG code 100 co-occurs with RAW codes 40, 41, 42 and an outlier at 250.
        let raw_codes = [40usize, 41, 42, 250, 255];
        let jpeg_codes = [100usize, 100, 100, 100, 255];
        let raw = Image::from_fn(5, 1, 1, 1.0, |x, _, _| raw_codes[x] as f32 / 255.0);
        let jpeg = Image::from_fn(5, 1, 1, 1.0, |x, _, _| jpeg_codes[x] as f32 / 255.0);
        let hist = &joint_histograms(&raw, &jpeg).unwrap()[0];
        assert_eq!(hist.get(250, 100), 1);

        let medians = hist.column_medians();
        assert_eq!(medians[100], Some(42)); // Upper median of 4 entries.
        assert_eq!(medians[255], Some(255));
        assert_eq!(medians[0], None);
    }

    #[test]
    fn gaps_are_interpolated() {
        let mut medians = vec![None; 256];
        medians[10] = Some(20u8);
        medians[20] = Some(40u8);
        let filled = fill_gaps(&medians).unwrap();
        assert_eq!(filled[0], 20.0 / 255.0);
        assert_eq!(filled[15], 30.0 / 255.0);
        assert_eq!(filled[255], 40.0 / 255.0);
        assert!(fill_gaps(&vec![None; 256]).is_none());
    }

    #[test]
    fn smoothing_keeps_raw_scale() {
        let (raw, jpeg) = pair_from_mapping(|j| j / 2);
        let model = estimate_from_raw_jpeg(&raw, &jpeg, &RawJpegConfig::default()).unwrap();
        let chan = model.channel(0);
        assert!(chan.iter().all(|&v| v < 0.51));
        assert!(model.is_monotonic());
        assert!((chan[128] - 64.0 / 255.0).abs() < 0.01);
    }

    #[test]
    fn mismatched_pair() {
        let raw = Image::new(4, 4, 3, 1.0);
        let jpeg = Image::new(4, 4, 1, 1.0);
        assert_eq!(
            estimate_from_raw_jpeg(&raw, &jpeg, &RawJpegConfig::default()).unwrap_err(),
            CrfError::DimensionMismatch
        );
    }

    #[test]
    fn multi_channel_histograms() {
        let raw = Image::from_fn(8, 8, 3, 1.0, |_, _, c| c as f32 * 0.25);
        let jpeg = Image::from_fn(8, 8, 3, 1.0, |_, _, c| 1.0 - c as f32 * 0.25);
        let hists = joint_histograms(&raw, &jpeg).unwrap();
        assert_eq!(hists.len(), 3);
        assert_eq!(hists[0].get(0, 255), 64);
        assert_eq!(hists[1].get(64, 191), 64);
        assert_eq!(hists[2].get(128, 128), 64);
    }
}
