pub(crate) type Curve = Vec<(f32, f32)>;

/// Minimum per-step rise, relative to the curve length, that
/// `make_monotonic()` enforces.
pub const MIN_SLOPE: f32 = 0.005;

// Returns the x value at the given y value.
pub(crate) fn lerp_curve_at_y(curve: &[(f32, f32)], t: f32) -> f32 {
    let (p1, p2) = match curve.binary_search_by(|v| v.1.total_cmp(&t)) {
        Ok(i) => return curve[i].0, // Early out.
        Err(i) => {
            if i == 0 {
                ((0.0f32, 0.0f32), curve[i])
            } else if i == curve.len() {
                (curve[i - 1], (1.0f32, 1.0f32))
            } else {
                (curve[i - 1], curve[i])
            }
        }
    };

    if p2.1 == p1.1 {
        return p1.0;
    }
    let alpha = (t - p1.1) / (p2.1 - p1.1);
    p1.0 + ((p2.0 - p1.0) * alpha)
}

/// Forces the curve to be strictly increasing by clamping each entry
/// to at least its predecessor plus a small minimum step.
pub fn make_monotonic(curve: &mut [f32]) {
    let min_diff = MIN_SLOPE / curve.len() as f32;
    for i in 1..curve.len() {
        if (curve[i] - curve[i - 1]) < min_diff {
            curve[i] = curve[i - 1] + min_diff;
        }
    }
}

/// Divides the curve by its maximum, if the maximum is positive.
///
/// Returns the maximum before normalization.
pub fn normalize_by_max(curve: &mut [f32]) -> f32 {
    let max = curve.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > 0.0 {
        for v in curve.iter_mut() {
            *v /= max;
        }
    }
    max
}

/// Centered moving average.  Near the ends the window only covers the
/// entries that exist.  A window of 0 or 1 leaves the curve unchanged.
pub fn mean_filter(curve: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 || curve.is_empty() {
        return curve.to_vec();
    }

    let half = window / 2;
    let mut prefix = Vec::with_capacity(curve.len() + 1);
    let mut sum = 0.0f64;
    prefix.push(sum);
    for v in curve {
        sum += *v as f64;
        prefix.push(sum);
    }

    (0..curve.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + window - half).min(curve.len());
            ((prefix[end] - prefix[start]) / (end - start) as f64) as f32
        })
        .collect()
}
