use std::cell::Cell;

use sensor_analysis::{
    estimate, estimate_with_solver, linearize, CrfError, EstimateConfig, Image,
    LeastSquaresSolver, LinearSystem, MissingBackend, Response, SamplingStrategy, WeightFunction,
};

const WIDTH: usize = 256;
const HEIGHT: usize = 64;

/// A registered stack of a smooth irradiance ramp, captured with a pure
/// power-law response per channel.
fn synthetic_stack(exposures: &[f32], gammas: &[f32]) -> Vec<Image> {
    let pixel_count = (WIDTH * HEIGHT) as f32;
    let brightest = exposures.iter().copied().fold(0.0f32, f32::max);
    exposures
        .iter()
        .map(|&t| {
            Image::from_fn(WIDTH, HEIGHT, gammas.len(), t, |x, y, c| {
                let irradiance = ((y * WIDTH + x) as f32 + 0.5) / pixel_count / brightest;
                (irradiance * t).min(1.0).powf(1.0 / gammas[c])
            })
        })
        .collect()
}

struct CountingSolver {
    calls: Cell<usize>,
}

impl LeastSquaresSolver for CountingSolver {
    fn solve(&self, system: &LinearSystem) -> sensor_analysis::Result<Vec<f64>> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![0.0; system.cols])
    }
}

#[test]
fn recovers_gamma_response() {
    let stack = synthetic_stack(&[1.0, 2.0, 4.0], &[2.2]);
    let config = EstimateConfig::builder().samples(100).lambda(10.0).build();
    let model = estimate(&stack, &config).unwrap();

    assert_eq!(model.channel_count(), 1);
    let curve = model.channel(0);
    let expected = (128.0f32 / 255.0).powf(2.2);
    assert!(
        (curve[128] - expected).abs() < 0.03,
        "got {}, expected {}",
        curve[128],
        expected
    );
    assert!(model.is_monotonic());
}

#[test]
fn every_channel_is_normalized() {
    let stack = synthetic_stack(&[1.0, 2.0, 4.0], &[1.8, 2.2, 2.6]);
    let config = EstimateConfig::builder()
        .samples(64)
        .weight(WeightFunction::Hat)
        .build();
    let model = estimate(&stack, &config).unwrap();

    assert_eq!(model.channel_count(), 3);
    for chan in model.channels() {
        let max = chan.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max, 1.0);
    }

    // Steeper gammas give darker mid-tones once linearized.
    assert!(model.channel(0)[128] > model.channel(2)[128]);
}

#[test]
fn spatial_sampling_recovers_gamma_response() {
    let stack = synthetic_stack(&[1.0, 2.0, 4.0], &[2.2]);
    let config = EstimateConfig::builder()
        .samples(150)
        .sampling(SamplingStrategy::Spatial)
        .seed(42)
        .build();
    let model = estimate(&stack, &config).unwrap();

    let expected = (128.0f32 / 255.0).powf(2.2);
    assert!((model.channel(0)[128] - expected).abs() < 0.05);
}

#[test]
fn linearizing_with_the_estimate() {
    let stack = synthetic_stack(&[1.0, 2.0, 4.0], &[2.2]);
    let model = estimate(&stack, &EstimateConfig::builder().samples(100).build()).unwrap();

    // Linearizing the brightest exposure should give back the ramp.
    let mut img = stack[2].clone();
    linearize(&mut img, Response::Lookup(&model)).unwrap();
    let mid = img.get(WIDTH / 2, HEIGHT / 2, 0);
    let expected = ((HEIGHT / 2 * WIDTH + WIDTH / 2) as f32 + 0.5) / (WIDTH * HEIGHT) as f32;
    assert!((mid - expected).abs() < 0.05, "{} vs {}", mid, expected);
}

#[test]
fn empty_stack_never_reaches_the_solver() {
    let solver = CountingSolver {
        calls: Cell::new(0),
    };
    let config = EstimateConfig::default();
    assert_eq!(
        estimate_with_solver(&[], &config, &solver).unwrap_err(),
        CrfError::InsufficientData
    );

    let single = synthetic_stack(&[1.0], &[2.2]);
    assert_eq!(
        estimate_with_solver(&single, &config, &solver).unwrap_err(),
        CrfError::InsufficientData
    );
    assert_eq!(solver.calls.get(), 0);
}

#[test]
fn solver_is_called_once_per_channel() {
    let solver = CountingSolver {
        calls: Cell::new(0),
    };
    let stack = synthetic_stack(&[1.0, 4.0], &[2.2, 2.2, 2.2]);
    let model = estimate_with_solver(&stack, &EstimateConfig::default(), &solver).unwrap();
    assert_eq!(solver.calls.get(), 3);

    // An all-zero log response is flat; monotonic enforcement tilts it.
    assert!(model.is_monotonic());
    assert_eq!(model.channel(1)[255], 1.0);
}

#[test]
fn missing_backend_is_reported() {
    let stack = synthetic_stack(&[1.0, 2.0], &[2.2]);
    assert_eq!(
        estimate_with_solver(&stack, &EstimateConfig::default(), &MissingBackend).unwrap_err(),
        CrfError::UnsupportedBackend
    );
}

#[test]
fn invalid_inputs() {
    let mut stack = synthetic_stack(&[1.0, 2.0], &[2.2]);
    let config = EstimateConfig::builder().lambda(-1.0).build();
    assert!(matches!(
        estimate_with_solver(&stack, &config, &MissingBackend),
        Err(CrfError::InvalidParameter(_))
    ));

    stack[1].exposure = 0.0;
    assert!(matches!(
        estimate_with_solver(&stack, &EstimateConfig::default(), &MissingBackend),
        Err(CrfError::InvalidParameter(_))
    ));

    let mismatched = vec![Image::new(4, 4, 3, 1.0), Image::new(4, 4, 1, 2.0)];
    assert_eq!(
        estimate_with_solver(&mismatched, &EstimateConfig::default(), &MissingBackend)
            .unwrap_err(),
        CrfError::DimensionMismatch
    );
}
