use nanorand::{Pcg64, Rng};

/// Produces well-spread pixel locations over an image domain.
pub trait PointSampler {
    /// Returns roughly `count` distinct pixel coordinates inside a
    /// `width` x `height` domain.  The achieved count may differ from
    /// the request.
    fn sample_points(&mut self, width: usize, height: usize, count: usize) -> Vec<(usize, usize)>;
}

/// Number of candidates tried around an active point before it's retired.
const CANDIDATES_PER_POINT: usize = 30;

/// Fraction of the domain area a maximal Poisson-disk set covers,
/// expressed as `count * radius^2 / area`.
const PACKING_DENSITY: f64 = 0.7;

/// Bridson's Poisson-disk sampler.
pub struct PoissonDiskSampler {
    rand: Pcg64,
}

impl PoissonDiskSampler {
    pub fn new(seed: u64) -> PoissonDiskSampler {
        PoissonDiskSampler {
            rand: Pcg64::new_seed(0x8f3a_17c2_55e0_4d91_0000_0000_0000_0000 ^ seed as u128),
        }
    }

    /// The minimum point distance that yields approximately `count`
    /// points in the given domain.
    pub fn radius_for_count(width: usize, height: usize, count: usize) -> f64 {
        let area = (width * height) as f64;
        (PACKING_DENSITY * area / count.max(1) as f64).sqrt().max(1.0)
    }

    fn rand_0_1(&mut self) -> f64 {
        self.rand.generate::<u32>() as f64 * (1.0 / 4294967296.0)
    }

    /// Generates points with at least `radius` distance between any two.
    pub fn sample_with_radius(&mut self, width: f64, height: f64, radius: f64) -> Vec<(f64, f64)> {
        let cell = radius / std::f64::consts::SQRT_2;
        let grid_w = ((width / cell).ceil() as usize).max(1);
        let grid_h = ((height / cell).ceil() as usize).max(1);
        let mut grid: Vec<Option<usize>> = vec![None; grid_w * grid_h];
        let grid_index = |p: (f64, f64)| -> usize {
            let gx = ((p.0 / cell) as usize).min(grid_w - 1);
            let gy = ((p.1 / cell) as usize).min(grid_h - 1);
            gy * grid_w + gx
        };

        let mut points = Vec::new();
        let mut active = Vec::new();

        let first = (self.rand_0_1() * width, self.rand_0_1() * height);
        grid[grid_index(first)] = Some(0);
        points.push(first);
        active.push(0);

        let radius_sq = radius * radius;
        while !active.is_empty() {
            let active_i = self.rand.generate_range(0..active.len());
            let center = points[active[active_i]];

            let mut found = false;
            for _ in 0..CANDIDATES_PER_POINT {
                // Uniform in the annulus [radius, 2 * radius].
                let angle = self.rand_0_1() * std::f64::consts::TAU;
                let dist = (radius_sq * (1.0 + 3.0 * self.rand_0_1())).sqrt();
                let candidate = (center.0 + dist * angle.cos(), center.1 + dist * angle.sin());
                if candidate.0 < 0.0
                    || candidate.1 < 0.0
                    || candidate.0 >= width
                    || candidate.1 >= height
                {
                    continue;
                }

                // Check the 5x5 neighborhood of grid cells.
                let gx = ((candidate.0 / cell) as usize).min(grid_w - 1);
                let gy = ((candidate.1 / cell) as usize).min(grid_h - 1);
                let mut too_close = false;
                'search: for ny in gy.saturating_sub(2)..(gy + 3).min(grid_h) {
                    for nx in gx.saturating_sub(2)..(gx + 3).min(grid_w) {
                        if let Some(pi) = grid[ny * grid_w + nx] {
                            let p = points[pi];
                            let dx = p.0 - candidate.0;
                            let dy = p.1 - candidate.1;
                            if (dx * dx + dy * dy) < radius_sq {
                                too_close = true;
                                break 'search;
                            }
                        }
                    }
                }

                if !too_close {
                    grid[grid_index(candidate)] = Some(points.len());
                    active.push(points.len());
                    points.push(candidate);
                    found = true;
                    break;
                }
            }

            if !found {
                active.swap_remove(active_i);
            }
        }

        points
    }
}

impl PointSampler for PoissonDiskSampler {
    fn sample_points(&mut self, width: usize, height: usize, count: usize) -> Vec<(usize, usize)> {
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let radius = Self::radius_for_count(width, height, count);
        let mut taken = vec![false; width * height];
        self.sample_with_radius(width as f64, height as f64, radius)
            .into_iter()
            .map(|(x, y)| {
                (
                    (x as usize).min(width - 1),
                    (y as usize).min(height - 1),
                )
            })
            .filter(|&(x, y)| !std::mem::replace(&mut taken[y * width + x], true))
            .collect()
    }
}
