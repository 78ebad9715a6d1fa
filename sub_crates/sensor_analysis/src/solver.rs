//! Sparse linear systems and the least-squares backends that solve them.

use crate::error::{CrfError, Result};

/// An overdetermined linear system `A x = b` stored as coefficient
/// triplets.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub rows: usize,
    pub cols: usize,
    /// `(row, col, coefficient)`.  A coordinate appears at most once.
    pub entries: Vec<(usize, usize, f64)>,
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    pub fn new(rows: usize, cols: usize) -> LinearSystem {
        LinearSystem {
            rows: rows,
            cols: cols,
            entries: Vec::new(),
            rhs: vec![0.0; rows],
        }
    }

    #[inline]
    pub fn push(&mut self, row: usize, col: usize, coefficient: f64) {
        debug_assert!(row < self.rows && col < self.cols);
        self.entries.push((row, col, coefficient));
    }

    /// Number of nonzero coefficients in the given row.
    pub fn row_nonzeros(&self, row: usize) -> usize {
        self.entries
            .iter()
            .filter(|&&(r, _, v)| r == row && v != 0.0)
            .count()
    }
}

/// A least-squares solver for `LinearSystem`s.
pub trait LeastSquaresSolver {
    /// Returns the `x` minimizing `|A x - b|`, with `cols` entries.
    fn solve(&self, system: &LinearSystem) -> Result<Vec<f64>>;
}

/// Stand-in used when no solver backend was compiled in.
#[derive(Debug, Copy, Clone, Default)]
pub struct MissingBackend;

impl LeastSquaresSolver for MissingBackend {
    fn solve(&self, _system: &LinearSystem) -> Result<Vec<f64>> {
        Err(CrfError::UnsupportedBackend)
    }
}

/// Dense SVD least squares via nalgebra.
#[cfg(feature = "svd")]
#[derive(Debug, Copy, Clone, Default)]
pub struct SvdSolver;

#[cfg(feature = "svd")]
impl LeastSquaresSolver for SvdSolver {
    fn solve(&self, system: &LinearSystem) -> Result<Vec<f64>> {
        use nalgebra::{DMatrix, DVector};

        let mut a = DMatrix::<f64>::zeros(system.rows, system.cols);
        for &(r, c, v) in system.entries.iter() {
            a[(r, c)] += v;
        }
        let b = DVector::<f64>::from_column_slice(&system.rhs);

        let svd = a.svd(true, true);
        // Singular values below this are treated as zero.
        let eps = svd.singular_values.max() * 1.0e-12;
        let x = svd.solve(&b, eps).map_err(|e| {
            tracing::error!("SVD solve failed: {}", e);
            CrfError::UnsupportedBackend
        })?;

        if x.iter().any(|v| !v.is_finite()) {
            tracing::error!("SVD solve produced a non-finite solution");
            return Err(CrfError::UnsupportedBackend);
        }

        Ok(x.iter().copied().collect())
    }
}

/// The best solver available in this build.
pub fn default_solver() -> Box<dyn LeastSquaresSolver + Send + Sync> {
    #[cfg(feature = "svd")]
    {
        Box::new(SvdSolver)
    }
    #[cfg(not(feature = "svd"))]
    {
        Box::new(MissingBackend)
    }
}
