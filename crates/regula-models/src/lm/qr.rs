//! QR least squares on top of faer
//!
//! The design matrix is copied into a faer `Mat` once; the solve and the
//! unscaled covariance both come from the same factorisation.

use faer::linalg::solvers::{Qr, Solve, SolveLstsq};
use faer::{Mat, MatRef};
use ndarray::{Array1, Array2};
use std::fmt;

use crate::lm::{Matrix, Vector};

/// QR factorisation of an `n x k` design matrix with `n >= k`
pub(crate) struct LeastSquaresQr {
    qr: Qr<f64>,
    /// Leading `k x k` block of the triangular factor
    r: Mat<f64>,
}

impl fmt::Debug for LeastSquaresQr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeastSquaresQr")
            .field("columns", &self.r.nrows())
            .finish_non_exhaustive()
    }
}

/// Index of the first column that is numerically dependent on the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RankDeficient {
    pub(crate) column: usize,
}

impl LeastSquaresQr {
    /// Factor `x`, rejecting the first column whose diagonal entry in `R` is
    /// at most `tolerance` times the column norm
    pub(crate) fn factor(x: &Matrix, tolerance: f64) -> Result<Self, RankDeficient> {
        let (n, k) = x.dim();
        if k > n {
            return Err(RankDeficient { column: n });
        }

        let qr = array_to_faer(x).qr();
        let r = triangular_block(qr.R(), k);

        for (j, column) in x.columns().into_iter().enumerate() {
            let norm = column.dot(&column).sqrt();
            if r[(j, j)].abs() <= tolerance * norm {
                return Err(RankDeficient { column: j });
            }
        }

        Ok(Self { qr, r })
    }

    /// Least-squares solution of `x * beta = y`
    pub(crate) fn solve(&self, y: &Vector) -> Vector {
        let rhs = Mat::from_fn(y.len(), 1, |i, _| y[i]);
        let beta = self.qr.solve_lstsq(&rhs);
        Array1::from_shape_fn(self.r.nrows(), |i| beta[(i, 0)])
    }

    /// `(X'X)^-1`, computed as `R^-1 R^-T`
    pub(crate) fn xtx_inverse(&self) -> Matrix {
        let k = self.r.nrows();
        let r_inverse = self.r.partial_piv_lu().solve(&Mat::<f64>::identity(k, k));
        mat_to_array(&(r_inverse.as_ref() * r_inverse.transpose()))
    }

    /// Upper triangular factor
    #[cfg(test)]
    pub(crate) fn r(&self) -> Matrix {
        mat_to_array(&self.r)
    }
}

fn triangular_block(r: MatRef<'_, f64>, k: usize) -> Mat<f64> {
    Mat::from_fn(k, k, |i, j| if i <= j { r[(i, j)] } else { 0.0 })
}

fn array_to_faer(array: &Matrix) -> Mat<f64> {
    let (rows, cols) = array.dim();
    Mat::from_fn(rows, cols, |i, j| array[[i, j]])
}

fn mat_to_array(mat: &Mat<f64>) -> Matrix {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat[(i, j)])
}
