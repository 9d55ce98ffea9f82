//! Direct solution of the pile system with `faer`'s sparse LU.
//!
//! The operator is assembled in band form and converted to compressed column
//! storage through faer `Triplet`s. The LU factorization pivots, so the
//! unsymmetric rows produced by an axial load need no special treatment.
//!
//! Rounding turns an exactly singular operator into a finite but meaningless
//! solution, so the operator is checked for rigid-body modes (a translation
//! or rotation of the whole pile) before it is factorized.

use faer::linalg::solvers::Solve;
use faer::sparse::linalg::solvers::{Lu, SymbolicLu};
use faer::sparse::{SparseColMat, Triplet};
use faer::Mat;
use nalgebra::{DMatrix, DVector};

use crate::banded::BandMatrix;
use crate::errors::{AnalysisError, AnalysisResult, SingularityCause};

/// Rigid-body stiffness, relative to the largest operator entry, below which
/// the operator is treated as a mechanism.
pub const MECHANISM_TOLERANCE: f64 = 1.0e-14;

/// Smallest stiffness `matrix` offers against a unit rigid-body motion,
/// relative to its largest entry.
///
/// Rigid-body motions are the linear fields `a + b·z`. The result is the
/// smallest singular value of `matrix` restricted to that plane; it is zero
/// (up to rounding) for a pile whose supports and soil leave it free to
/// translate or rotate.
#[must_use]
pub fn rigid_body_stiffness(matrix: &BandMatrix) -> f64 {
    let n = matrix.dimension();
    let scale = matrix.max_abs();
    if n < 2 || !(scale.is_finite() && scale > 0.0) {
        return 0.0;
    }
    let last = (n - 1) as f64;
    let motions = DMatrix::from_fn(n, 2, |node, col| match col {
        0 => 1.0,
        _ => node as f64 / last,
    });
    let basis = motions.qr().q();
    let image = DMatrix::from_columns(&[
        matrix.mul_vector(&basis.column(0).into_owned()),
        matrix.mul_vector(&basis.column(1).into_owned()),
    ]);
    let gram = image.transpose() * &image;
    gram.symmetric_eigenvalues().min().max(0.0).sqrt() / scale
}

/// Sparse LU factors of a pile operator.
pub struct SparseLu {
    /// Numeric factorization.
    lu: Lu<usize, f64>,
    /// Number of rows.
    dimension: usize,
}

impl SparseLu {
    /// Check `matrix` for rigid-body modes and factorize it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularSystem`] when the matrix is empty or
    /// not finite, when it is a mechanism (see [`rigid_body_stiffness`]), or
    /// when faer rejects the factorization.
    pub fn factorize(matrix: &BandMatrix) -> AnalysisResult<Self> {
        let n = matrix.dimension();
        if n == 0 || !matrix.is_finite() || matrix.max_abs() == 0.0 {
            return Err(AnalysisError::SingularSystem(
                SingularityCause::InvalidOperator,
            ));
        }
        // Also catches NaN from the eigenvalue step.
        if !(rigid_body_stiffness(matrix) >= MECHANISM_TOLERANCE) {
            return Err(AnalysisError::SingularSystem(SingularityCause::Mechanism));
        }

        let triplets: Vec<Triplet<usize, usize, f64>> = matrix
            .entries()
            .map(|(row, col, val)| Triplet { row, col, val })
            .collect();
        let csc = SparseColMat::try_new_from_triplets(n, n, &triplets)
            .map_err(|error| factorization_failed(&error))?;
        let symbolic = SymbolicLu::try_new(csc.symbolic().as_ref())
            .map_err(|error| factorization_failed(&error))?;
        let lu = Lu::try_new_with_symbolic(symbolic, csc.as_ref())
            .map_err(|error| factorization_failed(&error))?;

        Ok(Self { lu, dimension: n })
    }

    /// Number of rows of the factorized matrix.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Solve for `x` using the cached factors.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularSystem`] when substitution produces a
    /// non-finite value.
    ///
    /// # Panics
    ///
    /// Panics when `rhs` does not match the factorized dimension.
    pub fn solve(&self, rhs: &DVector<f64>) -> AnalysisResult<DVector<f64>> {
        assert_eq!(
            rhs.len(),
            self.dimension,
            "right-hand side does not match the matrix"
        );
        let rhs = Mat::from_fn(self.dimension, 1, |row, _| rhs[row]);
        let solution = self.lu.solve(&rhs);
        let x = DVector::from_fn(self.dimension, |row, _| solution[(row, 0)]);

        match x.iter().position(|value| !value.is_finite()) {
            Some(node) => Err(AnalysisError::SingularSystem(SingularityCause::NonFinite(
                node,
            ))),
            None => Ok(x),
        }
    }
}

/// Wrap a faer error as a singular system.
fn factorization_failed(error: &impl std::fmt::Debug) -> AnalysisError {
    AnalysisError::SingularSystem(SingularityCause::Factorization(format!("{error:?}")))
}
