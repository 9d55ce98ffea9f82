//! Band storage for the pile operator.
//!
//! The beam-column operator couples each node to its two neighbours on either
//! side, so only five diagonals are ever populated. [`BandMatrix`] stores just
//! those diagonals while the operator is assembled; [`crate::linear`] hands
//! them to the sparse solver.

use nalgebra::{DMatrix, DVector};

use crate::errors::AnalysisResult;
use crate::linear::SparseLu;

/// Number of sub-diagonals (and super-diagonals) held by a [`BandMatrix`].
pub const HALF_BANDWIDTH: usize = 2;

/// Stored diagonals per row of a [`BandMatrix`].
const BAND_WIDTH: usize = 2 * HALF_BANDWIDTH + 1;

/// Square matrix with two sub- and two super-diagonals.
#[derive(Clone, Debug, PartialEq)]
pub struct BandMatrix {
    /// Row `i` holds columns `i - 2 ..= i + 2` in slots `0..5`.
    bands: DMatrix<f64>,
}

impl BandMatrix {
    /// Create an all-zero band matrix with `dimension` rows.
    #[must_use]
    pub fn zeros(dimension: usize) -> Self {
        Self {
            bands: DMatrix::zeros(dimension, BAND_WIDTH),
        }
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.bands.nrows()
    }

    /// Storage slot of `(row, col)`, or `None` outside the band or the matrix.
    fn slot(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.dimension() || col >= self.dimension() {
            return None;
        }
        let slot = col + HALF_BANDWIDTH;
        (slot >= row && slot - row < BAND_WIDTH).then(|| slot - row)
    }

    /// Read an entry. Entries outside the band are zero.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.slot(row, col)
            .map_or(0.0, |slot| self.bands[(row, slot)])
    }

    /// Overwrite an entry inside the band.
    ///
    /// # Panics
    ///
    /// Panics when `(row, col)` lies outside the band.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let slot = self.band_slot(row, col);
        self.bands[(row, slot)] = value;
    }

    /// Add to an entry inside the band.
    ///
    /// # Panics
    ///
    /// Panics when `(row, col)` lies outside the band.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        let slot = self.band_slot(row, col);
        self.bands[(row, slot)] += value;
    }

    /// Slot of an entry that must lie inside the band.
    fn band_slot(&self, row: usize, col: usize) -> usize {
        match self.slot(row, col) {
            Some(slot) => slot,
            None => panic!("entry ({row}, {col}) lies outside the pentadiagonal band"),
        }
    }

    /// Zero every stored entry of `row`.
    pub fn clear_row(&mut self, row: usize) {
        self.bands.row_mut(row).fill(0.0);
    }

    /// Multiply every stored entry of `row` by `factor`.
    pub fn scale_row(&mut self, row: usize, factor: f64) {
        for value in self.bands.row_mut(row).iter_mut() {
            *value *= factor;
        }
    }

    /// Add `values[i] * weights[i]` to each diagonal entry.
    pub fn add_weighted_diagonal(&mut self, values: &DVector<f64>, weights: &DVector<f64>) {
        for (row, (value, weight)) in values.iter().zip(weights.iter()).enumerate() {
            self.bands[(row, HALF_BANDWIDTH)] += value * weight;
        }
    }

    /// Largest absolute stored entry.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.bands.amax()
    }

    /// Matrix-vector product.
    #[must_use]
    pub fn mul_vector(&self, x: &DVector<f64>) -> DVector<f64> {
        let n = self.dimension();
        DVector::from_fn(n, |row, _| {
            let first = row.saturating_sub(HALF_BANDWIDTH);
            let last = (row + HALF_BANDWIDTH).min(n - 1);
            (first..=last).map(|col| self.get(row, col) * x[col]).sum()
        })
    }

    /// Expand into a dense matrix.
    #[must_use]
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.dimension();
        DMatrix::from_fn(n, n, |row, col| self.get(row, col))
    }

    /// Whether every stored entry is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.bands.iter().all(|value| value.is_finite())
    }

    /// Stored entries as `(row, col, value)`, row by row.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.dimension();
        (0..n).flat_map(move |row| {
            let first = row.saturating_sub(HALF_BANDWIDTH);
            let last = (row + HALF_BANDWIDTH).min(n - 1);
            (first..=last).map(move |col| (row, col, self.get(row, col)))
        })
    }

    /// Factorize the matrix.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AnalysisError::SingularSystem`] when the matrix is a
    /// mechanism or cannot be factorized.
    pub fn factorize(&self) -> AnalysisResult<SparseLu> {
        SparseLu::factorize(self)
    }

    /// Solve `self * x = rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AnalysisError::SingularSystem`] when the matrix is
    /// singular or the solution is not finite.
    pub fn solve(&self, rhs: &DVector<f64>) -> AnalysisResult<DVector<f64>> {
        self.factorize()?.solve(rhs)
    }
}
