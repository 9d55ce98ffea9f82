//! Finite-difference operator for the beam-column equation
//! `EI·y'''' + P·y'' = q`.
//!
//! Each interior row combines the five-point fourth difference with the
//! three-point second difference:
//!
//! ```text
//! c · [ 1,  -4 - β,  6 + 2β,  -4 - β,  1 ]      c = EI / h⁴,  β = -P·h² / EI
//! ```
//!
//! Rows 0, 1, n-2 and n-1 are filled with the truncated stencil only as
//! placeholders; [`crate::boundary`] rewrites them.

use crate::banded::BandMatrix;
use crate::mesh::Mesh;

/// Interior stencil of the beam-column operator at a given node spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamColumnStencil {
    /// Node spacing `h`.
    pub spacing: f64,
    /// Flexural rigidity `EI`.
    pub flexural_rigidity: f64,
    /// Axial load `P`, compression positive.
    pub axial_load: f64,
}

impl BeamColumnStencil {
    /// Create a stencil for the given spacing, rigidity and axial load.
    #[must_use]
    pub const fn new(spacing: f64, flexural_rigidity: f64, axial_load: f64) -> Self {
        Self {
            spacing,
            flexural_rigidity,
            axial_load,
        }
    }

    /// Row scale `c = EI / h⁴`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.flexural_rigidity / self.spacing.powi(4)
    }

    /// Dimensionless axial parameter `β = -P·h² / EI`.
    #[must_use]
    pub fn beta(&self) -> f64 {
        -self.axial_load * self.spacing.powi(2) / self.flexural_rigidity
    }

    /// Coefficients on nodes `i-2 ..= i+2` of an interior row.
    #[must_use]
    pub fn coefficients(&self) -> [f64; 5] {
        let c = self.scale();
        let beta = self.beta();
        [
            c,
            c * (-4.0 - beta),
            c * (6.0 + 2.0 * beta),
            c * (-4.0 - beta),
            c,
        ]
    }
}

/// Pile operator before the soil term is added.
#[derive(Clone, Debug, PartialEq)]
pub struct StiffnessOperator {
    /// Banded matrix over the mesh nodes.
    pub matrix: BandMatrix,
    /// Stencil the matrix was assembled from.
    pub stencil: BeamColumnStencil,
}

impl StiffnessOperator {
    /// Assemble the pentadiagonal operator for `mesh`.
    ///
    /// # Examples
    /// ```
    /// use pilex::{Mesh, StiffnessOperator};
    ///
    /// let mesh = Mesh::uniform(4.0, 5).expect("valid mesh");
    /// let operator = StiffnessOperator::assemble(&mesh, 1.0, 0.0);
    /// assert_eq!(operator.matrix.get(2, 2), 6.0);
    /// assert_eq!(operator.matrix.get(2, 0), 1.0);
    /// ```
    #[must_use]
    pub fn assemble(mesh: &Mesh, flexural_rigidity: f64, axial_load: f64) -> Self {
        let stencil = BeamColumnStencil::new(mesh.spacing(), flexural_rigidity, axial_load);
        let coefficients = stencil.coefficients();
        let n = mesh.len();
        let mut matrix = BandMatrix::zeros(n);
        for row in 0..n {
            for (slot, value) in coefficients.iter().enumerate() {
                // Column `row + slot - 2`, skipped when it falls off the mesh.
                let shifted = row + slot;
                if shifted >= 2 && shifted - 2 < n {
                    matrix.set(row, shifted - 2, *value);
                }
            }
        }
        Self { matrix, stencil }
    }

    /// Number of mesh nodes.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.matrix.dimension()
    }
}
