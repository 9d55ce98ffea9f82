//! Boundary treatment at the pile head and tip.
//!
//! The interior stencil reaches two nodes past each end of the mesh. Those
//! ghost nodes are eliminated with relations derived from the support
//! conditions, written with central differences about the end node:
//!
//! | support | relations                                  |
//! |---------|--------------------------------------------|
//! | free    | `EI·y'' = M`, `EI·y''' + P·y' = H`         |
//! | fixed   | `y = 0`, `y' = 0`                          |
//! | pinned  | `y = 0`, `EI·y'' = M`                      |
//!
//! At the tip `H = M = 0`. A zero displacement replaces the end row with
//! `c·y = 0`; free end rows are halved, which keeps the operator symmetric
//! when there is no axial load.

use std::str::FromStr;

use nalgebra::DVector;

use crate::banded::HALF_BANDWIDTH;
use crate::errors::AnalysisResult;
use crate::model::{HeadCondition, TipCondition};
use crate::stiffness::{BeamColumnStencil, StiffnessOperator};

/// Weight applied to a free end row.
const FREE_END_WEIGHT: f64 = 0.5;

/// Support conditions at both ends of the pile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundaryConditions {
    /// Condition at the pile head.
    pub head: HeadCondition,
    /// Condition at the pile tip.
    pub tip: TipCondition,
}

/// Rows touched by [`BoundaryConditions::enforce`] and the per-row data the
/// load builder and the soil term need.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryRecord {
    /// Conditions that produced this record.
    pub conditions: BoundaryConditions,
    /// Rows replaced by a zero-displacement constraint.
    pub constrained_rows: Vec<usize>,
    /// Multiplier on each row's soil stiffness.
    pub soil_weights: DVector<f64>,
    /// Right-hand side produced by a unit head lateral load.
    pub lateral_sensitivity: DVector<f64>,
    /// Right-hand side produced by a unit head moment.
    pub moment_sensitivity: DVector<f64>,
}

impl BoundaryRecord {
    /// Whether `row` carries a displacement constraint.
    #[must_use]
    pub fn is_constrained(&self, row: usize) -> bool {
        self.constrained_rows.contains(&row)
    }
}

/// Support type at one end, shared by head and tip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EndSupport {
    /// Free to translate and rotate.
    Free,
    /// No translation or rotation.
    Fixed,
    /// No translation, free rotation.
    Pinned,
}

impl From<HeadCondition> for EndSupport {
    fn from(condition: HeadCondition) -> Self {
        match condition {
            HeadCondition::Free => Self::Free,
            HeadCondition::Fixed => Self::Fixed,
            HeadCondition::Pinned => Self::Pinned,
        }
    }
}

impl From<TipCondition> for EndSupport {
    fn from(condition: TipCondition) -> Self {
        match condition {
            TipCondition::Free => Self::Free,
            TipCondition::Fixed => Self::Fixed,
            TipCondition::Pinned => Self::Pinned,
        }
    }
}

/// Which end of the mesh a row belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum End {
    /// Node 0 side.
    Head,
    /// Node `n - 1` side.
    Tip,
}

impl End {
    /// Global node for `local` nodes inward from this end.
    fn node(self, dimension: usize, local: usize) -> usize {
        match self {
            Self::Head => local,
            Self::Tip => dimension - 1 - local,
        }
    }
}

/// Ghost displacement expressed through real nodes and the head loads.
///
/// Node indices count inward from the end the relation belongs to.
#[derive(Clone, Debug, PartialEq)]
struct GhostRelation {
    /// `(local node, coefficient)` pairs.
    terms: Vec<(usize, f64)>,
    /// Coefficient on the head lateral load.
    lateral: f64,
    /// Coefficient on the head moment.
    moment: f64,
}

impl EndSupport {
    /// Whether the end node is held at zero displacement.
    fn is_constrained(self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Relations for the ghost nodes one and two steps outside the end.
    ///
    /// Constrained ends only ever need the first one.
    fn ghost_relations(self, stencil: &BeamColumnStencil) -> Vec<GhostRelation> {
        let flexibility = stencil.spacing.powi(2) / stencil.flexural_rigidity;
        let alpha = -stencil.beta();
        let curvature = GhostRelation {
            terms: vec![(0, 2.0), (1, -1.0)],
            lateral: 0.0,
            moment: flexibility,
        };
        match self {
            Self::Free => vec![
                curvature,
                GhostRelation {
                    terms: vec![(0, 4.0 - 2.0 * alpha), (1, 2.0 * alpha - 4.0), (2, 1.0)],
                    lateral: -2.0 * stencil.spacing * flexibility,
                    moment: (2.0 - alpha) * flexibility,
                },
            ],
            Self::Fixed => vec![GhostRelation {
                terms: vec![(1, 1.0)],
                lateral: 0.0,
                moment: 0.0,
            }],
            Self::Pinned => vec![curvature],
        }
    }
}

impl BoundaryConditions {
    /// Create a pair of end conditions.
    #[must_use]
    pub const fn new(head: HeadCondition, tip: TipCondition) -> Self {
        Self { head, tip }
    }

    /// Parse head and tip selectors such as `"free-head"` and `"fixed-tip"`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AnalysisError::UnsupportedBoundaryCondition`] for an
    /// unknown selector.
    ///
    /// # Examples
    /// ```
    /// use pilex::{BoundaryConditions, HeadCondition, TipCondition};
    ///
    /// let conditions = BoundaryConditions::from_selectors("pinned-head", "fixed-tip")
    ///     .expect("known selectors");
    /// assert_eq!(conditions.head, HeadCondition::Pinned);
    /// assert_eq!(conditions.tip, TipCondition::Fixed);
    /// assert!(BoundaryConditions::from_selectors("hinged", "free-tip").is_err());
    /// ```
    pub fn from_selectors(head: &str, tip: &str) -> AnalysisResult<Self> {
        Ok(Self::new(HeadCondition::from_str(head)?, TipCondition::from_str(tip)?))
    }

    /// Rewrite the edge rows of `operator` and record how loads and soil
    /// stiffness enter them.
    pub fn enforce(&self, operator: &mut StiffnessOperator) -> BoundaryRecord {
        let n = operator.dimension();
        let stencil = operator.stencil;
        let coefficients = stencil.coefficients();
        let mut record = BoundaryRecord {
            conditions: *self,
            constrained_rows: Vec::new(),
            soil_weights: DVector::from_element(n, 1.0),
            lateral_sensitivity: DVector::zeros(n),
            moment_sensitivity: DVector::zeros(n),
        };

        let ends = [
            (End::Head, EndSupport::from(self.head)),
            (End::Tip, EndSupport::from(self.tip)),
        ];
        for (end, support) in ends {
            let ghosts = support.ghost_relations(&stencil);
            for local_row in 0..HALF_BANDWIDTH {
                let row = end.node(n, local_row);
                if local_row == 0 && support.is_constrained() {
                    operator.matrix.clear_row(row);
                    operator.matrix.set(row, row, stencil.scale());
                    record.soil_weights[row] = 0.0;
                    record.constrained_rows.push(row);
                    continue;
                }

                // Slots with `local_row + slot < 2` fall outside the mesh.
                for (slot, coefficient) in coefficients.iter().enumerate() {
                    let reach = local_row + slot;
                    if reach >= HALF_BANDWIDTH {
                        continue;
                    }
                    let Some(ghost) = ghosts.get(HALF_BANDWIDTH - 1 - reach) else {
                        continue;
                    };
                    for &(local, factor) in &ghost.terms {
                        operator
                            .matrix
                            .add(row, end.node(n, local), coefficient * factor);
                    }
                    if end == End::Head {
                        record.lateral_sensitivity[row] -= coefficient * ghost.lateral;
                        record.moment_sensitivity[row] -= coefficient * ghost.moment;
                    }
                }

                if local_row == 0 {
                    operator.matrix.scale_row(row, FREE_END_WEIGHT);
                    record.soil_weights[row] = FREE_END_WEIGHT;
                    record.lateral_sensitivity[row] *= FREE_END_WEIGHT;
                    record.moment_sensitivity[row] *= FREE_END_WEIGHT;
                }
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::errors::AnalysisError;
    use crate::mesh::Mesh;

    fn operator(axial_load: f64) -> StiffnessOperator {
        let mesh = Mesh::uniform(8.0, 9).expect("valid mesh");
        StiffnessOperator::assemble(&mesh, 1_000.0, axial_load)
    }

    #[test]
    fn free_head_loads_do_not_depend_on_axial_load() {
        for axial_load in [0.0, 150.0, -80.0] {
            let mut operator = operator(axial_load);
            let record = BoundaryConditions::new(HeadCondition::Free, TipCondition::Fixed)
                .enforce(&mut operator);
            // h = 1
            assert_relative_eq!(record.lateral_sensitivity[0], 1.0, epsilon = 1.0e-12);
            assert_relative_eq!(record.moment_sensitivity[0], 1.0, epsilon = 1.0e-12);
            assert_relative_eq!(record.moment_sensitivity[1], -1.0, epsilon = 1.0e-12);
            assert_eq!(record.lateral_sensitivity[1], 0.0);
            assert_eq!(record.lateral_sensitivity.rows(2, 7).amax(), 0.0);
            assert_eq!(record.moment_sensitivity.rows(2, 7).amax(), 0.0);
        }
    }

    #[test]
    fn free_ends_are_symmetric_without_axial_load() {
        let mut operator = operator(0.0);
        let record = BoundaryConditions::default().enforce(&mut operator);
        let dense = operator.matrix.to_dense();
        assert_relative_eq!(dense.clone(), dense.transpose(), epsilon = 1.0e-9);
        assert_eq!(record.soil_weights[0], 0.5);
        assert_eq!(record.soil_weights[8], 0.5);
        assert_eq!(record.soil_weights[4], 1.0);
        assert!(record.constrained_rows.is_empty());

        // Rigid-body translation and rotation lie in the null space.
        let translation = DVector::from_element(9, 1.0);
        let rotation = DVector::from_fn(9, |node, _| node as f64);
        assert_relative_eq!(operator.matrix.mul_vector(&translation).amax(), 0.0, epsilon = 1.0e-9);
        assert_relative_eq!(operator.matrix.mul_vector(&rotation).amax(), 0.0, epsilon = 1.0e-9);
    }

    #[test]
    fn fixed_head_becomes_a_scaled_identity_row() {
        let mut operator = operator(0.0);
        let c = operator.stencil.scale();
        let record = BoundaryConditions::new(HeadCondition::Fixed, TipCondition::Free)
            .enforce(&mut operator);
        assert_eq!(operator.matrix.get(0, 0), c);
        assert_eq!(operator.matrix.get(0, 1), 0.0);
        assert_eq!(operator.matrix.get(0, 2), 0.0);
        // The ghost mirrors node 1, so row 1 gains one more stencil weight.
        assert_relative_eq!(operator.matrix.get(1, 1), 7.0 * c);
        assert!(record.is_constrained(0));
        assert_eq!(record.soil_weights[0], 0.0);
        assert_eq!(record.lateral_sensitivity.amax(), 0.0);
        assert_eq!(record.moment_sensitivity.amax(), 0.0);
    }

    #[test]
    fn pinned_head_keeps_the_moment_and_drops_the_shear() {
        let mut operator = operator(0.0);
        let record = BoundaryConditions::new(HeadCondition::Pinned, TipCondition::Pinned)
            .enforce(&mut operator);
        assert_eq!(record.constrained_rows, vec![0, 8]);
        assert_eq!(record.lateral_sensitivity.amax(), 0.0);
        assert_eq!(record.moment_sensitivity[0], 0.0);
        assert_relative_eq!(record.moment_sensitivity[1], -1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn unknown_selectors_are_reported() {
        assert_eq!(
            BoundaryConditions::from_selectors("free-head", "socketed"),
            Err(AnalysisError::UnsupportedBoundaryCondition(
                "socketed".to_owned()
            ))
        );
    }
}
