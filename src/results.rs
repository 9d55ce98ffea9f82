//! Output record of a pile analysis.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Per-node response fields produced by a finished solve.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseFields {
    /// Node depths.
    pub depths: DVector<f64>,
    /// Lateral deflection.
    pub deflections: DVector<f64>,
    /// Bending moment.
    pub moments: DVector<f64>,
    /// Shear force.
    pub shears: DVector<f64>,
    /// Force per unit length exerted by the soil on the pile.
    pub soil_reactions: DVector<f64>,
}

/// Result of one analysis, serialized with camelCase field names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Whether a deflection field was computed.
    pub success: bool,
    /// Whether the soil iteration met the tolerance.
    pub converged: bool,
    /// Number of soil iterations performed.
    pub iterations: usize,
    /// Message explaining why `success` is `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Node depths from head to tip.
    pub depths: Vec<f64>,
    /// Lateral deflection at each node.
    pub deflections: Vec<f64>,
    /// Bending moment at each node.
    pub moments: Vec<f64>,
    /// Shear force at each node.
    pub shears: Vec<f64>,
    /// Soil reaction at each node.
    pub soil_reactions: Vec<f64>,
    /// Largest absolute deflection.
    pub max_deflection: f64,
    /// Largest absolute bending moment.
    pub max_moment: f64,
    /// Largest absolute shear force.
    pub max_shear: f64,
    /// Deflection at the pile head, where the loads act.
    pub deflection_at_load: f64,
}

impl ResultRecord {
    /// Package a finished solve.
    #[must_use]
    pub fn assemble(fields: &ResponseFields, converged: bool, iterations: usize) -> Self {
        Self {
            success: true,
            converged,
            iterations,
            error: None,
            depths: fields.depths.iter().copied().collect(),
            deflections: fields.deflections.iter().copied().collect(),
            moments: fields.moments.iter().copied().collect(),
            shears: fields.shears.iter().copied().collect(),
            soil_reactions: fields.soil_reactions.iter().copied().collect(),
            max_deflection: fields.deflections.amax(),
            max_moment: fields.moments.amax(),
            max_shear: fields.shears.amax(),
            deflection_at_load: fields.deflections.get(0).copied().unwrap_or(0.0),
        }
    }

    /// Record for an analysis that produced no deflection field.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            converged: false,
            iterations: 0,
            error: Some(message.into()),
            depths: Vec::new(),
            deflections: Vec::new(),
            moments: Vec::new(),
            shears: Vec::new(),
            soil_reactions: Vec::new(),
            max_deflection: 0.0,
            max_moment: 0.0,
            max_shear: 0.0,
            deflection_at_load: 0.0,
        }
    }

    /// Number of nodes in the per-node sequences.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.depths.len()
    }

    /// Index of the node with the largest absolute bending moment.
    #[must_use]
    pub fn max_moment_node(&self) -> Option<usize> {
        self.moments
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .map(|(node, _)| node)
    }
}
