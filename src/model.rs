//! Input records for a lateral pile analysis.
//!
//! Field names serialize in the camelCase form used by the JSON input
//! documents (`lateralLoad`, `numNodes`, `EI`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, AnalysisResult, ConfigurationError};
use crate::soil::SoilCurve;

/// Geometry and stiffness of the pile. `EI` is constant along the length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PileProperties {
    /// Embedded length from head (depth 0) to tip.
    pub length: f64,
    /// Width used by the soil curves.
    pub diameter: f64,
    /// Flexural rigidity of the cross-section.
    #[serde(rename = "EI")]
    pub flexural_rigidity: f64,
}

impl PileProperties {
    /// Create a [`PileProperties`] record.
    #[must_use]
    pub const fn new(length: f64, diameter: f64, flexural_rigidity: f64) -> Self {
        Self {
            length,
            diameter,
            flexural_rigidity,
        }
    }

    /// Check the length and flexural rigidity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NonPositiveLength`] or
    /// [`ConfigurationError::NonPositiveRigidity`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !is_positive(self.length) {
            return Err(ConfigurationError::NonPositiveLength(self.length));
        }
        if !is_positive(self.flexural_rigidity) {
            return Err(ConfigurationError::NonPositiveRigidity(
                self.flexural_rigidity,
            ));
        }
        Ok(())
    }
}

/// One soil stratum and the p-y curve family that describes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Depth of the top of the layer.
    pub top: f64,
    /// Depth of the bottom of the layer.
    pub bottom: f64,
    /// Curve family and its parameters.
    pub curve: SoilCurve,
}

impl SoilLayer {
    /// Create a [`SoilLayer`].
    #[must_use]
    pub fn new(top: f64, bottom: f64, curve: SoilCurve) -> Self {
        Self { top, bottom, curve }
    }
}

/// Soil layers ordered from the surface down.
///
/// An empty profile means the pile has no lateral support from soil.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    /// Layers ordered by depth.
    #[serde(default)]
    pub layers: Vec<SoilLayer>,
}

impl SoilProfile {
    /// Profile with no layers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Profile with a single layer spanning `[0, depth]`.
    #[must_use]
    pub fn uniform(depth: f64, curve: SoilCurve) -> Self {
        Self {
            layers: vec![SoilLayer::new(0.0, depth, curve)],
        }
    }

    /// Append a layer below the existing ones.
    #[must_use]
    pub fn with_layer(mut self, layer: SoilLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Whether the profile has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Check coverage of `[0, pile.length]` and every curve's parameters.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] describing a gap, overlap,
    /// short profile, missing pile diameter or bad curve parameter.
    pub fn validate(&self, pile: &PileProperties) -> Result<(), ConfigurationError> {
        if self.is_empty() {
            return Ok(());
        }
        if !is_positive(pile.diameter) {
            return Err(ConfigurationError::NonPositiveDiameter(pile.diameter));
        }
        check_coverage(
            self.layers.iter().map(|layer| (layer.top, layer.bottom)),
            pile.length,
        )?;
        for (index, layer) in self.layers.iter().enumerate() {
            layer.curve.validate(index)?;
        }
        Ok(())
    }
}

/// Verify that consecutive `(top, bottom)` ranges tile `[0, length]`.
pub(crate) fn check_coverage<I>(ranges: I, length: f64) -> Result<(), ConfigurationError>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let tolerance = 1.0e-9 * length;
    let mut previous_bottom: Option<f64> = None;
    for (index, (top, bottom)) in ranges.into_iter().enumerate() {
        if !(top.is_finite() && bottom.is_finite() && bottom > top) {
            return Err(ConfigurationError::InvertedLayer { index, top, bottom });
        }
        match previous_bottom {
            None if top.abs() > tolerance => {
                return Err(ConfigurationError::ProfileDoesNotStartAtSurface(top));
            }
            Some(above) if top - above > tolerance => {
                return Err(ConfigurationError::LayerGap {
                    index,
                    above,
                    below: top,
                });
            }
            Some(above) if above - top > tolerance => {
                return Err(ConfigurationError::LayerOverlap {
                    index,
                    above,
                    below: top,
                });
            }
            _ => {}
        }
        previous_bottom = Some(bottom);
    }
    match previous_bottom {
        Some(bottom) if length - bottom > tolerance => {
            Err(ConfigurationError::ProfileTooShallow { bottom, length })
        }
        _ => Ok(()),
    }
}

/// Loads applied at the pile head.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCase {
    /// Lateral force at the head.
    pub lateral_load: f64,
    /// Moment at the head.
    #[serde(default)]
    pub moment: f64,
    /// Axial force, compression positive.
    #[serde(default)]
    pub axial_load: f64,
}

impl LoadCase {
    /// Create a [`LoadCase`].
    #[must_use]
    pub const fn new(lateral_load: f64, moment: f64, axial_load: f64) -> Self {
        Self {
            lateral_load,
            moment,
            axial_load,
        }
    }

    /// Copy of this load case with every component multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.lateral_load * factor,
            self.moment * factor,
            self.axial_load * factor,
        )
    }

    /// Check that every component is finite.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NonFiniteLoad`] naming the component.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [
            ("lateral load", self.lateral_load),
            ("moment", self.moment),
            ("axial load", self.axial_load),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::NonFiniteLoad { name, value });
            }
        }
        Ok(())
    }
}

/// Support condition at the pile head.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HeadCondition {
    /// Free to translate and rotate; head force and moment are applied.
    #[default]
    Free,
    /// No translation and no rotation.
    Fixed,
    /// No translation; head moment is applied.
    Pinned,
}

impl HeadCondition {
    /// Selector text for this condition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free-head",
            Self::Fixed => "fixed-head",
            Self::Pinned => "pinned-head",
        }
    }
}

impl FromStr for HeadCondition {
    type Err = AnalysisError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector {
            "free-head" | "free" => Ok(Self::Free),
            "fixed-head" | "fixed" => Ok(Self::Fixed),
            "pinned-head" | "pinned" => Ok(Self::Pinned),
            other => Err(AnalysisError::UnsupportedBoundaryCondition(other.to_owned())),
        }
    }
}

/// Support condition at the pile tip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TipCondition {
    /// Zero moment and zero shear.
    #[default]
    Free,
    /// No translation and no rotation.
    Fixed,
    /// No translation and zero moment.
    Pinned,
}

impl TipCondition {
    /// Selector text for this condition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free-tip",
            Self::Fixed => "fixed-tip",
            Self::Pinned => "pinned-tip",
        }
    }
}

impl FromStr for TipCondition {
    type Err = AnalysisError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector {
            "free-tip" | "free" => Ok(Self::Free),
            "fixed-tip" | "fixed" => Ok(Self::Fixed),
            "pinned-tip" | "pinned" => Ok(Self::Pinned),
            other => Err(AnalysisError::UnsupportedBoundaryCondition(other.to_owned())),
        }
    }
}

macro_rules! selector_conversions {
    ($($condition:ty),*) => {$(
        impl fmt::Display for $condition {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $condition {
            type Error = AnalysisError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$condition> for String {
            fn from(value: $condition) -> Self {
                value.as_str().to_owned()
            }
        }
    )*};
}

selector_conversions!(HeadCondition, TipCondition);

/// Numerical settings for one analysis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Number of mesh nodes from head to tip, at least 5.
    #[serde(rename = "numNodes")]
    pub node_count: usize,
    /// Cap on nonlinear soil iterations, at least 1.
    pub max_iterations: usize,
    /// Largest deflection change between iterations accepted as converged.
    #[serde(rename = "convergenceTolerance")]
    pub tolerance: f64,
    /// Support at the pile head.
    pub boundary_condition: HeadCondition,
    /// Support at the pile tip.
    pub tip_condition: TipCondition,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            node_count: 50,
            max_iterations: 50,
            tolerance: 1.0e-6,
            boundary_condition: HeadCondition::Free,
            tip_condition: TipCondition::Free,
        }
    }
}

impl AnalysisConfig {
    /// Copy of this configuration with a different node count.
    #[must_use]
    pub fn with_nodes(mut self, node_count: usize) -> Self {
        self.node_count = node_count;
        self
    }

    /// Copy of this configuration with different support conditions.
    #[must_use]
    pub fn with_supports(mut self, head: HeadCondition, tip: TipCondition) -> Self {
        self.boundary_condition = head;
        self.tip_condition = tip;
        self
    }

    /// Copy of this configuration with a different iteration budget.
    #[must_use]
    pub fn with_iterations(mut self, max_iterations: usize, tolerance: f64) -> Self {
        self.max_iterations = max_iterations;
        self.tolerance = tolerance;
        self
    }

    /// Check node count, iteration cap and tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::TooFewNodes`],
    /// [`ConfigurationError::NoIterations`] or
    /// [`ConfigurationError::NonPositiveTolerance`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.node_count < 5 {
            return Err(ConfigurationError::TooFewNodes(self.node_count));
        }
        if self.max_iterations == 0 {
            return Err(ConfigurationError::NoIterations);
        }
        if !is_positive(self.tolerance) {
            return Err(ConfigurationError::NonPositiveTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Complete input document for one analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    /// Pile geometry and stiffness.
    pub pile: PileProperties,
    /// Soil layers.
    #[serde(default)]
    pub soil: SoilProfile,
    /// Head loads.
    pub load: LoadCase,
    /// Numerical settings.
    #[serde(default)]
    pub config: AnalysisConfig,
}

impl AnalysisInput {
    /// Validate every record.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] for the first record
    /// that fails validation.
    pub fn validate(&self) -> AnalysisResult<()> {
        validate_records(&self.pile, &self.soil, &self.load, &self.config)
    }
}

/// Validate the four input records, numerical settings first.
pub(crate) fn validate_records(
    pile: &PileProperties,
    soil: &SoilProfile,
    load: &LoadCase,
    config: &AnalysisConfig,
) -> AnalysisResult<()> {
    config.validate()?;
    pile.validate()?;
    load.validate()?;
    soil.validate(pile)?;
    Ok(())
}

/// Whether `value` is finite and strictly positive.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
