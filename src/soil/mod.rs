//! Soil reaction model: maps a node depth and trial deflection to a soil
//! resistance and a secant stiffness through per-layer p-y curves.

use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;

use crate::errors::ConfigurationError;
use crate::model::{check_coverage, PileProperties, SoilProfile};

mod curves;

pub use curves::{HyperbolicCurve, LinearCurve, SandCurve, SoftClayCurve, SoilCurve};

/// Positive branch of a p-y curve.
///
/// Implementations describe the resistance for non-negative deflection only;
/// [`SoilModel`] applies odd symmetry. Curves should be monotonic
/// non-decreasing with `resistance(z, 0) == 0`.
///
/// # Examples
/// ```
/// use pilex::PyCurve;
///
/// #[derive(Debug)]
/// struct Bilinear;
///
/// impl PyCurve for Bilinear {
///     fn resistance(&self, _depth: f64, deflection: f64) -> f64 {
///         (1_000.0 * deflection).min(10.0)
///     }
///
///     fn initial_stiffness(&self, _depth: f64) -> f64 {
///         1_000.0
///     }
/// }
///
/// assert_eq!(Bilinear.resistance(1.0, 0.5), 10.0);
/// ```
pub trait PyCurve: fmt::Debug + Send + Sync {
    /// Resistance per unit length at `depth` for `deflection ≥ 0`.
    fn resistance(&self, depth: f64, deflection: f64) -> f64;

    /// Slope of the curve at zero deflection.
    fn initial_stiffness(&self, depth: f64) -> f64;
}

/// Soil response at one node for a trial deflection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SoilReaction {
    /// Resisting force per unit length, with the sign of the deflection.
    pub resistance: f64,
    /// `resistance / deflection`, or the initial stiffness at zero deflection.
    pub secant_stiffness: f64,
}

/// A depth range and the curve that governs it.
#[derive(Clone, Debug)]
struct ModelLayer {
    /// Top depth.
    top: f64,
    /// Bottom depth.
    bottom: f64,
    /// Curve for nodes inside the layer.
    curve: Arc<dyn PyCurve>,
}

/// Layered Winkler foundation built from a [`SoilProfile`] or custom curves.
#[derive(Clone, Debug, Default)]
pub struct SoilModel {
    /// Layers ordered from the surface down.
    layers: Vec<ModelLayer>,
}

impl SoilModel {
    /// Model without soil.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the model for `profile` around a pile of the given properties.
    #[must_use]
    pub fn from_profile(profile: &SoilProfile, pile: &PileProperties) -> Self {
        let layers = profile
            .layers
            .iter()
            .map(|layer| ModelLayer {
                top: layer.top,
                bottom: layer.bottom,
                curve: layer.curve.build(pile.diameter),
            })
            .collect();
        Self { layers }
    }

    /// Append a layer governed by a custom curve below the existing ones.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use pilex::{LinearCurve, SoilModel};
    ///
    /// let model = SoilModel::empty().with_layer(0.0, 10.0, Arc::new(LinearCurve::new(500.0)));
    /// assert_eq!(model.reaction(5.0, -0.5).resistance, -250.0);
    /// ```
    #[must_use]
    pub fn with_layer(mut self, top: f64, bottom: f64, curve: Arc<dyn PyCurve>) -> Self {
        self.layers.push(ModelLayer { top, bottom, curve });
        self
    }

    /// Whether the model has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Check that the layers tile `[0, length]`. An empty model is valid.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigurationError`] describing the first gap, overlap
    /// or short coverage.
    pub fn validate(&self, length: f64) -> Result<(), ConfigurationError> {
        if self.is_empty() {
            return Ok(());
        }
        check_coverage(
            self.layers.iter().map(|layer| (layer.top, layer.bottom)),
            length,
        )
    }

    /// Curve governing `depth`: the layer with `top ≤ depth < bottom`, with
    /// the deepest layer also owning its bottom.
    #[must_use]
    pub fn curve_at(&self, depth: f64) -> Option<&dyn PyCurve> {
        let layer = self
            .layers
            .iter()
            .find(|layer| layer.top <= depth && depth < layer.bottom)
            .or_else(|| self.layers.last().filter(|layer| depth >= layer.top))?;
        Some(layer.curve.as_ref())
    }

    /// Soil reaction at `depth` for a signed trial `deflection`.
    #[must_use]
    pub fn reaction(&self, depth: f64, deflection: f64) -> SoilReaction {
        let Some(curve) = self.curve_at(depth) else {
            return SoilReaction::default();
        };
        let magnitude = curve.resistance(depth, deflection.abs());
        if deflection == 0.0 {
            return SoilReaction {
                resistance: 0.0,
                secant_stiffness: curve.initial_stiffness(depth),
            };
        }
        SoilReaction {
            resistance: magnitude.copysign(deflection),
            secant_stiffness: magnitude / deflection.abs(),
        }
    }

    /// Secant stiffness at every node.
    #[must_use]
    pub fn secant_stiffness(
        &self,
        depths: &DVector<f64>,
        deflections: &DVector<f64>,
    ) -> DVector<f64> {
        depths.zip_map(deflections, |depth, deflection| {
            self.reaction(depth, deflection).secant_stiffness
        })
    }

    /// Signed resistance at every node.
    #[must_use]
    pub fn resistance(&self, depths: &DVector<f64>, deflections: &DVector<f64>) -> DVector<f64> {
        depths.zip_map(deflections, |depth, deflection| {
            self.reaction(depth, deflection).resistance
        })
    }
}
