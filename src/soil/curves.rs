//! Built-in p-y curve families.
//!
//! Every curve here describes only the positive branch `p(y)` for `y ≥ 0`;
//! [`crate::soil::SoilModel`] mirrors it for negative deflection.

use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::soil::PyCurve;

/// At-rest earth pressure coefficient used by the sand wedge model.
const SAND_AT_REST_COEFFICIENT: f64 = 0.4;

/// Lower bound of the sand empirical adjustment factor (cyclic value).
const SAND_CYCLIC_FACTOR: f64 = 0.9;

/// Deflection ratio `y / y50` beyond which soft clay carries its ultimate resistance.
const SOFT_CLAY_PLATEAU_RATIO: f64 = 8.0;

/// Curve family of a soil layer together with its parameters.
///
/// Serialized with a `type` tag, e.g.
/// `{ "type": "soft-clay", "undrainedShearStrength": 20.0, ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SoilCurve {
    /// Linear Winkler springs, `p = k·y`.
    #[serde(rename_all = "camelCase")]
    Linear {
        /// Subgrade reaction per unit pile length (force / length²).
        modulus: f64,
    },
    /// Hyperbolic curve, `p = y / (1/k + y/pu)`.
    #[serde(rename_all = "camelCase")]
    Hyperbolic {
        /// Initial slope `k` (force / length²).
        initial_modulus: f64,
        /// Asymptotic resistance `pu` (force / length).
        ultimate_resistance: f64,
    },
    /// Matlock static curve for soft clay below the water table.
    #[serde(rename_all = "camelCase")]
    SoftClay {
        /// Undrained shear strength `cu`.
        undrained_shear_strength: f64,
        /// Effective unit weight `γ'`.
        effective_unit_weight: f64,
        /// Strain at half the maximum deviator stress `ε50`.
        strain_at_half_strength: f64,
        /// Empirical wedge coefficient `J`.
        #[serde(rename = "J", alias = "j", default = "default_matlock_j")]
        j: f64,
        /// Initial modulus gradient `k` (force / length³); the initial slope is `k·z`.
        initial_modulus_gradient: f64,
    },
    /// API sand curve with Reese's wedge and flow ultimate resistance.
    #[serde(rename_all = "camelCase")]
    Sand {
        /// Internal friction angle in degrees.
        friction_angle: f64,
        /// Effective unit weight `γ'`.
        effective_unit_weight: f64,
        /// Initial modulus gradient `k` (force / length³); the initial slope is `k·z`.
        subgrade_modulus: f64,
        /// Use the cyclic adjustment factor instead of the static one.
        #[serde(default)]
        cyclic: bool,
    },
}

/// Matlock's recommended `J` for soft clay.
fn default_matlock_j() -> f64 {
    0.5
}

impl SoilCurve {
    /// Check the curve parameters of the layer at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidCurveParameter`] naming the first
    /// parameter that is negative, zero where a positive value is required,
    /// or not finite.
    pub fn validate(&self, index: usize) -> Result<(), ConfigurationError> {
        let check = |parameter: &'static str, value: f64, allow_zero: bool| {
            let valid = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
            if valid {
                Ok(())
            } else {
                Err(ConfigurationError::InvalidCurveParameter {
                    index,
                    parameter,
                    value,
                })
            }
        };
        match *self {
            Self::Linear { modulus } => check("modulus", modulus, true),
            Self::Hyperbolic {
                initial_modulus,
                ultimate_resistance,
            } => {
                check("initialModulus", initial_modulus, false)?;
                check("ultimateResistance", ultimate_resistance, false)
            }
            Self::SoftClay {
                undrained_shear_strength,
                effective_unit_weight,
                strain_at_half_strength,
                j,
                initial_modulus_gradient,
            } => {
                check("undrainedShearStrength", undrained_shear_strength, false)?;
                check("effectiveUnitWeight", effective_unit_weight, true)?;
                check("strainAtHalfStrength", strain_at_half_strength, false)?;
                check("J", j, true)?;
                check("initialModulusGradient", initial_modulus_gradient, false)
            }
            Self::Sand {
                friction_angle,
                effective_unit_weight,
                subgrade_modulus,
                ..
            } => {
                if !(friction_angle > 0.0 && friction_angle < 90.0) {
                    return Err(ConfigurationError::InvalidCurveParameter {
                        index,
                        parameter: "frictionAngle",
                        value: friction_angle,
                    });
                }
                check("effectiveUnitWeight", effective_unit_weight, false)?;
                check("subgradeModulus", subgrade_modulus, false)
            }
        }
    }

    /// Instantiate the curve for a pile of the given `diameter`.
    #[must_use]
    pub fn build(&self, diameter: f64) -> Arc<dyn PyCurve> {
        match *self {
            Self::Linear { modulus } => Arc::new(LinearCurve::new(modulus)),
            Self::Hyperbolic {
                initial_modulus,
                ultimate_resistance,
            } => Arc::new(HyperbolicCurve::new(initial_modulus, ultimate_resistance)),
            Self::SoftClay {
                undrained_shear_strength,
                effective_unit_weight,
                strain_at_half_strength,
                j,
                initial_modulus_gradient,
            } => Arc::new(SoftClayCurve {
                undrained_shear_strength,
                effective_unit_weight,
                strain_at_half_strength,
                j,
                initial_modulus_gradient,
                diameter,
            }),
            Self::Sand {
                friction_angle,
                effective_unit_weight,
                subgrade_modulus,
                cyclic,
            } => Arc::new(SandCurve {
                friction_angle: friction_angle.to_radians(),
                effective_unit_weight,
                subgrade_modulus,
                cyclic,
                diameter,
            }),
        }
    }
}

/// Linear springs with constant modulus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearCurve {
    /// Resistance per unit deflection.
    pub modulus: f64,
}

impl LinearCurve {
    /// Create a linear curve.
    #[must_use]
    pub const fn new(modulus: f64) -> Self {
        Self { modulus }
    }
}

impl PyCurve for LinearCurve {
    fn resistance(&self, _depth: f64, deflection: f64) -> f64 {
        self.modulus * deflection
    }

    fn initial_stiffness(&self, _depth: f64) -> f64 {
        self.modulus
    }
}

/// Hyperbolic curve with a depth-independent initial slope and asymptote.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HyperbolicCurve {
    /// Slope at zero deflection.
    pub initial_modulus: f64,
    /// Resistance approached at large deflection.
    pub ultimate_resistance: f64,
}

impl HyperbolicCurve {
    /// Create a hyperbolic curve.
    #[must_use]
    pub const fn new(initial_modulus: f64, ultimate_resistance: f64) -> Self {
        Self {
            initial_modulus,
            ultimate_resistance,
        }
    }
}

impl PyCurve for HyperbolicCurve {
    fn resistance(&self, _depth: f64, deflection: f64) -> f64 {
        deflection / (1.0 / self.initial_modulus + deflection / self.ultimate_resistance)
    }

    fn initial_stiffness(&self, _depth: f64) -> f64 {
        self.initial_modulus
    }
}

/// Matlock (1970) static soft clay curve, capped by an initial linear branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftClayCurve {
    /// Undrained shear strength.
    pub undrained_shear_strength: f64,
    /// Effective unit weight.
    pub effective_unit_weight: f64,
    /// Strain at half strength.
    pub strain_at_half_strength: f64,
    /// Wedge coefficient.
    pub j: f64,
    /// Initial modulus gradient.
    pub initial_modulus_gradient: f64,
    /// Pile width.
    pub diameter: f64,
}

impl SoftClayCurve {
    /// Ultimate resistance: the lesser of the wedge and flow-around values.
    #[must_use]
    pub fn ultimate_resistance(&self, depth: f64) -> f64 {
        let cu = self.undrained_shear_strength;
        let b = self.diameter;
        let wedge = 3.0 + self.effective_unit_weight * depth / cu + self.j * depth / b;
        wedge.min(9.0) * cu * b
    }

    /// Deflection at which half the ultimate resistance develops.
    #[must_use]
    pub fn y50(&self) -> f64 {
        2.5 * self.strain_at_half_strength * self.diameter
    }
}

impl PyCurve for SoftClayCurve {
    fn resistance(&self, depth: f64, deflection: f64) -> f64 {
        let pu = self.ultimate_resistance(depth);
        let ratio = deflection / self.y50();
        let matlock = if ratio >= SOFT_CLAY_PLATEAU_RATIO {
            pu
        } else {
            0.5 * pu * ratio.cbrt()
        };
        matlock.min(self.initial_stiffness(depth) * deflection)
    }

    fn initial_stiffness(&self, depth: f64) -> f64 {
        self.initial_modulus_gradient * depth
    }
}

/// API (1987) sand curve, `p = A·pu·tanh(k·z·y / (A·pu))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SandCurve {
    /// Internal friction angle in radians.
    pub friction_angle: f64,
    /// Effective unit weight.
    pub effective_unit_weight: f64,
    /// Initial modulus gradient.
    pub subgrade_modulus: f64,
    /// Whether the cyclic factor applies.
    pub cyclic: bool,
    /// Pile width.
    pub diameter: f64,
}

impl SandCurve {
    /// Ultimate resistance from Reese's wedge and flow-around mechanisms.
    #[must_use]
    pub fn ultimate_resistance(&self, depth: f64) -> f64 {
        let phi = self.friction_angle;
        let alpha = phi / 2.0;
        let beta = FRAC_PI_4 + phi / 2.0;
        let k0 = SAND_AT_REST_COEFFICIENT;
        let ka = (FRAC_PI_4 - phi / 2.0).tan().powi(2);
        let (b, z, gamma) = (self.diameter, depth, self.effective_unit_weight);
        let (tan_beta, tan_phi, tan_alpha) = (beta.tan(), phi.tan(), alpha.tan());
        let tan_wedge = (beta - phi).tan();

        let shallow = gamma
            * z
            * (k0 * z * tan_phi * beta.sin() / (tan_wedge * alpha.cos())
                + tan_beta / tan_wedge * (b + z * tan_beta * tan_alpha)
                + k0 * z * tan_beta * (tan_phi * beta.sin() - tan_alpha)
                - ka * b);
        let deep = ka * b * gamma * z * (tan_beta.powi(8) - 1.0)
            + k0 * b * gamma * z * tan_phi * tan_beta.powi(4);
        shallow.min(deep)
    }

    /// Empirical factor `A` applied to the ultimate resistance.
    #[must_use]
    pub fn adjustment_factor(&self, depth: f64) -> f64 {
        if self.cyclic {
            SAND_CYCLIC_FACTOR
        } else {
            (3.0 - 0.8 * depth / self.diameter).max(SAND_CYCLIC_FACTOR)
        }
    }
}

impl PyCurve for SandCurve {
    fn resistance(&self, depth: f64, deflection: f64) -> f64 {
        let pu = self.ultimate_resistance(depth);
        if pu <= 0.0 {
            return 0.0;
        }
        let capacity = self.adjustment_factor(depth) * pu;
        capacity * (self.initial_stiffness(depth) * deflection / capacity).tanh()
    }

    fn initial_stiffness(&self, depth: f64) -> f64 {
        self.subgrade_modulus * depth
    }
}
