//! Error types produced while validating or solving a pile analysis.

use thiserror::Error;

/// Error returned when a pile analysis cannot be carried out.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when an input record fails validation. No matrix is assembled.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
    /// Returned when a head or tip selector names an unknown support type.
    #[error("unsupported boundary condition `{0}`")]
    UnsupportedBoundaryCondition(String),
    /// Returned when the combined pile and soil operator cannot be factorized.
    #[error("linear system is singular or ill-conditioned ({0}); check supports and soil stiffness")]
    SingularSystem(SingularityCause),
}

/// Why a linear solve was rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SingularityCause {
    /// The operator is empty, all zero or holds non-finite entries.
    #[error("operator is empty or not finite")]
    InvalidOperator,
    /// The supports and soil leave a rigid-body translation or rotation free.
    #[error("pile can move as a rigid body")]
    Mechanism,
    /// The sparse factorization reported an error.
    #[error("factorization failed: {0}")]
    Factorization(String),
    /// Substitution produced a non-finite deflection.
    #[error("non-finite deflection at node {0}")]
    NonFinite(usize),
}

/// Reason an input record was rejected.
///
/// Each variant carries the rejected value so callers can present actionable
/// feedback to users.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    /// Returned when fewer nodes are requested than the edge stencils need.
    #[error("node count must be at least 5 (received {0})")]
    TooFewNodes(usize),
    /// Returned when the pile length is zero, negative or not finite.
    #[error("pile length must be positive (received {0})")]
    NonPositiveLength(f64),
    /// Returned when the flexural rigidity is zero, negative or not finite.
    #[error("flexural rigidity EI must be positive (received {0})")]
    NonPositiveRigidity(f64),
    /// Returned when soil curves need a pile width and none is available.
    #[error("pile diameter must be positive when soil is present (received {0})")]
    NonPositiveDiameter(f64),
    /// Returned when the iteration budget is zero.
    #[error("maximum iterations must be at least 1")]
    NoIterations,
    /// Returned when the convergence tolerance is zero, negative or not finite.
    #[error("convergence tolerance must be positive (received {0})")]
    NonPositiveTolerance(f64),
    /// Returned when an applied load is not a finite number.
    #[error("{name} must be finite (received {value})")]
    NonFiniteLoad {
        /// Name of the offending load component.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Returned when the first soil layer does not start at the pile head.
    #[error("soil profile must start at depth 0 (first layer starts at {0})")]
    ProfileDoesNotStartAtSurface(f64),
    /// Returned when a layer's bottom is not below its top.
    #[error("soil layer {index} has an empty or inverted depth range [{top}, {bottom}]")]
    InvertedLayer {
        /// Position of the layer in the profile.
        index: usize,
        /// Top of the layer.
        top: f64,
        /// Bottom of the layer.
        bottom: f64,
    },
    /// Returned when two consecutive layers leave uncovered depth between them.
    #[error("soil profile has a gap between {above} and {below} at layer {index}")]
    LayerGap {
        /// Position of the deeper layer in the profile.
        index: usize,
        /// Bottom of the shallower layer.
        above: f64,
        /// Top of the deeper layer.
        below: f64,
    },
    /// Returned when two consecutive layers cover the same depth.
    #[error("soil layer {index} overlaps the layer above ({below} < {above})")]
    LayerOverlap {
        /// Position of the deeper layer in the profile.
        index: usize,
        /// Bottom of the shallower layer.
        above: f64,
        /// Top of the deeper layer.
        below: f64,
    },
    /// Returned when the deepest layer stops short of the pile tip.
    #[error("soil profile ends at {bottom} but the pile extends to {length}")]
    ProfileTooShallow {
        /// Bottom of the deepest layer.
        bottom: f64,
        /// Pile length.
        length: f64,
    },
    /// Returned when a soil curve parameter is not physically meaningful.
    #[error("soil layer {index}: {parameter} is out of range (received {value})")]
    InvalidCurveParameter {
        /// Position of the layer in the profile.
        index: usize,
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Convenience alias for results produced by this crate.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
