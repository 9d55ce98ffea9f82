#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod banded;
pub mod boundary;
pub mod errors;
pub mod linear;
pub mod load;
pub mod mesh;
pub mod model;
pub mod post;
pub mod results;
pub mod soil;
pub mod solver;
pub mod stiffness;

pub use banded::BandMatrix;
pub use boundary::{BoundaryConditions, BoundaryRecord};
pub use errors::{AnalysisError, AnalysisResult, ConfigurationError, SingularityCause};
pub use linear::{rigid_body_stiffness, SparseLu, MECHANISM_TOLERANCE};
pub use load::build_load_vector;
pub use mesh::Mesh;
pub use model::{
    AnalysisConfig, AnalysisInput, HeadCondition, LoadCase, PileProperties, SoilLayer,
    SoilProfile, TipCondition,
};
pub use post::{bending_moments, shear_forces};
pub use results::{ResponseFields, ResultRecord};
pub use soil::{
    HyperbolicCurve, LinearCurve, PyCurve, SandCurve, SoftClayCurve, SoilCurve, SoilModel,
    SoilReaction,
};
pub use solver::{
    analyze, analyze_with_soil_model, IterationOutcome, IterationState, NonlinearDriver,
    PileSystem,
};
pub use stiffness::{BeamColumnStencil, StiffnessOperator};
