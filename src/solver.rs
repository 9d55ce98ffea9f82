//! Pile system assembly, the nonlinear soil iteration and the analysis entry
//! points.

use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::banded::BandMatrix;
use crate::boundary::{BoundaryConditions, BoundaryRecord};
use crate::errors::{AnalysisError, AnalysisResult, ConfigurationError};
use crate::load::build_load_vector;
use crate::mesh::Mesh;
use crate::model::{validate_records, AnalysisConfig, LoadCase, PileProperties, SoilProfile};
use crate::post::{bending_moments, shear_forces};
use crate::results::{ResponseFields, ResultRecord};
use crate::soil::SoilModel;
use crate::stiffness::StiffnessOperator;

/// Pile operator with boundary rows in place and its load vector.
///
/// Everything here stays fixed while the soil stiffness is iterated.
#[derive(Clone, Debug, PartialEq)]
pub struct PileSystem {
    /// Node layout.
    mesh: Mesh,
    /// Beam-column operator without soil.
    operator: StiffnessOperator,
    /// Boundary bookkeeping, including the soil weights.
    record: BoundaryRecord,
    /// Right-hand side.
    load: DVector<f64>,
}

impl PileSystem {
    /// Mesh the pile, assemble the operator, enforce the supports and build
    /// the load vector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the mesh cannot be built.
    pub fn build(
        pile: &PileProperties,
        load: &LoadCase,
        config: &AnalysisConfig,
    ) -> Result<Self, ConfigurationError> {
        let mesh = Mesh::uniform(pile.length, config.node_count)?;
        let mut operator =
            StiffnessOperator::assemble(&mesh, pile.flexural_rigidity, load.axial_load);
        let record = BoundaryConditions::new(config.boundary_condition, config.tip_condition)
            .enforce(&mut operator);
        let load = build_load_vector(&record, load);
        Ok(Self {
            mesh,
            operator,
            record,
            load,
        })
    }

    /// Node layout.
    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Boundary bookkeeping.
    #[must_use]
    pub fn boundary(&self) -> &BoundaryRecord {
        &self.record
    }

    /// Right-hand side.
    #[must_use]
    pub fn load_vector(&self) -> &DVector<f64> {
        &self.load
    }

    /// Pile operator plus the weighted soil stiffness on the diagonal.
    /// Constrained rows have zero weight and keep their identity form.
    #[must_use]
    pub fn combined_operator(&self, soil_stiffness: &DVector<f64>) -> BandMatrix {
        let mut matrix = self.operator.matrix.clone();
        matrix.add_weighted_diagonal(soil_stiffness, &self.record.soil_weights);
        matrix
    }

    /// Deflections for the given nodal soil stiffness.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularSystem`] when the combined operator
    /// cannot be factorized.
    pub fn solve(&self, soil_stiffness: &DVector<f64>) -> AnalysisResult<DVector<f64>> {
        self.combined_operator(soil_stiffness).solve(&self.load)
    }

    /// Deflections of the pile with no soil.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularSystem`] when the supports alone do not
    /// prevent rigid-body motion.
    pub fn solve_elastic(&self) -> AnalysisResult<DVector<f64>> {
        self.operator.matrix.solve(&self.load)
    }
}

/// Phase of the soil iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterationState {
    /// No deflection estimate yet.
    Initializing,
    /// Refining the estimate.
    Iterating,
    /// The last change fell below the tolerance.
    Converged,
    /// The iteration budget ran out first.
    MaxIterationsReached,
    /// A linear solve failed.
    Failed,
}

impl IterationState {
    /// Whether no further work will be done.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Converged | Self::MaxIterationsReached | Self::Failed
        )
    }
}

/// Final state of a finished soil iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationOutcome {
    /// Last deflection estimate.
    pub deflections: DVector<f64>,
    /// Linear solves performed after initialization.
    pub iterations: usize,
    /// Whether the tolerance was met.
    pub converged: bool,
    /// Max-norm of the last deflection change.
    pub last_change: f64,
}

/// Fixed-point iteration between the pile operator and the secant soil
/// stiffness.
#[derive(Debug)]
pub struct NonlinearDriver<'a> {
    /// Fixed part of the system.
    system: &'a PileSystem,
    /// Soil springs.
    soil: &'a SoilModel,
    /// Iteration budget.
    max_iterations: usize,
    /// Convergence threshold on the deflection change.
    tolerance: f64,
    /// Current phase.
    state: IterationState,
    /// Current estimate.
    deflections: DVector<f64>,
    /// Iterations completed.
    iterations: usize,
    /// Max-norm of the last change.
    last_change: f64,
}

impl<'a> NonlinearDriver<'a> {
    /// Prepare an iteration over `system` with the given soil.
    #[must_use]
    pub fn new(system: &'a PileSystem, soil: &'a SoilModel, config: &AnalysisConfig) -> Self {
        Self {
            system,
            soil,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            state: IterationState::Initializing,
            deflections: DVector::zeros(system.mesh().len()),
            iterations: 0,
            last_change: f64::INFINITY,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> IterationState {
        self.state
    }

    /// Current deflection estimate.
    #[must_use]
    pub fn deflections(&self) -> &DVector<f64> {
        &self.deflections
    }

    /// Perform one step and return the resulting phase.
    ///
    /// Initialization takes the elastic solution without soil; a pile that is
    /// a mechanism on its own starts from zero deflection instead, where the
    /// soil contributes its initial stiffness. Terminal phases are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularSystem`] when a linear solve fails;
    /// the driver is then [`IterationState::Failed`].
    pub fn advance(&mut self) -> AnalysisResult<IterationState> {
        match self.state {
            IterationState::Initializing => {
                match self.system.solve_elastic() {
                    Ok(deflections) => self.deflections = deflections,
                    Err(AnalysisError::SingularSystem(cause)) if !self.soil.is_empty() => {
                        debug!(%cause, "pile alone cannot be solved, starting from rest");
                    }
                    Err(error) => return Err(self.fail(error)),
                }
                self.state = IterationState::Iterating;
            }
            IterationState::Iterating => {
                let depths = self.system.mesh().depths();
                let stiffness = self.soil.secant_stiffness(depths, &self.deflections);
                let updated = match self.system.solve(&stiffness) {
                    Ok(updated) => updated,
                    Err(error) => return Err(self.fail(error)),
                };
                self.last_change = (&updated - &self.deflections).amax();
                self.deflections = updated;
                self.iterations += 1;
                debug!(
                    iteration = self.iterations,
                    change = self.last_change,
                    "soil iteration"
                );

                if self.last_change < self.tolerance {
                    info!(
                        iterations = self.iterations,
                        change = self.last_change,
                        "soil iteration converged"
                    );
                    self.state = IterationState::Converged;
                } else if self.iterations >= self.max_iterations {
                    warn!(
                        iterations = self.iterations,
                        change = self.last_change,
                        tolerance = self.tolerance,
                        "soil iteration stopped at the iteration limit"
                    );
                    self.state = IterationState::MaxIterationsReached;
                }
            }
            IterationState::Converged
            | IterationState::MaxIterationsReached
            | IterationState::Failed => {}
        }
        Ok(self.state)
    }

    /// Advance until a terminal phase is reached.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularSystem`] when a linear solve fails.
    pub fn run(mut self) -> AnalysisResult<IterationOutcome> {
        while !self.advance()?.is_terminal() {}
        Ok(IterationOutcome {
            converged: self.state == IterationState::Converged,
            deflections: self.deflections,
            iterations: self.iterations,
            last_change: self.last_change,
        })
    }

    /// Enter the failed phase and hand back `error`.
    fn fail(&mut self, error: AnalysisError) -> AnalysisError {
        warn!(%error, iteration = self.iterations, "pile system could not be solved");
        self.state = IterationState::Failed;
        error
    }
}

/// Analyse a laterally loaded pile.
///
/// Inputs are validated before anything is assembled. A system that cannot
/// be solved yields `Ok` with `success == false`; running out of iterations
/// yields `success == true` and `converged == false`.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfiguration`] for a rejected input record.
///
/// # Examples
/// ```
/// use pilex::{analyze, AnalysisConfig, HeadCondition, LoadCase, PileProperties, SoilProfile, TipCondition};
///
/// let pile = PileProperties::new(10.0, 0.6, 5.0e4);
/// let config = AnalysisConfig::default().with_supports(HeadCondition::Free, TipCondition::Fixed);
/// let record = analyze(&pile, &SoilProfile::empty(), &LoadCase::new(100.0, 0.0, 0.0), &config)
///     .expect("valid input");
/// assert!(record.success && record.converged);
/// assert_eq!(record.iterations, 1);
/// assert!((record.max_moment - 1_000.0).abs() < 1.0e-3);
/// ```
pub fn analyze(
    pile: &PileProperties,
    soil: &SoilProfile,
    load: &LoadCase,
    config: &AnalysisConfig,
) -> AnalysisResult<ResultRecord> {
    validate_records(pile, soil, load, config)?;
    let model = SoilModel::from_profile(soil, pile);
    solve_validated(pile, &model, load, config)
}

/// Analyse a pile embedded in a caller-built [`SoilModel`], typically one
/// holding custom [`crate::PyCurve`] implementations.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfiguration`] for a rejected input record
/// or soil layers that do not tile the pile length.
pub fn analyze_with_soil_model(
    pile: &PileProperties,
    soil: &SoilModel,
    load: &LoadCase,
    config: &AnalysisConfig,
) -> AnalysisResult<ResultRecord> {
    validate_records(pile, &SoilProfile::empty(), load, config)?;
    soil.validate(pile.length)?;
    solve_validated(pile, soil, load, config)
}

/// Run the solve and post-processing for validated inputs.
fn solve_validated(
    pile: &PileProperties,
    soil: &SoilModel,
    load: &LoadCase,
    config: &AnalysisConfig,
) -> AnalysisResult<ResultRecord> {
    let system = PileSystem::build(pile, load, config)?;
    let outcome = match NonlinearDriver::new(&system, soil, config).run() {
        Ok(outcome) => outcome,
        Err(error @ AnalysisError::SingularSystem(_)) => {
            return Ok(ResultRecord::failed(error.to_string()));
        }
        Err(error) => return Err(error),
    };

    let mesh = system.mesh();
    let depths = mesh.depths();
    let fields = ResponseFields {
        moments: bending_moments(&outcome.deflections, mesh.spacing(), pile.flexural_rigidity),
        shears: shear_forces(&outcome.deflections, mesh.spacing(), pile.flexural_rigidity),
        soil_reactions: -soil.resistance(depths, &outcome.deflections),
        depths: depths.clone(),
        deflections: outcome.deflections,
    };
    Ok(ResultRecord::assemble(
        &fields,
        outcome.converged,
        outcome.iterations,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::model::{HeadCondition, TipCondition};
    use crate::soil::{LinearCurve, SoilCurve};

    fn pile() -> PileProperties {
        PileProperties::new(10.0, 0.6, 5.0e4)
    }

    fn cantilever() -> AnalysisConfig {
        AnalysisConfig::default()
            .with_nodes(21)
            .with_supports(HeadCondition::Free, TipCondition::Fixed)
    }

    #[test]
    fn driver_moves_through_its_phases() {
        let config = cantilever();
        let system = PileSystem::build(&pile(), &LoadCase::new(100.0, 0.0, 0.0), &config)
            .expect("valid system");
        let soil = SoilModel::empty();
        let mut driver = NonlinearDriver::new(&system, &soil, &config);
        assert_eq!(driver.state(), IterationState::Initializing);
        assert_eq!(driver.advance(), Ok(IterationState::Iterating));
        assert!(driver.deflections()[0] > 0.0);
        assert_eq!(driver.advance(), Ok(IterationState::Converged));
        assert_eq!(driver.advance(), Ok(IterationState::Converged));
    }

    #[test]
    fn soil_term_leaves_constrained_rows_alone() {
        let config = cantilever();
        let system = PileSystem::build(&pile(), &LoadCase::new(100.0, 0.0, 0.0), &config)
            .expect("valid system");
        let stiffness = DVector::from_element(21, 1.0e6);
        let combined = system.combined_operator(&stiffness);
        let bare = system.combined_operator(&DVector::zeros(21));
        assert_eq!(combined.get(20, 20), bare.get(20, 20));
        assert_relative_eq!(combined.get(0, 0) - bare.get(0, 0), 0.5e6, epsilon = 1.0e-6);
        assert_relative_eq!(combined.get(7, 7) - bare.get(7, 7), 1.0e6, epsilon = 1.0e-6);
    }

    #[test]
    fn mechanism_with_soil_starts_from_rest() {
        let config = AnalysisConfig::default().with_nodes(21);
        let profile = SoilProfile::uniform(10.0, SoilCurve::Linear { modulus: 2_000.0 });
        let record = analyze(&pile(), &profile, &LoadCase::new(100.0, 0.0, 0.0), &config)
            .expect("valid input");
        assert!(record.success);
        assert!(record.converged);
        // Linear springs settle after one corrective solve.
        assert_eq!(record.iterations, 2);
    }

    #[test]
    fn free_pile_without_soil_reports_a_singular_system() {
        let record = analyze(
            &pile(),
            &SoilProfile::empty(),
            &LoadCase::new(100.0, 0.0, 0.0),
            &AnalysisConfig::default(),
        )
        .expect("valid input");
        assert!(!record.success);
        assert!(record.error.as_deref().is_some_and(|message| message.contains("singular")));
        assert!(record.deflections.is_empty());
    }

    #[test]
    fn custom_curves_drive_the_same_solver() {
        let config = AnalysisConfig::default().with_nodes(21);
        let load = LoadCase::new(100.0, 0.0, 0.0);
        let from_profile = analyze(
            &pile(),
            &SoilProfile::uniform(10.0, SoilCurve::Linear { modulus: 2_000.0 }),
            &load,
            &config,
        )
        .expect("valid input");
        let custom = SoilModel::empty().with_layer(0.0, 10.0, Arc::new(LinearCurve::new(2_000.0)));
        let from_model =
            analyze_with_soil_model(&pile(), &custom, &load, &config).expect("valid input");
        assert_eq!(from_profile, from_model);
    }

    #[test]
    fn soil_reactions_oppose_the_deflection() {
        let config = AnalysisConfig::default().with_nodes(21);
        let record = analyze(
            &pile(),
            &SoilProfile::uniform(10.0, SoilCurve::Linear { modulus: 2_000.0 }),
            &LoadCase::new(100.0, 0.0, 0.0),
            &config,
        )
        .expect("valid input");
        assert!(record.deflection_at_load > 0.0);
        for (deflection, reaction) in record.deflections.iter().zip(&record.soil_reactions) {
            assert_relative_eq!(*reaction, -2_000.0 * deflection, epsilon = 1.0e-9);
        }
    }
}
