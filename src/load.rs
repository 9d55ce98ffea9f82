//! Right-hand side of the pile system.

use nalgebra::DVector;

use crate::boundary::BoundaryRecord;
use crate::model::LoadCase;

/// Build the load vector for `load` from the sensitivities recorded when the
/// boundary rows were written.
///
/// With a free head node 0 receives `H/h + M/h²` and node 1 receives `-M/h²`.
/// A pinned head keeps only the moment term on node 1; a fixed head reacts
/// both loads. The axial load acts through the operator, not here.
#[must_use]
pub fn build_load_vector(record: &BoundaryRecord, load: &LoadCase) -> DVector<f64> {
    &record.lateral_sensitivity * load.lateral_load + &record.moment_sensitivity * load.moment
}
