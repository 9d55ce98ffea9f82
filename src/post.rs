//! Recovery of bending moment and shear from the nodal deflections.
//!
//! `M = -EI·y''` and `V = -EI·y'''`. Interior nodes use central differences;
//! nodes without enough neighbours on one side use one-sided stencils of
//! the same (second) order. Shears are exact for quartic fields.

use nalgebra::DVector;

/// One-sided second difference at an end node, applied inward.
const END_CURVATURE: [f64; 4] = [2.0, -5.0, 4.0, -1.0];

/// One-sided third differences (times 2) at the end node and its neighbour,
/// applied inward.
const END_THIRD_DIFFERENCES: [[f64; 5]; 2] = [
    [-5.0, 18.0, -24.0, 14.0, -3.0],
    [-3.0, 10.0, -12.0, 6.0, -1.0],
];

/// Weighted sum of `stencil` over deflections taken inward from the head
/// (`reverse == false`) or the tip.
fn inward(deflections: &DVector<f64>, stencil: &[f64], reverse: bool) -> f64 {
    let n = deflections.len();
    stencil
        .iter()
        .enumerate()
        .map(|(offset, weight)| {
            let node = if reverse { n - 1 - offset } else { offset };
            weight * deflections[node]
        })
        .sum()
}

/// Bending moment at every node.
///
/// Expects at least four nodes.
#[must_use]
pub fn bending_moments(
    deflections: &DVector<f64>,
    spacing: f64,
    flexural_rigidity: f64,
) -> DVector<f64> {
    let n = deflections.len();
    let scale = -flexural_rigidity / spacing.powi(2);
    DVector::from_fn(n, |node, _| {
        let curvature = if node == 0 {
            inward(deflections, &END_CURVATURE, false)
        } else if node == n - 1 {
            inward(deflections, &END_CURVATURE, true)
        } else {
            deflections[node - 1] - 2.0 * deflections[node] + deflections[node + 1]
        };
        scale * curvature
    })
}

/// Shear force at every node.
///
/// Expects at least five nodes.
#[must_use]
pub fn shear_forces(
    deflections: &DVector<f64>,
    spacing: f64,
    flexural_rigidity: f64,
) -> DVector<f64> {
    let n = deflections.len();
    let scale = -flexural_rigidity / (2.0 * spacing.powi(3));
    DVector::from_fn(n, |node, _| {
        let third = match node {
            0 | 1 => inward(deflections, &END_THIRD_DIFFERENCES[node], false),
            // Mirrored stencils change sign for an odd derivative.
            _ if node + 2 >= n => -inward(deflections, &END_THIRD_DIFFERENCES[n - 1 - node], true),
            _ => {
                -deflections[node - 2] + 2.0 * deflections[node - 1] - 2.0 * deflections[node + 1]
                    + deflections[node + 2]
            }
        };
        scale * third
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn sample(n: usize, spacing: f64, field: impl Fn(f64) -> f64) -> DVector<f64> {
        DVector::from_fn(n, |node, _| field(node as f64 * spacing))
    }

    #[test]
    fn quartic_fields_match_the_stencil_truncation() {
        let (n, h, ei) = (9, 0.5, 2.0);
        // y = z⁴ - z³, y'' = 12z² - 6z, y''' = 24z - 6
        let deflections = sample(n, h, |z| z.powi(4) - z.powi(3));
        let moments = bending_moments(&deflections, h, ei);
        let shears = shear_forces(&deflections, h, ei);
        for node in 0..n {
            let z = node as f64 * h;
            let exact_curvature = 12.0 * z * z - 6.0 * z;
            let exact_third = 24.0 * z - 6.0;
            // Second differences of z⁴ carry an h² error: +2h² central, -22h² one-sided.
            let truncation = if node == 0 || node == n - 1 {
                -22.0 * h * h
            } else {
                2.0 * h * h
            };
            assert_relative_eq!(
                moments[node],
                -ei * (exact_curvature + truncation),
                epsilon = 1.0e-9
            );
            assert_relative_eq!(shears[node], -ei * exact_third, epsilon = 1.0e-9);
        }
    }

    #[test]
    fn symmetric_fields_give_symmetric_moments_and_antisymmetric_shears() {
        let n = 11;
        let deflections = sample(n, 1.0, |z| (z - 5.0).powi(2) + 0.1 * (z - 5.0).powi(4));
        let moments = bending_moments(&deflections, 1.0, 1.0);
        let shears = shear_forces(&deflections, 1.0, 1.0);
        for node in 0..n {
            let mirror = n - 1 - node;
            assert_relative_eq!(moments[node], moments[mirror], epsilon = 1.0e-9);
            assert_relative_eq!(shears[node], -shears[mirror], epsilon = 1.0e-9);
        }
    }

    #[test]
    fn linear_fields_carry_no_moment_or_shear() {
        let deflections = sample(6, 0.3, |z| 0.01 - 0.002 * z);
        assert_relative_eq!(bending_moments(&deflections, 0.3, 1.0e4).amax(), 0.0, epsilon = 1.0e-9);
        assert_relative_eq!(shear_forces(&deflections, 0.3, 1.0e4).amax(), 0.0, epsilon = 1.0e-6);
    }
}
