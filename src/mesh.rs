//! Uniform one-dimensional discretization of pile depth.

use nalgebra::DVector;

use crate::errors::ConfigurationError;

/// Equally spaced nodes from the pile head (depth 0) to the tip.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Node depths, increasing from 0 to the pile length.
    depths: DVector<f64>,
    /// Distance between neighbouring nodes.
    spacing: f64,
}

impl Mesh {
    /// Place `node_count` nodes along a pile of the given `length`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::TooFewNodes`] when fewer than five nodes
    /// are requested and [`ConfigurationError::NonPositiveLength`] when the
    /// length is not a positive number.
    ///
    /// # Examples
    /// ```
    /// use pilex::Mesh;
    ///
    /// let mesh = Mesh::uniform(10.0, 5).expect("valid mesh");
    /// assert_eq!(mesh.spacing(), 2.5);
    /// assert_eq!(mesh.depth(4), 10.0);
    /// ```
    pub fn uniform(length: f64, node_count: usize) -> Result<Self, ConfigurationError> {
        if node_count < 5 {
            return Err(ConfigurationError::TooFewNodes(node_count));
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(ConfigurationError::NonPositiveLength(length));
        }
        let spacing = length / (node_count - 1) as f64;
        let mut depths = DVector::from_fn(node_count, |node, _| node as f64 * spacing);
        // Pin the tip so it does not drift by rounding.
        depths[node_count - 1] = length;
        Ok(Self { depths, spacing })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Always `false`; a mesh has at least five nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Node spacing `h`.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Depth of every node.
    #[must_use]
    pub fn depths(&self) -> &DVector<f64> {
        &self.depths
    }

    /// Depth of a single node.
    #[must_use]
    pub fn depth(&self, node: usize) -> f64 {
        self.depths[node]
    }

    /// Depth of the tip.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.depths[self.len() - 1]
    }
}
