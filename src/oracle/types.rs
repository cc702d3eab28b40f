//! Packing oracle contract.

use serde::{Deserialize, Serialize};

use crate::models::{CargoBox, Container};

/// Errors reported by a packing oracle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    /// The oracle could not process the box set.
    #[error("oracle failed: {0}")]
    Failed(String),

    /// The oracle cannot work with the given container at all.
    #[error("oracle does not support this container: {0}")]
    Unsupported(String),

    /// The oracle reported more placed boxes than it was given.
    #[error("oracle placed {placed} of {total} boxes")]
    InconsistentOutcome {
        /// Reported placed count.
        placed: usize,
        /// Boxes handed to the oracle.
        total: usize,
    },

    /// The oracle reported a negative or non-finite packed volume.
    #[error("oracle reported invalid packed volume {0}")]
    InvalidVolume(f64),
}

/// Where one box ended up inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Id of the placed box.
    pub box_id: usize,
    /// Minimum corner `[x, y, z]`.
    pub position: [f64; 3],
    /// Extents along x, y, z after rotation.
    pub extents: [f64; 3],
}

impl Placement {
    /// Maximum corner `[x, y, z]`.
    pub fn max_corner(&self) -> [f64; 3] {
        [
            self.position[0] + self.extents[0],
            self.position[1] + self.extents[1],
            self.position[2] + self.extents[2],
        ]
    }

    /// Returns `true` if the two placements share interior volume.
    pub fn overlaps(&self, other: &Placement, tol: f64) -> bool {
        let (a_max, b_max) = (self.max_corner(), other.max_corner());
        (0..3).all(|k| self.position[k] < b_max[k] - tol && other.position[k] < a_max[k] - tol)
    }
}

/// Result of one oracle invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingOutcome {
    /// Placed boxes with their positions.
    pub placements: Vec<Placement>,
    /// Sum of placed box volumes.
    pub packed_volume: f64,
    /// Number of placed boxes.
    pub placed_count: usize,
}

impl PackingOutcome {
    /// Checks the outcome against the number of boxes that were submitted.
    pub fn validate(&self, total: usize) -> Result<(), OracleError> {
        if self.placed_count > total {
            return Err(OracleError::InconsistentOutcome {
                placed: self.placed_count,
                total,
            });
        }
        if !self.packed_volume.is_finite() || self.packed_volume < 0.0 {
            return Err(OracleError::InvalidVolume(self.packed_volume));
        }
        Ok(())
    }
}

/// Decides whether a set of boxes fits into a container.
///
/// Implementations must be deterministic for identical ordered input:
/// evaluation results are cached and runs are expected to be reproducible.
/// They must also be safe to call concurrently on distinct inputs.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::{CargoBox, Container};
/// use u_cargo_routing::oracle::{OracleError, PackingOracle, PackingOutcome};
///
/// /// Accepts everything without computing positions.
/// struct Unlimited;
///
/// impl PackingOracle for Unlimited {
///     fn pack(&self, _c: &Container, boxes: &[CargoBox]) -> Result<PackingOutcome, OracleError> {
///         Ok(PackingOutcome {
///             placements: vec![],
///             packed_volume: boxes.iter().map(|b| b.volume()).sum(),
///             placed_count: boxes.len(),
///         })
///     }
/// }
///
/// let c = Container::new(1.0, 1.0, 1.0).unwrap();
/// let out = Unlimited.pack(&c, &[CargoBox::new(1, 2.0, 2.0, 2.0)]).unwrap();
/// assert_eq!(out.placed_count, 1);
/// ```
pub trait PackingOracle: Send + Sync {
    /// Packs `boxes`, in the given order, into `container`.
    fn pack(&self, container: &Container, boxes: &[CargoBox])
        -> Result<PackingOutcome, OracleError>;

    /// Confirms up front that the oracle can work with `container`.
    ///
    /// Called once when an evaluator is constructed.
    fn check_capability(&self, _container: &Container) -> Result<(), OracleError> {
        Ok(())
    }
}

impl<T: PackingOracle + ?Sized> PackingOracle for &T {
    fn pack(
        &self,
        container: &Container,
        boxes: &[CargoBox],
    ) -> Result<PackingOutcome, OracleError> {
        (**self).pack(container, boxes)
    }

    fn check_capability(&self, container: &Container) -> Result<(), OracleError> {
        (**self).check_capability(container)
    }
}

impl<T: PackingOracle + ?Sized> PackingOracle for Box<T> {
    fn pack(
        &self,
        container: &Container,
        boxes: &[CargoBox],
    ) -> Result<PackingOutcome, OracleError> {
        (**self).pack(container, boxes)
    }

    fn check_capability(&self, container: &Container) -> Result<(), OracleError> {
        (**self).check_capability(container)
    }
}

/// What the evaluator does when the oracle fails on a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleFallback {
    /// Propagate the failure and abort the evaluation.
    #[default]
    Abort,
    /// Count the route as having packed none of its boxes and mark the
    /// evaluation as degraded.
    TreatAsUnpacked,
}
