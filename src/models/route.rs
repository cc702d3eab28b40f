//! Per-route evaluation records.

use serde::{Deserialize, Serialize};

/// Packing verdict for one route's aggregated boxes.
///
/// Derived from packing oracle output; never edited after creation.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::RouteEvaluation;
///
/// let empty = RouteEvaluation::empty();
/// assert!(empty.feasible);
/// assert_eq!(empty.unpacked(), 0);
///
/// let eval = RouteEvaluation::from_counts(10, 7, 0.4);
/// assert!(!eval.feasible);
/// assert_eq!(eval.unpacked(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEvaluation {
    /// Boxes assigned to the route.
    pub boxes_total: usize,
    /// Boxes the oracle managed to place.
    pub boxes_packed: usize,
    /// Packed volume divided by container volume.
    pub fill_rate: f64,
    /// All boxes placed (or no boxes at all).
    pub feasible: bool,
    /// Produced by an oracle fallback policy rather than a real packing.
    #[serde(default)]
    pub degraded: bool,
}

impl RouteEvaluation {
    /// Evaluation of a route carrying no boxes.
    pub fn empty() -> Self {
        Self {
            boxes_total: 0,
            boxes_packed: 0,
            fill_rate: 0.0,
            feasible: true,
            degraded: false,
        }
    }

    /// Builds an evaluation from counts; feasibility follows from them.
    pub fn from_counts(boxes_total: usize, boxes_packed: usize, fill_rate: f64) -> Self {
        Self {
            boxes_total,
            boxes_packed,
            fill_rate,
            feasible: boxes_total == 0 || boxes_packed == boxes_total,
            degraded: false,
        }
    }

    /// Evaluation substituted when the oracle failed: nothing counts as packed.
    pub fn degraded(boxes_total: usize) -> Self {
        Self {
            degraded: true,
            ..Self::from_counts(boxes_total, 0, 0.0)
        }
    }

    /// Boxes left outside the container.
    pub fn unpacked(&self) -> usize {
        self.boxes_total.saturating_sub(self.boxes_packed)
    }
}

/// Diagnostic record for one decoded route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Customer ids in visit order.
    pub customers: Vec<usize>,
    /// Depot → customers → depot Euclidean distance.
    pub distance: f64,
    /// Packing verdict.
    #[serde(flatten)]
    pub evaluation: RouteEvaluation,
}

impl RouteRecord {
    /// Number of customers on the route.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Returns `true` if the route has no customers.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Shorthand for the evaluation's feasibility flag.
    pub fn feasible(&self) -> bool {
        self.evaluation.feasible
    }
}
