//! Fitness record of a whole chromosome.

use serde::{Deserialize, Serialize};

use super::RouteRecord;

/// Score and diagnostics of one decoded chromosome.
///
/// Cached by the evaluator keyed by the exact permutation; immutable once
/// written.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::FitnessRecord;
///
/// let rec = FitnessRecord::default();
/// assert!(rec.is_feasible());
/// assert_eq!(rec.num_routes(), 0);
/// assert_eq!(rec.total_unpacked(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    /// Scalar objective (lower is better).
    pub score: f64,
    /// Sum of route distances.
    pub total_distance: f64,
    /// Routes whose boxes did not all fit.
    pub infeasible_count: usize,
    /// Per-route diagnostics in decoding order.
    pub routes: Vec<RouteRecord>,
}

impl FitnessRecord {
    /// Returns `true` if every route packs completely.
    pub fn is_feasible(&self) -> bool {
        self.infeasible_count == 0
    }

    /// Number of routes.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Boxes left unpacked across all routes.
    pub fn total_unpacked(&self) -> usize {
        self.routes.iter().map(|r| r.evaluation.unpacked()).sum()
    }

    /// Routes whose evaluation came from an oracle fallback.
    pub fn degraded_routes(&self) -> usize {
        self.routes.iter().filter(|r| r.evaluation.degraded).count()
    }

    /// Total number of customers served.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(RouteRecord::len).sum()
    }

    /// Customer ids of all routes, concatenated in order.
    pub fn order(&self) -> Vec<usize> {
        self.routes
            .iter()
            .flat_map(|r| r.customers.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RouteEvaluation;

    fn record() -> FitnessRecord {
        FitnessRecord {
            score: 1e8 + 0.013,
            total_distance: 13.0,
            infeasible_count: 1,
            routes: vec![
                RouteRecord {
                    customers: vec![1, 2],
                    distance: 5.0,
                    evaluation: RouteEvaluation::from_counts(4, 4, 0.2),
                },
                RouteRecord {
                    customers: vec![3, 4],
                    distance: 8.0,
                    evaluation: RouteEvaluation::from_counts(10, 7, 0.5),
                },
            ],
        }
    }

    #[test]
    fn test_record_aggregates() {
        let rec = record();
        assert!(!rec.is_feasible());
        assert_eq!(rec.num_routes(), 2);
        assert_eq!(rec.total_unpacked(), 3);
        assert_eq!(rec.num_served(), 4);
        assert_eq!(rec.order(), vec![1, 2, 3, 4]);
        assert_eq!(rec.degraded_routes(), 0);
    }
}
