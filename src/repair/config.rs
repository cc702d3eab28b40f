//! Repair configuration.

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// How much a customer "weighs" when picking move candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMetric {
    /// Total volume of the customer's boxes.
    #[default]
    Volume,
    /// Number of boxes the customer owns.
    BoxCount,
}

/// How many customers an isolation move pulls out of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationMode {
    /// As many heaviest customers as the route has unpacked boxes.
    #[default]
    Unpacked,
    /// Only the single heaviest customer.
    Single,
}

/// What a candidate move is scored on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairMode {
    /// Flatten the edited routes and decode them again with the evaluator's
    /// policy. Routes between moves are always the decoded ones, so the
    /// outcome's `order` decodes back to the outcome's `routes`.
    #[default]
    Decoded,
    /// Score the edited routes as they stand. The outcome's `order` is not
    /// guaranteed to decode back to the same routes; verify it with
    /// [`FitnessEvaluator::evaluate_routes`](crate::evaluation::FitnessEvaluator::evaluate_routes).
    Partition,
}

/// Candidate moves explored by the repair engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Neighborhood {
    /// One customer from an infeasible route to the end of a feasible one.
    Relocation,
    /// Exchange between an infeasible route and any other route, among each
    /// route's `top_k` heaviest customers.
    PairwiseSwap {
        /// Candidates per route.
        top_k: usize,
    },
    /// Two customers of an infeasible route for one of another route.
    TwoForOne,
    /// Heaviest customers of an infeasible route into new singleton routes.
    Isolation {
        /// How many customers one move isolates.
        mode: IsolationMode,
    },
    /// Relocation restricted to a subset of routes, trying the `top_k`
    /// heaviest customers and preferring targets with fewer unpacked boxes.
    TargetedRelocation {
        /// Route indices the search may touch.
        routes: Vec<usize>,
        /// Candidates per source route.
        top_k: usize,
    },
}

/// Parameters of one [`RepairEngine`](super::RepairEngine) run.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::repair::{Neighborhood, RepairConfig, WeightMetric};
///
/// let config = RepairConfig::pairwise_swap()
///     .with_weight(WeightMetric::BoxCount)
///     .with_max_moves(50);
/// assert_eq!(config.neighborhood, Neighborhood::PairwiseSwap { top_k: 6 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Move family.
    pub neighborhood: Neighborhood,
    /// What moves are scored on.
    #[serde(default)]
    pub mode: RepairMode,
    /// Candidate ordering metric.
    #[serde(default)]
    pub weight: WeightMetric,
    /// Stop after this many accepted moves.
    #[serde(default)]
    pub max_moves: Option<usize>,
    /// Stop after this many neighborhood scans.
    #[serde(default)]
    pub max_passes: Option<usize>,
    /// Stop after this many milliseconds.
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self::pairwise_swap()
    }
}

impl RepairConfig {
    fn with_neighborhood(neighborhood: Neighborhood) -> Self {
        Self {
            neighborhood,
            mode: RepairMode::Decoded,
            weight: WeightMetric::Volume,
            max_moves: None,
            max_passes: None,
            time_limit_ms: None,
        }
    }

    /// Single relocation: stops at the first accepted move.
    pub fn relocation() -> Self {
        Self::with_neighborhood(Neighborhood::Relocation).with_max_moves(1)
    }

    /// Pairwise swap among the 6 heaviest customers, up to 200 swaps or
    /// ten minutes.
    pub fn pairwise_swap() -> Self {
        Self {
            max_moves: Some(200),
            time_limit_ms: Some(600_000),
            ..Self::with_neighborhood(Neighborhood::PairwiseSwap { top_k: 6 })
        }
    }

    /// Two-for-one exchange, up to 2000 scans.
    pub fn two_for_one() -> Self {
        Self {
            max_passes: Some(2000),
            ..Self::with_neighborhood(Neighborhood::TwoForOne)
        }
    }

    /// Isolation in [`IsolationMode::Unpacked`] mode.
    pub fn isolation() -> Self {
        Self::with_neighborhood(Neighborhood::Isolation {
            mode: IsolationMode::Unpacked,
        })
    }

    /// Targeted relocation over `routes`, top 4 candidates, up to 200 scans.
    pub fn targeted_relocation(routes: Vec<usize>) -> Self {
        Self {
            max_passes: Some(200),
            ..Self::with_neighborhood(Neighborhood::TargetedRelocation { routes, top_k: 4 })
        }
    }

    /// Sets what moves are scored on.
    pub fn with_mode(mut self, mode: RepairMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the weight metric.
    pub fn with_weight(mut self, weight: WeightMetric) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the accepted-move budget.
    pub fn with_max_moves(mut self, n: usize) -> Self {
        self.max_moves = Some(n);
        self
    }

    /// Sets the scan budget.
    pub fn with_max_passes(mut self, n: usize) -> Self {
        self.max_passes = Some(n);
        self
    }

    /// Sets the wall-clock budget in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Removes every budget.
    pub fn unbounded(mut self) -> Self {
        self.max_moves = None;
        self.max_passes = None;
        self.time_limit_ms = None;
        self
    }

    /// Validates budgets and neighborhood parameters.
    pub fn validate(&self) -> Result<(), RoutingError> {
        match &self.neighborhood {
            Neighborhood::PairwiseSwap { top_k } | Neighborhood::TargetedRelocation { top_k, .. }
                if *top_k == 0 =>
            {
                return Err(RoutingError::InvalidConfig("top_k must be at least 1".into()));
            }
            Neighborhood::TargetedRelocation { routes, .. } if routes.len() < 2 => {
                return Err(RoutingError::InvalidConfig(
                    "targeted relocation needs at least two routes".into(),
                ));
            }
            _ => {}
        }
        if self.max_moves == Some(0) || self.max_passes == Some(0) {
            return Err(RoutingError::InvalidConfig(
                "move and pass budgets must be positive or None".into(),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(RoutingError::InvalidConfig(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        Ok(())
    }
}
