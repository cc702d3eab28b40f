//! Evaluator configuration.

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::ga::DecodePolicy;
use crate::oracle::OracleFallback;

/// Settings of a [`FitnessEvaluator`](super::FitnessEvaluator).
///
/// The score of a chromosome with `k > 0` infeasible routes is
/// `penalty_factor × k + epsilon × total_distance`; with `k = 0` it is the
/// plain total distance. Validation keeps the two weights at least three
/// orders of magnitude apart so that fewer infeasible routes always wins.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::evaluation::EvaluatorConfig;
/// use u_cargo_routing::ga::DecodePolicy;
///
/// let config = EvaluatorConfig::default()
///     .with_policy(DecodePolicy::by_box_count())
///     .with_fitness_cache_capacity(10_000);
/// assert!(config.validate().is_ok());
/// assert!(config.with_weights(1.0, 1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Decoding policy.
    pub policy: DecodePolicy,
    /// Weight per infeasible route.
    pub penalty_factor: f64,
    /// Distance weight when some route is infeasible.
    pub epsilon: f64,
    /// Behaviour when the oracle fails on a route.
    pub fallback: OracleFallback,
    /// Permutation cache capacity (`0` = unbounded).
    pub fitness_cache_capacity: usize,
    /// Route cache capacity (`0` = unbounded).
    pub route_cache_capacity: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            policy: DecodePolicy::default(),
            penalty_factor: 1e8,
            epsilon: 1e-3,
            fallback: OracleFallback::Abort,
            fitness_cache_capacity: 100_000,
            route_cache_capacity: 100_000,
        }
    }
}

impl EvaluatorConfig {
    /// Sets the decoding policy.
    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the penalty factor and the distance weight.
    pub fn with_weights(mut self, penalty_factor: f64, epsilon: f64) -> Self {
        self.penalty_factor = penalty_factor;
        self.epsilon = epsilon;
        self
    }

    /// Sets the oracle fallback policy.
    pub fn with_fallback(mut self, fallback: OracleFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets the permutation cache capacity.
    pub fn with_fitness_cache_capacity(mut self, capacity: usize) -> Self {
        self.fitness_cache_capacity = capacity;
        self
    }

    /// Sets the route cache capacity.
    pub fn with_route_cache_capacity(mut self, capacity: usize) -> Self {
        self.route_cache_capacity = capacity;
        self
    }

    /// Validates the policy and the scoring weights.
    pub fn validate(&self) -> Result<(), RoutingError> {
        self.policy.validate()?;
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(RoutingError::InvalidConfig(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        if !self.penalty_factor.is_finite() || self.epsilon * 1e3 > self.penalty_factor {
            return Err(RoutingError::InvalidConfig(format!(
                "penalty_factor {} must exceed epsilon {} by at least 1e3",
                self.penalty_factor, self.epsilon
            )));
        }
        Ok(())
    }

    /// Scalar score from the infeasible route count and total distance.
    pub fn score(&self, infeasible_count: usize, total_distance: f64) -> f64 {
        if infeasible_count == 0 {
            total_distance
        } else {
            self.penalty_factor * infeasible_count as f64 + self.epsilon * total_distance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let c = EvaluatorConfig::default();
        assert_eq!(c.penalty_factor, 1e8);
        assert_eq!(c.epsilon, 1e-3);
        assert_eq!(c.fallback, OracleFallback::Abort);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_score() {
        let c = EvaluatorConfig::default();
        assert_eq!(c.score(0, 42.0), 42.0);
        assert!((c.score(2, 1000.0) - (2e8 + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let base = EvaluatorConfig::default();
        assert!(base.clone().with_weights(1e8, 0.0).validate().is_err());
        assert!(base.clone().with_weights(1e8, f64::NAN).validate().is_err());
        assert!(base.clone().with_weights(0.5, 1e-3).validate().is_err());
        assert!(base.clone().with_weights(1.0, 1e-3).validate().is_ok());
        assert!(base
            .with_policy(DecodePolicy::FixedSize { route_size: 0 })
            .validate()
            .is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let c: EvaluatorConfig = serde_json::from_str(
            r#"{"policy": {"kind": "fixed_size", "route_size": 5}, "fallback": "treat_as_unpacked"}"#,
        )
        .expect("valid");
        assert_eq!(c.policy, DecodePolicy::FixedSize { route_size: 5 });
        assert_eq!(c.fallback, OracleFallback::TreatAsUnpacked);
        assert_eq!(c.penalty_factor, 1e8);
    }
}
