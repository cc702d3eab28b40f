//! Fitness evaluator: decode, pack, score, memoize.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace, warn};

use super::cache::{CacheStats, FifoCache};
use super::config::EvaluatorConfig;
use crate::error::RoutingError;
use crate::ga::RouteDecoder;
use crate::models::{CargoBox, FitnessRecord, Instance, RouteEvaluation, RouteRecord};
use crate::oracle::{OracleFallback, PackingOracle};

/// Counters of both evaluator caches plus oracle invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorStats {
    /// Permutation → fitness record cache.
    pub fitness: CacheStats,
    /// Route sequence → packing verdict cache.
    pub routes: CacheStats,
    /// Oracle calls made so far.
    pub oracle_calls: u64,
}

/// Scores customer permutations against a packing oracle.
///
/// Each route of the decoded permutation is handed to the oracle with its
/// customers' boxes concatenated in visit order. A route is feasible when
/// every box is placed; routes without boxes skip the oracle.
///
/// Results are memoized twice: by exact permutation and by exact route
/// sequence. Both caches are bounded and safe to share across threads.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::evaluation::{EvaluatorConfig, FitnessEvaluator};
/// use u_cargo_routing::ga::DecodePolicy;
/// use u_cargo_routing::models::{CargoBox, Container, Customer, Instance, Point};
/// use u_cargo_routing::oracle::ShelfOracle;
///
/// let inst = Instance::new(
///     Container::new(2.0, 2.0, 2.0).unwrap(),
///     Point::new(0.0, 0.0),
///     vec![
///         Customer::new(1, 3.0, 4.0, 1).with_boxes(vec![1]),
///         Customer::new(2, 3.0, -4.0, 1).with_boxes(vec![2]),
///     ],
///     vec![CargoBox::new(1, 1.0, 1.0, 1.0), CargoBox::new(2, 1.0, 1.0, 1.0)],
/// )
/// .unwrap();
///
/// let oracle = ShelfOracle::new();
/// let config = EvaluatorConfig::default().with_policy(DecodePolicy::FixedSize { route_size: 1 });
/// let evaluator = FitnessEvaluator::new(&inst, &oracle, config).unwrap();
///
/// let record = evaluator.evaluate(&[1, 2]).unwrap();
/// assert!(record.is_feasible());
/// assert!((record.score - 20.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct FitnessEvaluator<'a, O: PackingOracle> {
    instance: &'a Instance,
    oracle: &'a O,
    config: EvaluatorConfig,
    decoder: RouteDecoder<'a>,
    fitness_cache: FifoCache<Vec<usize>, Arc<FitnessRecord>>,
    route_cache: FifoCache<Vec<usize>, RouteEvaluation>,
    oracle_calls: AtomicU64,
}

impl<'a, O: PackingOracle> FitnessEvaluator<'a, O> {
    /// Creates an evaluator.
    ///
    /// Validates the configuration and asks the oracle whether it can work
    /// with the instance's container.
    #[instrument(level = "debug", skip_all, fields(customers = instance.num_customers()))]
    pub fn new(
        instance: &'a Instance,
        oracle: &'a O,
        config: EvaluatorConfig,
    ) -> Result<Self, RoutingError> {
        config.validate()?;
        oracle.check_capability(instance.container())?;
        let decoder = RouteDecoder::new(config.policy, instance)?;

        Ok(Self {
            instance,
            oracle,
            decoder,
            fitness_cache: FifoCache::new(config.fitness_cache_capacity),
            route_cache: FifoCache::new(config.route_cache_capacity),
            oracle_calls: AtomicU64::new(0),
            config,
        })
    }

    /// The instance being evaluated.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Active configuration.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// The decoder built from the configured policy.
    pub fn decoder(&self) -> &RouteDecoder<'a> {
        &self.decoder
    }

    /// Scores a permutation of the instance's customer ids.
    ///
    /// Identical permutations return the same shared record.
    pub fn evaluate(&self, order: &[usize]) -> Result<Arc<FitnessRecord>, RoutingError> {
        if let Some(hit) = self.fitness_cache.get(order) {
            trace!(score = hit.score, "fitness cache hit");
            return Ok(hit);
        }

        self.instance.check_permutation(order)?;
        let routes = self.decoder.decode(order)?;
        let record = Arc::new(self.score_routes(routes.iter())?);
        // degraded verdicts are retried on the next request
        if record.degraded_routes() == 0 {
            self.fitness_cache.insert(order.to_vec(), Arc::clone(&record));
        }
        Ok(record)
    }

    /// Scores an explicit route partition.
    ///
    /// The routes together must form a permutation of the customer ids.
    /// Empty routes are ignored.
    #[instrument(level = "debug", skip_all, fields(routes = routes.len()))]
    pub fn evaluate_routes(&self, routes: &[Vec<usize>]) -> Result<FitnessRecord, RoutingError> {
        let flat: Vec<usize> = routes.iter().flatten().copied().collect();
        self.instance.check_permutation(&flat)?;
        self.score_routes(routes.iter().filter(|r| !r.is_empty()).map(Vec::as_slice))
    }

    /// Packing verdict of one route, through the route cache.
    pub fn evaluate_route(&self, route: &[usize]) -> Result<RouteEvaluation, RoutingError> {
        self.evaluate_route_at(0, route)
    }

    /// Depot → route → depot distance. Zero for an empty route.
    ///
    /// Unknown customer ids are skipped.
    pub fn route_distance(&self, route: &[usize]) -> f64 {
        let nodes: Vec<usize> = route.iter().filter_map(|&id| self.instance.node(id)).collect();
        self.instance.distances().tour_length(&nodes)
    }

    /// Cache and oracle counters.
    pub fn cache_stats(&self) -> EvaluatorStats {
        EvaluatorStats {
            fitness: self.fitness_cache.stats(),
            routes: self.route_cache.stats(),
            oracle_calls: self.oracle_calls.load(Ordering::Relaxed),
        }
    }

    /// Drops every memoized result.
    pub fn clear_caches(&self) {
        self.fitness_cache.clear();
        self.route_cache.clear();
    }

    /// Route evaluation tagged with the route's position for error reports.
    pub(crate) fn evaluate_route_at(
        &self,
        index: usize,
        route: &[usize],
    ) -> Result<RouteEvaluation, RoutingError> {
        let mut total = 0;
        for &id in route {
            if self.instance.position(id).is_none() {
                return Err(RoutingError::InvalidChromosome(format!(
                    "unknown customer id {id}"
                )));
            }
            total += self.instance.box_count(id);
        }
        if total == 0 {
            return Ok(RouteEvaluation::empty());
        }
        if let Some(hit) = self.route_cache.get(route) {
            trace!(route = index, "route cache hit");
            return Ok(hit);
        }

        let mut boxes: Vec<CargoBox> = Vec::with_capacity(total);
        for &id in route {
            boxes.extend(self.instance.boxes_of(id));
        }

        self.oracle_calls.fetch_add(1, Ordering::Relaxed);
        let container = self.instance.container();
        let outcome = self
            .oracle
            .pack(container, &boxes)
            .and_then(|out| out.validate(boxes.len()).map(|()| out));

        match outcome {
            Ok(out) => {
                let fill_rate = if out.placed_count == 0 {
                    0.0
                } else {
                    out.packed_volume / container.volume()
                };
                let eval = RouteEvaluation::from_counts(boxes.len(), out.placed_count, fill_rate);
                self.route_cache.insert(route.to_vec(), eval);
                Ok(eval)
            }
            Err(source) => match self.config.fallback {
                OracleFallback::Abort => Err(RoutingError::Oracle {
                    route: index,
                    source,
                }),
                OracleFallback::TreatAsUnpacked => {
                    warn!(route = index, error = %source, "oracle failed, route counted as unpacked");
                    Ok(RouteEvaluation::degraded(boxes.len()))
                }
            },
        }
    }

    fn score_routes<'r>(
        &self,
        routes: impl Iterator<Item = &'r [usize]>,
    ) -> Result<FitnessRecord, RoutingError> {
        let mut record = FitnessRecord::default();
        for (index, route) in routes.enumerate() {
            let evaluation = self.evaluate_route_at(index, route)?;
            let distance = self.route_distance(route);
            record.total_distance += distance;
            if !evaluation.feasible {
                record.infeasible_count += 1;
            }
            record.routes.push(RouteRecord {
                customers: route.to_vec(),
                distance,
                evaluation,
            });
        }
        record.score = self
            .config
            .score(record.infeasible_count, record.total_distance);
        Ok(record)
    }
}
