//! First-improvement local search over route partitions.
//!
//! # Algorithm
//!
//! Each pass asks the configured [`Neighborhood`](super::Neighborhood) for
//! candidate moves and applies them one at a time to a copy of the plan. In
//! [`RepairMode::Decoded`] the edited routes are flattened and decoded again
//! with the evaluator's policy; in [`RepairMode::Partition`] only the routes
//! a move touches are re-evaluated. Route verdicts come from the evaluator's
//! route cache either way. The first move that strictly lowers the total
//! number of unpacked boxes is accepted and a new pass starts. The search
//! stops when the plan is feasible, a pass finds nothing, a budget runs out,
//! or the caller cancels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::config::{RepairConfig, RepairMode, WeightMetric};
use super::neighborhood::candidates;
use super::plan::RoutePlan;
use crate::error::RoutingError;
use crate::evaluation::FitnessEvaluator;
use crate::oracle::PackingOracle;

/// Why a repair run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairTermination {
    /// Every route packs completely.
    Feasible,
    /// A full pass found no improving move.
    NoImprovement,
    /// `max_moves` accepted moves reached.
    MoveBudget,
    /// `max_passes` scans reached.
    PassBudget,
    /// `time_limit_ms` reached.
    TimeBudget,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Result of a repair run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairOutcome {
    /// Repaired routes concatenated in order. In [`RepairMode::Decoded`]
    /// decoding it reproduces `routes`.
    pub order: Vec<usize>,
    /// Repaired routes, empty ones dropped.
    pub routes: Vec<Vec<usize>>,
    /// Unpacked boxes before the run.
    pub initial_unpacked: usize,
    /// Unpacked boxes after the run.
    pub final_unpacked: usize,
    /// Accepted moves.
    pub moves_applied: usize,
    /// Neighborhood scans started.
    pub passes: usize,
    /// Why the run stopped.
    pub termination: RepairTermination,
}

impl RepairOutcome {
    /// The repaired routes as a plan, ready for another repair stage.
    pub fn plan(&self) -> RoutePlan {
        RoutePlan::from_routes(self.routes.clone())
    }
}

/// Runs one neighborhood under one configuration.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::evaluation::{EvaluatorConfig, FitnessEvaluator};
/// use u_cargo_routing::ga::DecodePolicy;
/// use u_cargo_routing::models::{CargoBox, Container, Customer, Instance, Point};
/// use u_cargo_routing::oracle::ShelfOracle;
/// use u_cargo_routing::repair::{RepairConfig, RepairEngine, RepairTermination, RoutePlan};
///
/// // The container holds two unit cubes; customer 2 owns two of them.
/// let inst = Instance::new(
///     Container::new(2.0, 1.0, 1.0).unwrap(),
///     Point::new(0.0, 0.0),
///     vec![
///         Customer::new(1, 1.0, 0.0, 1).with_boxes(vec![1]),
///         Customer::new(2, 2.0, 0.0, 1).with_boxes(vec![2, 3]),
///         Customer::new(3, 3.0, 0.0, 1).with_boxes(vec![4]),
///     ],
///     (1..=4).map(|id| CargoBox::new(id, 1.0, 1.0, 1.0)).collect(),
/// )
/// .unwrap();
/// let oracle = ShelfOracle::new();
/// let config = EvaluatorConfig::default().with_policy(DecodePolicy::FixedSize { route_size: 2 });
/// let evaluator = FitnessEvaluator::new(&inst, &oracle, config).unwrap();
///
/// // [1, 2, 3] decodes to [[1, 2], [3]]; the first route carries three cubes
/// let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3]]);
/// let engine = RepairEngine::new(&evaluator, RepairConfig::relocation()).unwrap();
/// let outcome = engine.run(&plan).unwrap();
///
/// assert_eq!(outcome.initial_unpacked, 1);
/// assert_eq!(outcome.final_unpacked, 0);
/// assert_eq!(outcome.termination, RepairTermination::Feasible);
/// assert_eq!(outcome.order, vec![1, 3, 2]);
/// assert_eq!(outcome.routes, vec![vec![1, 3], vec![2]]);
/// assert!(evaluator.evaluate(&outcome.order).unwrap().is_feasible());
/// ```
pub struct RepairEngine<'e, 'a, O: PackingOracle> {
    evaluator: &'e FitnessEvaluator<'a, O>,
    config: RepairConfig,
}

impl<'e, 'a, O: PackingOracle> RepairEngine<'e, 'a, O> {
    /// Creates an engine after validating the configuration.
    pub fn new(
        evaluator: &'e FitnessEvaluator<'a, O>,
        config: RepairConfig,
    ) -> Result<Self, RoutingError> {
        config.validate()?;
        Ok(Self { evaluator, config })
    }

    /// Active configuration.
    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// Repairs `plan`.
    pub fn run(&self, plan: &RoutePlan) -> Result<RepairOutcome, RoutingError> {
        self.execute(plan, None)
    }

    /// Repairs `plan`, stopping early once `cancel` is raised.
    ///
    /// The flag is checked between passes and between candidate moves.
    pub fn run_with_cancel(
        &self,
        plan: &RoutePlan,
        cancel: &AtomicBool,
    ) -> Result<RepairOutcome, RoutingError> {
        self.execute(plan, Some(cancel))
    }

    #[instrument(level = "info", skip_all, fields(
        neighborhood = ?self.config.neighborhood,
        routes = plan.num_routes(),
    ))]
    fn execute(
        &self,
        plan: &RoutePlan,
        cancel: Option<&AtomicBool>,
    ) -> Result<RepairOutcome, RoutingError> {
        let start = Instant::now();
        let instance = self.evaluator.instance();
        instance.check_permutation(&plan.flatten())?;

        let weigh = |id: usize| match self.config.weight {
            WeightMetric::Volume => instance.cargo_volume(id),
            WeightMetric::BoxCount => instance.box_count(id) as f64,
        };

        let (mut plan, mut unpacked) = match self.config.mode {
            RepairMode::Decoded => self.decoded(&plan.flatten())?,
            RepairMode::Partition => {
                let unpacked = self.per_route(plan.routes())?;
                (plan.clone(), unpacked)
            }
        };
        let initial_unpacked: usize = unpacked.iter().sum();
        let mut current = initial_unpacked;
        let mut moves_applied = 0;
        let mut passes = 0;

        info!(initial_unpacked, "repair started");

        let termination = 'search: loop {
            if current == 0 {
                break RepairTermination::Feasible;
            }
            if let Some(reason) = self.interrupted(start, cancel) {
                break reason;
            }
            if self.config.max_moves.is_some_and(|m| moves_applied >= m) {
                break RepairTermination::MoveBudget;
            }
            if self.config.max_passes.is_some_and(|m| passes >= m) {
                break RepairTermination::PassBudget;
            }
            passes += 1;

            let mut accepted = false;
            for mv in candidates(&self.config.neighborhood, &plan, &unpacked, &weigh) {
                if let Some(reason) = self.interrupted(start, cancel) {
                    break 'search reason;
                }

                let mut trial = plan.clone();
                let touched = trial.apply(&mv)?;
                let (trial, trial_unpacked) = self.rescore(trial, &touched, &unpacked)?;
                let total: usize = trial_unpacked.iter().sum();

                if total < current {
                    current = total;
                    moves_applied += 1;
                    debug!(?mv, unpacked = current, "move accepted");
                    plan = trial;
                    unpacked = trial_unpacked;
                    accepted = true;
                    break;
                }
            }

            if !accepted {
                break RepairTermination::NoImprovement;
            }
        };

        info!(
            final_unpacked = current,
            moves_applied,
            passes,
            ?termination,
            "repair finished"
        );

        let routes = plan.compacted();
        Ok(RepairOutcome {
            order: routes.iter().flatten().copied().collect(),
            routes,
            initial_unpacked,
            final_unpacked: current,
            moves_applied,
            passes,
            termination,
        })
    }

    /// Routes `order` decodes to, with their unpacked counts.
    fn decoded(&self, order: &[usize]) -> Result<(RoutePlan, Vec<usize>), RoutingError> {
        let routes = self.evaluator.decoder().decode(order)?;
        let unpacked = routes
            .iter()
            .enumerate()
            .map(|(idx, route)| self.unpacked(idx, route))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((RoutePlan::from_decoded(&routes), unpacked))
    }

    fn per_route(&self, routes: &[Vec<usize>]) -> Result<Vec<usize>, RoutingError> {
        routes
            .iter()
            .enumerate()
            .map(|(idx, route)| self.unpacked(idx, route))
            .collect()
    }

    /// Plan and unpacked counts after a move edited `trial`.
    fn rescore(
        &self,
        trial: RoutePlan,
        touched: &[usize],
        unpacked: &[usize],
    ) -> Result<(RoutePlan, Vec<usize>), RoutingError> {
        match self.config.mode {
            RepairMode::Decoded => self.decoded(&trial.flatten()),
            RepairMode::Partition => {
                let mut next = unpacked.to_vec();
                next.resize(trial.num_routes(), 0);
                for &r in touched {
                    next[r] = self.unpacked(r, &trial.routes()[r])?;
                }
                Ok((trial, next))
            }
        }
    }

    fn unpacked(&self, idx: usize, route: &[usize]) -> Result<usize, RoutingError> {
        if route.is_empty() {
            return Ok(0);
        }
        Ok(self.evaluator.evaluate_route_at(idx, route)?.unpacked())
    }

    fn interrupted(&self, start: Instant, cancel: Option<&AtomicBool>) -> Option<RepairTermination> {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Some(RepairTermination::Cancelled);
        }
        match self.config.time_limit_ms {
            Some(ms) if start.elapsed().as_millis() >= u128::from(ms) => {
                Some(RepairTermination::TimeBudget)
            }
            _ => None,
        }
    }
}

/// Runs several repair stages in order, each starting from the previous
/// stage's routes.
///
/// Route indices in a stage's configuration (targeted relocation) refer to
/// the routes that stage starts from: the decoded routes of the previous
/// order in [`RepairMode::Decoded`], the previous routes with empty ones
/// dropped in [`RepairMode::Partition`].
pub fn repair_sequence<O: PackingOracle>(
    evaluator: &FitnessEvaluator<'_, O>,
    plan: &RoutePlan,
    stages: &[RepairConfig],
) -> Result<Vec<RepairOutcome>, RoutingError> {
    let mut current = plan.clone();
    let mut outcomes = Vec::with_capacity(stages.len());
    for config in stages {
        let outcome = RepairEngine::new(evaluator, config.clone())?.run(&current)?;
        current = outcome.plan();
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::EvaluatorConfig;
    use crate::ga::DecodePolicy;
    use crate::models::{CargoBox, Container, Customer, Instance, Point};
    use crate::oracle::{OracleError, PackingOutcome};
    use crate::repair::{IsolationMode, Neighborhood};

    /// Places at most `limit` boxes.
    struct CountOracle {
        limit: usize,
    }

    impl PackingOracle for CountOracle {
        fn pack(
            &self,
            _container: &Container,
            boxes: &[CargoBox],
        ) -> Result<PackingOutcome, OracleError> {
            let placed = boxes.len().min(self.limit);
            Ok(PackingOutcome {
                placements: vec![],
                packed_volume: placed as f64,
                placed_count: placed,
            })
        }
    }

    /// Customer `id` owns `counts[id - 1]` unit cubes; the container holds
    /// 1000 of them.
    fn instance(counts: &[usize]) -> Instance {
        let mut boxes = Vec::new();
        let mut customers = Vec::new();
        let mut next = 0;
        for (i, &n) in counts.iter().enumerate() {
            let owned: Vec<usize> = (next..next + n).collect();
            next += n;
            boxes.extend(owned.iter().map(|&b| CargoBox::new(b, 1.0, 1.0, 1.0)));
            customers.push(Customer::new(i + 1, i as f64, 0.0, 0).with_boxes(owned));
        }
        Instance::new(
            Container::new(10.0, 10.0, 10.0).expect("valid"),
            Point::new(0.0, 0.0),
            customers,
            boxes,
        )
        .expect("valid")
    }

    fn evaluator<'a>(
        inst: &'a Instance,
        oracle: &'a CountOracle,
    ) -> FitnessEvaluator<'a, CountOracle> {
        FitnessEvaluator::new(inst, oracle, EvaluatorConfig::default()).expect("valid")
    }

    fn evaluator_with<'a>(
        inst: &'a Instance,
        oracle: &'a CountOracle,
        policy: DecodePolicy,
    ) -> FitnessEvaluator<'a, CountOracle> {
        let config = EvaluatorConfig::default().with_policy(policy);
        FitnessEvaluator::new(inst, oracle, config).expect("valid")
    }

    fn partition(config: RepairConfig) -> RepairConfig {
        config.with_mode(RepairMode::Partition)
    }

    fn run(
        ev: &FitnessEvaluator<'_, CountOracle>,
        config: RepairConfig,
        plan: &RoutePlan,
    ) -> RepairOutcome {
        RepairEngine::new(ev, config).expect("valid").run(plan).expect("runs")
    }

    /// The outcome's order must score exactly as the engine reported.
    fn assert_decodes_to_outcome(ev: &FitnessEvaluator<'_, CountOracle>, out: &RepairOutcome) {
        let record = ev.evaluate(&out.order).expect("evaluates");
        assert_eq!(record.total_unpacked(), out.final_unpacked);
        let decoded = ev.decoder().decode(&out.order).expect("decodes");
        assert_eq!(decoded.to_vecs(), out.routes);
    }

    #[test]
    fn test_decoded_swap_survives_redecoding() {
        // [1,2] = 4+4 = 8 > 6; swapping 1 and 3 gives 5, 5, 2
        let inst = instance(&[4, 4, 1, 1, 1, 1]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator_with(&inst, &oracle, DecodePolicy::FixedSize { route_size: 2 });
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);

        let out = run(&ev, RepairConfig::pairwise_swap(), &plan);
        assert_eq!(out.initial_unpacked, 2);
        assert_eq!(out.final_unpacked, 0);
        assert_eq!(out.order, vec![3, 2, 1, 4, 5, 6]);
        assert_eq!(out.termination, RepairTermination::Feasible);
        assert_decodes_to_outcome(&ev, &out);
    }

    #[test]
    fn test_decoded_isolation_is_scored_on_the_order() {
        let inst = instance(&[4, 4, 1, 1, 1, 1]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator_with(&inst, &oracle, DecodePolicy::FixedSize { route_size: 2 });
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);

        // moving 1 and 2 to the back only rebuilds the same overloaded pair
        let out = run(&ev, RepairConfig::isolation(), &plan);
        assert_eq!(out.final_unpacked, 2);
        assert_eq!(out.order, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(out.termination, RepairTermination::NoImprovement);
        assert_decodes_to_outcome(&ev, &out);

        // moving 1 alone shifts every pair by one
        let single = RepairConfig {
            neighborhood: Neighborhood::Isolation {
                mode: IsolationMode::Single,
            },
            ..RepairConfig::isolation()
        };
        let out = run(&ev, single, &plan);
        assert_eq!(out.final_unpacked, 0);
        assert_eq!(out.order, vec![2, 3, 4, 5, 6, 1]);
        assert_eq!(out.routes, vec![vec![2, 3], vec![4, 5], vec![6, 1]]);
        assert_decodes_to_outcome(&ev, &out);
    }

    #[test]
    fn test_decoded_input_routes_are_redecoded() {
        // explicit routes that differ from what the policy builds
        let inst = instance(&[4, 4, 1, 1]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator_with(&inst, &oracle, DecodePolicy::FixedSize { route_size: 2 });
        let plan = RoutePlan::from_routes(vec![vec![1], vec![2, 3, 4]]);

        let out = RepairEngine::new(&ev, RepairConfig::pairwise_swap())
            .expect("valid")
            .run_with_cancel(&plan, &AtomicBool::new(true))
            .expect("runs");
        assert_eq!(out.initial_unpacked, 2);
        assert_eq!(out.routes, vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(out.termination, RepairTermination::Cancelled);
    }

    #[test]
    fn test_repaired_order_reproduces_final_unpacked_for_every_policy() {
        let inst = instance(&[5, 3, 4, 1, 2, 6, 1, 3, 2, 4]);
        let oracle = CountOracle { limit: 6 };
        let policies = [
            DecodePolicy::FixedSize { route_size: 3 },
            DecodePolicy::VariableByBoxCount {
                max_boxes_per_route: 9,
            },
            // 9 unit cubes of the 1000-cube container
            DecodePolicy::VariableByVolume {
                volume_limit_factor: 0.009,
            },
        ];
        let configs = [
            RepairConfig::relocation(),
            RepairConfig::pairwise_swap(),
            RepairConfig::two_for_one().with_max_passes(20),
            RepairConfig::isolation(),
            RepairConfig {
                neighborhood: Neighborhood::Isolation {
                    mode: IsolationMode::Single,
                },
                ..RepairConfig::isolation()
            },
            RepairConfig::targeted_relocation(vec![0, 1, 2]),
        ];

        let ids = inst.customer_ids();
        for policy in policies {
            let ev = evaluator_with(&inst, &oracle, policy);
            let start = ev.evaluate(&ids).expect("evaluates").total_unpacked();
            let plan = RoutePlan::from_decoded(&ev.decoder().decode(&ids).expect("decodes"));
            for config in &configs {
                let out = run(&ev, config.clone(), &plan);
                assert_eq!(out.initial_unpacked, start, "{policy:?} {config:?}");
                assert!(out.final_unpacked <= start, "{policy:?} {config:?}");
                assert_decodes_to_outcome(&ev, &out);
            }
        }
    }

    #[test]
    fn test_isolation_moves_two_heaviest() {
        // route [1,2,3,4] carries 3+2+1+1 = 7 boxes against a limit of 5
        let inst = instance(&[3, 2, 1, 1, 1]);
        let oracle = CountOracle { limit: 5 };
        let ev = evaluator(&inst, &oracle);
        let plan = RoutePlan::from_routes(vec![vec![1, 2, 3, 4], vec![5]]);

        let out = run(&ev, partition(RepairConfig::isolation()), &plan);
        assert_eq!(out.initial_unpacked, 2);
        assert_eq!(out.final_unpacked, 0);
        assert_eq!(out.moves_applied, 1);
        assert_eq!(out.routes, vec![vec![3, 4], vec![5], vec![1], vec![2]]);
        assert_eq!(out.order.len(), 5);
        assert_eq!(out.termination, RepairTermination::Feasible);
        let record = ev.evaluate_routes(&out.routes).expect("verifies");
        assert_eq!(record.total_unpacked(), 0);
    }

    #[test]
    fn test_single_isolation_iterates() {
        let inst = instance(&[3, 2, 1, 1]);
        let oracle = CountOracle { limit: 3 };
        let ev = evaluator(&inst, &oracle);
        let plan = RoutePlan::from_routes(vec![vec![1, 2, 3, 4]]);

        let config = RepairConfig {
            neighborhood: Neighborhood::Isolation {
                mode: IsolationMode::Single,
            },
            ..partition(RepairConfig::isolation())
        };
        let out = run(&ev, config, &plan);
        // 7 boxes against 3: customer 1 goes first, then customer 2
        assert_eq!(out.final_unpacked, 0);
        assert_eq!(out.routes, vec![vec![3, 4], vec![1], vec![2]]);
        assert_eq!(out.moves_applied, 2);
    }

    #[test]
    fn test_swap_fixes_overloaded_route() {
        // [1,2] = 4+4 = 8 > 6, [3,4] = 1+1; swapping 1 and 3 gives 5 and 5
        let inst = instance(&[4, 4, 1, 1]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator(&inst, &oracle);
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3, 4]]);

        let out = run(&ev, partition(RepairConfig::pairwise_swap()), &plan);
        assert_eq!(out.final_unpacked, 0);
        assert_eq!(out.routes, vec![vec![3, 2], vec![1, 4]]);
        assert_eq!(out.termination, RepairTermination::Feasible);
    }

    #[test]
    fn test_two_for_one() {
        // [1,2,3] = 3+1+3 = 7 > 5; giving 1 and 2 for 4 leaves 4 and 4
        let inst = instance(&[3, 1, 3, 1]);
        let oracle = CountOracle { limit: 5 };
        let ev = evaluator(&inst, &oracle);
        let plan = RoutePlan::from_routes(vec![vec![1, 2, 3], vec![4]]);

        let out = run(&ev, partition(RepairConfig::two_for_one()), &plan);
        assert_eq!(out.initial_unpacked, 2);
        assert_eq!(out.routes, vec![vec![3, 4], vec![1, 2]]);
        assert_eq!(out.termination, RepairTermination::Feasible);
    }

    #[test]
    fn test_no_improvement_terminates() {
        // a single overloaded customer cannot be helped
        let inst = instance(&[9, 1]);
        let oracle = CountOracle { limit: 5 };
        let ev = evaluator(&inst, &oracle);
        let plan = RoutePlan::from_routes(vec![vec![1], vec![2]]);

        let out = run(&ev, partition(RepairConfig::pairwise_swap()), &plan);
        assert_eq!(out.termination, RepairTermination::NoImprovement);
        assert_eq!(out.final_unpacked, 4);
        assert_eq!(out.moves_applied, 0);
        assert_eq!(out.passes, 1);
    }

    #[test]
    fn test_cancelled_before_first_pass() {
        let inst = instance(&[4, 4, 1, 1]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator(&inst, &oracle);
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3, 4]]);
        let flag = AtomicBool::new(true);

        let out = RepairEngine::new(&ev, partition(RepairConfig::pairwise_swap()))
            .expect("valid")
            .run_with_cancel(&plan, &flag)
            .expect("runs");
        assert_eq!(out.termination, RepairTermination::Cancelled);
        assert_eq!(out.routes, plan.routes());
    }

    #[test]
    fn test_rejects_plan_that_is_not_a_partition() {
        let inst = instance(&[1, 1, 1]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator(&inst, &oracle);
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![2]]);
        for config in [RepairConfig::isolation(), partition(RepairConfig::isolation())] {
            assert!(RepairEngine::new(&ev, config).expect("valid").run(&plan).is_err());
        }
    }

    #[test]
    fn test_sequence_feeds_previous_plan() {
        let inst = instance(&[4, 4, 1, 1, 6]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator(&inst, &oracle);
        // one relocation, then isolation finishes the job
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3], vec![4, 5]]);

        let outcomes = repair_sequence(
            &ev,
            &plan,
            &[
                partition(RepairConfig::relocation()),
                partition(RepairConfig::isolation()),
            ],
        )
        .expect("runs");
        assert_eq!(outcomes.len(), 2);
        let last = outcomes.last().expect("two stages");
        assert_eq!(last.final_unpacked, 0);
        assert_eq!(outcomes[0].moves_applied, 1);
        assert_eq!(outcomes[1].initial_unpacked, outcomes[0].final_unpacked);

        let record = ev.evaluate_routes(&last.routes).expect("verifies");
        assert!(record.is_feasible());
    }

    #[test]
    fn test_decoded_sequence_keeps_order_stable() {
        let inst = instance(&[4, 4, 1, 1, 1, 1]);
        let oracle = CountOracle { limit: 6 };
        let ev = evaluator_with(&inst, &oracle, DecodePolicy::FixedSize { route_size: 2 });
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);

        let outcomes = repair_sequence(
            &ev,
            &plan,
            &[RepairConfig::isolation(), RepairConfig::pairwise_swap()],
        )
        .expect("runs");
        assert_eq!(outcomes[0].final_unpacked, 2);
        assert_eq!(outcomes[1].initial_unpacked, 2);
        assert_eq!(outcomes[1].final_unpacked, 0);
        for out in &outcomes {
            assert_decodes_to_outcome(&ev, out);
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn configs() -> impl Strategy<Value = RepairConfig> {
            prop_oneof![
                Just(RepairConfig::relocation()),
                Just(RepairConfig::pairwise_swap()),
                Just(RepairConfig::two_for_one().with_max_passes(20)),
                Just(RepairConfig::isolation()),
                Just(RepairConfig::targeted_relocation(vec![0, 1, 2])),
            ]
        }

        fn policies() -> impl Strategy<Value = DecodePolicy> {
            prop_oneof![
                (1usize..4).prop_map(|route_size| DecodePolicy::FixedSize { route_size }),
                (1usize..10).prop_map(|max_boxes_per_route| DecodePolicy::VariableByBoxCount {
                    max_boxes_per_route
                }),
                (1usize..10).prop_map(|cubes| DecodePolicy::VariableByVolume {
                    volume_limit_factor: cubes as f64 / 1000.0
                }),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(48))]

            #[test]
            fn repair_never_loses_customers(
                counts in prop::collection::vec(0usize..5, 4..9),
                cut in 1usize..4,
                config in configs(),
                policy in policies(),
                decoded in any::<bool>(),
            ) {
                let inst = instance(&counts);
                let oracle = CountOracle { limit: 6 };
                let ev = evaluator_with(&inst, &oracle, policy);
                let ids = inst.customer_ids();
                let routes: Vec<Vec<usize>> = ids.chunks(cut).map(<[usize]>::to_vec).collect();
                let plan = RoutePlan::from_routes(routes);
                let mode = if decoded { RepairMode::Decoded } else { RepairMode::Partition };

                let out = run(&ev, config.with_mode(mode), &plan);
                let mut sorted = out.order.clone();
                sorted.sort_unstable();
                prop_assert_eq!(sorted, ids);
                prop_assert!(out.final_unpacked <= out.initial_unpacked);

                let by_routes = ev.evaluate_routes(&out.routes).expect("verifies");
                prop_assert_eq!(by_routes.total_unpacked(), out.final_unpacked);
                if decoded {
                    let by_order = ev.evaluate(&out.order).expect("evaluates");
                    prop_assert_eq!(by_order.total_unpacked(), out.final_unpacked);
                }
            }
        }
    }
}
