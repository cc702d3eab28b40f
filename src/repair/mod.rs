//! Local repair of infeasible route partitions.
//!
//! A decoded solution can still leave boxes outside the container. Repair
//! moves customers between the routes of a [`RoutePlan`] until every route
//! packs or a budget runs out. By default every candidate is scored by
//! decoding the edited order again ([`RepairMode::Decoded`]), so the repaired
//! permutation reproduces the repaired routes.
//!
//! - [`Move`] / [`RoutePlan`] — Route edits and the partition they apply to
//! - [`Neighborhood`] / [`RepairConfig`] — Move families and budgets
//! - [`RepairEngine`] — First-improvement search over one neighborhood
//! - [`repair_sequence`] — Several neighborhoods chained in order

mod config;
mod engine;
mod neighborhood;
mod plan;

pub use config::{IsolationMode, Neighborhood, RepairConfig, RepairMode, WeightMetric};
pub use engine::{repair_sequence, RepairEngine, RepairOutcome, RepairTermination};
pub use plan::{Move, RoutePlan};
