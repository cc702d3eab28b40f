//! Domain model types for packing-aware vehicle routing.
//!
//! Customers own boxes, every route shares one container, and an instance
//! ties them together with precomputed lookups. Evaluation records describe
//! how well each decoded route packs.

mod cargo;
mod customer;
mod instance;
mod route;
mod solution;

pub use cargo::{CargoBox, Container};
pub use customer::{Customer, Point};
pub use instance::{Instance, InstanceData};
pub use route::{RouteEvaluation, RouteRecord};
pub use solution::FitnessRecord;
