//! Packing oracle interface.
//!
//! The oracle is the external capability that judges whether a route's boxes
//! fit the shared container. The optimization engine depends only on the
//! [`PackingOracle`] contract; [`ShelfOracle`] is a simple deterministic
//! implementation for baselines and tests.
//!
//! - [`PackingOracle`] — Packing contract (deterministic, thread-safe)
//! - [`PackingOutcome`] — Placements, packed volume, placed count
//! - [`OracleFallback`] — Caller-selected behaviour when the oracle fails
//! - [`ShelfOracle`] — Shelf/layer reference packer

mod shelf;
mod types;

pub use shelf::ShelfOracle;
pub use types::{OracleError, OracleFallback, PackingOracle, PackingOutcome, Placement};
