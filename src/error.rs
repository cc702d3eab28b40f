//! Error types shared by every stage of the optimization pipeline.

use crate::oracle::OracleError;

/// Errors raised while building an instance, evaluating chromosomes,
/// running the GA, or repairing a route plan.
///
/// Normal terminations (no improving move left, budget exhausted) are not
/// errors; they are reported through [`Termination`](crate::ga::Termination)
/// and [`RepairTermination`](crate::repair::RepairTermination).
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// The instance has nothing to route, or a required part is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Container extents are non-positive or non-finite.
    #[error("invalid container: length={length}, width={width}, height={height}")]
    InvalidContainer {
        /// Length extent.
        length: f64,
        /// Width extent.
        width: f64,
        /// Height extent.
        height: f64,
    },

    /// A box in the catalogue has a non-positive or non-finite dimension.
    #[error("invalid box {box_id}: dimensions must be positive and finite")]
    InvalidBox {
        /// Offending box id.
        box_id: usize,
    },

    /// Two customers share the same id.
    #[error("duplicate customer id {0}")]
    DuplicateCustomer(usize),

    /// Two catalogue entries share the same box id.
    #[error("duplicate box id {0}")]
    DuplicateBox(usize),

    /// A customer references a box id missing from the catalogue.
    #[error("customer {customer_id} references unknown box {box_id}")]
    UnknownBox {
        /// Customer owning the reference.
        customer_id: usize,
        /// Unresolved box id.
        box_id: usize,
    },

    /// An order handed to the evaluator is not a permutation of the
    /// instance's customer ids.
    #[error("invalid chromosome: {0}")]
    InvalidChromosome(String),

    /// A decoding policy lost, duplicated, or reordered a customer.
    ///
    /// This is an internal invariant failure: every downstream fitness value
    /// would be meaningless, so the run must abort.
    #[error("decoder invariant violated: {0}")]
    DecoderInvariant(String),

    /// The packing oracle failed on a route and the fallback policy is
    /// [`OracleFallback::Abort`](crate::oracle::OracleFallback::Abort).
    #[error("packing oracle degraded on route {route}: {source}")]
    Oracle {
        /// Index of the route whose box set was rejected.
        route: usize,
        /// Underlying oracle error.
        #[source]
        source: OracleError,
    },

    /// The oracle refused the container during the capability check.
    #[error("packing oracle unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),

    /// A repair move refers to routes or positions the plan does not have.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
