//! Fitness evaluation of customer permutations.
//!
//! - [`FitnessEvaluator`] — Decodes, packs each route, scores, memoizes
//! - [`EvaluatorConfig`] — Decoding policy, scoring weights, fallback, cache sizes
//! - [`FifoCache`] — Bounded thread-safe memo table

mod cache;
mod config;
mod fitness;

pub use cache::{CacheStats, FifoCache};
pub use config::EvaluatorConfig;
pub use fitness::{EvaluatorStats, FitnessEvaluator};
