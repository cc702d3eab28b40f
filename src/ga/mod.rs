//! Genetic algorithm over customer orders.
//!
//! - [`Chromosome`] — Permutation of every customer id plus its score
//! - [`DecodePolicy`] / [`RouteDecoder`] — Split a permutation into routes
//! - [`order_crossover`], [`swap_mutation`], [`tournament_select`] — Operators
//! - [`GaConfig`] — Loop parameters and presets
//! - [`Optimizer`] — The evolutionary loop

mod chromosome;
mod config;
pub mod decoder;
mod operators;
mod runner;

pub use chromosome::Chromosome;
pub use config::GaConfig;
pub use decoder::{DecodePolicy, DecodedRoutes, RouteDecoder};
pub use operators::{order_crossover, order_crossover_at, swap_mutation, tournament_select};
pub use runner::{GenerationStats, OptimizationResult, Optimizer, Phase, Termination};
