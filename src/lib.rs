//! # u-cargo-routing
//!
//! Packing-aware vehicle routing: a genetic algorithm searches customer
//! orders, a decoder splits each order into routes, and every route is
//! scored by whether its boxes fit one shared container.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Customer, CargoBox, Container, Instance, records)
//! - [`distance`] — Depot/customer distance matrix
//! - [`oracle`] — Packing oracle contract and a shelf-based reference packer
//! - [`ga`] — Chromosome, route decoder, operators, and the evolutionary loop
//! - [`evaluation`] — Memoized fitness evaluation
//! - [`repair`] — Local repair of routes that leave boxes unpacked
//!
//! ## Example
//!
//! ```
//! use u_cargo_routing::evaluation::{EvaluatorConfig, FitnessEvaluator};
//! use u_cargo_routing::ga::{DecodePolicy, GaConfig, Optimizer};
//! use u_cargo_routing::models::{CargoBox, Container, Customer, Instance, Point};
//! use u_cargo_routing::oracle::ShelfOracle;
//!
//! let customers: Vec<Customer> = (1..=6)
//!     .map(|id| Customer::new(id, id as f64, (id % 3) as f64, 1).with_boxes(vec![id]))
//!     .collect();
//! let boxes = (1..=6).map(|id| CargoBox::new(id, 1.0, 1.0, 1.0)).collect();
//! let instance = Instance::new(
//!     Container::new(2.0, 2.0, 1.0).unwrap(),
//!     Point::new(0.0, 0.0),
//!     customers,
//!     boxes,
//! )
//! .unwrap();
//!
//! let oracle = ShelfOracle::new();
//! let config = EvaluatorConfig::default().with_policy(DecodePolicy::FixedSize { route_size: 3 });
//! let evaluator = FitnessEvaluator::new(&instance, &oracle, config).unwrap();
//!
//! let ga = GaConfig::default().with_population_size(12).with_generations(10);
//! let result = Optimizer::new(&evaluator, ga).unwrap().run_seeded(7).unwrap();
//!
//! assert_eq!(result.best_order.len(), 6);
//! assert!(result.best_record.is_feasible());
//! ```

pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod models;
pub mod oracle;
pub mod repair;

pub use error::RoutingError;
