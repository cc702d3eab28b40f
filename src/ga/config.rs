//! GA configuration.
//!
//! [`GaConfig`] holds every parameter that controls the evolutionary loop.

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Configuration for the genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_cargo_routing::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 80);
/// assert_eq!(config.generations, 200);
/// assert_eq!(config.elite_count(), 4);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_cargo_routing::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(120)
///     .with_crossover_rate(0.8)
///     .with_mutation_rate(1.7)
///     .with_seed(7);
/// assert_eq!(config.mutation_rate, 1.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of chromosomes per generation.
    pub population_size: usize,

    /// Number of generations to evaluate.
    pub generations: usize,

    /// Probability of applying order crossover to a parent pair.
    ///
    /// Otherwise the first parent is cloned.
    pub crossover_rate: f64,

    /// Probability of applying swap mutation to an offspring.
    pub mutation_rate: f64,

    /// Candidates per tournament.
    pub tournament_size: usize,

    /// Fraction of the population copied unchanged to the next generation.
    pub elite_ratio: f64,

    /// Lower bound on the number of elites.
    pub min_elite: usize,

    /// Generations without a new global best before stopping.
    ///
    /// Set to 0 to disable (the default).
    pub stagnation_limit: usize,

    /// Optional wall-clock limit in milliseconds.
    ///
    /// Checked between generations, so a run may overshoot by one
    /// generation's worth of work. At least one generation always runs.
    pub time_limit_ms: Option<u64>,

    /// Evaluate the population with rayon when the `parallel` feature is on.
    pub parallel: bool,

    /// Seed for [`Optimizer::solve`](super::Optimizer::solve).
    ///
    /// `None` draws a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 80,
            generations: 200,
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            tournament_size: 3,
            elite_ratio: 0.05,
            min_elite: 4,
            stagnation_limit: 0,
            time_limit_ms: None,
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the tournament size (at least 1).
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k.max(1);
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the minimum elite count.
    pub fn with_min_elite(mut self, n: usize) -> Self {
        self.min_elite = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the seed used by [`Optimizer::solve`](super::Optimizer::solve).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick runs.
    ///
    /// - Population: 40, Generations: 100, Time limit: 10s
    /// - Stagnation limit: 20
    pub fn fast() -> Self {
        Self {
            population_size: 40,
            generations: 100,
            stagnation_limit: 20,
            time_limit_ms: Some(10_000),
            ..Self::default()
        }
    }

    /// Preset balancing quality and time.
    ///
    /// - Population: 80, Generations: 200, Time limit: 60s
    /// - Stagnation limit: 50
    pub fn balanced() -> Self {
        Self {
            stagnation_limit: 50,
            time_limit_ms: Some(60_000),
            ..Self::default()
        }
    }

    /// Preset for long runs.
    ///
    /// - Population: 150, Generations: 500, Time limit: 10min
    /// - Stagnation limit: 100
    pub fn quality() -> Self {
        Self {
            population_size: 150,
            generations: 500,
            stagnation_limit: 100,
            time_limit_ms: Some(600_000),
            ..Self::default()
        }
    }

    /// `max(min_elite, ⌊elite_ratio × population_size⌋)`, capped at the
    /// population size.
    pub fn elite_count(&self) -> usize {
        let by_ratio = (self.elite_ratio * self.population_size as f64) as usize;
        by_ratio.max(self.min_elite).min(self.population_size)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.population_size < 2 {
            return Err(RoutingError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if self.generations == 0 {
            return Err(RoutingError::InvalidConfig(
                "generations must be at least 1".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(RoutingError::InvalidConfig(
                "tournament_size must be at least 1".into(),
            ));
        }
        for (name, p) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("elite_ratio", self.elite_ratio),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(RoutingError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if self.elite_count() >= self.population_size {
            return Err(RoutingError::InvalidConfig(
                "elites fill the entire population".into(),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(RoutingError::InvalidConfig(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        Ok(())
    }
}
