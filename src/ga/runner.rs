//! Evolutionary loop.
//!
//! [`Optimizer`] drives the whole search:
//! initialization → evaluation → elitism + tournament/OX/swap → repeat.
//!
//! The global best is tracked across generations independently of the
//! current population, so the score history never increases.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::chromosome::Chromosome;
use super::config::GaConfig;
use super::operators::{order_crossover, swap_mutation, tournament_select};
use crate::error::RoutingError;
use crate::evaluation::{EvaluatorStats, FitnessEvaluator};
use crate::models::FitnessRecord;
use crate::oracle::PackingOracle;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Building the first population.
    Initializing,
    /// Scoring the current population.
    Evaluating,
    /// Building the next population.
    Reproducing,
    /// Run finished.
    Terminated,
}

/// Why a run stopped. Every variant reports the best found so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// All configured generations were evaluated.
    Completed,
    /// The wall-clock limit was reached.
    TimeLimit,
    /// No new global best for `stagnation_limit` generations.
    Stagnated,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Zero-based generation index.
    pub generation: usize,
    /// Global best score after this generation.
    pub best_score: f64,
    /// Best score within this generation's population.
    pub population_best: f64,
    /// Mean score of this generation's population.
    pub population_mean: f64,
    /// Chromosomes with every route feasible.
    pub feasible: usize,
}

/// Result of an optimization run.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// Best permutation ever evaluated.
    pub best_order: Vec<usize>,
    /// Its score.
    pub best_score: f64,
    /// Its per-route diagnostics.
    pub best_record: FitnessRecord,
    /// Global best score after each evaluated generation (non-increasing).
    pub history: Vec<f64>,
    /// Per-generation population statistics.
    pub generation_stats: Vec<GenerationStats>,
    /// Generations evaluated.
    pub generations: usize,
    /// Why the run stopped.
    pub termination: Termination,
    /// Evaluator counters at the end of the run.
    pub cache: EvaluatorStats,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

/// Genetic algorithm over customer permutations.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::evaluation::{EvaluatorConfig, FitnessEvaluator};
/// use u_cargo_routing::ga::{DecodePolicy, GaConfig, Optimizer};
/// use u_cargo_routing::models::{CargoBox, Container, Customer, Instance, Point};
/// use u_cargo_routing::oracle::ShelfOracle;
///
/// let customers: Vec<Customer> = (1..=6)
///     .map(|id| Customer::new(id, id as f64, (id % 3) as f64, 1).with_boxes(vec![id]))
///     .collect();
/// let boxes: Vec<CargoBox> = (1..=6).map(|id| CargoBox::new(id, 1.0, 1.0, 1.0)).collect();
/// let inst = Instance::new(
///     Container::new(2.0, 1.0, 1.0).unwrap(),
///     Point::new(0.0, 0.0),
///     customers,
///     boxes,
/// )
/// .unwrap();
///
/// let oracle = ShelfOracle::new();
/// let evaluator = FitnessEvaluator::new(
///     &inst,
///     &oracle,
///     EvaluatorConfig::default().with_policy(DecodePolicy::FixedSize { route_size: 2 }),
/// )
/// .unwrap();
///
/// let config = GaConfig::default().with_population_size(12).with_generations(15);
/// let result = Optimizer::new(&evaluator, config).unwrap().run_seeded(42).unwrap();
/// assert_eq!(result.history.len(), 15);
/// assert!(result.best_record.is_feasible());
/// ```
pub struct Optimizer<'e, 'a, O: PackingOracle> {
    evaluator: &'e FitnessEvaluator<'a, O>,
    config: GaConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'e, 'a, O: PackingOracle> Optimizer<'e, 'a, O> {
    /// Creates an optimizer after validating the configuration.
    pub fn new(
        evaluator: &'e FitnessEvaluator<'a, O>,
        config: GaConfig,
    ) -> Result<Self, RoutingError> {
        config.validate()?;
        Ok(Self {
            evaluator,
            config,
            cancel: None,
        })
    }

    /// Installs a cancellation flag, checked between generations.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs with [`GaConfig::seed`], or a random seed when unset.
    pub fn solve(&self) -> Result<OptimizationResult, RoutingError> {
        self.run_seeded(self.config.seed.unwrap_or_else(rand::random))
    }

    /// Runs with a `ChaCha8Rng` seeded from `seed`.
    ///
    /// Same seed and deterministic oracle give the same result.
    pub fn run_seeded(&self, seed: u64) -> Result<OptimizationResult, RoutingError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.run(&mut rng)
    }

    /// Runs the GA drawing every random decision from `rng`.
    ///
    /// At least one generation is always evaluated; cancellation and the
    /// time limit are checked before each later generation.
    #[instrument(level = "info", skip_all, fields(
        population = self.config.population_size,
        generations = self.config.generations,
    ))]
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<OptimizationResult, RoutingError> {
        let start = Instant::now();
        let mut phase = Phase::Initializing;
        let elite_count = self.config.elite_count();

        let mut population = self.initial_population(rng);
        let mut best: Option<(Vec<usize>, Arc<FitnessRecord>)> = None;
        let mut history = Vec::with_capacity(self.config.generations);
        let mut generation_stats = Vec::with_capacity(self.config.generations);
        let mut stagnation = 0usize;
        let mut termination = Termination::Completed;

        info!(elite_count, "optimization started");

        for generation in 0..self.config.generations {
            if generation > 0 {
                if let Some(reason) = self.should_stop(start) {
                    termination = reason;
                    break;
                }
            }

            transition(&mut phase, Phase::Evaluating);
            let records = self.evaluate_population(&population)?;
            for (c, rec) in population.iter_mut().zip(&records) {
                c.set_score(rec.score);
            }

            let mut improved = false;
            for (c, rec) in population.iter().zip(&records) {
                let better = best.as_ref().map_or(true, |(_, b)| rec.score < b.score);
                if better {
                    best = Some((c.genes().to_vec(), Arc::clone(rec)));
                    improved = true;
                }
            }
            let best_score = best.as_ref().map_or(f64::INFINITY, |(_, b)| b.score);
            history.push(best_score);

            let stats = generation_summary(generation, best_score, &records);
            debug!(
                generation,
                best_score,
                population_best = stats.population_best,
                feasible = stats.feasible,
                "generation evaluated"
            );
            generation_stats.push(stats);

            stagnation = if improved { 0 } else { stagnation + 1 };
            if self.config.stagnation_limit > 0 && stagnation >= self.config.stagnation_limit {
                termination = Termination::Stagnated;
                break;
            }
            if generation + 1 == self.config.generations {
                break;
            }

            transition(&mut phase, Phase::Reproducing);
            population = self.next_generation(&population, elite_count, rng);
        }

        transition(&mut phase, Phase::Terminated);

        let (best_order, best_record) = best.ok_or_else(|| {
            RoutingError::MissingInput("no generation was evaluated".into())
        })?;
        let result = OptimizationResult {
            best_score: best_record.score,
            best_order,
            best_record: (*best_record).clone(),
            generations: history.len(),
            history,
            generation_stats,
            termination,
            cache: self.evaluator.cache_stats(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            best_score = result.best_score,
            generations = result.generations,
            termination = ?result.termination,
            elapsed_ms = result.elapsed_ms,
            "optimization finished"
        );
        Ok(result)
    }

    /// `population_size - 2` shuffles plus the natural order and its reverse.
    fn initial_population<R: Rng>(&self, rng: &mut R) -> Vec<Chromosome> {
        let natural = self.evaluator.instance().customer_ids();
        let mut population: Vec<Chromosome> = (0..self.config.population_size - 2)
            .map(|_| {
                let mut genes = natural.clone();
                genes.shuffle(rng);
                Chromosome::new(genes)
            })
            .collect();
        let mut reversed = natural.clone();
        reversed.reverse();
        population.push(Chromosome::new(natural));
        population.push(Chromosome::new(reversed));
        population
    }

    fn next_generation<R: Rng>(
        &self,
        population: &[Chromosome],
        elite_count: usize,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        let scores: Vec<f64> = population.iter().map(Chromosome::score).collect();

        let mut ranked: Vec<usize> = (0..population.len()).collect();
        ranked.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

        let mut next: Vec<Chromosome> = ranked[..elite_count]
            .iter()
            .map(|&i| population[i].clone())
            .collect();

        while next.len() < self.config.population_size {
            let p1 = tournament_select(&scores, self.config.tournament_size, rng);
            let p2 = tournament_select(&scores, self.config.tournament_size, rng);

            let mut genes = if rng.random::<f64>() < self.config.crossover_rate {
                order_crossover(population[p1].genes(), population[p2].genes(), rng)
            } else {
                population[p1].genes().to_vec()
            };
            if rng.random::<f64>() < self.config.mutation_rate {
                swap_mutation(&mut genes, rng);
            }
            next.push(Chromosome::new(genes));
        }
        next
    }

    fn evaluate_population(
        &self,
        population: &[Chromosome],
    ) -> Result<Vec<Arc<FitnessRecord>>, RoutingError> {
        #[cfg(feature = "parallel")]
        let records = if self.config.parallel {
            use rayon::prelude::*;
            population
                .par_iter()
                .map(|c| self.evaluator.evaluate(c.genes()))
                .collect()
        } else {
            population
                .iter()
                .map(|c| self.evaluator.evaluate(c.genes()))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let records = population
            .iter()
            .map(|c| self.evaluator.evaluate(c.genes()))
            .collect();

        records
    }

    fn should_stop(&self, start: Instant) -> Option<Termination> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Some(Termination::Cancelled);
        }
        match self.config.time_limit_ms {
            Some(ms) if start.elapsed().as_millis() >= u128::from(ms) => {
                Some(Termination::TimeLimit)
            }
            _ => None,
        }
    }
}

fn transition(phase: &mut Phase, next: Phase) {
    if *phase != next {
        debug!(from = ?*phase, to = ?next, "phase transition");
        *phase = next;
    }
}

fn generation_summary(
    generation: usize,
    best_score: f64,
    records: &[Arc<FitnessRecord>],
) -> GenerationStats {
    let population_best = records
        .iter()
        .map(|r| r.score)
        .fold(f64::INFINITY, f64::min);
    let population_mean = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.score).sum::<f64>() / records.len() as f64
    };
    GenerationStats {
        generation,
        best_score,
        population_best,
        population_mean,
        feasible: records.iter().filter(|r| r.is_feasible()).count(),
    }
}
