//! Customer-order chromosome.
//!
//! A chromosome is one permutation of every customer id. Decoding it with a
//! [`DecodePolicy`](super::DecodePolicy) yields routes; its score is the
//! fitness of that decoding.

/// A permutation of customer ids together with its score.
///
/// Unevaluated chromosomes score `f64::INFINITY`. Lower score = better.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::ga::Chromosome;
///
/// let c = Chromosome::new(vec![3, 1, 2]);
/// assert_eq!(c.genes(), &[3, 1, 2]);
/// assert_eq!(c.score(), f64::INFINITY);
/// assert!(!c.is_evaluated());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    genes: Vec<usize>,
    score: f64,
}

impl Chromosome {
    /// Creates an unevaluated chromosome.
    pub fn new(genes: Vec<usize>) -> Self {
        Self {
            genes,
            score: f64::INFINITY,
        }
    }

    /// The customer order.
    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    /// Mutable access to the order. Resets the score.
    pub fn genes_mut(&mut self) -> &mut Vec<usize> {
        self.score = f64::INFINITY;
        &mut self.genes
    }

    /// Consumes the chromosome, returning its order.
    pub fn into_genes(self) -> Vec<usize> {
        self.genes
    }

    /// Current score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Records the score computed by the evaluator.
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Returns `true` once a finite score has been recorded.
    pub fn is_evaluated(&self) -> bool {
        self.score.is_finite()
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns true if the chromosome has no customers.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
