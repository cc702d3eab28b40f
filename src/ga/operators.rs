//! Permutation operators for customer-order chromosomes.
//!
//! - [`order_crossover`] (OX): keeps a segment of parent A, fills the rest in
//!   parent B's relative order
//! - [`swap_mutation`]: exchanges two distinct positions
//! - [`tournament_select`]: best of `k` candidates drawn with replacement
//!
//! Ids are arbitrary `usize` values, not `0..n` indices.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"

use std::collections::HashSet;

use rand::Rng;

/// Order crossover with explicit cut points.
///
/// Copies `a[i..=j]` into the child at the same positions, then fills the
/// remaining positions left to right with the ids of `b` in their original
/// order, skipping ids already placed.
///
/// # Panics
///
/// Panics if the parents differ in length, or if `i > j` or `j` is out of
/// bounds.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::ga::order_crossover_at;
///
/// let child = order_crossover_at(&[1, 2, 3, 4, 5], &[5, 4, 3, 2, 1], 1, 2);
/// assert_eq!(child, vec![5, 2, 3, 4, 1]);
/// ```
pub fn order_crossover_at(a: &[usize], b: &[usize], i: usize, j: usize) -> Vec<usize> {
    assert_eq!(a.len(), b.len(), "parents must have equal length");
    assert!(i <= j && j < a.len(), "cut points out of range");

    let segment: HashSet<usize> = a[i..=j].iter().copied().collect();
    let mut donor = b.iter().copied().filter(|id| !segment.contains(id));

    (0..a.len())
        .map(|pos| {
            if (i..=j).contains(&pos) {
                a[pos]
            } else {
                // Both parents hold the same ids, so the donor never runs dry.
                donor.next().unwrap_or(a[pos])
            }
        })
        .collect()
}

/// Order crossover with two distinct random cut points.
///
/// Parents shorter than 2 yield a clone of `a`.
pub fn order_crossover<R: Rng>(a: &[usize], b: &[usize], rng: &mut R) -> Vec<usize> {
    if a.len() < 2 {
        return a.to_vec();
    }
    let (x, y) = distinct_pair(a.len(), rng);
    order_crossover_at(a, b, x.min(y), x.max(y))
}

/// Swaps two distinct random positions. No-op below length 2.
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    if perm.len() < 2 {
        return;
    }
    let (x, y) = distinct_pair(perm.len(), rng);
    perm.swap(x, y);
}

/// Tournament selection on scores (lower is better).
///
/// Draws `k` candidates with replacement; the first candidate seen wins
/// ties.
///
/// # Panics
///
/// Panics if `scores` is empty.
pub fn tournament_select<R: Rng>(scores: &[f64], k: usize, rng: &mut R) -> usize {
    assert!(!scores.is_empty(), "cannot select from empty population");
    let n = scores.len();
    let mut best = rng.random_range(0..n);
    for _ in 1..k.max(1) {
        let idx = rng.random_range(0..n);
        if scores[idx] < scores[best] {
            best = idx;
        }
    }
    best
}

fn distinct_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let x = rng.random_range(0..n);
    let mut y = rng.random_range(0..n - 1);
    if y >= x {
        y += 1;
    }
    (x, y)
}
