//! Candidate move enumeration.
//!
//! Each neighborhood lists moves in the order they should be tried; the
//! engine accepts the first one that strictly lowers the unpacked total.

use super::config::{IsolationMode, Neighborhood};
use super::plan::{Move, RoutePlan};

/// Positions of the `k` heaviest customers of `route`, heaviest first.
///
/// Ties keep route order.
pub(crate) fn heaviest(route: &[usize], k: usize, weigh: &impl Fn(usize) -> f64) -> Vec<usize> {
    let weights: Vec<f64> = route.iter().map(|&id| weigh(id)).collect();
    let mut positions: Vec<usize> = (0..route.len()).collect();
    positions.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    positions.truncate(k);
    positions
}

/// Lists candidate moves for the current plan.
///
/// `unpacked[r]` is the number of boxes route `r` leaves outside the
/// container.
pub(crate) fn candidates(
    neighborhood: &Neighborhood,
    plan: &RoutePlan,
    unpacked: &[usize],
    weigh: &impl Fn(usize) -> f64,
) -> Vec<Move> {
    let routes = plan.routes();
    let infeasible: Vec<usize> = (0..routes.len()).filter(|&r| unpacked[r] > 0).collect();
    let mut moves = Vec::new();

    match neighborhood {
        Neighborhood::Relocation => {
            for &from in &infeasible {
                for pos in 0..routes[from].len() {
                    for to in 0..routes.len() {
                        if to != from && unpacked[to] == 0 && !routes[to].is_empty() {
                            moves.push(Move::Relocate { from, pos, to });
                        }
                    }
                }
            }
        }
        Neighborhood::PairwiseSwap { top_k } => {
            for &a in &infeasible {
                let a_cands = heaviest(&routes[a], *top_k, weigh);
                for b in (0..routes.len()).filter(|&b| b != a && !routes[b].is_empty()) {
                    let b_cands = heaviest(&routes[b], *top_k, weigh);
                    for &pos_a in &a_cands {
                        for &pos_b in &b_cands {
                            moves.push(Move::Swap { a, pos_a, b, pos_b });
                        }
                    }
                }
            }
        }
        Neighborhood::TwoForOne => {
            for &from in infeasible.iter().filter(|&&r| routes[r].len() >= 2) {
                let n = routes[from].len();
                for to in (0..routes.len()).filter(|&b| b != from && !routes[b].is_empty()) {
                    for p in 0..n {
                        for q in (p + 1)..n {
                            for back in 0..routes[to].len() {
                                moves.push(Move::TwoForOne {
                                    from,
                                    pair: (p, q),
                                    to,
                                    back,
                                });
                            }
                        }
                    }
                }
            }
        }
        Neighborhood::Isolation { mode } => {
            for &route in infeasible.iter().filter(|&&r| routes[r].len() >= 2) {
                let count = match mode {
                    IsolationMode::Unpacked => unpacked[route].min(routes[route].len()),
                    IsolationMode::Single => 1,
                };
                moves.push(Move::Isolate {
                    route,
                    positions: heaviest(&routes[route], count, weigh),
                });
            }
        }
        Neighborhood::TargetedRelocation {
            routes: subset,
            top_k,
        } => {
            let mut scope: Vec<usize> = Vec::new();
            for &r in subset {
                if r < routes.len() && !scope.contains(&r) {
                    scope.push(r);
                }
            }
            let mut targets = scope.clone();
            targets.sort_by_key(|&r| unpacked[r]);

            for &from in scope.iter().filter(|&&r| unpacked[r] > 0) {
                for pos in heaviest(&routes[from], *top_k, weigh) {
                    for &to in &targets {
                        if to != from && !routes[to].is_empty() {
                            moves.push(Move::Relocate { from, pos, to });
                        }
                    }
                }
            }
        }
    }
    moves
}
