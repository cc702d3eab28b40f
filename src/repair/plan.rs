//! Explicit route partition and the moves that edit it.

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::ga::DecodedRoutes;

/// One edit of a [`RoutePlan`].
///
/// Every move takes customers out of exactly one route and puts them into
/// exactly one other route, or into new singleton routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Move {
    /// Remove `routes[from][pos]` and append it to `routes[to]`.
    Relocate {
        /// Source route.
        from: usize,
        /// Position within the source.
        pos: usize,
        /// Target route.
        to: usize,
    },
    /// Exchange `routes[a][pos_a]` with `routes[b][pos_b]` in place.
    Swap {
        /// First route.
        a: usize,
        /// Position within the first route.
        pos_a: usize,
        /// Second route.
        b: usize,
        /// Position within the second route.
        pos_b: usize,
    },
    /// Append two customers of `from` to `to`, and one customer of `to` to
    /// `from`.
    TwoForOne {
        /// Route giving two customers.
        from: usize,
        /// Positions of the two customers, distinct.
        pair: (usize, usize),
        /// Route giving one customer back.
        to: usize,
        /// Position of the returned customer.
        back: usize,
    },
    /// Remove customers of `route` and give each a new singleton route, in
    /// the listed order.
    Isolate {
        /// Source route.
        route: usize,
        /// Distinct positions within the source.
        positions: Vec<usize>,
    },
}

/// Routes being repaired.
///
/// Empty routes are kept while editing so that indices stay stable; they are
/// dropped by [`compacted`](Self::compacted).
///
/// # Examples
///
/// ```
/// use u_cargo_routing::repair::{Move, RoutePlan};
///
/// let mut plan = RoutePlan::from_routes(vec![vec![1, 2, 3], vec![4]]);
/// let touched = plan.apply(&Move::Relocate { from: 0, pos: 1, to: 1 }).unwrap();
/// assert_eq!(touched, vec![0, 1]);
/// assert_eq!(plan.routes(), &[vec![1, 3], vec![4, 2]]);
/// assert_eq!(plan.flatten(), vec![1, 3, 4, 2]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    routes: Vec<Vec<usize>>,
}

impl RoutePlan {
    /// Wraps explicit routes.
    pub fn from_routes(routes: Vec<Vec<usize>>) -> Self {
        Self { routes }
    }

    /// Copies decoded routes.
    pub fn from_decoded(decoded: &DecodedRoutes<'_>) -> Self {
        Self {
            routes: decoded.to_vecs(),
        }
    }

    /// Current routes, including emptied ones.
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    /// Number of routes, including emptied ones.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Customers of every route concatenated in order.
    pub fn flatten(&self) -> Vec<usize> {
        self.routes.iter().flatten().copied().collect()
    }

    /// Total customers across routes.
    pub fn customer_count(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// Routes with the empty ones removed.
    pub fn compacted(&self) -> Vec<Vec<usize>> {
        self.routes.iter().filter(|r| !r.is_empty()).cloned().collect()
    }

    /// Consumes the plan, returning its routes.
    pub fn into_routes(self) -> Vec<Vec<usize>> {
        self.routes
    }

    /// Applies a move, returning the indices of every route it touched.
    ///
    /// New singleton routes are appended at the end. On error the plan is
    /// left unchanged.
    pub fn apply(&mut self, mv: &Move) -> Result<Vec<usize>, RoutingError> {
        match *mv {
            Move::Relocate { from, pos, to } => {
                self.check_pair(from, to)?;
                self.check_pos(from, pos)?;
                let id = self.routes[from].remove(pos);
                self.routes[to].push(id);
                Ok(vec![from, to])
            }
            Move::Swap { a, pos_a, b, pos_b } => {
                self.check_pair(a, b)?;
                self.check_pos(a, pos_a)?;
                self.check_pos(b, pos_b)?;
                let tmp = self.routes[a][pos_a];
                self.routes[a][pos_a] = self.routes[b][pos_b];
                self.routes[b][pos_b] = tmp;
                Ok(vec![a, b])
            }
            Move::TwoForOne {
                from,
                pair: (p, q),
                to,
                back,
            } => {
                self.check_pair(from, to)?;
                self.check_pos(from, p)?;
                self.check_pos(from, q)?;
                self.check_pos(to, back)?;
                if p == q {
                    return Err(RoutingError::InvalidMove(format!(
                        "two-for-one needs distinct positions, got {p} twice"
                    )));
                }
                let (lo, hi) = (p.min(q), p.max(q));
                let second = self.routes[from].remove(hi);
                let first = self.routes[from].remove(lo);
                let returned = self.routes[to].remove(back);
                self.routes[from].push(returned);
                self.routes[to].extend([first, second]);
                Ok(vec![from, to])
            }
            Move::Isolate {
                route,
                ref positions,
            } => {
                self.check_route(route)?;
                let mut sorted = positions.clone();
                sorted.sort_unstable();
                sorted.dedup();
                if sorted.len() != positions.len() {
                    return Err(RoutingError::InvalidMove(
                        "isolation positions must be distinct".into(),
                    ));
                }
                for &pos in positions {
                    self.check_pos(route, pos)?;
                }

                let isolated: Vec<usize> = positions.iter().map(|&p| self.routes[route][p]).collect();
                for &pos in sorted.iter().rev() {
                    self.routes[route].remove(pos);
                }
                let mut touched = vec![route];
                for id in isolated {
                    touched.push(self.routes.len());
                    self.routes.push(vec![id]);
                }
                Ok(touched)
            }
        }
    }

    fn check_route(&self, idx: usize) -> Result<(), RoutingError> {
        if idx >= self.routes.len() {
            return Err(RoutingError::InvalidMove(format!(
                "route {idx} does not exist ({} routes)",
                self.routes.len()
            )));
        }
        Ok(())
    }

    fn check_pair(&self, a: usize, b: usize) -> Result<(), RoutingError> {
        self.check_route(a)?;
        self.check_route(b)?;
        if a == b {
            return Err(RoutingError::InvalidMove(format!(
                "source and target are both route {a}"
            )));
        }
        Ok(())
    }

    fn check_pos(&self, route: usize, pos: usize) -> Result<(), RoutingError> {
        if pos >= self.routes[route].len() {
            return Err(RoutingError::InvalidMove(format!(
                "route {route} has no position {pos}"
            )));
        }
        Ok(())
    }
}
