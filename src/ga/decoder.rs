//! Route decoding: partition a customer permutation into routes.
//!
//! Every policy cuts the permutation into contiguous pieces, so the routes
//! concatenated in order always reproduce the input exactly.
//!
//! # Policies
//!
//! - [`DecodePolicy::FixedSize`]: chunks of `route_size` customers
//! - [`DecodePolicy::VariableByVolume`]: greedy accumulation up to a fraction
//!   of the container volume
//! - [`DecodePolicy::VariableByBoxCount`]: greedy accumulation up to a box
//!   count
//!
//! The variable policies never reject a customer: one whose own requirement
//! already exceeds the limit opens a route of its own.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::models::Instance;

/// How a permutation is split into routes.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::ga::DecodePolicy;
///
/// let policy: DecodePolicy =
///     serde_json::from_str(r#"{"kind": "variable_by_box_count", "max_boxes_per_route": 40}"#)
///         .unwrap();
/// assert!(policy.validate().is_ok());
/// assert!(DecodePolicy::FixedSize { route_size: 0 }.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Contiguous chunks of `route_size`; the last chunk may be shorter.
    FixedSize {
        /// Customers per route (at least 1).
        route_size: usize,
    },
    /// Accumulate while assigned box volume stays within
    /// `container_volume × volume_limit_factor`.
    VariableByVolume {
        /// Fraction of the container volume (finite, positive).
        volume_limit_factor: f64,
    },
    /// Accumulate while the box count stays within `max_boxes_per_route`.
    VariableByBoxCount {
        /// Box limit per route (at least 1).
        max_boxes_per_route: usize,
    },
}

impl Default for DecodePolicy {
    fn default() -> Self {
        Self::FixedSize { route_size: 8 }
    }
}

impl DecodePolicy {
    /// Volume policy with the customary 0.95 factor.
    pub fn by_volume() -> Self {
        Self::VariableByVolume {
            volume_limit_factor: 0.95,
        }
    }

    /// Box-count policy with the customary limit of 48 boxes.
    pub fn by_box_count() -> Self {
        Self::VariableByBoxCount {
            max_boxes_per_route: 48,
        }
    }

    /// Checks the policy parameters.
    pub fn validate(&self) -> Result<(), RoutingError> {
        match *self {
            Self::FixedSize { route_size } if route_size == 0 => Err(
                RoutingError::InvalidConfig("route_size must be at least 1".into()),
            ),
            Self::VariableByVolume {
                volume_limit_factor,
            } if !(volume_limit_factor.is_finite() && volume_limit_factor > 0.0) => {
                Err(RoutingError::InvalidConfig(format!(
                    "volume_limit_factor must be finite and positive, got {volume_limit_factor}"
                )))
            }
            Self::VariableByBoxCount {
                max_boxes_per_route,
            } if max_boxes_per_route == 0 => Err(RoutingError::InvalidConfig(
                "max_boxes_per_route must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Routes decoded from one permutation, stored as index ranges into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRoutes<'o> {
    order: &'o [usize],
    bounds: Vec<Range<usize>>,
}

impl<'o> DecodedRoutes<'o> {
    /// Number of routes.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Returns `true` if there are no routes (empty permutation).
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Customers of route `idx` in visit order.
    pub fn route(&self, idx: usize) -> Option<&'o [usize]> {
        self.bounds.get(idx).map(|r| &self.order[r.clone()])
    }

    /// Iterates over routes in order.
    pub fn iter(&self) -> impl Iterator<Item = &'o [usize]> + '_ {
        self.bounds.iter().map(|r| &self.order[r.clone()])
    }

    /// Index ranges of every route within the source permutation.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.bounds
    }

    /// The source permutation.
    pub fn order(&self) -> &'o [usize] {
        self.order
    }

    /// Owned copies of every route.
    pub fn to_vecs(&self) -> Vec<Vec<usize>> {
        self.iter().map(<[usize]>::to_vec).collect()
    }
}

/// Applies a [`DecodePolicy`] to permutations of one instance.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::{Container, Customer, Instance, Point};
/// use u_cargo_routing::ga::{DecodePolicy, RouteDecoder};
///
/// let customers: Vec<Customer> = (1..=4).map(|id| Customer::new(id, 0.0, 0.0, 0)).collect();
/// let inst = Instance::new(
///     Container::new(1.0, 1.0, 1.0).unwrap(),
///     Point::new(0.0, 0.0),
///     customers,
///     vec![],
/// )
/// .unwrap();
///
/// let decoder = RouteDecoder::new(DecodePolicy::FixedSize { route_size: 2 }, &inst).unwrap();
/// let routes = decoder.decode(&[1, 2, 3, 4]).unwrap();
/// assert_eq!(routes.to_vecs(), vec![vec![1, 2], vec![3, 4]]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteDecoder<'a> {
    policy: DecodePolicy,
    instance: &'a Instance,
}

impl<'a> RouteDecoder<'a> {
    /// Creates a decoder after validating the policy.
    pub fn new(policy: DecodePolicy, instance: &'a Instance) -> Result<Self, RoutingError> {
        policy.validate()?;
        Ok(Self { policy, instance })
    }

    /// The policy in use.
    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Splits `order` into routes.
    ///
    /// Customer ids the instance does not know carry no volume and no boxes.
    pub fn decode<'o>(&self, order: &'o [usize]) -> Result<DecodedRoutes<'o>, RoutingError> {
        let bounds = match self.policy {
            DecodePolicy::FixedSize { route_size } => fixed_bounds(order.len(), route_size),
            DecodePolicy::VariableByVolume {
                volume_limit_factor,
            } => {
                let limit = self.instance.container().volume() * volume_limit_factor;
                greedy_bounds(order, limit, |id| self.instance.cargo_volume(id))
            }
            DecodePolicy::VariableByBoxCount {
                max_boxes_per_route,
            } => greedy_bounds(order, max_boxes_per_route as f64, |id| {
                self.instance.box_count(id) as f64
            }),
        };

        check_cover(&bounds, order.len())?;
        Ok(DecodedRoutes { order, bounds })
    }
}

fn fixed_bounds(n: usize, size: usize) -> Vec<Range<usize>> {
    (0..n)
        .step_by(size)
        .map(|start| start..(start + size).min(n))
        .collect()
}

fn greedy_bounds(
    order: &[usize],
    limit: f64,
    weight: impl Fn(usize) -> f64,
) -> Vec<Range<usize>> {
    let mut bounds = Vec::new();
    let mut start = 0;
    let mut load = 0.0;

    for (i, &id) in order.iter().enumerate() {
        let w = weight(id);
        if i > start && load + w > limit {
            bounds.push(start..i);
            start = i;
            load = 0.0;
        }
        load += w;
    }
    if start < order.len() {
        bounds.push(start..order.len());
    }
    bounds
}

/// Ranges must be non-empty, adjacent, and cover `0..n`.
fn check_cover(bounds: &[Range<usize>], n: usize) -> Result<(), RoutingError> {
    let mut expected = 0;
    for (idx, r) in bounds.iter().enumerate() {
        if r.start != expected || r.end <= r.start {
            return Err(RoutingError::DecoderInvariant(format!(
                "route {idx} spans {}..{}, expected to start at {expected}",
                r.start, r.end
            )));
        }
        expected = r.end;
    }
    if expected != n {
        return Err(RoutingError::DecoderInvariant(format!(
            "routes cover {expected} of {n} customers"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CargoBox, Container, Customer, Point};

    /// Customer `id` owns `id` unit boxes.
    fn instance(n: usize) -> Instance {
        let mut boxes = Vec::new();
        let mut customers = Vec::new();
        let mut next_box = 0;
        for id in 1..=n {
            let owned: Vec<usize> = (next_box..next_box + id).collect();
            next_box += id;
            boxes.extend(owned.iter().map(|&b| CargoBox::new(b, 1.0, 1.0, 1.0)));
            customers.push(Customer::new(id, id as f64, 0.0, 0).with_boxes(owned));
        }
        Instance::new(
            Container::new(2.0, 2.0, 2.0).expect("valid"),
            Point::new(0.0, 0.0),
            customers,
            boxes,
        )
        .expect("valid")
    }

    #[test]
    fn test_fixed_size() {
        let inst = instance(5);
        let d = RouteDecoder::new(DecodePolicy::FixedSize { route_size: 2 }, &inst).expect("ok");
        let routes = d.decode(&[5, 4, 3, 2, 1]).expect("ok");
        assert_eq!(routes.to_vecs(), vec![vec![5, 4], vec![3, 2], vec![1]]);
        assert_eq!(routes.len(), 3);
        assert_eq!(routes.route(2), Some(&[1][..]));
        assert_eq!(routes.route(3), None);
    }

    #[test]
    fn test_by_box_count() {
        let inst = instance(5);
        let d = RouteDecoder::new(
            DecodePolicy::VariableByBoxCount {
                max_boxes_per_route: 5,
            },
            &inst,
        )
        .expect("ok");
        // 1+2 = 3, +3 = 6 > 5 → cut; 3, +4 = 7 → cut; 4, +5 → cut; 5
        let routes = d.decode(&[1, 2, 3, 4, 5]).expect("ok");
        assert_eq!(
            routes.to_vecs(),
            vec![vec![1, 2], vec![3], vec![4], vec![5]]
        );
    }

    #[test]
    fn test_by_volume_limit_is_inclusive() {
        let inst = instance(4);
        // container volume 8, factor 0.75 → limit 6
        let d = RouteDecoder::new(
            DecodePolicy::VariableByVolume {
                volume_limit_factor: 0.75,
            },
            &inst,
        )
        .expect("ok");
        let routes = d.decode(&[1, 2, 3, 4]).expect("ok");
        assert_eq!(routes.to_vecs(), vec![vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn test_oversized_customer_gets_own_route() {
        let inst = instance(6);
        let d = RouteDecoder::new(
            DecodePolicy::VariableByBoxCount {
                max_boxes_per_route: 2,
            },
            &inst,
        )
        .expect("ok");
        let routes = d.decode(&[1, 6, 2]).expect("ok");
        assert_eq!(routes.to_vecs(), vec![vec![1], vec![6], vec![2]]);
    }

    #[test]
    fn test_empty_order() {
        let inst = instance(2);
        let d = RouteDecoder::new(DecodePolicy::by_volume(), &inst).expect("ok");
        let routes = d.decode(&[]).expect("ok");
        assert!(routes.is_empty());
    }

    #[test]
    fn test_invalid_policies_rejected() {
        let inst = instance(2);
        assert!(RouteDecoder::new(DecodePolicy::FixedSize { route_size: 0 }, &inst).is_err());
        for f in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(DecodePolicy::VariableByVolume {
                volume_limit_factor: f
            }
            .validate()
            .is_err());
        }
        assert!(DecodePolicy::VariableByBoxCount {
            max_boxes_per_route: 0
        }
        .validate()
        .is_err());
        assert!(DecodePolicy::by_box_count().validate().is_ok());
    }

    #[test]
    fn test_check_cover_detects_gaps() {
        assert!(check_cover(&[0..2, 3..4], 4).is_err());
        assert!(check_cover(&[0..2, 2..2, 2..4], 4).is_err());
        assert!(check_cover(&[0..2], 4).is_err());
        assert!(check_cover(&[0..2, 2..4], 4).is_ok());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn policies() -> impl Strategy<Value = DecodePolicy> {
            prop_oneof![
                (1usize..10).prop_map(|route_size| DecodePolicy::FixedSize { route_size }),
                (0.05f64..3.0).prop_map(|volume_limit_factor| DecodePolicy::VariableByVolume {
                    volume_limit_factor
                }),
                (1usize..20).prop_map(|max_boxes_per_route| DecodePolicy::VariableByBoxCount {
                    max_boxes_per_route
                }),
            ]
        }

        proptest! {
            #[test]
            fn routes_concatenate_to_order(
                order in Just((1..=12).collect::<Vec<usize>>()).prop_shuffle(),
                policy in policies(),
            ) {
                let inst = instance(12);
                let d = RouteDecoder::new(policy, &inst).expect("valid");
                let routes = d.decode(&order).expect("decodes");
                let flat: Vec<usize> = routes.iter().flatten().copied().collect();
                prop_assert_eq!(&flat, &order);
                prop_assert!(routes.iter().all(|r| !r.is_empty()));
            }
        }
    }
}
