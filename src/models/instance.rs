//! Validated problem instance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{CargoBox, Container, Customer, Point};
use crate::distance::DistanceMatrix;
use crate::error::RoutingError;

/// Raw instance data as supplied by an instance source.
///
/// Parsing a concrete file format is left to the caller; any serde format
/// that produces this shape can be turned into an [`Instance`].
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::InstanceData;
///
/// let json = r#"{
///     "container": {"length": 10.0, "width": 10.0, "height": 10.0},
///     "depot": {"x": 0.0, "y": 0.0},
///     "customers": [{"id": 1, "x": 3.0, "y": 4.0, "demand": 1, "boxes": [1]}],
///     "boxes": [{"id": 1, "length": 1.0, "width": 1.0, "height": 1.0}]
/// }"#;
/// let data: InstanceData = serde_json::from_str(json).unwrap();
/// let instance = data.into_instance().unwrap();
/// assert_eq!(instance.num_customers(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceData {
    /// Container shared by every route.
    pub container: Container,
    /// Depot location; the first customer's location when absent.
    #[serde(default)]
    pub depot: Option<Point>,
    /// Customers in their natural order.
    pub customers: Vec<Customer>,
    /// Box catalogue.
    pub boxes: Vec<CargoBox>,
}

impl InstanceData {
    /// Validates the data and builds an [`Instance`].
    pub fn into_instance(self) -> Result<Instance, RoutingError> {
        match self.depot {
            Some(depot) => Instance::new(self.container, depot, self.customers, self.boxes),
            None => Instance::with_first_customer_as_depot(self.container, self.customers, self.boxes),
        }
    }
}

/// A validated routing instance with precomputed lookups.
///
/// Holds the container, the depot, customers in their natural order, and the
/// box catalogue. Construction fails fast on anything that would make the
/// optimization meaningless (no customers, malformed container or boxes,
/// duplicate ids, dangling box references).
///
/// Distance matrix nodes: `0` is the depot, `p + 1` is the customer at
/// position `p` of [`customers`](Self::customers).
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::{CargoBox, Container, Customer, Instance, Point};
///
/// let container = Container::new(10.0, 10.0, 10.0).unwrap();
/// let customers = vec![
///     Customer::new(1, 3.0, 4.0, 1).with_boxes(vec![1, 2]),
///     Customer::new(2, 6.0, 8.0, 1),
/// ];
/// let boxes = vec![CargoBox::new(1, 1.0, 2.0, 3.0), CargoBox::new(2, 1.0, 1.0, 1.0)];
/// let inst = Instance::new(container, Point::new(0.0, 0.0), customers, boxes).unwrap();
///
/// assert_eq!(inst.customer_ids(), vec![1, 2]);
/// assert_eq!(inst.cargo_volume(1), 7.0);
/// assert_eq!(inst.box_count(2), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    container: Container,
    depot: Point,
    customers: Vec<Customer>,
    catalogue: HashMap<usize, CargoBox>,
    positions: HashMap<usize, usize>,
    volumes: Vec<f64>,
    distances: DistanceMatrix,
}

impl Instance {
    /// Builds an instance with an explicit depot location.
    pub fn new(
        container: Container,
        depot: Point,
        customers: Vec<Customer>,
        boxes: Vec<CargoBox>,
    ) -> Result<Self, RoutingError> {
        if customers.is_empty() {
            return Err(RoutingError::MissingInput("instance has no customers".into()));
        }

        let mut catalogue = HashMap::with_capacity(boxes.len());
        for b in boxes {
            b.validate()?;
            if catalogue.insert(b.id(), b).is_some() {
                return Err(RoutingError::DuplicateBox(b.id()));
            }
        }

        let mut positions = HashMap::with_capacity(customers.len());
        let mut volumes = Vec::with_capacity(customers.len());
        for (pos, c) in customers.iter().enumerate() {
            if positions.insert(c.id(), pos).is_some() {
                return Err(RoutingError::DuplicateCustomer(c.id()));
            }
            let mut volume = 0.0;
            for &bid in c.boxes() {
                let b = catalogue.get(&bid).ok_or(RoutingError::UnknownBox {
                    customer_id: c.id(),
                    box_id: bid,
                })?;
                volume += b.volume();
            }
            volumes.push(volume);
        }

        let points: Vec<Point> = std::iter::once(depot)
            .chain(customers.iter().map(Customer::location))
            .collect();
        let distances = DistanceMatrix::from_points(&points);

        Ok(Self {
            container,
            depot,
            customers,
            catalogue,
            positions,
            volumes,
            distances,
        })
    }

    /// Builds an instance whose depot sits at the first customer's location.
    pub fn with_first_customer_as_depot(
        container: Container,
        customers: Vec<Customer>,
        boxes: Vec<CargoBox>,
    ) -> Result<Self, RoutingError> {
        let depot = customers
            .first()
            .map(Customer::location)
            .ok_or_else(|| RoutingError::MissingInput("instance has no customers".into()))?;
        Self::new(container, depot, customers, boxes)
    }

    /// The shared container.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Depot location.
    pub fn depot(&self) -> Point {
        self.depot
    }

    /// Customers in natural order.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Number of customers.
    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    /// Customer ids in natural order.
    pub fn customer_ids(&self) -> Vec<usize> {
        self.customers.iter().map(Customer::id).collect()
    }

    /// Position of a customer id in natural order.
    pub fn position(&self, id: usize) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Looks up a customer by id.
    pub fn customer(&self, id: usize) -> Option<&Customer> {
        self.position(id).map(|p| &self.customers[p])
    }

    /// Looks up a box in the catalogue.
    pub fn cargo_box(&self, id: usize) -> Option<&CargoBox> {
        self.catalogue.get(&id)
    }

    /// Boxes owned by a customer, in owned order. Empty for unknown ids.
    pub fn boxes_of(&self, customer_id: usize) -> Vec<CargoBox> {
        self.customer(customer_id)
            .map(|c| c.boxes().iter().map(|bid| self.catalogue[bid]).collect())
            .unwrap_or_default()
    }

    /// Total volume of a customer's boxes. Zero for unknown ids.
    pub fn cargo_volume(&self, customer_id: usize) -> f64 {
        self.position(customer_id).map_or(0.0, |p| self.volumes[p])
    }

    /// Number of boxes owned by a customer. Zero for unknown ids.
    pub fn box_count(&self, customer_id: usize) -> usize {
        self.customer(customer_id).map_or(0, Customer::box_count)
    }

    /// Distance matrix over depot (node 0) and customers (node `pos + 1`).
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Matrix node of a customer id.
    pub fn node(&self, customer_id: usize) -> Option<usize> {
        self.position(customer_id).map(|p| p + 1)
    }

    /// Checks that `order` is a permutation of this instance's customer ids.
    pub fn check_permutation(&self, order: &[usize]) -> Result<(), RoutingError> {
        if order.len() != self.customers.len() {
            return Err(RoutingError::InvalidChromosome(format!(
                "expected {} customers, got {}",
                self.customers.len(),
                order.len()
            )));
        }
        let mut seen = vec![false; self.customers.len()];
        for &id in order {
            let pos = self.position(id).ok_or_else(|| {
                RoutingError::InvalidChromosome(format!("unknown customer id {id}"))
            })?;
            if std::mem::replace(&mut seen[pos], true) {
                return Err(RoutingError::InvalidChromosome(format!(
                    "customer id {id} appears more than once"
                )));
            }
        }
        Ok(())
    }
}
