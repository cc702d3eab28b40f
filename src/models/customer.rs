//! Customer and location types.

use serde::{Deserialize, Serialize};

/// A planar location (depot or customer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate.
    pub x: f64,
    /// Y-coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A customer to be served by exactly one route.
///
/// Each customer owns an ordered list of box ids from the instance's box
/// catalogue. The boxes of every customer on a route are loaded into the
/// same container, so they must pack together.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::Customer;
///
/// let c = Customer::new(7, 41.0, 49.0, 10).with_boxes(vec![3, 4, 4]);
/// assert_eq!(c.id(), 7);
/// assert_eq!(c.demand(), 10);
/// assert_eq!(c.boxes(), &[3, 4, 4]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    #[serde(default)]
    boxes: Vec<usize>,
}

impl Customer {
    /// Creates a customer without cargo.
    pub fn new(id: usize, x: f64, y: f64, demand: i32) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            boxes: Vec::new(),
        }
    }

    /// Sets the owned box ids (order is preserved, repeats allowed).
    pub fn with_boxes(mut self, boxes: Vec<usize>) -> Self {
        self.boxes = boxes;
        self
    }

    /// Customer ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Location as a [`Point`].
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Demand at this customer. Informational; capacity is judged by packing.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Owned box ids in loading order.
    pub fn boxes(&self) -> &[usize] {
        &self.boxes
    }

    /// Number of owned boxes.
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// Euclidean distance to another customer.
    pub fn distance_to(&self, other: &Customer) -> f64 {
        self.location().distance_to(&other.location())
    }
}
