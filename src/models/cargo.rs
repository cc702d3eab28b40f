//! Boxes and containers.

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// A rectangular box of cargo.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::CargoBox;
///
/// let b = CargoBox::new(1, 2.0, 3.0, 4.0).with_weight(12.5);
/// assert_eq!(b.volume(), 24.0);
/// assert_eq!(b.weight(), Some(12.5));
/// assert!(b.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CargoBox {
    id: usize,
    length: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    weight: Option<f64>,
}

impl CargoBox {
    /// Creates a box without weight.
    pub fn new(id: usize, length: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            length,
            width,
            height,
            weight: None,
        }
    }

    /// Sets the box weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Box ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Length extent.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Width extent.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height extent.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Extents as `[length, width, height]`.
    pub fn dims(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    /// Optional weight.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Product of the three extents.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Checks that all dimensions are positive and finite.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.dims().iter().all(|&d| positive(d)) {
            Ok(())
        } else {
            Err(RoutingError::InvalidBox { box_id: self.id })
        }
    }
}

/// The fixed-size cargo space of every vehicle.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::Container;
///
/// let c = Container::new(10.0, 5.0, 2.0).unwrap();
/// assert_eq!(c.volume(), 100.0);
/// assert!(Container::new(0.0, 5.0, 2.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContainerData")]
pub struct Container {
    length: f64,
    width: f64,
    height: f64,
}

#[derive(Deserialize)]
struct ContainerData {
    length: f64,
    width: f64,
    height: f64,
}

impl TryFrom<ContainerData> for Container {
    type Error = RoutingError;

    fn try_from(d: ContainerData) -> Result<Self, Self::Error> {
        Container::new(d.length, d.width, d.height)
    }
}

impl Container {
    /// Creates a container, rejecting non-positive or non-finite extents.
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self, RoutingError> {
        if !(positive(length) && positive(width) && positive(height)) {
            return Err(RoutingError::InvalidContainer {
                length,
                width,
                height,
            });
        }
        Ok(Self {
            length,
            width,
            height,
        })
    }

    /// Length extent.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Width extent.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height extent.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Extents as `[length, width, height]`.
    pub fn dims(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    /// Product of the three extents.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}
