//! Deterministic shelf/layer packer.
//!
//! # Algorithm
//!
//! Boxes are taken in input order. The container is filled layer by layer
//! (along z); each layer is split into shelves (along y) and each shelf is
//! filled left to right (along x). For every box the packer tries, in this
//! order, the current shelf, a new shelf in the current layer, and a new
//! layer, each with the six axis-aligned orientations in a fixed order. A box
//! that fits nowhere stays unplaced and packing continues with the next one.
//!
//! # Complexity
//!
//! O(n) per call where n = number of boxes.

use tracing::trace;

use super::types::{OracleError, PackingOracle, PackingOutcome, Placement};
use crate::models::{CargoBox, Container};

const TOL: f64 = 1e-9;

/// Reference packing oracle.
///
/// Simple and fast rather than tight: it never overlaps boxes and never
/// exceeds the container, but it leaves gaps a real 3-D packer would fill.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::{CargoBox, Container};
/// use u_cargo_routing::oracle::{PackingOracle, ShelfOracle};
///
/// let container = Container::new(2.0, 2.0, 1.0).unwrap();
/// let boxes: Vec<CargoBox> = (0..5).map(|i| CargoBox::new(i, 1.0, 1.0, 1.0)).collect();
///
/// let out = ShelfOracle::new().pack(&container, &boxes).unwrap();
/// assert_eq!(out.placed_count, 4);
/// assert!((out.packed_volume - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfOracle;

impl ShelfOracle {
    /// Creates the packer.
    pub fn new() -> Self {
        Self
    }
}

/// Six axis-aligned orientations of `[l, w, h]` in a fixed order.
fn orientations(d: [f64; 3]) -> [[f64; 3]; 6] {
    let [l, w, h] = d;
    [
        [l, w, h],
        [w, l, h],
        [l, h, w],
        [h, l, w],
        [w, h, l],
        [h, w, l],
    ]
}

#[derive(Debug, Default)]
struct Cursor {
    x: f64,
    shelf_y: f64,
    shelf_depth: f64,
    layer_z: f64,
    layer_height: f64,
}

enum Slot {
    CurrentShelf,
    NewShelf,
    NewLayer,
}

impl Cursor {
    fn origin(&self, slot: &Slot) -> [f64; 3] {
        match slot {
            Slot::CurrentShelf => [self.x, self.shelf_y, self.layer_z],
            Slot::NewShelf => [0.0, self.shelf_y + self.shelf_depth, self.layer_z],
            Slot::NewLayer => [0.0, 0.0, self.layer_z + self.layer_height],
        }
    }

    fn commit(&mut self, slot: &Slot, e: [f64; 3]) {
        match slot {
            Slot::CurrentShelf => {
                self.x += e[0];
                self.shelf_depth = self.shelf_depth.max(e[1]);
                self.layer_height = self.layer_height.max(e[2]);
            }
            Slot::NewShelf => {
                self.shelf_y += self.shelf_depth;
                self.shelf_depth = e[1];
                self.x = e[0];
                self.layer_height = self.layer_height.max(e[2]);
            }
            Slot::NewLayer => {
                self.layer_z += self.layer_height;
                self.layer_height = e[2];
                self.shelf_y = 0.0;
                self.shelf_depth = e[1];
                self.x = e[0];
            }
        }
    }
}

fn fits(origin: [f64; 3], e: [f64; 3], bounds: [f64; 3]) -> bool {
    (0..3).all(|k| origin[k] + e[k] <= bounds[k] + TOL)
}

impl PackingOracle for ShelfOracle {
    fn pack(
        &self,
        container: &Container,
        boxes: &[CargoBox],
    ) -> Result<PackingOutcome, OracleError> {
        let bounds = container.dims();
        let mut cursor = Cursor::default();
        let mut outcome = PackingOutcome::default();

        for b in boxes {
            let placed = [Slot::CurrentShelf, Slot::NewShelf, Slot::NewLayer]
                .into_iter()
                .find_map(|slot| {
                    let origin = cursor.origin(&slot);
                    orientations(b.dims())
                        .into_iter()
                        .find(|&e| fits(origin, e, bounds))
                        .map(|e| (slot, origin, e))
                });

            match placed {
                Some((slot, origin, extents)) => {
                    cursor.commit(&slot, extents);
                    outcome.placements.push(Placement {
                        box_id: b.id(),
                        position: origin,
                        extents,
                    });
                    outcome.packed_volume += b.volume();
                    outcome.placed_count += 1;
                }
                None => trace!(box_id = b.id(), "box left unplaced"),
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_boxes(n: usize) -> Vec<CargoBox> {
        (0..n).map(|i| CargoBox::new(i, 1.0, 1.0, 1.0)).collect()
    }

    fn assert_valid(container: &Container, out: &PackingOutcome) {
        let bounds = container.dims();
        for p in &out.placements {
            assert!(fits(p.position, p.extents, bounds), "out of bounds: {p:?}");
            assert!(p.position.iter().all(|&v| v >= 0.0));
        }
        for (i, a) in out.placements.iter().enumerate() {
            for b in &out.placements[i + 1..] {
                assert!(!a.overlaps(b, 1e-9), "overlap: {a:?} / {b:?}");
            }
        }
        assert_eq!(out.placed_count, out.placements.len());
    }

    #[test]
    fn test_exact_fill() {
        let c = Container::new(2.0, 2.0, 2.0).expect("valid");
        let out = ShelfOracle::new().pack(&c, &unit_boxes(8)).expect("ok");
        assert_eq!(out.placed_count, 8);
        assert!((out.packed_volume - 8.0).abs() < 1e-12);
        assert_valid(&c, &out);
    }

    #[test]
    fn test_overflow_leaves_boxes_out() {
        let c = Container::new(2.0, 2.0, 2.0).expect("valid");
        let out = ShelfOracle::new().pack(&c, &unit_boxes(10)).expect("ok");
        assert_eq!(out.placed_count, 8);
        assert_valid(&c, &out);
    }

    #[test]
    fn test_rotation_makes_box_fit() {
        let c = Container::new(1.0, 1.0, 3.0).expect("valid");
        let out = ShelfOracle::new()
            .pack(&c, &[CargoBox::new(1, 3.0, 1.0, 1.0)])
            .expect("ok");
        assert_eq!(out.placed_count, 1);
        assert_eq!(out.placements[0].extents, [1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_oversized_box_skipped_others_packed() {
        let c = Container::new(2.0, 2.0, 2.0).expect("valid");
        let boxes = vec![
            CargoBox::new(1, 5.0, 1.0, 1.0),
            CargoBox::new(2, 1.0, 1.0, 1.0),
        ];
        let out = ShelfOracle::new().pack(&c, &boxes).expect("ok");
        assert_eq!(out.placed_count, 1);
        assert_eq!(out.placements[0].box_id, 2);
    }

    #[test]
    fn test_empty_input() {
        let c = Container::new(1.0, 1.0, 1.0).expect("valid");
        let out = ShelfOracle::new().pack(&c, &[]).expect("ok");
        assert_eq!(out, PackingOutcome::default());
    }

    #[test]
    fn test_deterministic() {
        let c = Container::new(3.0, 2.0, 2.0).expect("valid");
        let boxes = vec![
            CargoBox::new(1, 1.5, 1.0, 0.5),
            CargoBox::new(2, 2.0, 1.0, 1.0),
            CargoBox::new(3, 0.5, 0.5, 2.0),
            CargoBox::new(4, 1.0, 2.0, 1.0),
        ];
        let a = ShelfOracle::new().pack(&c, &boxes).expect("ok");
        let b = ShelfOracle::new().pack(&c, &boxes).expect("ok");
        assert_eq!(a, b);
        assert_valid(&c, &a);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn placements_never_overlap_or_escape(
                dims in prop::collection::vec((0.2f64..3.0, 0.2f64..3.0, 0.2f64..3.0), 0..30)
            ) {
                let c = Container::new(4.0, 3.0, 2.5).expect("valid");
                let boxes: Vec<CargoBox> = dims
                    .iter()
                    .enumerate()
                    .map(|(i, &(l, w, h))| CargoBox::new(i, l, w, h))
                    .collect();
                let out = ShelfOracle::new().pack(&c, &boxes).expect("ok");
                prop_assert!(out.validate(boxes.len()).is_ok());
                assert_valid(&c, &out);
            }
        }
    }
}
