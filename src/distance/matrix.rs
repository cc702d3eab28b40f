//! Dense distance matrix.

use crate::models::Point;

/// A dense n×n distance matrix stored in row-major order.
///
/// Node `0` is the depot by convention; [`tour_length`](Self::tour_length)
/// closes every tour there.
///
/// # Examples
///
/// ```
/// use u_cargo_routing::models::Point;
/// use u_cargo_routing::distance::DistanceMatrix;
///
/// let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(6.0, 8.0)];
/// let dm = DistanceMatrix::from_points(&points);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert!((dm.tour_length(&[1, 2]) - 20.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean distance matrix from point coordinates.
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance_to(&points[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Returns the distance from node `from` to node `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from node `from` to node `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of nodes in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Length of the closed tour `0 → nodes[0] → … → nodes[n-1] → 0`.
    ///
    /// Zero for an empty tour.
    pub fn tour_length(&self, nodes: &[usize]) -> f64 {
        let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) else {
            return 0.0;
        };
        let inner: f64 = nodes.windows(2).map(|w| self.get(w[0], w[1])).sum();
        self.get(0, first) + inner + self.get(last, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> DistanceMatrix {
        DistanceMatrix::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(0.0, 8.0),
        ])
    }

    #[test]
    fn test_from_points_is_symmetric() {
        let dm = triangle();
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((dm.get(2, 0) - 8.0).abs() < 1e-10);
        for i in 0..3 {
            assert_eq!(dm.get(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(dm.get(i, j), dm.get(j, i));
            }
        }
    }

    #[test]
    fn test_tour_length() {
        let dm = triangle();
        assert_eq!(dm.tour_length(&[]), 0.0);
        // 0→1→0
        assert!((dm.tour_length(&[1]) - 10.0).abs() < 1e-10);
        // 0→1→2→0 = 5 + 5 + 8
        assert!((dm.tour_length(&[1, 2]) - 18.0).abs() < 1e-10);
    }

    #[test]
    fn test_tour_follows_direction() {
        let mut dm = DistanceMatrix::new(3);
        dm.set(0, 1, 1.0);
        dm.set(1, 2, 2.0);
        dm.set(2, 0, 3.0);
        dm.set(0, 2, 10.0);
        dm.set(2, 1, 20.0);
        dm.set(1, 0, 30.0);
        assert_eq!(dm.tour_length(&[1, 2]), 6.0);
        assert_eq!(dm.tour_length(&[2, 1]), 60.0);
    }
}
