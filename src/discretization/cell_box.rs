use super::grid::{Axis, Side};

/// Closed box of grid cells `[lower, upper]` on one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellBox {
    pub lower: [usize; 3],
    pub upper: [usize; 3],
}

impl CellBox {
    /// Returns `None` if the corners are inverted along any axis.
    pub fn new(lower: [usize; 3], upper: [usize; 3]) -> Option<Self> {
        if (0..3).any(|a| lower[a] > upper[a]) {
            return None;
        }
        Some(Self { lower, upper })
    }

    pub fn stride(&self, axis: Axis) -> usize {
        let a = axis.index();
        self.upper[a] - self.lower[a] + 1
    }

    pub fn strides(&self) -> [usize; 3] {
        [self.stride(Axis::X), self.stride(Axis::Y), self.stride(Axis::Z)]
    }

    pub fn volume(&self) -> usize {
        self.strides().iter().product()
    }

    /// Coordinate of the boundary layer on the given side of `axis`.
    pub fn layer(&self, axis: Axis, side: Side) -> usize {
        match side {
            Side::Minus => self.lower[axis.index()],
            Side::Plus => self.upper[axis.index()],
        }
    }

    pub fn contains(&self, cell: [usize; 3]) -> bool {
        (0..3).all(|a| self.lower[a] <= cell[a] && cell[a] <= self.upper[a])
    }

    /// Footprint of this box one multigrid level coarser.
    ///
    /// Inner index `i` (ghost layer at 0) lands in coarse cell `(i - 1) / 2 + 1`,
    /// which is how the grid halves its inner cell counts.
    pub fn coarsen(&self) -> CellBox {
        let c = |i: usize| (i - 1) / 2 + 1;
        CellBox {
            lower: self.lower.map(c),
            upper: self.upper.map(c),
        }
    }

    pub fn intersects_along(&self, other: &CellBox, axis: Axis) -> bool {
        let a = axis.index();
        self.lower[a] <= other.upper[a] && other.lower[a] <= self.upper[a]
    }

    /// Ranges intersect or are directly adjacent along `axis`.
    pub fn touches_along(&self, other: &CellBox, axis: Axis) -> bool {
        let a = axis.index();
        self.lower[a] <= other.upper[a] + 1 && other.lower[a] <= self.upper[a] + 1
    }

    pub fn intersects(&self, other: &CellBox) -> bool {
        Axis::ALL.iter().all(|&a| self.intersects_along(other, a))
    }

    /// Boxes share cells, or share a face across which their cells are neighbours.
    ///
    /// Edge- or corner-only adjacency is not contact: no cell of one box then
    /// has a face neighbour inside the other.
    pub fn in_contact(&self, other: &CellBox) -> bool {
        Axis::ALL.iter().any(|&normal| {
            self.touches_along(other, normal)
                && Axis::ALL
                    .iter()
                    .filter(|&&a| a != normal)
                    .all(|&a| self.intersects_along(other, a))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(lower: [usize; 3], upper: [usize; 3]) -> CellBox {
        CellBox::new(lower, upper).expect("ordered corners")
    }

    #[test]
    fn inverted_corners_are_rejected() {
        assert!(CellBox::new([3, 1, 1], [2, 4, 4]).is_none());
        assert!(CellBox::new([2, 1, 1], [2, 1, 1]).is_some());
    }

    #[test]
    fn coarsening_follows_grid_halving() {
        let b = cube([3, 4, 1], [6, 9, 8]);
        let c = b.coarsen();
        assert_eq!(c.lower, [2, 2, 1]);
        assert_eq!(c.upper, [3, 5, 4]);
    }

    #[test]
    fn contact_requires_face_adjacency() {
        let a = cube([2, 2, 2], [4, 4, 4]);
        assert!(a.in_contact(&cube([5, 3, 3], [7, 4, 4])));
        assert!(a.in_contact(&cube([4, 2, 2], [6, 4, 4])));
        assert!(!a.in_contact(&cube([6, 2, 2], [7, 4, 4])));
        // touching only along an edge
        assert!(!a.in_contact(&cube([5, 5, 2], [6, 6, 4])));
    }
}
