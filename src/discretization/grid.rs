use glam::DVec3;

use crate::error::{BoundaryError, Result};

/// Cartesian axis of the structured grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Which end of an axis a face sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Minus,
    Plus,
}

impl Side {
    pub fn sign(self) -> isize {
        match self {
            Side::Minus => -1,
            Side::Plus => 1,
        }
    }
}

/// Resolution data of one multigrid level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLevel {
    /// Cell counts per axis, including one ghost layer on each side.
    pub n: [usize; 3],
    pub spacing: DVec3,
}

impl GridLevel {
    pub fn total_cells(&self) -> usize {
        self.n.iter().product()
    }

    /// Offset between linear indices of neighbouring cells along `axis`.
    pub fn axis_stride(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => 1,
            Axis::Y => self.n[0],
            Axis::Z => self.n[0] * self.n[1],
        }
    }

    #[inline]
    pub fn linear_index(&self, [i, j, k]: [usize; 3]) -> usize {
        i + self.n[0] * j + self.n[0] * self.n[1] * k
    }

    #[inline]
    pub fn coordinate_from_linear_index(&self, idx: usize) -> [usize; 3] {
        let plane = self.n[0] * self.n[1];
        let k = idx / plane;
        let j = (idx - k * plane) / self.n[0];
        let i = idx - k * plane - j * self.n[0];
        [i, j, k]
    }

    pub fn spacing_along(&self, axis: Axis) -> f64 {
        self.spacing[axis.index()]
    }

    /// Whether `coord` lies in the ghost layer surrounding the domain.
    pub fn is_ghost(&self, coord: [usize; 3]) -> bool {
        (0..3).any(|a| coord[a] == 0 || coord[a] + 1 >= self.n[a])
    }
}

/// Uniform Cartesian domain with its multigrid hierarchy.
///
/// Level 0 is the finest mesh. Each coarser level halves the number of inner
/// cells along every axis; the ghost layer is kept at every level.
#[derive(Clone, Debug)]
pub struct Grid {
    origin: DVec3,
    length: DVec3,
    levels: Vec<GridLevel>,
}

impl Grid {
    pub fn new(origin: DVec3, length: DVec3, inner: [usize; 3], num_levels: usize) -> Result<Self> {
        if !origin.is_finite() || !length.is_finite() || length.min_element() <= 0.0 {
            return Err(BoundaryError::InvalidGrid(format!(
                "domain origin {origin} and length {length} must be finite with positive length"
            )));
        }
        if inner.contains(&0) {
            return Err(BoundaryError::InvalidGrid(format!(
                "inner cell counts {inner:?} must all be positive"
            )));
        }
        if num_levels == 0 {
            return Err(BoundaryError::InvalidGrid(
                "at least one multigrid level is required".into(),
            ));
        }

        let mut levels = Vec::with_capacity(num_levels);
        let mut cells = inner;
        for level in 0..num_levels {
            if level > 0 {
                if cells.iter().any(|&c| c < 2 || c % 2 != 0) {
                    return Err(BoundaryError::InvalidGrid(format!(
                        "inner cell counts {cells:?} at level {} cannot be halved for level {level}",
                        level - 1
                    )));
                }
                cells = cells.map(|c| c / 2);
            }
            let spacing = DVec3::new(
                length.x / cells[0] as f64,
                length.y / cells[1] as f64,
                length.z / cells[2] as f64,
            );
            levels.push(GridLevel {
                n: cells.map(|c| c + 2),
                spacing,
            });
        }

        Ok(Self {
            origin,
            length,
            levels,
        })
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn length(&self) -> DVec3 {
        self.length
    }

    pub fn end(&self) -> DVec3 {
        self.origin + self.length
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn level(&self, level: usize) -> Option<&GridLevel> {
        self.levels.get(level)
    }

    /// Level data for a level the caller already knows to exist.
    ///
    /// Panics on an unknown level: every public entry point validates levels
    /// before reaching code that calls this.
    pub(crate) fn at(&self, level: usize) -> &GridLevel {
        &self.levels[level]
    }

    pub fn check_level(&self, level: usize) -> Result<&GridLevel> {
        self.levels.get(level).ok_or_else(|| {
            BoundaryError::InvalidGrid(format!(
                "level {level} requested, grid has {} levels",
                self.levels.len()
            ))
        })
    }

    pub fn cell_count_x(&self, level: usize) -> Result<usize> {
        Ok(self.check_level(level)?.n[0])
    }

    pub fn cell_count_y(&self, level: usize) -> Result<usize> {
        Ok(self.check_level(level)?.n[1])
    }

    pub fn cell_count_z(&self, level: usize) -> Result<usize> {
        Ok(self.check_level(level)?.n[2])
    }

    pub fn spacing_x(&self, level: usize) -> Result<f64> {
        Ok(self.check_level(level)?.spacing.x)
    }

    pub fn spacing_y(&self, level: usize) -> Result<f64> {
        Ok(self.check_level(level)?.spacing.y)
    }

    pub fn spacing_z(&self, level: usize) -> Result<f64> {
        Ok(self.check_level(level)?.spacing.z)
    }

    pub fn total_cells(&self, level: usize) -> Result<usize> {
        Ok(self.check_level(level)?.total_cells())
    }

    /// Snaps a physical coordinate to the nearest cell index along `axis`.
    ///
    /// The result is offset by one so that index 0 stays the ghost layer.
    pub fn snap_index(&self, coordinate: f64, axis: Axis, level: usize) -> isize {
        let a = axis.index();
        let h = self.at(level).spacing[a];
        ((coordinate - self.origin[a]) / h).round() as isize + 1
    }
}
