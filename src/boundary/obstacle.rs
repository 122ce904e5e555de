use std::fmt;
use std::ops::Range;

use glam::DVec3;
use log::{debug, warn};

use super::face::{Face, NUM_FACES};
use crate::discretization::cell_box::CellBox;
use crate::discretization::grid::{Axis, Grid, GridLevel, Side};
use crate::error::{BoundaryError, Result};

/// Face index lists of one obstacle level, stored in a single buffer.
///
/// Each face owns a contiguous range of `indices`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLists {
    indices: Vec<usize>,
    ranges: [Range<usize>; NUM_FACES],
}

impl FaceLists {
    fn from_faces(faces: [Vec<usize>; NUM_FACES]) -> Self {
        let total = faces.iter().map(Vec::len).sum();
        let mut indices = Vec::with_capacity(total);
        let ranges = std::array::from_fn(|f| {
            let start = indices.len();
            indices.extend_from_slice(&faces[f]);
            start..indices.len()
        });
        Self { indices, ranges }
    }

    fn into_faces(self) -> [Vec<usize>; NUM_FACES] {
        std::array::from_fn(|f| self.indices[self.ranges[f].clone()].to_vec())
    }

    pub fn get(&self, face: Face) -> &[usize] {
        &self.indices[self.ranges[face.index()].clone()]
    }

    pub fn len(&self, face: Face) -> usize {
        self.ranges[face.index()].len()
    }

    pub fn total_len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Keeps the indices for which `keep` returns true; returns how many were dropped.
    fn retain(&mut self, mut keep: impl FnMut(Face, usize) -> bool) -> usize {
        let before = self.indices.len();
        let faces = std::mem::take(self).into_faces();
        let mut kept: [Vec<usize>; NUM_FACES] = Default::default();
        for face in Face::ALL {
            kept[face.index()] = faces[face.index()]
                .iter()
                .copied()
                .filter(|&idx| keep(face, idx))
                .collect();
        }
        *self = FaceLists::from_faces(kept);
        before - self.indices.len()
    }

    fn replace(&mut self, face: Face, replacement: Vec<usize>) {
        let mut faces = std::mem::take(self).into_faces();
        faces[face.index()] = replacement;
        *self = FaceLists::from_faces(faces);
    }
}

/// Index lists of an obstacle on one multigrid level.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleLevel {
    level: usize,
    cell_box: CellBox,
    grid_level: GridLevel,
    interior: Vec<usize>,
    faces: FaceLists,
}

impl ObstacleLevel {
    fn build(level: usize, cell_box: CellBox, grid_level: GridLevel) -> Self {
        let [i1, j1, k1] = cell_box.lower;
        let [i2, j2, k2] = cell_box.upper;
        let [nx, ny, _] = grid_level.n;
        let idx = |i: usize, j: usize, k: usize| i + nx * j + nx * ny * k;

        let mut interior = Vec::with_capacity(cell_box.volume());
        for k in k1..=k2 {
            for j in j1..=j2 {
                for i in i1..=i2 {
                    interior.push(idx(i, j, k));
                }
            }
        }

        // Faces exist only along axes at least two cells thick. Edge and corner
        // cells belong to the Z faces first, then the Y faces, then the X faces.
        let has = cell_box.strides().map(|s| s >= 2);
        let mut faces: [Vec<usize>; NUM_FACES] = Default::default();

        if has[2] {
            for j in j1..=j2 {
                for i in i1..=i2 {
                    faces[Face::Front.index()].push(idx(i, j, k1));
                    faces[Face::Back.index()].push(idx(i, j, k2));
                }
            }
        }

        let ks = if has[2] { k1 + 1..=k2 - 1 } else { k1..=k2 };
        if has[1] {
            for k in ks.clone() {
                for i in i1..=i2 {
                    faces[Face::Bottom.index()].push(idx(i, j1, k));
                    faces[Face::Top.index()].push(idx(i, j2, k));
                }
            }
        }

        let js = if has[1] { j1 + 1..=j2 - 1 } else { j1..=j2 };
        if has[0] {
            for k in ks {
                for j in js.clone() {
                    faces[Face::Left.index()].push(idx(i1, j, k));
                    faces[Face::Right.index()].push(idx(i2, j, k));
                }
            }
        }

        // A face whose outward neighbours are the domain's ghost layer is not
        // exposed to the flow.
        for face in Face::ALL {
            let a = face.axis().index();
            let outward = match face.side() {
                Side::Minus => cell_box.lower[a] - 1,
                Side::Plus => cell_box.upper[a] + 1,
            };
            if outward == 0 || outward + 1 == grid_level.n[a] {
                let list = &mut faces[face.index()];
                if !list.is_empty() {
                    debug!(
                        "level {level}: {face} face lies on the domain boundary, dropping {} cells",
                        list.len()
                    );
                    list.clear();
                }
            }
        }

        Self {
            level,
            cell_box,
            grid_level,
            interior,
            faces: FaceLists::from_faces(faces),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn cell_box(&self) -> &CellBox {
        &self.cell_box
    }

    pub fn grid_level(&self) -> &GridLevel {
        &self.grid_level
    }

    pub fn face(&self, face: Face) -> &[usize] {
        self.faces.get(face)
    }

    pub fn face_len(&self, face: Face) -> usize {
        self.faces.len(face)
    }

    pub fn faces(&self) -> &FaceLists {
        &self.faces
    }

    pub fn interior(&self) -> &[usize] {
        &self.interior
    }

    pub fn stride(&self, axis: Axis) -> usize {
        self.cell_box.stride(axis)
    }

    pub fn stride_x(&self) -> usize {
        self.cell_box.stride(Axis::X)
    }

    pub fn stride_y(&self) -> usize {
        self.cell_box.stride(Axis::Y)
    }

    pub fn stride_z(&self) -> usize {
        self.cell_box.stride(Axis::Z)
    }

    pub fn strides(&self) -> [usize; 3] {
        self.cell_box.strides()
    }

    pub(crate) fn coordinate(&self, idx: usize) -> [usize; 3] {
        self.grid_level.coordinate_from_linear_index(idx)
    }

    fn on_layer(&self, face: Face, idx: usize) -> bool {
        let cell = self.coordinate(idx);
        idx < self.grid_level.total_cells()
            && self.cell_box.contains(cell)
            && cell[face.axis().index()] == self.cell_box.layer(face.axis(), face.side())
    }

    /// Drops face cells that look into `other`.
    ///
    /// A cell inside `other` survives only if `keeps_shared` and it is either
    /// still exposed or lies on the layer of `other` facing it (the plane the
    /// two obstacles share).
    pub(crate) fn strip_contested(&mut self, other: &CellBox, keeps_shared: bool) -> usize {
        let grid_level = self.grid_level;
        self.faces.retain(|face, idx| {
            let cell = grid_level.coordinate_from_linear_index(idx);
            let faces_other = face
                .step_outward(cell)
                .is_some_and(|neighbour| other.contains(neighbour));
            if !other.contains(cell) {
                return !faces_other;
            }
            let a = face.axis().index();
            let on_shared_plane = cell[a] == other.layer(face.axis(), face.opposite().side());
            keeps_shared && (!faces_other || on_shared_plane)
        })
    }
}

/// Rectangular solid immersed in the domain.
///
/// Holds the interior cell list and the six face lists on every level from
/// the level it was defined on down to the coarsest.
#[derive(Clone, Debug)]
pub struct Obstacle {
    name: String,
    base_level: usize,
    base_box: CellBox,
    levels: Vec<ObstacleLevel>,
}

impl Obstacle {
    /// Builds an obstacle from physical corner coordinates on the finest level.
    ///
    /// Each coordinate is snapped to the grid; the upper corner refers to the
    /// last cell below its snapped face.
    pub fn from_physical(
        grid: &Grid,
        name: impl Into<String>,
        lower: DVec3,
        upper: DVec3,
    ) -> Result<Self> {
        let name = name.into();
        if !lower.is_finite() || !upper.is_finite() {
            return Err(BoundaryError::geometry(
                &name,
                format!("non-finite corners {lower} / {upper}"),
            ));
        }
        let (start, end) = (grid.origin(), grid.end());
        let tol = 1e-9 * grid.length().max_element();
        if lower.cmplt(start - tol).any() || upper.cmpgt(end + tol).any() {
            return Err(BoundaryError::geometry(
                &name,
                format!("extent {lower} .. {upper} exceeds domain {start} .. {end}"),
            ));
        }

        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for axis in Axis::ALL {
            let a = axis.index();
            let i1 = grid.snap_index(lower[a], axis, 0);
            let i2 = grid.snap_index(upper[a], axis, 0) - 1;
            if i1 > i2 {
                return Err(BoundaryError::geometry(
                    &name,
                    format!(
                        "zero thickness along {axis:?}: {} .. {} snaps to cells {i1} .. {i2}",
                        lower[a], upper[a]
                    ),
                ));
            }
            lo[a] = i1 as usize;
            hi[a] = i2 as usize;
        }

        Self::from_grid(grid, name, lo, hi, 0)
    }

    /// Builds an obstacle from grid index corners on `level` (both inclusive).
    pub fn from_grid(
        grid: &Grid,
        name: impl Into<String>,
        lower: [usize; 3],
        upper: [usize; 3],
        level: usize,
    ) -> Result<Self> {
        let name = name.into();
        let grid_level = grid
            .check_level(level)
            .map_err(|e| BoundaryError::geometry(&name, e.to_string()))?;
        let base_box = CellBox::new(lower, upper).ok_or_else(|| {
            BoundaryError::geometry(
                &name,
                format!("inverted corners {lower:?} .. {upper:?}"),
            )
        })?;
        if (0..3).any(|a| lower[a] < 1 || upper[a] > grid_level.n[a].saturating_sub(2)) {
            return Err(BoundaryError::geometry(
                &name,
                format!(
                    "cells {lower:?} .. {upper:?} leave the inner domain of level {level} ({:?} cells with ghosts)",
                    grid_level.n
                ),
            ));
        }

        let levels = Self::build_levels(grid, base_box, level);
        let obstacle = Self {
            name,
            base_level: level,
            base_box,
            levels,
        };
        obstacle.log_details();
        Ok(obstacle)
    }

    fn build_levels(grid: &Grid, base_box: CellBox, base_level: usize) -> Vec<ObstacleLevel> {
        let mut levels = Vec::with_capacity(grid.num_levels() - base_level);
        let mut cell_box = base_box;
        for level in base_level..grid.num_levels() {
            if level > base_level {
                cell_box = cell_box.coarsen();
            }
            levels.push(ObstacleLevel::build(level, cell_box, *grid.at(level)));
        }
        levels
    }

    /// Builds a copy of this obstacle for another multigrid hierarchy from
    /// the original corners. Overlap resolution must be rerun on the copy.
    pub fn rebuilt_for(&self, grid: &Grid) -> Result<Obstacle> {
        Self::from_grid(
            grid,
            self.name.clone(),
            self.base_box.lower,
            self.base_box.upper,
            self.base_level,
        )
    }

    /// Recomputes every level in place; on error the obstacle is unchanged.
    pub fn rebuild(&mut self, grid: &Grid) -> Result<()> {
        *self = self.rebuilt_for(grid)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_level(&self) -> usize {
        self.base_level
    }

    pub fn coarsest_level(&self) -> usize {
        self.base_level + self.levels.len() - 1
    }

    pub fn levels(&self) -> impl Iterator<Item = &ObstacleLevel> {
        self.levels.iter()
    }

    pub fn level(&self, level: usize) -> Result<&ObstacleLevel> {
        level
            .checked_sub(self.base_level)
            .and_then(|l| self.levels.get(l))
            .ok_or_else(|| BoundaryError::LevelNotBuilt {
                name: self.name.clone(),
                level,
            })
    }

    pub(crate) fn level_mut(&mut self, level: usize) -> Result<&mut ObstacleLevel> {
        let name = &self.name;
        level
            .checked_sub(self.base_level)
            .and_then(|l| self.levels.get_mut(l))
            .ok_or_else(|| BoundaryError::LevelNotBuilt {
                name: name.clone(),
                level,
            })
    }

    pub fn face_indices(&self, level: usize, face: Face) -> Result<&[usize]> {
        Ok(self.level(level)?.face(face))
    }

    pub fn face_len(&self, level: usize, face: Face) -> Result<usize> {
        Ok(self.level(level)?.face_len(face))
    }

    pub fn interior_indices(&self, level: usize) -> Result<&[usize]> {
        Ok(self.level(level)?.interior())
    }

    pub fn stride_x(&self, level: usize) -> Result<usize> {
        Ok(self.level(level)?.stride_x())
    }

    pub fn stride_y(&self, level: usize) -> Result<usize> {
        Ok(self.level(level)?.stride_y())
    }

    pub fn stride_z(&self, level: usize) -> Result<usize> {
        Ok(self.level(level)?.stride_z())
    }

    pub fn is_obstacle_cell(&self, level: usize, i: usize, j: usize, k: usize) -> bool {
        self.level(level)
            .is_ok_and(|l| l.cell_box.contains([i, j, k]))
    }

    /// Writes `value` into every interior cell of the obstacle.
    pub fn set_inner_cells(&self, field: &mut [f64], level: usize, value: f64) -> Result<()> {
        for &idx in self.interior_indices(level)? {
            field[idx] = value;
        }
        Ok(())
    }

    /// Replaces one face list, e.g. when an adaption step reshapes the patch.
    ///
    /// Every index must lie on that face's layer of the obstacle.
    pub fn replace_face(&mut self, level: usize, face: Face, indices: Vec<usize>) -> Result<()> {
        let name = self.name.clone();
        let lvl = self.level_mut(level)?;
        if let Some(&bad) = indices.iter().find(|&&idx| !lvl.on_layer(face, idx)) {
            return Err(BoundaryError::IndexOffFace {
                name,
                face,
                index: bad,
            });
        }
        lvl.faces.replace(face, indices);
        Ok(())
    }

    pub fn clear_face(&mut self, level: usize, face: Face) -> Result<()> {
        self.level_mut(level)?.faces.replace(face, Vec::new());
        Ok(())
    }

    /// Checks the structural invariants of every level.
    pub fn validate(&self) -> Result<()> {
        for lvl in &self.levels {
            if lvl.interior.len() != lvl.cell_box.volume() {
                return Err(BoundaryError::geometry(
                    &self.name,
                    format!(
                        "level {}: interior has {} cells, box holds {}",
                        lvl.level,
                        lvl.interior.len(),
                        lvl.cell_box.volume()
                    ),
                ));
            }
            let mut seen = std::collections::HashSet::with_capacity(lvl.faces.total_len());
            for face in Face::ALL {
                for &idx in lvl.face(face) {
                    if !lvl.on_layer(face, idx) {
                        return Err(BoundaryError::IndexOffFace {
                            name: self.name.clone(),
                            face,
                            index: idx,
                        });
                    }
                    if !seen.insert(idx) {
                        return Err(BoundaryError::geometry(
                            &self.name,
                            format!("level {}: cell {idx} is on more than one face", lvl.level),
                        ));
                    }
                    let mut neighbour = lvl.coordinate(idx).map(|c| c as isize);
                    neighbour[face.axis().index()] += face.side().sign();
                    let n = lvl.grid_level.n;
                    if (0..3).any(|d| neighbour[d] < 0 || neighbour[d] as usize >= n[d]) {
                        return Err(BoundaryError::geometry(
                            &self.name,
                            format!("level {}: {face} cell {idx} has no outward neighbour", lvl.level),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn log_details(&self) {
        debug!("{self}");
        for lvl in &self.levels {
            let b = lvl.cell_box;
            debug!(
                "  level {}: cells {:?} .. {:?}, strides {:?}, interior {}, faces [{}]",
                lvl.level,
                b.lower,
                b.upper,
                b.strides(),
                lvl.interior.len(),
                Face::ALL
                    .iter()
                    .map(|&f| format!("{f}: {}", lvl.face_len(f)))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if lvl.faces.is_empty() && lvl.level == self.base_level {
                warn!(
                    "obstacle '{}' has no exposed face cells on level {}",
                    self.name, lvl.level
                );
            }
        }
    }
}

impl fmt::Display for Obstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.base_box;
        write!(
            f,
            "obstacle '{}': level {} cells {:?} .. {:?}, strides {:?}, {} levels",
            self.name,
            self.base_level,
            b.lower,
            b.upper,
            b.strides(),
            self.levels.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(DVec3::ZERO, DVec3::ONE, [16, 16, 16], 3).expect("valid grid")
    }

    #[test]
    fn cube_faces_have_expected_sizes() {
        let g = grid();
        let o = Obstacle::from_grid(&g, "cube", [4, 4, 4], [7, 7, 7], 0).unwrap();
        let l0 = o.level(0).unwrap();
        assert_eq!(l0.interior().len(), 64);
        assert_eq!(l0.face_len(Face::Front), 16);
        assert_eq!(l0.face_len(Face::Back), 16);
        assert_eq!(l0.face_len(Face::Bottom), 8);
        assert_eq!(l0.face_len(Face::Top), 8);
        assert_eq!(l0.face_len(Face::Left), 4);
        assert_eq!(l0.face_len(Face::Right), 4);
        o.validate().unwrap();
    }

    #[test]
    fn coarse_levels_follow_the_grid() {
        let g = grid();
        let o = Obstacle::from_grid(&g, "cube", [4, 4, 4], [7, 7, 7], 0).unwrap();
        assert_eq!(o.coarsest_level(), 2);
        let l1 = o.level(1).unwrap();
        assert_eq!(l1.cell_box().lower, [2, 2, 2]);
        assert_eq!(l1.cell_box().upper, [4, 4, 4]);
        assert_eq!(o.stride_y(2).unwrap(), 2);
    }

    #[test]
    fn physical_corners_snap_to_cells() {
        let g = grid();
        let o = Obstacle::from_physical(&g, "block", DVec3::splat(0.25), DVec3::splat(0.5)).unwrap();
        let b = o.level(0).unwrap().cell_box();
        assert_eq!(b.lower, [5, 5, 5]);
        assert_eq!(b.upper, [8, 8, 8]);
    }

    #[test]
    fn zero_thickness_is_invalid() {
        let g = grid();
        let err = Obstacle::from_physical(
            &g,
            "plate",
            DVec3::new(0.5, 0.25, 0.25),
            DVec3::new(0.5, 0.5, 0.5),
        )
        .unwrap_err();
        assert!(matches!(err, BoundaryError::InvalidGeometry { .. }));
    }

    #[test]
    fn huge_upper_corner_is_rejected() {
        let g = grid();
        let err = Obstacle::from_grid(&g, "huge", [4, 4, 4], [usize::MAX, 7, 7], 0).unwrap_err();
        assert!(matches!(err, BoundaryError::InvalidGeometry { .. }));
        assert!(Obstacle::from_grid(&g, "edge", [4, 4, 4], [16, 7, 7], 0).is_ok());
        assert!(Obstacle::from_grid(&g, "ghost", [4, 4, 4], [17, 7, 7], 0).is_err());
    }

    #[test]
    fn faces_on_domain_boundary_are_dropped() {
        let g = grid();
        let o = Obstacle::from_grid(&g, "wall", [1, 4, 4], [3, 7, 7], 0).unwrap();
        let l0 = o.level(0).unwrap();
        assert_eq!(l0.face_len(Face::Left), 0);
        assert_eq!(l0.face_len(Face::Right), 4);
    }

    #[test]
    fn replaced_faces_must_stay_on_layer() {
        let g = grid();
        let mut o = Obstacle::from_grid(&g, "cube", [4, 4, 4], [7, 7, 7], 0).unwrap();
        let level = *o.level(0).unwrap().grid_level();
        let keep = vec![level.linear_index([4, 5, 5])];
        o.replace_face(0, Face::Left, keep.clone()).unwrap();
        assert_eq!(o.face_indices(0, Face::Left).unwrap(), keep.as_slice());
        assert_eq!(o.face_len(0, Face::Right).unwrap(), 4);

        let off = vec![level.linear_index([5, 5, 5])];
        assert!(matches!(
            o.replace_face(0, Face::Left, off),
            Err(BoundaryError::IndexOffFace { .. })
        ));
    }

    #[test]
    fn inner_cells_are_overwritten() {
        let g = grid();
        let o = Obstacle::from_grid(&g, "cube", [4, 4, 4], [5, 5, 5], 0).unwrap();
        let mut field = vec![1.0; g.total_cells(0).unwrap()];
        o.set_inner_cells(&mut field, 0, 0.0).unwrap();
        assert_eq!(field.iter().filter(|&&v| v == 0.0).count(), 8);
        assert!(o.is_obstacle_cell(0, 4, 5, 4));
        assert!(!o.is_obstacle_cell(0, 6, 5, 4));
    }
}
