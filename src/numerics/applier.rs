use log::trace;
use rayon::prelude::*;

use crate::boundary::face::Face;
use crate::discretization::grid::GridLevel;
use crate::physics::bc::{ghost_val, ConditionKind, FaceCondition};

/// Faces shorter than this are evaluated on the calling thread.
const PAR_MIN_LEN: usize = 512;

/// Everything the per-face formulas need besides the field.
#[derive(Clone, Copy, Debug)]
pub struct FaceContext<'a> {
    pub grid_level: &'a GridLevel,
    pub level: usize,
    /// Obstacle cell counts along x, y, z on this level.
    pub obstacle_strides: [usize; 3],
}

/// Linear offset from a face cell to the cell it reads from.
///
/// Dirichlet and Neumann read the outward neighbour. Periodic reads the cell
/// `stride - 2` layers inward, on the far side of the obstacle.
pub fn reference_offset(face: Face, kind: ConditionKind, ctx: &FaceContext) -> isize {
    let axis = face.axis();
    let step = ctx.grid_level.axis_stride(axis) as isize;
    let sign = face.side().sign();
    match kind {
        ConditionKind::Dirichlet | ConditionKind::Neumann => sign * step,
        ConditionKind::Periodic => {
            let layers = ctx.obstacle_strides[axis.index()] as isize - 2;
            -sign * step * layers
        }
    }
}

#[inline]
fn source(b: usize, offset: isize) -> usize {
    (b as isize + offset) as usize
}

/// Computes the new values of `indices` without touching the field.
///
/// Every read sees `field` as passed in, so the result does not depend on the
/// order in which cells are evaluated.
pub fn evaluate_face(
    field: &[f64],
    indices: &[usize],
    face: Face,
    condition: &FaceCondition,
    ctx: &FaceContext,
) -> Vec<f64> {
    let offset = reference_offset(face, condition.kind, ctx);
    let h = ctx.grid_level.spacing_along(face.axis());
    let level = ctx.level;
    indices
        .par_iter()
        .with_min_len(PAR_MIN_LEN)
        .map(|&b| ghost_val(condition, field[source(b, offset)], level, h))
        .collect()
}

/// Writes values produced by [`evaluate_face`].
pub fn commit(field: &mut [f64], indices: &[usize], values: &[f64]) {
    debug_assert_eq!(indices.len(), values.len());
    for (&b, &v) in indices.iter().zip(values) {
        field[b] = v;
    }
}

/// Applies `condition` to every cell of one face list.
pub fn apply(
    field: &mut [f64],
    indices: &[usize],
    face: Face,
    condition: &FaceCondition,
    ctx: &FaceContext,
) {
    if indices.is_empty() {
        return;
    }
    trace!(
        "level {}: {:?} on {face} ({} cells)",
        ctx.level,
        condition.kind,
        indices.len()
    );
    let values = evaluate_face(field, indices, face, condition, ctx);
    commit(field, indices, &values);
}

pub fn apply_dirichlet(field: &mut [f64], indices: &[usize], face: Face, g: f64, ctx: &FaceContext) {
    apply(field, indices, face, &FaceCondition::dirichlet(g), ctx);
}

pub fn apply_neumann(field: &mut [f64], indices: &[usize], face: Face, q: f64, ctx: &FaceContext) {
    apply(field, indices, face, &FaceCondition::neumann(q), ctx);
}

pub fn apply_periodic(field: &mut [f64], indices: &[usize], face: Face, ctx: &FaceContext) {
    apply(field, indices, face, &FaceCondition::periodic(), ctx);
}

/// Boundary values computed from one field snapshot and not yet written.
///
/// Nothing reaches the field until [`PendingWrites::wait`] is called; that
/// call is the synchronisation point before the field is used again.
#[must_use = "pending boundary writes do nothing until `wait` commits them"]
#[derive(Debug, Default)]
pub struct PendingWrites<'a> {
    batches: Vec<(&'a [usize], Vec<f64>)>,
}

impl<'a> PendingWrites<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, indices: &'a [usize], values: Vec<f64>) {
        debug_assert_eq!(indices.len(), values.len());
        if !indices.is_empty() {
            self.batches.push((indices, values));
        }
    }

    pub fn extend(&mut self, other: PendingWrites<'a>) {
        self.batches.extend(other.batches);
    }

    /// Number of cells that will be written.
    pub fn len(&self) -> usize {
        self.batches.iter().map(|(i, _)| i.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn wait(self, field: &mut [f64]) {
        for (indices, values) in self.batches {
            commit(field, indices, &values);
        }
    }
}
