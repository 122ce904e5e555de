use num_dual::DualNum;
use serde::{Deserialize, Serialize};

use crate::boundary::face::{Face, NUM_FACES};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Dirichlet,
    Neumann,
    Periodic,
}

/// Condition imposed on one face, with its value for Dirichlet/Neumann.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceCondition {
    pub kind: ConditionKind,
    #[serde(default)]
    pub value: f64,
}

impl FaceCondition {
    pub fn dirichlet(g: f64) -> Self {
        Self {
            kind: ConditionKind::Dirichlet,
            value: g,
        }
    }

    pub fn neumann(q: f64) -> Self {
        Self {
            kind: ConditionKind::Neumann,
            value: q,
        }
    }

    pub fn periodic() -> Self {
        Self {
            kind: ConditionKind::Periodic,
            value: 0.0,
        }
    }

    /// Value enforced on `level`: coarse-grid corrections solve the
    /// homogeneous problem, so only level 0 carries the configured value.
    pub fn value_at(&self, level: usize) -> f64 {
        if level > 0 {
            0.0
        } else {
            self.value
        }
    }
}

impl Default for FaceCondition {
    fn default() -> Self {
        FaceCondition::dirichlet(0.0)
    }
}

/// Conditions for the six faces of one obstacle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundarySpec {
    conditions: [FaceCondition; NUM_FACES],
}

impl BoundarySpec {
    pub fn uniform(condition: FaceCondition) -> Self {
        Self {
            conditions: [condition; NUM_FACES],
        }
    }

    pub fn with_face(mut self, face: Face, condition: FaceCondition) -> Self {
        self.set(face, condition);
        self
    }

    pub fn set(&mut self, face: Face, condition: FaceCondition) {
        self.conditions[face.index()] = condition;
    }

    pub fn condition(&self, face: Face) -> &FaceCondition {
        &self.conditions[face.index()]
    }
}

/// Ghost value that places `g` halfway between the cell and its neighbour.
#[inline]
pub fn dirichlet_ghost_val<T: DualNum<f64>>(u_neighbour: T, g: f64) -> T {
    T::from(2.0 * g) - u_neighbour
}

/// Ghost value giving the one-sided difference `(u_n - u_b) / h = q`.
#[inline]
pub fn neumann_ghost_val<T: DualNum<f64>>(u_neighbour: T, q: f64, h: f64) -> T {
    u_neighbour - T::from(q * h)
}

#[inline]
pub fn periodic_ghost_val<T: DualNum<f64>>(u_source: T) -> T {
    u_source
}

/// Ghost value for `condition` on `level`, `h` being the spacing normal to the face.
#[inline]
pub fn ghost_val<T: DualNum<f64>>(condition: &FaceCondition, u_ref: T, level: usize, h: f64) -> T {
    let g = condition.value_at(level);
    match condition.kind {
        ConditionKind::Dirichlet => dirichlet_ghost_val(u_ref, g),
        ConditionKind::Neumann => neumann_ghost_val(u_ref, g, h),
        ConditionKind::Periodic => periodic_ghost_val(u_ref),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_dual::Dual64;

    #[test]
    fn coarse_levels_are_homogeneous() {
        let c = FaceCondition::neumann(3.0);
        assert_eq!(c.value_at(0), 3.0);
        assert_eq!(c.value_at(2), 0.0);
        assert_eq!(ghost_val(&c, 1.5, 1, 0.1), 1.5);
    }

    #[test]
    fn dirichlet_mirrors_through_value() {
        let c = FaceCondition::dirichlet(1.0);
        assert_eq!(ghost_val(&c, 0.25, 0, 0.1), 1.75);
        assert_eq!(ghost_val(&FaceCondition::default(), 4.0, 0, 0.1), -4.0);
    }

    #[test]
    fn ghost_values_are_differentiable() {
        let u = Dual64::from_re(2.0).derivative();
        let d = dirichlet_ghost_val(u, 1.0);
        assert_eq!(d.re, 0.0);
        assert_eq!(d.eps, -1.0);
        let n = neumann_ghost_val(u, 4.0, 0.5);
        assert_eq!(n.re, 0.0);
        assert_eq!(n.eps, 1.0);
    }

    #[test]
    fn spec_overrides_single_face() {
        let spec = BoundarySpec::uniform(FaceCondition::neumann(0.0))
            .with_face(Face::Top, FaceCondition::periodic());
        assert_eq!(spec.condition(Face::Top).kind, ConditionKind::Periodic);
        assert_eq!(spec.condition(Face::Bottom).kind, ConditionKind::Neumann);
    }
}
