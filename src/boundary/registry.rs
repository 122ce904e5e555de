use std::sync::Arc;

use log::{debug, info, warn};

use super::face::Face;
use super::obstacle::Obstacle;
use super::overlap::OverlapPriority;
use crate::discretization::grid::Grid;
use crate::error::{BoundaryError, Result};
use crate::numerics::applier::{self, FaceContext, PendingWrites};
use crate::physics::bc::BoundarySpec;
use crate::physics::field::ScalarField;

pub type ObstacleId = usize;

/// Owns every obstacle of a simulation together with its face conditions.
///
/// Obstacle ids are declaration order, which is also the default priority
/// when two obstacles compete for the same face cells.
#[derive(Clone, Debug)]
pub struct BoundaryRegistry {
    grid: Arc<Grid>,
    obstacles: Vec<Obstacle>,
    specs: Vec<BoundarySpec>,
    overlap_priority: Option<OverlapPriority>,
}

impl BoundaryRegistry {
    pub fn new(grid: Arc<Grid>, overlap_priority: Option<OverlapPriority>) -> Self {
        Self {
            grid,
            obstacles: Vec::new(),
            specs: Vec::new(),
            overlap_priority,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle, spec: BoundarySpec) -> Result<ObstacleId> {
        if self.obstacles.iter().any(|o| o.name() == obstacle.name()) {
            return Err(BoundaryError::DuplicateObstacle(obstacle.name().to_string()));
        }
        obstacle.validate()?;
        let id = self.obstacles.len();
        debug!("registered obstacle '{}' as id {id}", obstacle.name());
        self.obstacles.push(obstacle);
        self.specs.push(spec);
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Result<ObstacleId> {
        self.obstacles
            .iter()
            .position(|o| o.name() == name)
            .ok_or_else(|| BoundaryError::UnknownObstacle(name.to_string()))
    }

    pub fn obstacle(&self, id: ObstacleId) -> Result<&Obstacle> {
        self.obstacles
            .get(id)
            .ok_or_else(|| BoundaryError::UnknownObstacle(id.to_string()))
    }

    pub fn obstacle_mut(&mut self, id: ObstacleId) -> Result<&mut Obstacle> {
        self.obstacles
            .get_mut(id)
            .ok_or_else(|| BoundaryError::UnknownObstacle(id.to_string()))
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn spec(&self, id: ObstacleId) -> Result<&BoundarySpec> {
        self.specs
            .get(id)
            .ok_or_else(|| BoundaryError::UnknownObstacle(id.to_string()))
    }

    pub fn set_spec(&mut self, id: ObstacleId, spec: BoundarySpec) -> Result<()> {
        let slot = self
            .specs
            .get_mut(id)
            .ok_or_else(|| BoundaryError::UnknownObstacle(id.to_string()))?;
        *slot = spec;
        Ok(())
    }

    pub fn obstacle_stride_x(&self, id: ObstacleId, level: usize) -> Result<usize> {
        self.obstacle(id)?.stride_x(level)
    }

    pub fn obstacle_stride_y(&self, id: ObstacleId, level: usize) -> Result<usize> {
        self.obstacle(id)?.stride_y(level)
    }

    pub fn obstacle_stride_z(&self, id: ObstacleId, level: usize) -> Result<usize> {
        self.obstacle(id)?.stride_z(level)
    }

    /// Runs overlap resolution over every pair of obstacles in declaration order.
    ///
    /// Returns the number of pairs found in contact.
    pub fn resolve_overlaps(&mut self) -> usize {
        let priority = self.overlap_priority.unwrap_or_default();
        let mut pairs = 0;
        for j in 1..self.obstacles.len() {
            let (head, tail) = self.obstacles.split_at_mut(j);
            let second = &mut tail[0];
            for first in head.iter_mut() {
                if self.overlap_priority.is_none() && first.shares_cells_with(second) {
                    let err = BoundaryError::OverlapUnresolved {
                        first: first.name().to_string(),
                        second: second.name().to_string(),
                    };
                    warn!("{err}; '{}' keeps the shared cells", first.name());
                }
                if Obstacle::remove_cells_facing_another_obstacle(first, second, priority) {
                    pairs += 1;
                }
            }
        }
        if pairs > 0 {
            info!("resolved {pairs} obstacle contacts");
        }
        pairs
    }

    /// Number of obstacle pairs that touch or overlap.
    pub fn contact_pairs(&self) -> usize {
        self.obstacles
            .iter()
            .enumerate()
            .flat_map(|(i, a)| self.obstacles[i + 1..].iter().map(move |b| (a, b)))
            .filter(|(a, b)| a.in_contact_with(b))
            .count()
    }

    /// Rebuilds every obstacle for a new multigrid hierarchy and reruns
    /// overlap resolution. Face lists replaced by hand are lost.
    ///
    /// If any obstacle cannot be built on `grid` the registry is left as it was.
    pub fn rebuild(&mut self, grid: Arc<Grid>) -> Result<()> {
        let rebuilt = self
            .obstacles
            .iter()
            .map(|o| o.rebuilt_for(&grid))
            .collect::<Result<Vec<_>>>()?;
        self.obstacles = rebuilt;
        self.grid = grid;
        let contacts = self.resolve_overlaps();
        debug!(
            "rebuilt {} obstacles for {} levels, {contacts} contacts",
            self.obstacles.len(),
            self.grid.num_levels()
        );
        Ok(())
    }

    /// Computes the boundary values of all six faces of one obstacle from the
    /// current contents of `field`; nothing is written until the returned
    /// handle is waited on.
    pub fn dispatch_boundary_condition(
        &self,
        field: &ScalarField,
        id: ObstacleId,
    ) -> Result<PendingWrites<'_>> {
        field.check_size(&self.grid)?;
        let level = field.level;
        let obstacle = self.obstacle(id)?;
        let spec = &self.specs[id];
        let lvl = obstacle.level(level)?;
        let ctx = FaceContext {
            grid_level: self.grid.at(level),
            level,
            obstacle_strides: lvl.strides(),
        };

        let mut pending = PendingWrites::new();
        for face in Face::ALL {
            let indices = lvl.face(face);
            if indices.is_empty() {
                continue;
            }
            let values =
                applier::evaluate_face(field.as_slice(), indices, face, spec.condition(face), &ctx);
            pending.push(indices, values);
        }
        Ok(pending)
    }

    /// Applies the configured conditions on all six faces of one obstacle.
    pub fn apply_boundary_condition(&self, field: &mut ScalarField, id: ObstacleId) -> Result<()> {
        let pending = self.dispatch_boundary_condition(field, id)?;
        pending.wait(field.as_mut_slice());
        Ok(())
    }

    /// Applies the conditions of every obstacle built on the field's level,
    /// reading one snapshot of the field and writing once at the end.
    pub fn apply_all(&self, field: &mut ScalarField) -> Result<usize> {
        let mut pending = PendingWrites::new();
        for (id, obstacle) in self.obstacles.iter().enumerate() {
            if obstacle.level(field.level).is_err() {
                continue;
            }
            pending.extend(self.dispatch_boundary_condition(field, id)?);
        }
        let written = pending.len();
        pending.wait(field.as_mut_slice());
        Ok(written)
    }

    /// Writes `value` into the interior cells of every obstacle on the field's level.
    pub fn set_inner_cells(&self, field: &mut ScalarField, value: f64) -> Result<()> {
        field.check_size(&self.grid)?;
        let level = field.level;
        for obstacle in &self.obstacles {
            if obstacle.level(level).is_ok() {
                obstacle.set_inner_cells(field.as_mut_slice(), level, value)?;
            }
        }
        Ok(())
    }
}
