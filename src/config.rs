use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::boundary::face::Face;
use crate::boundary::obstacle::Obstacle;
use crate::boundary::overlap::OverlapPriority;
use crate::boundary::registry::BoundaryRegistry;
use crate::discretization::grid::Grid;
use crate::error::{BoundaryError, Result};
use crate::physics::bc::{BoundarySpec, FaceCondition};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`; `RUST_LOG` is used when absent.
    #[serde(default)]
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Some("info".into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub origin: [f64; 3],
    pub length: [f64; 3],
    /// Inner cells per axis on the finest level.
    pub cells: [usize; 3],
    #[serde(default = "default_levels")]
    pub levels: usize,
}

fn default_levels() -> usize {
    1
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            length: [1.0; 3],
            cells: [32; 3],
            levels: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryConfig {
    Physical {
        lower: [f64; 3],
        upper: [f64; 3],
    },
    Grid {
        lower: [usize; 3],
        upper: [usize; 3],
        #[serde(default)]
        level: usize,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundaryConfig {
    #[serde(default)]
    pub default: FaceCondition,
    #[serde(default)]
    pub faces: BTreeMap<Face, FaceCondition>,
}

impl BoundaryConfig {
    pub fn to_spec(&self) -> BoundarySpec {
        self.faces
            .iter()
            .fold(BoundarySpec::uniform(self.default), |spec, (&face, &c)| {
                spec.with_face(face, c)
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub name: String,
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub boundary: BoundaryConfig,
}

impl ObstacleConfig {
    pub fn build(&self, grid: &Grid) -> Result<Obstacle> {
        match self.geometry {
            GeometryConfig::Physical { lower, upper } => Obstacle::from_physical(
                grid,
                self.name.clone(),
                DVec3::from_array(lower),
                DVec3::from_array(upper),
            ),
            GeometryConfig::Grid {
                lower,
                upper,
                level,
            } => Obstacle::from_grid(grid, self.name.clone(), lower, upper, level),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub overlap_priority: Option<OverlapPriority>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
}

impl SimulationConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.domain;
        if d.length.iter().any(|&l| !(l > 0.0)) {
            return Err(BoundaryError::InvalidGrid(format!(
                "domain length {:?} must be positive",
                d.length
            )));
        }
        if d.cells.contains(&0) || d.levels == 0 {
            return Err(BoundaryError::InvalidGrid(format!(
                "domain needs cells {:?} > 0 and at least one level",
                d.cells
            )));
        }
        let mut names: Vec<&str> = self.obstacles.iter().map(|o| o.name.as_str()).collect();
        names.sort_unstable();
        if let Some(w) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(BoundaryError::DuplicateObstacle(w[0].to_string()));
        }
        Ok(())
    }

    pub fn build_grid(&self) -> Result<Grid> {
        let d = &self.domain;
        Grid::new(
            DVec3::from_array(d.origin),
            DVec3::from_array(d.length),
            d.cells,
            d.levels,
        )
    }

    /// Builds every obstacle, registers it and resolves overlaps.
    pub fn build_registry(&self, grid: Arc<Grid>) -> Result<BoundaryRegistry> {
        let mut registry = BoundaryRegistry::new(grid.clone(), self.overlap_priority);
        for obstacle in &self.obstacles {
            registry.add_obstacle(obstacle.build(&grid)?, obstacle.boundary.to_spec())?;
        }
        registry.resolve_overlaps();
        Ok(registry)
    }
}
