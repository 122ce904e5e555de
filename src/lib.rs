//! Immersed-obstacle boundary conditions for structured-grid multigrid solvers.
//!
//! Obstacles are snapped onto every level of a [`Grid`](discretization::grid::Grid),
//! their face cells are de-duplicated against each other, and Dirichlet,
//! Neumann or periodic conditions are written into cell-centred fields.

pub mod boundary;
pub mod config;
pub mod discretization;
pub mod error;
pub mod logging;
pub mod numerics;
pub mod physics;
pub mod processing;

pub use boundary::face::Face;
pub use boundary::obstacle::Obstacle;
pub use boundary::overlap::OverlapPriority;
pub use boundary::registry::{BoundaryRegistry, ObstacleId};
pub use error::{BoundaryError, Result};
