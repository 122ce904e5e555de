use thiserror::Error;

use crate::boundary::face::Face;

pub type Result<T> = std::result::Result<T, BoundaryError>;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("invalid geometry for obstacle '{name}': {reason}")]
    InvalidGeometry { name: String, reason: String },
    #[error("obstacles '{first}' and '{second}' share cells but no overlap priority is configured")]
    OverlapUnresolved { first: String, second: String },
    #[error("unknown face '{0}'")]
    InvalidFace(String),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    #[error("obstacle '{name}' has no index lists for level {level}")]
    LevelNotBuilt { name: String, level: usize },
    #[error("no obstacle with id or name '{0}'")]
    UnknownObstacle(String),
    #[error("obstacle '{0}' is already registered")]
    DuplicateObstacle(String),
    #[error("field '{field}' has {actual} cells, level {level} needs {expected}")]
    FieldSizeMismatch {
        field: String,
        level: usize,
        expected: usize,
        actual: usize,
    },
    #[error("index {index} does not lie on the {face} layer of obstacle '{name}'")]
    IndexOffFace {
        name: String,
        face: Face,
        index: usize,
    },
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoundaryError {
    pub(crate) fn geometry(name: &str, reason: impl Into<String>) -> Self {
        BoundaryError::InvalidGeometry {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
