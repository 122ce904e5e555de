use std::sync::Arc;

use nalgebra::DVector;

use crate::discretization::grid::Grid;
use crate::error::{BoundaryError, Result};

/// Field identifier stored as a runtime string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field(pub Arc<str>);

impl Field {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }
}

impl<T: Into<Arc<str>>> From<T> for Field {
    fn from(name: T) -> Self {
        Field::new(name)
    }
}

/// Cell-centred scalar on one multigrid level, ghost cells included.
#[derive(Clone, Debug)]
pub struct ScalarField {
    pub id: Field,
    pub level: usize,
    pub data: DVector<f64>,
}

impl ScalarField {
    pub fn zeros(id: impl Into<Field>, grid: &Grid, level: usize) -> Result<Self> {
        Self::from_element(id, grid, level, 0.0)
    }

    pub fn from_element(id: impl Into<Field>, grid: &Grid, level: usize, value: f64) -> Result<Self> {
        let cells = grid.check_level(level)?.total_cells();
        Ok(Self {
            id: id.into(),
            level,
            data: DVector::from_element(cells, value),
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.data.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.data.as_mut_slice()
    }

    /// Fails if the field does not have one entry per cell of its level.
    pub fn check_size(&self, grid: &Grid) -> Result<()> {
        let expected = grid.check_level(self.level)?.total_cells();
        if self.data.len() != expected {
            return Err(BoundaryError::FieldSizeMismatch {
                field: self.id.0.to_string(),
                level: self.level,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}
