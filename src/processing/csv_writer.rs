use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::boundary::face::Face;
use crate::boundary::registry::BoundaryRegistry;
use crate::physics::field::ScalarField;

/// Writes one row per face cell of every obstacle on the field's level:
/// obstacle name, face, grid coordinates, cell-centre position and the
/// current field value.
pub fn write_face_cells<P: AsRef<Path>>(
    path: P,
    registry: &BoundaryRegistry,
    field: &ScalarField,
) -> io::Result<usize> {
    let level = field.level;
    let Some(grid_level) = registry.grid().level(level) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("field '{}' refers to missing level {level}", field.id.0),
        ));
    };
    if field.len() != grid_level.total_cells() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "field '{}' has {} values, level {level} has {} cells",
                field.id.0,
                field.len(),
                grid_level.total_cells()
            ),
        ));
    }

    let origin = registry.grid().origin();
    let h = grid_level.spacing;
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "obstacle,face,i,j,k,x,y,z,{}", field.id.0)?;

    let mut rows = 0;
    for obstacle in registry.obstacles() {
        let Ok(lvl) = obstacle.level(level) else {
            continue;
        };
        for face in Face::ALL {
            for &idx in lvl.face(face) {
                let [i, j, k] = grid_level.coordinate_from_linear_index(idx);
                // index 1 is the first inner cell, centred half a cell from the origin
                let x = origin.x + (i as f64 - 0.5) * h.x;
                let y = origin.y + (j as f64 - 0.5) * h.y;
                let z = origin.z + (k as f64 - 0.5) * h.z;
                writeln!(
                    file,
                    "{},{face},{i},{j},{k},{x:.15e},{y:.15e},{z:.15e},{:.15e}",
                    obstacle.name(),
                    field.as_slice()[idx]
                )?;
                rows += 1;
            }
        }
    }
    file.flush()?;
    Ok(rows)
}
