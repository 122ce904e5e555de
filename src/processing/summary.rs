use crate::boundary::face::Face;
use crate::boundary::registry::BoundaryRegistry;
use crate::physics::bc::ConditionKind;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct LevelRow {
    pub level: usize,
    pub strides: [usize; 3],
    pub interior_cells: usize,
    pub face_cells: [usize; 6],
}

pub struct ObstacleRow {
    pub name: String,
    pub conditions: [ConditionKind; 6],
    pub levels: Vec<LevelRow>,
}

pub struct BoundarySummary {
    // Grid info
    pub num_levels: usize,
    pub finest_cells: [usize; 3],
    pub coarsest_cells: [usize; 3],
    pub finest_spacing: [f64; 3],
    pub domain_extent: ([f64; 3], [f64; 3]),

    // Obstacles
    pub obstacles: Vec<ObstacleRow>,
    pub contact_pairs: usize,

    // Application
    pub cells_written: Option<usize>,
    pub field_range: Option<(f64, f64)>,
}

impl BoundarySummary {
    pub fn from_registry(registry: &BoundaryRegistry, contact_pairs: usize) -> Self {
        let grid = registry.grid();
        let finest = grid.level(0).map(|l| l.n).unwrap_or_default();
        let coarsest = grid.level(grid.max_level()).map(|l| l.n).unwrap_or_default();

        let obstacles = registry
            .obstacles()
            .iter()
            .enumerate()
            .map(|(id, obstacle)| {
                let conditions = registry
                    .spec(id)
                    .map(|spec| Face::ALL.map(|f| spec.condition(f).kind))
                    .unwrap_or([ConditionKind::Dirichlet; 6]);
                let levels = obstacle
                    .levels()
                    .map(|lvl| LevelRow {
                        level: lvl.level(),
                        strides: lvl.strides(),
                        interior_cells: lvl.interior().len(),
                        face_cells: Face::ALL.map(|f| lvl.face_len(f)),
                    })
                    .collect();
                ObstacleRow {
                    name: obstacle.name().to_string(),
                    conditions,
                    levels,
                }
            })
            .collect();

        Self {
            num_levels: grid.num_levels(),
            finest_cells: finest,
            coarsest_cells: coarsest,
            finest_spacing: grid.level(0).map(|l| l.spacing.to_array()).unwrap_or_default(),
            domain_extent: (grid.origin().to_array(), grid.end().to_array()),
            obstacles,
            contact_pairs,
            cells_written: None,
            field_range: None,
        }
    }

    pub fn add_application_info(&mut self, cells_written: usize, field: &[f64]) {
        let min = field.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = field.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        self.cells_written = Some(cells_written);
        self.field_range = Some((min, max));
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write_report(&mut file)
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("OBSTACLE BOUNDARY SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "Grid:          {:?} cells, {} levels",
            self.finest_cells, self.num_levels
        );
        println!(
            "Obstacles:     {} ({} pairs in contact)",
            self.obstacles.len(),
            self.contact_pairs
        );
        for row in &self.obstacles {
            if let Some(finest) = row.levels.first() {
                println!(
                    "  {:<12} strides {:?}, {} face cells",
                    row.name,
                    finest.strides,
                    finest.face_cells.iter().sum::<usize>()
                );
            }
        }
        if let Some(n) = self.cells_written {
            println!("Cells written: {}", n);
        }
        println!("{}\n", "=".repeat(60));
    }

    fn write_report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", "=".repeat(72))?;
        writeln!(w, "{:^72}", "OBSTACLE BOUNDARY SUMMARY")?;
        writeln!(w, "{}", "=".repeat(72))?;
        writeln!(w, "\nGRID")?;
        writeln!(
            w,
            "  Domain:           [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
            self.domain_extent.0[0],
            self.domain_extent.0[1],
            self.domain_extent.0[2],
            self.domain_extent.1[0],
            self.domain_extent.1[1],
            self.domain_extent.1[2]
        )?;
        writeln!(w, "  Levels:           {}", self.num_levels)?;
        writeln!(w, "  Finest cells:     {:?} (with ghosts)", self.finest_cells)?;
        writeln!(w, "  Coarsest cells:   {:?} (with ghosts)", self.coarsest_cells)?;
        writeln!(
            w,
            "  Finest spacing:   [{:.4e}, {:.4e}, {:.4e}]",
            self.finest_spacing[0], self.finest_spacing[1], self.finest_spacing[2]
        )?;

        writeln!(w, "\nOBSTACLES ({}, {} in contact)", self.obstacles.len(), self.contact_pairs)?;
        for row in &self.obstacles {
            let kinds: Vec<String> = Face::ALL
                .iter()
                .zip(row.conditions.iter())
                .map(|(f, k)| format!("{f}={k:?}"))
                .collect();
            writeln!(w, "  {}  [{}]", row.name, kinds.join(" "))?;
            writeln!(
                w,
                "    {:>5} | {:>14} | {:>8} | {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
                "level", "strides", "interior", "front", "back", "bottom", "top", "left", "right"
            )?;
            for lvl in &row.levels {
                let strides = format!("{}x{}x{}", lvl.strides[0], lvl.strides[1], lvl.strides[2]);
                let f = lvl.face_cells;
                writeln!(
                    w,
                    "    {:>5} | {:>14} | {:>8} | {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
                    lvl.level, strides, lvl.interior_cells, f[0], f[1], f[2], f[3], f[4], f[5]
                )?;
            }
        }

        if let (Some(n), Some((min, max))) = (self.cells_written, self.field_range) {
            writeln!(w, "\nAPPLICATION")?;
            writeln!(w, "  Cells written:    {n}")?;
            writeln!(w, "  Field range:      [{min:.6e}, {max:.6e}]")?;
        }
        writeln!(w, "{}", "=".repeat(72))?;
        Ok(())
    }
}
