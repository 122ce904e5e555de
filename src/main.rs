use obstacle_bc::config::{GeometryConfig, ObstacleConfig, SimulationConfig};
use obstacle_bc::logging::init_logging;
use obstacle_bc::physics::bc::FaceCondition;
use obstacle_bc::physics::field::ScalarField;
use obstacle_bc::processing::csv_writer::write_face_cells;
use obstacle_bc::processing::summary::BoundarySummary;
use obstacle_bc::{Face, Result};
use std::fs;
use std::sync::Arc;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => demo_config(),
    };
    init_logging(config.logging.level.as_deref());

    if let Err(e) = run(&config) {
        eprintln!("Boundary setup failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &SimulationConfig) -> Result<()> {
    fs::create_dir_all("output/main")?;

    let grid = Arc::new(config.build_grid()?);
    let registry = config.build_registry(grid.clone())?;
    let mut summary = BoundarySummary::from_registry(&registry, registry.contact_pairs());

    let mut written = 0;
    let mut finest = None;
    for level in 0..grid.num_levels() {
        let mut u = ScalarField::from_element("u", &grid, level, 1.0)?;
        registry.set_inner_cells(&mut u, 0.0)?;
        written += registry.apply_all(&mut u)?;
        log::info!("level {level}: boundary conditions applied to '{}'", u.id.0);
        if level == 0 {
            finest = Some(u);
        }
    }
    if let Some(u) = finest {
        summary.add_application_info(written, u.as_slice());
        let rows = write_face_cells("output/main/face_cells.csv", &registry, &u)?;
        println!("{} face cells saved to output/main/face_cells.csv", rows);
    }

    summary.write_to_file("output/main/boundary_summary.txt")?;
    summary.print_to_console();
    println!("Summary saved to output/main/boundary_summary.txt");
    Ok(())
}

/// Two blocks sharing a face, one Dirichlet and one with a Neumann top.
fn demo_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    let mut heater = ObstacleConfig {
        name: "heater".into(),
        geometry: GeometryConfig::Physical {
            lower: [0.25, 0.25, 0.25],
            upper: [0.5, 0.5, 0.5],
        },
        boundary: Default::default(),
    };
    heater.boundary.default = FaceCondition::dirichlet(1.0);

    let mut block = ObstacleConfig {
        name: "block".into(),
        geometry: GeometryConfig::Physical {
            lower: [0.5, 0.25, 0.25],
            upper: [0.75, 0.5, 0.5],
        },
        boundary: Default::default(),
    };
    block
        .boundary
        .faces
        .insert(Face::Top, FaceCondition::neumann(0.5));

    config.obstacles = vec![heater, block];
    config
}
