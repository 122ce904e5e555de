use std::sync::Arc;

use glam::DVec3;

use obstacle_bc::discretization::grid::Grid;
use obstacle_bc::physics::bc::{BoundarySpec, FaceCondition};
use obstacle_bc::physics::field::ScalarField;
use obstacle_bc::{BoundaryError, BoundaryRegistry, Face, Obstacle};

fn setup(spec: BoundarySpec, levels: usize) -> (Arc<Grid>, BoundaryRegistry) {
    let grid = Arc::new(Grid::new(DVec3::ZERO, DVec3::ONE, [16, 16, 16], levels).unwrap());
    let mut registry = BoundaryRegistry::new(grid.clone(), None);
    let block = Obstacle::from_grid(&grid, "block", [5, 5, 5], [10, 10, 10], 0).unwrap();
    registry.add_obstacle(block, spec).unwrap();
    (grid, registry)
}

/// Field whose value encodes the cell index, so every read is traceable.
fn ramp(grid: &Grid, level: usize) -> ScalarField {
    let mut u = ScalarField::zeros("u", grid, level).unwrap();
    for (i, v) in u.as_mut_slice().iter_mut().enumerate() {
        *v = 1.0 + i as f64 * 1e-3;
    }
    u
}

#[test]
fn verify_dirichlet_mirror() {
    println!("Test: homogeneous Dirichlet on the left face");
    let spec = BoundarySpec::uniform(FaceCondition::neumann(0.0))
        .with_face(Face::Left, FaceCondition::dirichlet(0.0));
    let (grid, registry) = setup(spec, 1);
    let mut u = ramp(&grid, 0);
    let before = u.clone();
    registry.apply_boundary_condition(&mut u, 0).unwrap();

    let left = registry.obstacle(0).unwrap().face_indices(0, Face::Left).unwrap();
    assert!(!left.is_empty());
    let mut max_err: f64 = 0.0;
    for &b in left {
        max_err = max_err.max((u.as_slice()[b] + before.as_slice()[b - 1]).abs());
    }
    println!("Max Absolute Error: {:.2e}", max_err);
    assert!(max_err < 1e-14);
    println!("  -> [PASSED]");
}

#[test]
fn verify_inhomogeneous_dirichlet_and_neumann() {
    println!("Test: Dirichlet g=2 on top, Neumann q=3 on right");
    let spec = BoundarySpec::default()
        .with_face(Face::Top, FaceCondition::dirichlet(2.0))
        .with_face(Face::Right, FaceCondition::neumann(3.0));
    let (grid, registry) = setup(spec, 1);
    let nx = grid.cell_count_x(0).unwrap();
    let ny = grid.cell_count_y(0).unwrap();
    let h = grid.spacing_x(0).unwrap();
    let mut u = ramp(&grid, 0);
    let before = u.clone();
    registry.apply_boundary_condition(&mut u, 0).unwrap();

    let obstacle = registry.obstacle(0).unwrap();
    for &b in obstacle.face_indices(0, Face::Top).unwrap() {
        assert!((u.as_slice()[b] - (4.0 - before.as_slice()[b + nx])).abs() < 1e-14);
    }
    for &b in obstacle.face_indices(0, Face::Right).unwrap() {
        assert!((u.as_slice()[b] - (before.as_slice()[b + 1] - 3.0 * h)).abs() < 1e-14);
    }
    // cells away from the obstacle surface are untouched
    let far = 2 + nx * 2 + nx * ny * 2;
    assert_eq!(u.as_slice()[far], before.as_slice()[far]);
    println!("  -> [PASSED]");
}

#[test]
fn verify_periodic_idempotence() {
    println!("Test: periodic faces applied twice");
    let spec = BoundarySpec::default()
        .with_face(Face::Left, FaceCondition::periodic())
        .with_face(Face::Right, FaceCondition::periodic());
    let (grid, registry) = setup(spec, 1);
    let mut u = ramp(&grid, 0);
    let before = u.clone();

    registry.apply_boundary_condition(&mut u, 0).unwrap();
    let once = u.clone();
    registry.apply_boundary_condition(&mut u, 0).unwrap();
    assert_eq!(once.as_slice(), u.as_slice());

    // stride 6: the left face copies from i = 9, the right face from i = 6
    let obstacle = registry.obstacle(0).unwrap();
    for &b in obstacle.face_indices(0, Face::Left).unwrap() {
        assert_eq!(u.as_slice()[b], before.as_slice()[b + 4]);
    }
    for &b in obstacle.face_indices(0, Face::Right).unwrap() {
        assert_eq!(u.as_slice()[b], before.as_slice()[b - 4]);
    }
    println!("  -> [PASSED]");
}

#[test]
fn verify_coarse_levels_are_homogeneous() {
    println!("Test: coarse levels ignore configured values");
    let spec = BoundarySpec::uniform(FaceCondition::dirichlet(5.0))
        .with_face(Face::Top, FaceCondition::neumann(7.0));
    let (grid, registry) = setup(spec, 2);
    let nx = grid.cell_count_x(1).unwrap();
    let mut u = ramp(&grid, 1);
    let before = u.clone();
    registry.apply_boundary_condition(&mut u, 0).unwrap();

    let obstacle = registry.obstacle(0).unwrap();
    for &b in obstacle.face_indices(1, Face::Front).unwrap() {
        let outward = b - nx * grid.cell_count_y(1).unwrap();
        assert!((u.as_slice()[b] + before.as_slice()[outward]).abs() < 1e-14);
    }
    for &b in obstacle.face_indices(1, Face::Top).unwrap() {
        assert!((u.as_slice()[b] - before.as_slice()[b + nx]).abs() < 1e-14);
    }
    println!("  -> [PASSED]");
}

#[test]
fn verify_dispatch_matches_apply() {
    println!("Test: dispatched writes equal immediate application");
    let spec = BoundarySpec::uniform(FaceCondition::dirichlet(1.0))
        .with_face(Face::Back, FaceCondition::periodic());
    let (grid, registry) = setup(spec, 1);

    let mut direct = ramp(&grid, 0);
    registry.apply_boundary_condition(&mut direct, 0).unwrap();

    let mut deferred = ramp(&grid, 0);
    let pending = registry.dispatch_boundary_condition(&deferred, 0).unwrap();
    assert!(!pending.is_empty());
    assert_eq!(deferred.as_slice(), ramp(&grid, 0).as_slice());
    pending.wait(deferred.as_mut_slice());

    assert_eq!(direct.as_slice(), deferred.as_slice());
    println!("  -> [PASSED]");
}

#[test]
fn verify_inner_cells_and_apply_all() {
    println!("Test: interior fill and apply_all over two obstacles");
    let grid = Arc::new(Grid::new(DVec3::ZERO, DVec3::ONE, [16, 16, 16], 1).unwrap());
    let mut registry = BoundaryRegistry::new(grid.clone(), None);
    let a = Obstacle::from_grid(&grid, "a", [3, 3, 3], [5, 5, 5], 0).unwrap();
    let b = Obstacle::from_grid(&grid, "b", [10, 10, 10], [13, 13, 13], 0).unwrap();
    registry.add_obstacle(a, BoundarySpec::default()).unwrap();
    registry.add_obstacle(b, BoundarySpec::uniform(FaceCondition::neumann(0.0))).unwrap();

    let mut u = ScalarField::from_element("u", &grid, 0, 1.0).unwrap();
    registry.set_inner_cells(&mut u, 0.0).unwrap();
    let zeros = u.as_slice().iter().filter(|&&v| v == 0.0).count();
    assert_eq!(zeros, 27 + 64);

    let written = registry.apply_all(&mut u).unwrap();
    let expected: usize = registry
        .obstacles()
        .iter()
        .map(|o| o.level(0).unwrap().faces().total_len())
        .sum();
    assert_eq!(written, expected);

    // Dirichlet 0 mirrors the surrounding 1.0, Neumann 0 copies it
    for &c in registry.obstacle(0).unwrap().face_indices(0, Face::Top).unwrap() {
        assert_eq!(u.as_slice()[c], -1.0);
    }
    for &c in registry.obstacle(1).unwrap().face_indices(0, Face::Left).unwrap() {
        assert_eq!(u.as_slice()[c], 1.0);
    }
    println!("  -> [PASSED]");
}

#[test]
fn verify_field_size_is_checked() {
    println!("Test: field from the wrong level is rejected");
    let (grid, registry) = setup(BoundarySpec::default(), 2);
    let coarse = ScalarField::zeros("u", &grid, 1).unwrap();
    let mut mislabeled = ScalarField { level: 0, ..coarse };
    let err = registry.apply_boundary_condition(&mut mislabeled, 0).unwrap_err();
    assert!(matches!(err, BoundaryError::FieldSizeMismatch { .. }));
    assert!(matches!(
        registry.apply_boundary_condition(&mut ScalarField::zeros("u", &grid, 0).unwrap(), 7),
        Err(BoundaryError::UnknownObstacle(_))
    ));
    println!("  -> [PASSED]");
}
