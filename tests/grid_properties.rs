//! Property tests for the uniform grid broad phase

use asteroid_field::grid::{BoundsSnapshot, UniformGrid};
use glam::Vec3;
use proptest::prelude::*;

fn scenario_grid() -> UniformGrid {
    UniformGrid::new(Vec3::splat(-50.0), Vec3::splat(50.0), Vec3::splat(10.0))
}

fn any_vec3(range: f32) -> impl Strategy<Value = Vec3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn snapshots() -> impl Strategy<Value = Vec<BoundsSnapshot>> {
    prop::collection::vec(
        (any_vec3(60.0), -1.0f32..8.0, any::<bool>()).prop_map(|(position, radius, active)| {
            BoundsSnapshot {
                position,
                radius,
                active,
            }
        }),
        0..64,
    )
}

/// Brute-force candidate check: every cell the object was inserted into
fn stored_anywhere(grid: &UniformGrid, index: usize) -> bool {
    (0..grid.total_cells()).any(|id| grid.store().cell(id).contains(&index))
}

proptest! {
    #[test]
    fn cell_of_always_linearizes_in_range(p in any_vec3(1.0e6)) {
        let grid = scenario_grid();
        let cell = grid.cell_of(p);
        prop_assert!(grid.indexer().is_valid(cell));
        prop_assert!(grid.indexer().to_linear(cell) < grid.total_cells());
    }

    #[test]
    fn cell_of_handles_non_finite(x in prop::num::f32::ANY, y in prop::num::f32::ANY, z in prop::num::f32::ANY) {
        let grid = scenario_grid();
        let cell = grid.cell_of(Vec3::new(x, y, z));
        prop_assert!(grid.indexer().to_linear(cell) < grid.total_cells());
    }

    #[test]
    fn object_inside_one_cell_is_found_from_that_cell(
        cell in (0i32..10, 0i32..10, 0i32..10),
        offset in (2.0f32..8.0, 2.0f32..8.0, 2.0f32..8.0),
        probe in (0.0f32..9.99, 0.0f32..9.99, 0.0f32..9.99),
        radius in 0.1f32..2.0,
    ) {
        let corner = Vec3::new(cell.0 as f32, cell.1 as f32, cell.2 as f32) * 10.0 - 50.0;
        let position = corner + Vec3::new(offset.0, offset.1, offset.2);
        let mut grid = scenario_grid();
        grid.build_all(&[BoundsSnapshot::new(position, radius)]);

        let query_at = corner + Vec3::new(probe.0, probe.1, probe.2);
        prop_assert!(grid.query(query_at).contains(&0));
    }

    #[test]
    fn build_is_idempotent(objects in snapshots()) {
        let mut grid = scenario_grid();
        grid.build_all(&objects);
        let first = grid.store().clone();
        grid.build_all(&objects);
        prop_assert_eq!(&first, grid.store());
    }

    #[test]
    fn inactive_objects_never_returned(objects in snapshots(), probe in any_vec3(70.0), dir in any_vec3(1.0)) {
        let mut grid = scenario_grid();
        grid.build_all(&objects);

        let near = grid.query(probe);
        let along = grid.query_ray(probe, dir, 500.0);
        for (index, object) in objects.iter().enumerate() {
            if !object.active {
                prop_assert!(!near.contains(&index));
                prop_assert!(!along.contains(&index));
                prop_assert!(!stored_anywhere(&grid, index));
            }
        }
    }

    #[test]
    fn activity_follows_latest_build(
        mut objects in snapshots(),
        flips in prop::collection::vec(any::<bool>(), 64),
    ) {
        let mut grid = scenario_grid();
        grid.build_all(&objects);
        for (object, flip) in objects.iter_mut().zip(&flips) {
            if *flip {
                object.active = !object.active;
            }
        }
        grid.build_all(&objects);

        for (index, object) in objects.iter().enumerate() {
            let near = grid.query(object.position);
            let along = grid.query_ray(object.position - Vec3::X * 200.0, Vec3::X, 400.0);
            prop_assert_eq!(near.contains(&index), object.active);
            prop_assert_eq!(along.contains(&index), object.active);
            prop_assert_eq!(stored_anywhere(&grid, index), object.active);
        }
    }

    #[test]
    fn results_are_deduplicated(objects in snapshots(), probe in any_vec3(70.0), dir in any_vec3(1.0)) {
        let mut grid = scenario_grid();
        grid.build_all(&objects);

        for result in [grid.query(probe), grid.query_ray(probe, dir, 500.0)] {
            let mut unique = result.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(unique.len(), result.len());
            prop_assert!(result.iter().all(|&i| i < objects.len()));
        }
    }

    #[test]
    fn degenerate_ray_equals_neighbor_query(objects in snapshots(), origin in any_vec3(70.0), tiny in any_vec3(0.005)) {
        let mut grid = scenario_grid();
        grid.build_all(&objects);
        prop_assert_eq!(grid.query_ray(origin, tiny, 100.0), grid.query(origin));
    }

    #[test]
    fn longer_ray_is_superset(objects in snapshots(), origin in any_vec3(70.0), dir in any_vec3(1.0), short in 0.0f32..60.0) {
        prop_assume!(dir.length_squared() >= 1.0e-4);
        let mut grid = scenario_grid();
        grid.build_all(&objects);

        let near = grid.query_ray(origin, dir, short);
        let far = grid.query_ray(origin, dir, short + 40.0);
        prop_assert!(near.iter().all(|i| far.contains(i)));
    }

    #[test]
    fn ray_traversal_terminates_within_grid_bound(origin in any_vec3(70.0), dir in any_vec3(1.0)) {
        prop_assume!(dir.length_squared() >= 1.0e-4);
        let grid = scenario_grid();
        let count = grid
            .ray_cells(origin, dir, f32::INFINITY)
            .map(|cells| cells.count())
            .unwrap_or(0);
        // Each step advances one axis monotonically, so at most nx + ny + nz - 2 steps
        prop_assert!(count <= 28);
    }

    #[test]
    fn non_positive_cell_size_behaves_as_unit(size in -5.0f32..=0.0, p in any_vec3(10.0)) {
        let clamped = UniformGrid::new(Vec3::splat(-8.0), Vec3::splat(8.0), Vec3::splat(size));
        let unit = UniformGrid::new(Vec3::splat(-8.0), Vec3::splat(8.0), Vec3::ONE);
        prop_assert_eq!(clamped.dims(), unit.dims());
        prop_assert_eq!(clamped.cell_of(p), unit.cell_of(p));
    }
}

#[test]
fn ray_scenario_from_outside_the_grid() {
    let mut grid = scenario_grid();
    assert_eq!(grid.dims(), glam::IVec3::splat(10));
    assert_eq!(grid.total_cells(), 1000);

    grid.insert(0, Vec3::splat(5.0), 1.0);
    assert!(grid.query(Vec3::splat(4.0)).contains(&0));

    let origin = Vec3::new(-60.0, 5.0, 5.0);
    assert!(grid.query_ray(origin, Vec3::X, 200.0).contains(&0));
    assert!(!grid.query_ray(origin, Vec3::X, 50.0).contains(&0));
}

#[test]
fn ray_prefix_drops_only_farther_object() {
    let mut grid = scenario_grid();
    grid.build_all(&[
        BoundsSnapshot::new(Vec3::new(-5.0, -25.0, 35.0), 1.0),
        BoundsSnapshot::new(Vec3::new(-5.0, -25.0, 25.0), 1.0),
    ]);
    // Travelling -z from z=50: cell z=8 entered at t=10, z=7 at t=20
    let origin = Vec3::new(-5.0, -25.0, 50.0);
    let full = grid.query_ray(origin, Vec3::NEG_Z, 100.0);
    let cut = grid.query_ray(origin, Vec3::NEG_Z, 15.0);
    assert_eq!(full, vec![0, 1]);
    assert_eq!(cut, vec![0]);
}
