//! Bridge Tests - Heightfield Alignment, Feature Spheres, Degraded Fallback
//!
//! The rapier heightfield must follow the collision field, and away from
//! overlapping features that is the same surface the mesh draws. These tests
//! ray-cast the collider at grid vertices, stack features on one spot, then
//! break the height matrix on purpose.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use condor_marble_engine::error::BridgeError;
use condor_marble_engine::game::MarbleConfig;
use condor_marble_engine::physics::{
    BallParams, BridgeConfig, ContactMaterialTable, HeightfieldLayout, PhysicsConfig,
    PhysicsWorld, SurfaceMaterial, TerrainColliders, TerrainPhysicsBridge,
};
use condor_marble_engine::telemetry::{RecordingTelemetry, TelemetryEvent};
use condor_marble_engine::terrain::{
    FeatureKind, HeightField, HeightSynthesizer, PlacementReport, TerrainFeature, TerrainMesh,
    TerrainParams, place_features_seeded,
};
use condor_marble_engine::world::GridTransform;

struct Scene {
    field: HeightField,
    collision: HeightField,
    mesh: TerrainMesh,
    placement: PlacementReport,
    world: PhysicsWorld,
    colliders: TerrainColliders,
    telemetry: RecordingTelemetry,
}

fn marble_scene(resolution: usize) -> Scene {
    let config = MarbleConfig::default();
    let placement = place_features_seeded(&config.placement);
    let synth = HeightSynthesizer::new(config.terrain, placement.features.clone());
    let grid = GridTransform::covering(config.grid.size, resolution);
    let field = synth.build_heightfield(&grid);
    let collision = synth.build_collision_heightfield(&grid);
    let mesh = TerrainMesh::from_heightfield(&field);

    let mut world = PhysicsWorld::new(&config.physics, config.contacts.table());
    let mut telemetry = RecordingTelemetry::new();
    let colliders = TerrainPhysicsBridge::new(config.bridge).build(
        &mut world,
        &collision,
        &placement.features,
        &mut telemetry,
    );
    Scene {
        field,
        collision,
        mesh,
        placement,
        world,
        colliders,
        telemetry,
    }
}

fn plain_world() -> PhysicsWorld {
    PhysicsWorld::new(&PhysicsConfig::default(), ContactMaterialTable::marble_defaults())
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_layout_origin_matches_centered_grid() {
    for (resolution, size) in [(129, 3.0), (257, 400.0), (17, 1.6)] {
        let grid = GridTransform::covering(size, resolution);
        let layout = HeightfieldLayout::from_grid(&grid);
        let expected = -((resolution - 1) as f32 * grid.cell_size) / 2.0;
        assert!(
            (layout.origin.x - expected).abs() < 1e-4 && (layout.origin.y - expected).abs() < 1e-4,
            "origin {:?} should be ({expected}, {expected}) for {resolution} x {size}",
            layout.origin
        );
        assert_eq!((layout.rows, layout.cols), (resolution, resolution));
        assert!((layout.scale.x - size).abs() < 1e-3);
        assert!((layout.scale.z - size).abs() < 1e-3);
    }
}

// ============================================================================
// Mesh / Collider Agreement
// ============================================================================

#[test]
fn test_collider_matches_mesh_at_random_vertices() {
    let scene = marble_scene(129);
    assert!(!scene.colliders.degraded);
    let handle = scene.colliders.heightfield.expect("heightfield collider");
    let grid = *scene.collision.grid();
    let top = scene.field.max_height() + 1.0;

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut shared = 0;
    for _ in 0..60 {
        let row = rng.gen_range(1..grid.rows - 1);
        let col = rng.gen_range(1..grid.cols - 1);
        // Nudge off the exact vertex so the ray lands inside a triangle
        let p = grid.world_position(row, col) + grid.cell_size * 1e-4;
        let expected = scene.collision.get(row, col).expect("vertex in range");
        let hit = scene
            .world
            .cast_down_on(handle, p.x, p.y, top)
            .unwrap_or_else(|| panic!("ray at vertex ({row}, {col}) missed the heightfield"));
        assert!(
            (hit - expected).abs() < 1e-4,
            "vertex ({row}, {col}) at ({:.4}, {:.4}): collider {hit}, collision field {expected}",
            p.x,
            p.y
        );

        // Where no features overlap the mesh draws the same surface
        let drawn = scene.mesh.vertex_height(row, col).expect("vertex in range");
        if drawn == expected {
            shared += 1;
            assert!((hit - drawn).abs() < 1e-4, "vertex ({row}, {col}): collider {hit}, mesh {drawn}");
        }
    }
    assert!(shared >= 20, "only {shared} sampled vertices were free of overlapping features");
}

#[test]
fn test_collider_stays_within_cell_corners() {
    let scene = marble_scene(65);
    let handle = scene.colliders.heightfield.expect("heightfield collider");
    let grid = *scene.collision.grid();
    let top = scene.collision.max_height() + 1.0;

    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..40 {
        let row = rng.gen_range(0..grid.rows - 1);
        let col = rng.gen_range(0..grid.cols - 1);
        let (fx, fz) = (rng.gen_range(0.1..0.9), rng.gen_range(0.1..0.9));
        let corner = grid.world_position(row, col);
        let x = corner.x + fx * grid.cell_size;
        let z = corner.y + fz * grid.cell_size;

        let corners = [(row, col), (row + 1, col), (row, col + 1), (row + 1, col + 1)]
            .map(|(r, c)| scene.collision.get(r, c).expect("corner in range"));
        let lo = corners.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = corners.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let hit = scene.world.cast_down_on(handle, x, z, top).expect("ray hits inside the grid");
        assert!(
            hit >= lo - 1e-4 && hit <= hi + 1e-4,
            "surface {hit} at ({x:.4}, {z:.4}) leaves the cell range [{lo}, {hi}]"
        );
    }
}

#[test]
fn test_heightfield_tagged_as_terrain() {
    let scene = marble_scene(33);
    let handle = scene.colliders.heightfield.expect("heightfield collider");
    let collider = scene.world.colliders.get(handle).expect("collider in set");
    assert_eq!(
        SurfaceMaterial::from_user_data(collider.user_data),
        Some(SurfaceMaterial::Terrain)
    );
    let plane = scene.world.colliders.get(scene.colliders.ground_plane).expect("plane in set");
    assert_eq!(
        SurfaceMaterial::from_user_data(plane.user_data),
        Some(SurfaceMaterial::GroundPlane)
    );
}

// ============================================================================
// Feature Spheres
// ============================================================================

#[test]
fn test_feature_spheres_peak_at_feature_top() {
    let scene = marble_scene(129);
    assert_eq!(
        scene.colliders.features.len(),
        scene.placement.features.len(),
        "every default feature is large enough for a sphere"
    );
    for sphere in &scene.colliders.features {
        let feature = scene.placement.features[sphere.feature];
        let (x, z) = (feature.position.x, feature.position.y);
        let peak = scene
            .world
            .cast_down_on(sphere.handle, x, z, sphere.center.y + sphere.radius + 1.0)
            .expect("ray through the sphere center");
        let expected = scene.collision.sample_at(x, z);
        assert!(
            (peak - expected).abs() < 1e-4,
            "{:?} sphere top {peak}, terrain {expected}",
            feature.kind
        );
    }
}

#[test]
fn test_overlapping_features_collide_at_tallest() {
    let hill = TerrainFeature::new(FeatureKind::Hill, Vec2::ZERO, 0.3, 0.05);
    let rock = TerrainFeature::new(FeatureKind::Rock, Vec2::ZERO, 0.1, 0.03);
    let features = vec![hill, rock];
    let synth = HeightSynthesizer::new(TerrainParams::flat(), features.clone());
    let grid = GridTransform::covering(1.0, 33);
    let rendered = synth.build_heightfield(&grid);
    assert!((rendered.sample_at(0.0, 0.0) - 0.08).abs() < 1e-5, "the mesh sums the stamps");

    let mut world = plain_world();
    let mut telemetry = RecordingTelemetry::new();
    let colliders = TerrainPhysicsBridge::default().build(
        &mut world,
        &synth.build_collision_heightfield(&grid),
        &features,
        &mut telemetry,
    );
    assert!(!colliders.degraded);
    assert_eq!(colliders.features.len(), 2);

    let heightfield = colliders.heightfield.expect("heightfield collider");
    // Just off the shared vertex so the ray lands inside a triangle
    let ground = world.cast_down_on(heightfield, 1e-4, 1e-4, 1.0).expect("ray hits the heightfield");
    assert!((ground - 0.05).abs() < 1e-4, "heightfield top {ground}, tallest feature is 0.05");

    let top = colliders
        .features
        .iter()
        .filter_map(|sphere| world.cast_down_on(sphere.handle, 0.0, 0.0, 1.0))
        .fold(ground, f32::max);
    assert!((top - 0.05).abs() < 1e-4, "collider top {top} should be 0.05, not the 0.08 sum");
}

#[test]
fn test_small_features_get_no_sphere() {
    let scene = marble_scene(33);
    let mut world = plain_world();
    let bridge = TerrainPhysicsBridge::new(BridgeConfig {
        feature_collider_min_radius: 10.0,
        ..BridgeConfig::default()
    });
    let mut telemetry = RecordingTelemetry::new();
    let colliders = bridge.build(&mut world, &scene.collision, &scene.placement.features, &mut telemetry);
    assert!(colliders.features.is_empty());
    assert!(colliders.heightfield.is_some());
}

#[test]
fn test_clean_build_reports_nothing() {
    let scene = marble_scene(33);
    assert_eq!(scene.telemetry.bridge_fallbacks(), 0);
    let lowest = scene.collision.min_height();
    let offset = BridgeConfig::default().ground_plane_offset;
    assert!((scene.colliders.ground_height - (lowest - offset)).abs() < 1e-6);
}

// ============================================================================
// Degraded Fallback
// ============================================================================

#[test]
fn test_nan_sample_falls_back_to_plane() {
    let grid = GridTransform::square(9, 0.1);
    let mut samples = vec![0.1; grid.sample_count()];
    samples[grid.index(4, 6)] = f32::NAN;
    let field = HeightField::from_raw(grid, samples);

    let mut world = plain_world();
    let mut telemetry = RecordingTelemetry::new();
    let colliders = TerrainPhysicsBridge::default().build(&mut world, &field, &[], &mut telemetry);

    assert!(colliders.degraded);
    assert!(colliders.heightfield.is_none());
    assert!(colliders.features.is_empty());
    assert!(matches!(
        telemetry.events.as_slice(),
        [TelemetryEvent::BridgeFallback(BridgeError::NonFinite { row: 4, col: 6 })]
    ));
    assert_eq!(world.colliders.len(), 1, "only the ground plane remains");
    assert!((colliders.ground_height - 0.05).abs() < 1e-6);
}

#[test]
fn test_ragged_matrix_falls_back_to_plane() {
    let grid = GridTransform::square(9, 0.1);
    let field = HeightField::from_raw(grid, vec![0.0; 80]);

    let mut world = plain_world();
    let mut telemetry = RecordingTelemetry::new();
    let colliders = TerrainPhysicsBridge::default().build(&mut world, &field, &[], &mut telemetry);

    assert!(colliders.degraded);
    assert_eq!(telemetry.bridge_fallbacks(), 1);
    assert!(matches!(
        telemetry.events[0],
        TelemetryEvent::BridgeFallback(BridgeError::NonRectangular { expected: 81, actual: 80 })
    ));
}

#[test]
fn test_ball_rests_on_fallback_plane() {
    let grid = GridTransform::square(5, 0.2);
    let field = HeightField::from_raw(grid, vec![f32::NAN; grid.sample_count()]);
    let mut world = plain_world();
    let mut telemetry = RecordingTelemetry::new();
    let colliders = TerrainPhysicsBridge::default().build(&mut world, &field, &[], &mut telemetry);

    let params = BallParams::default();
    let ball = world.add_ball(Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO, &params);
    for _ in 0..480 {
        world.step_fixed();
    }
    let state = world.body_state(ball).expect("ball still exists");
    assert!(state.is_finite());
    let resting = colliders.ground_height + params.radius;
    assert!(
        (state.position.y - resting).abs() < 0.01,
        "ball at y = {} should rest on the plane at {resting}",
        state.position.y
    );
}

// ============================================================================
// Contact Materials
// ============================================================================

#[test]
fn test_marble_contact_table_is_complete() {
    let table = MarbleConfig::default().contacts.table();
    let required = ContactMaterialTable::required_pairs(SurfaceMaterial::Marble);
    assert_eq!(required.len(), SurfaceMaterial::ALL.len());
    assert!(table.validate(&required).is_ok());
    assert!(ContactMaterialTable::new().validate(&required).is_err());
    assert_eq!(ContactMaterialTable::new().missing_pairs(&required).len(), required.len());
}
