use trestle_view::measure::{MarkerScene, MeasureController, pick, pick_ray};
use trestle_view::viewer::{
    Aabb, GroundGrid, Ndc, Projection, Rect, Vec3, ViewTransform, ViewerMesh, normalize_device, pos2,
    vec2,
};

fn viewport() -> Rect {
    Rect::from_min_size(pos2(50.0, 20.0), vec2(400.0, 200.0))
}

fn plane(z: f64, half: f64) -> (Vec<Vec3>, Vec<[usize; 3]>) {
    (
        vec![
            Vec3::new(-half, -half, z),
            Vec3::new(half, -half, z),
            Vec3::new(half, half, z),
            Vec3::new(-half, half, z),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
}

fn looking_down(projection: Projection, aspect: f64) -> ViewTransform {
    ViewTransform::look_at(
        Vec3::new(0.0, 0.0, 30.0),
        Vec3::ZERO,
        Vec3::new(0.0, 1.0, 0.0),
        projection,
        aspect,
    )
}

/// Regular grid of triangles on z = 0 spanning [0, n] in x and y.
fn tiled_floor(n: usize) -> ViewerMesh {
    let mut positions = Vec::new();
    for y in 0..=n {
        for x in 0..=n {
            let bump = ((x * 7 + y * 3) % 5) as f64 * 0.1;
            positions.push(Vec3::new(x as f64, y as f64, bump));
        }
    }
    let row = n + 1;
    let mut faces = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let a = y * row + x;
            faces.push([a, a + 1, a + row + 1]);
            faces.push([a, a + row + 1, a + row]);
        }
    }
    ViewerMesh::from_triangles(positions, faces)
}

#[test]
fn device_coordinates_flip_the_vertical_axis() {
    let rect = viewport();
    let center = normalize_device(rect.center(), rect);
    assert_eq!(center, Some(Ndc { x: 0.0, y: 0.0 }));
    assert_eq!(
        normalize_device(rect.min, rect),
        Some(Ndc { x: -1.0, y: 1.0 })
    );
    assert_eq!(
        normalize_device(rect.max, rect),
        Some(Ndc { x: 1.0, y: -1.0 })
    );
}

#[test]
fn positions_outside_the_viewport_do_not_normalize() {
    let rect = viewport();
    assert!(normalize_device(pos2(10.0, 100.0), rect).is_none());
    assert!(normalize_device(pos2(100.0, 221.0), rect).is_none());
    let flat = Rect::from_min_size(pos2(0.0, 0.0), vec2(300.0, 0.0));
    assert!(normalize_device(pos2(0.0, 0.0), flat).is_none());
}

#[test]
fn absent_and_empty_targets_never_hit() {
    let view = looking_down(Projection::Perspective { fov_y_deg: 50.0 }, 2.0);
    let empty = ViewerMesh::default();
    let center = viewport().center();
    assert!(pick(center, viewport(), &view, None).is_none());
    assert!(pick(center, viewport(), &view, Some(&empty)).is_none());
}

#[test]
fn rays_that_miss_return_nothing() {
    let (positions, faces) = plane(0.0, 1.0);
    let mesh = ViewerMesh::from_triangles(positions, faces);
    let view = looking_down(Projection::Parallel { view_height: 40.0 }, 2.0);
    let corner = pos2(60.0, 30.0);
    assert!(pick(corner, viewport(), &view, Some(&mesh)).is_none());
}

#[test]
fn nearest_surface_wins() {
    let (mut positions, mut faces) = plane(0.0, 10.0);
    let (upper, upper_faces) = plane(5.0, 10.0);
    let offset = positions.len();
    positions.extend(upper);
    faces.extend(upper_faces.into_iter().map(|[a, b, c]| [a + offset, b + offset, c + offset]));
    let mesh = ViewerMesh::from_triangles(positions, faces);

    for projection in [
        Projection::Perspective { fov_y_deg: 50.0 },
        Projection::Parallel { view_height: 40.0 },
    ] {
        let view = looking_down(projection, 2.0);
        let pos = viewport().center() + vec2(13.0, 7.0);
        let hit = pick(pos, viewport(), &view, Some(&mesh));
        let Some(hit) = hit else {
            panic!("expected a hit for {projection:?}");
        };
        assert!((hit.z - 5.0).abs() < 1.0e-9);
    }
}

#[test]
fn picking_is_deterministic() {
    let mesh = tiled_floor(6);
    let view = ViewTransform::look_at(
        Vec3::new(3.0, -8.0, 12.0),
        Vec3::new(3.0, 3.0, 0.0),
        Vec3::UNIT_Z,
        Projection::Perspective { fov_y_deg: 45.0 },
        2.0,
    );
    let pos = pos2(260.0, 120.0);
    let first = pick(pos, viewport(), &view, Some(&mesh));
    let second = pick(pos, viewport(), &view, Some(&mesh));
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn hierarchy_matches_exhaustive_search() {
    let mesh = tiled_floor(12);
    let view = ViewTransform::look_at(
        Vec3::new(-4.0, -6.0, 9.0),
        Vec3::new(6.0, 6.0, 0.0),
        Vec3::UNIT_Z,
        Projection::Perspective { fov_y_deg: 60.0 },
        2.0,
    );
    let rect = viewport();
    let mut hits = 0;
    for iy in 0..10 {
        for ix in 0..20 {
            let pos = pos2(rect.min.x + 10.0 + ix as f32 * 19.0, rect.min.y + 5.0 + iy as f32 * 19.0);
            let Some(ray) = pick_ray(pos, rect, &view) else {
                continue;
            };
            let fast = mesh.ray_pick(&ray);
            let slow = mesh.ray_pick_exhaustive(&ray);
            match (fast, slow) {
                (Some(fast), Some(slow)) => {
                    hits += 1;
                    assert!((fast.t - slow.t).abs() < 1.0e-9);
                    assert!(fast.point.distance(slow.point) < 1.0e-9);
                }
                (None, None) => {}
                other => panic!("hierarchy and exhaustive search disagree: {other:?}"),
            }
        }
    }
    assert!(hits > 0);
}

#[test]
fn markers_and_grid_are_not_pick_targets() {
    let (positions, faces) = plane(0.0, 2.0);
    let mesh = ViewerMesh::from_triangles(positions, faces);
    let view = looking_down(Projection::Parallel { view_height: 40.0 }, 2.0);
    let rect = viewport();

    let pos = rect.center() + vec2(7.0, 3.0);

    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    controller.on_pointer_down(pos, rect, &view, Some(&mesh));
    assert_eq!(controller.markers().len(), 1);
    let recorded = controller.session().points()[0].position;
    assert_eq!(recorded.z, 0.0);

    // Same pixel still lands on the surface, not on the marker glyph.
    let again = pick(pos, rect, &view, Some(&mesh));
    assert_eq!(again, Some(recorded));

    // The grid extends past the mesh; rays there still miss.
    let grid = GroundGrid::for_bounds(Aabb::new(Vec3::new(-2.0, -2.0, 0.0), Vec3::new(2.0, 2.0, 0.0)));
    assert!(grid.half_extent > 2.0);
    let beyond_mesh = rect.center() + vec2(30.0, 3.0);
    assert!(pick(beyond_mesh, rect, &view, Some(&mesh)).is_none());
}

#[test]
fn marker_scene_removal_is_idempotent() {
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    let mut layer = controller.markers().clone();
    assert!(layer.is_empty());
    let handle = layer.add_marker(trestle_view::measure::Marker::point(Vec3::ZERO));
    assert!(layer.remove_marker(handle));
    assert!(!layer.remove_marker(handle));
}
