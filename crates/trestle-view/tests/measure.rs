use trestle_base::LengthUnit;
use trestle_view::measure::{
    CursorHint, DISTANCE_PLACEHOLDER, DistanceFormat, MARKER_RENDER_ORDER, Marker, MarkerHandle,
    MarkerLayer, MarkerScene, MeasureController, MeasureState, MeasurementSession, PointOrdinal,
    RecordOutcome,
};
use trestle_view::viewer::{
    OverlayCollector, Point2, Projection, Rect, Vec3, ViewTransform, ViewerMesh, pos2, vec2,
};

/// Scene that only counts live handles.
#[derive(Default)]
struct CountingScene {
    live: Vec<MarkerHandle>,
    segments: usize,
    removed_twice: usize,
    layer: MarkerLayer,
}

impl MarkerScene for CountingScene {
    fn add_marker(&mut self, marker: Marker) -> MarkerHandle {
        let handle = self.layer.add_marker(marker);
        if marker.is_segment() {
            self.segments += 1;
        }
        self.live.push(handle);
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> bool {
        let Some(idx) = self.live.iter().position(|live| *live == handle) else {
            self.removed_twice += 1;
            return false;
        };
        if self.layer.get(handle).is_some_and(Marker::is_segment) {
            self.segments -= 1;
        }
        self.live.remove(idx);
        self.layer.remove_marker(handle)
    }
}

fn viewport() -> Rect {
    Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 200.0))
}

/// Looks straight down; one pixel is a tenth of a world unit.
fn top_view() -> ViewTransform {
    ViewTransform::look_at(
        Vec3::new(0.0, 0.0, 20.0),
        Vec3::ZERO,
        Vec3::new(0.0, 1.0, 0.0),
        Projection::Parallel { view_height: 20.0 },
        1.0,
    )
}

/// Deck slightly off-center so no test click lands on the shared diagonal.
fn deck() -> ViewerMesh {
    ViewerMesh::from_triangles(
        vec![
            Vec3::new(-8.0, -7.0, 0.0),
            Vec3::new(9.0, -7.0, 0.0),
            Vec3::new(9.0, 8.0, 0.0),
            Vec3::new(-8.0, 8.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
}

fn assert_marker_invariant(controller: &MeasureController) {
    let session = controller.session();
    let points = session.points().len();
    assert!(points <= 2);
    let expected_segments = usize::from(points == 2);
    assert_eq!(session.marker_count(), points);
    assert_eq!(session.segment_count(), expected_segments);
    assert_eq!(controller.markers().point_count(), points);
    assert_eq!(controller.markers().segment_count(), expected_segments);
}

fn click(controller: &mut MeasureController, mesh: &ViewerMesh, pos: Point2) -> RecordOutcome {
    controller.on_pointer_down(pos, viewport(), &top_view(), Some(mesh))
}

#[test]
fn picks_while_disarmed_change_nothing() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    for pos in [pos2(100.0, 100.0), pos2(130.0, 100.0), pos2(20.0, 180.0)] {
        assert_eq!(click(&mut controller, &mesh, pos), RecordOutcome::Ignored);
    }
    assert_eq!(controller.state(), MeasureState::Disarmed);
    assert!(controller.session().points().is_empty());
    assert!(controller.markers().is_empty());
    assert_eq!(controller.display_text(), DISTANCE_PLACEHOLDER);
}

#[test]
fn stray_record_while_disarmed_is_a_no_op() {
    let mut session = MeasurementSession::new();
    let mut scene = CountingScene::default();
    let outcome = session.record_point(Vec3::new(1.0, 2.0, 3.0), &mut scene);
    assert_eq!(outcome, RecordOutcome::Ignored);
    assert!(session.points().is_empty());
    assert!(scene.live.is_empty());
}

#[test]
fn first_pick_places_one_marker_without_distance() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    assert!(controller.toggle_measurement_mode());
    assert_eq!(controller.state(), MeasureState::ArmedEmpty);

    assert_eq!(
        click(&mut controller, &mesh, pos2(100.0, 100.0)),
        RecordOutcome::FirstPoint
    );
    assert_eq!(controller.state(), MeasureState::ArmedOnePoint);
    assert_eq!(controller.markers().len(), 1);
    assert_eq!(controller.session().distance(), None);
    assert_eq!(controller.display_text(), "-");
    assert_eq!(controller.session().points()[0].ordinal, PointOrdinal::First);
    assert_marker_invariant(&controller);
}

#[test]
fn two_points_give_euclidean_distance() {
    let mut session = MeasurementSession::new();
    let mut scene = CountingScene::default();
    session.toggle_arm(&mut scene);
    session.record_point(Vec3::new(0.0, 0.0, 0.0), &mut scene);
    let outcome = session.record_point(Vec3::new(3.0, 4.0, 0.0), &mut scene);

    assert_eq!(outcome, RecordOutcome::Completed { distance: 5.0 });
    assert_eq!(session.state(), MeasureState::ArmedComplete);
    assert_eq!(DistanceFormat::default().format(session.distance()), "5.00 m");
    assert_eq!(scene.live.len(), 3);
    assert_eq!(scene.segments, 1);
}

#[test]
fn clicks_on_the_deck_measure_through_the_controller() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(130.0, 100.0));
    let outcome = click(&mut controller, &mesh, pos2(100.0, 60.0));

    let RecordOutcome::Completed { distance } = outcome else {
        panic!("expected a completed measurement, got {outcome:?}");
    };
    assert!((distance - 5.0).abs() < 1.0e-5);
    assert_eq!(controller.display_text(), "5.00 m");
    let points = controller.session().points();
    assert!(points[0].position.distance(Vec3::new(3.0, 0.0, 0.0)) < 1.0e-5);
    assert!(points[1].position.distance(Vec3::new(0.0, 4.0, 0.0)) < 1.0e-5);
    assert_marker_invariant(&controller);
}

#[test]
fn precision_follows_the_format() {
    let mut controller = MeasureController::new(DistanceFormat::new(4, LengthUnit::Meter));
    let mesh = deck();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(100.0, 100.0));
    click(&mut controller, &mesh, pos2(120.0, 100.0));
    assert_eq!(controller.display_text(), "2.0000 m");
}

#[test]
fn third_pick_starts_a_new_measurement() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(100.0, 100.0));
    click(&mut controller, &mesh, pos2(130.0, 100.0));
    let old: Vec<_> = controller.markers().iter().map(|(handle, _)| handle).collect();
    assert_eq!(old.len(), 3);

    let outcome = click(&mut controller, &mesh, pos2(60.0, 140.0));
    assert_eq!(outcome, RecordOutcome::Restarted);
    assert_eq!(controller.state(), MeasureState::ArmedOnePoint);
    assert_eq!(controller.session().points().len(), 1);
    assert!(
        controller.session().points()[0]
            .position
            .distance(Vec3::new(-4.0, -4.0, 0.0))
            < 1.0e-5
    );
    assert!(old.iter().all(|handle| !controller.markers().contains(*handle)));
    assert_eq!(controller.display_text(), "-");
    assert_marker_invariant(&controller);
}

#[test]
fn clear_empties_every_state() {
    let mesh = deck();
    for clicks in 0..=3 {
        let mut controller = MeasureController::default();
        controller.toggle_measurement_mode();
        for idx in 0..clicks {
            click(&mut controller, &mesh, pos2(90.0 + idx as f32 * 10.0, 100.0));
        }
        controller.clear_measurement();
        assert_eq!(controller.state(), MeasureState::ArmedEmpty);
        assert!(controller.markers().is_empty());
        assert_eq!(controller.display_text(), DISTANCE_PLACEHOLDER);
    }

    let mut controller = MeasureController::default();
    controller.clear_measurement();
    controller.clear_measurement();
    assert_eq!(controller.state(), MeasureState::Disarmed);
}

#[test]
fn cancel_drops_an_unfinished_measurement() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(100.0, 100.0));

    controller.cancel_measurement();
    assert_eq!(controller.state(), MeasureState::Disarmed);
    assert!(controller.session().points().is_empty());
    assert!(controller.markers().is_empty());
}

#[test]
fn disarm_keeps_a_finished_measurement_until_cleared() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(100.0, 100.0));
    click(&mut controller, &mesh, pos2(130.0, 100.0));

    assert!(!controller.toggle_measurement_mode());
    assert_eq!(controller.state(), MeasureState::Disarmed);
    assert_eq!(controller.markers().len(), 3);
    assert_eq!(controller.display_text(), "3.00 m");

    assert_eq!(
        click(&mut controller, &mesh, pos2(40.0, 40.0)),
        RecordOutcome::Ignored
    );
    assert_eq!(controller.markers().len(), 3);

    controller.clear_measurement();
    assert!(controller.markers().is_empty());
    assert_eq!(controller.display_text(), "-");
}

#[test]
fn cancel_keeps_a_finished_measurement() {
    let mut session = MeasurementSession::new();
    let mut scene = CountingScene::default();
    session.toggle_arm(&mut scene);
    session.record_point(Vec3::ZERO, &mut scene);
    session.record_point(Vec3::new(0.0, 0.0, 2.0), &mut scene);
    session.cancel(&mut scene);

    assert_eq!(session.state(), MeasureState::Disarmed);
    assert_eq!(session.distance(), Some(2.0));
    assert_eq!(scene.live.len(), 3);
}

#[test]
fn rearming_starts_from_empty() {
    let mut session = MeasurementSession::new();
    let mut scene = CountingScene::default();
    session.toggle_arm(&mut scene);
    session.record_point(Vec3::ZERO, &mut scene);
    session.record_point(Vec3::new(1.0, 0.0, 0.0), &mut scene);
    session.toggle_arm(&mut scene);
    assert!(session.toggle_arm(&mut scene));

    assert_eq!(session.state(), MeasureState::ArmedEmpty);
    assert!(scene.live.is_empty());
    assert_eq!(scene.removed_twice, 0);
}

#[test]
fn absent_or_empty_target_never_changes_state() {
    let empty = ViewerMesh::default();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    for pos in [pos2(0.0, 0.0), pos2(100.0, 100.0), pos2(199.0, 50.0)] {
        let absent = controller.on_pointer_down(pos, viewport(), &top_view(), None);
        let hollow = controller.on_pointer_down(pos, viewport(), &top_view(), Some(&empty));
        assert_eq!(absent, RecordOutcome::Missed);
        assert_eq!(hollow, RecordOutcome::Missed);
    }
    assert_eq!(controller.state(), MeasureState::ArmedEmpty);
    assert!(controller.markers().is_empty());
}

#[test]
fn misses_leave_a_pending_point_alone() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(100.0, 100.0));
    assert_eq!(click(&mut controller, &mesh, pos2(5.0, 5.0)), RecordOutcome::Missed);
    assert_eq!(controller.state(), MeasureState::ArmedOnePoint);
    assert_marker_invariant(&controller);
}

#[derive(Clone, Copy)]
enum Step {
    Toggle,
    Click(f32, f32),
    Cancel,
    Clear,
}

#[test]
fn marker_count_tracks_points_through_a_long_session() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    let script = [
        Step::Click(100.0, 100.0),
        Step::Toggle,
        Step::Click(100.0, 100.0),
        Step::Click(110.0, 100.0),
        Step::Click(120.0, 100.0),
        Step::Click(0.0, 0.0),
        Step::Click(120.0, 120.0),
        Step::Cancel,
        Step::Toggle,
        Step::Click(80.0, 80.0),
        Step::Toggle,
        Step::Toggle,
        Step::Click(90.0, 90.0),
        Step::Click(95.0, 90.0),
        Step::Clear,
    ];
    for step in script {
        match step {
            Step::Toggle => {
                controller.toggle_measurement_mode();
            }
            Step::Click(x, y) => {
                click(&mut controller, &mesh, pos2(x, y));
            }
            Step::Cancel => controller.cancel_measurement(),
            Step::Clear => controller.clear_measurement(),
        }
        assert_marker_invariant(&controller);
    }
}

#[test]
fn markers_skip_depth_testing_and_draw_last() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(100.0, 100.0));
    click(&mut controller, &mesh, pos2(130.0, 100.0));

    for (_, marker) in controller.markers().iter() {
        assert!(!marker.style.depth_test);
        assert_eq!(marker.style.render_order, MARKER_RENDER_ORDER);
    }
    let order = controller.markers().draw_order();
    assert!(order[0].1.is_segment());
}

#[test]
fn markers_stay_visible_behind_geometry() {
    let mesh = deck();
    let mut controller = MeasureController::default();
    controller.toggle_measurement_mode();
    click(&mut controller, &mesh, pos2(100.0, 100.0));
    click(&mut controller, &mesh, pos2(130.0, 100.0));

    let roof = ViewerMesh::from_triangles(
        vec![
            Vec3::new(-9.0, -9.0, 5.0),
            Vec3::new(9.0, -9.0, 5.0),
            Vec3::new(9.0, 9.0, 5.0),
            Vec3::new(-9.0, 9.0, 5.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    );
    let mut painter = OverlayCollector::default();
    controller.paint(&mut painter, &top_view(), viewport(), Some(&roof));
    assert!(painter.circle_count() >= 2);
    assert!(painter.line_count() >= 1);
    assert!(painter.texts().any(|text| text == "3.00 m"));

    let mut layer = MarkerLayer::new();
    let mut hidden = Marker::point(Vec3::new(1.0, -2.0, 0.0));
    hidden.style.depth_test = true;
    layer.add_marker(hidden);
    let mut painter = OverlayCollector::default();
    layer.draw(&mut painter, &top_view(), viewport(), Some(&roof), None);
    assert_eq!(painter.circle_count(), 0);
}

#[test]
fn indicator_reflects_armed_state() {
    let mut controller = MeasureController::default();
    let idle = controller.indicator();
    assert!(!idle.armed);
    assert_eq!(idle.cursor, CursorHint::Default);

    controller.toggle_measurement_mode();
    let armed = controller.indicator();
    assert!(armed.armed);
    assert_eq!(armed.cursor, CursorHint::Crosshair);
    assert_ne!(idle.label, armed.label);
    assert_ne!(controller.hint(), MeasureController::default().hint());
}
