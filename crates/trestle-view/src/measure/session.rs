use tracing::debug;

use super::presentation::{Marker, MarkerHandle, MarkerScene, distance};
use crate::viewer::Vec3;

/// Measurement mode as seen by the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeasureState {
    #[default]
    Disarmed,
    ArmedEmpty,
    ArmedOnePoint,
    ArmedComplete,
}

impl MeasureState {
    pub fn is_armed(self) -> bool {
        self != MeasureState::Disarmed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointOrdinal {
    First,
    Second,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickedPoint {
    pub position: Vec3,
    pub ordinal: PointOrdinal,
}

/// What a pointer press did to the measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordOutcome {
    /// Not armed, or the point was unusable.
    Ignored,
    /// Armed, but the ray did not hit the model.
    Missed,
    FirstPoint,
    Completed { distance: f64 },
    /// The previous complete measurement was dropped and the point starts a new one.
    Restarted,
}

impl RecordOutcome {
    pub fn changed_state(self) -> bool {
        !matches!(self, RecordOutcome::Ignored | RecordOutcome::Missed)
    }
}

/// One two-point measurement and the markers it owns.
///
/// Markers are created and destroyed only through the `MarkerScene` passed to
/// each transition, so the scene holds exactly one point marker per recorded
/// point and a segment only when both points exist.
#[derive(Clone, Debug, Default)]
pub struct MeasurementSession {
    armed: bool,
    points: Vec<PickedPoint>,
    point_markers: Vec<MarkerHandle>,
    segment: Option<MarkerHandle>,
    distance: Option<f64>,
}

impl MeasurementSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MeasureState {
        if !self.armed {
            return MeasureState::Disarmed;
        }
        match self.points.len() {
            0 => MeasureState::ArmedEmpty,
            1 => MeasureState::ArmedOnePoint,
            _ => MeasureState::ArmedComplete,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn points(&self) -> &[PickedPoint] {
        &self.points
    }

    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn marker_count(&self) -> usize {
        self.point_markers.len()
    }

    pub fn segment_count(&self) -> usize {
        usize::from(self.segment.is_some())
    }

    pub fn marker_handles(&self) -> impl Iterator<Item = MarkerHandle> + '_ {
        self.point_markers.iter().copied().chain(self.segment)
    }

    /// Arms or disarms. Returns the new armed flag.
    ///
    /// Arming always starts from an empty measurement. Disarming drops a
    /// half-finished measurement but keeps a complete one on screen.
    pub fn toggle_arm(&mut self, scene: &mut impl MarkerScene) -> bool {
        if self.armed {
            self.disarm(scene);
        } else {
            self.discard(scene);
            self.armed = true;
            debug!("measurement armed");
        }
        self.armed
    }

    pub fn record_point(&mut self, point: Vec3, scene: &mut impl MarkerScene) -> RecordOutcome {
        if !self.armed {
            debug!(?point, "point ignored while disarmed");
            return RecordOutcome::Ignored;
        }
        if !point.is_finite() {
            debug!(?point, "non-finite point ignored");
            return RecordOutcome::Ignored;
        }

        match self.points.len() {
            0 => {
                self.push_point(point, PointOrdinal::First, scene);
                debug!(?point, "first point recorded");
                RecordOutcome::FirstPoint
            }
            1 => {
                let first = self.points[0].position;
                self.push_point(point, PointOrdinal::Second, scene);
                self.segment = Some(scene.add_marker(Marker::segment(first, point)));
                let value = distance(first, point);
                self.distance = Some(value);
                debug!(distance = value, "measurement complete");
                RecordOutcome::Completed { distance: value }
            }
            _ => {
                self.discard(scene);
                self.push_point(point, PointOrdinal::First, scene);
                debug!(?point, "measurement restarted");
                RecordOutcome::Restarted
            }
        }
    }

    /// Removes every point and marker. The armed flag is left as is.
    pub fn clear(&mut self, scene: &mut impl MarkerScene) {
        if !self.points.is_empty() {
            debug!("measurement cleared");
        }
        self.discard(scene);
    }

    /// Leaves measurement mode with the same cleanup as disarming.
    pub fn cancel(&mut self, scene: &mut impl MarkerScene) {
        if self.armed {
            self.disarm(scene);
        }
    }

    fn disarm(&mut self, scene: &mut impl MarkerScene) {
        if self.points.len() == 1 {
            debug!("incomplete measurement discarded");
            self.discard(scene);
        }
        self.armed = false;
        debug!("measurement disarmed");
    }

    fn push_point(&mut self, position: Vec3, ordinal: PointOrdinal, scene: &mut impl MarkerScene) {
        self.points.push(PickedPoint { position, ordinal });
        self.point_markers.push(scene.add_marker(Marker::point(position)));
    }

    fn discard(&mut self, scene: &mut impl MarkerScene) {
        for handle in self.point_markers.drain(..).chain(self.segment.take()) {
            scene.remove_marker(handle);
        }
        self.points.clear();
        self.distance = None;
    }
}
