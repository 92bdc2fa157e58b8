use tracing::debug;

use super::picker::pick;
use super::presentation::{DistanceFormat, MarkerLayer};
use super::session::{MeasureState, MeasurementSession, RecordOutcome};
use crate::viewer::{OverlayPainter, Point2, Rect, ViewTransform, ViewerMesh};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
}

/// Armed/disarmed styling for the UI layer to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeIndicator {
    pub armed: bool,
    pub label: &'static str,
    pub cursor: CursorHint,
}

/// Binds viewport and command input to a measurement session and its markers.
#[derive(Clone, Debug, Default)]
pub struct MeasureController {
    session: MeasurementSession,
    markers: MarkerLayer,
    format: DistanceFormat,
}

impl MeasureController {
    pub fn new(format: DistanceFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Pointer press on the viewport. Picks only while armed.
    pub fn on_pointer_down(
        &mut self,
        screen: Point2,
        viewport: Rect,
        view: &ViewTransform,
        target: Option<&ViewerMesh>,
    ) -> RecordOutcome {
        if !self.session.is_armed() {
            return RecordOutcome::Ignored;
        }
        match pick(screen, viewport, view, target) {
            Some(point) => self.session.record_point(point, &mut self.markers),
            None => {
                debug!(x = screen.x, y = screen.y, "pick missed");
                RecordOutcome::Missed
            }
        }
    }

    pub fn toggle_measurement_mode(&mut self) -> bool {
        self.session.toggle_arm(&mut self.markers)
    }

    pub fn clear_measurement(&mut self) {
        self.session.clear(&mut self.markers);
    }

    pub fn cancel_measurement(&mut self) {
        self.session.cancel(&mut self.markers);
    }

    pub fn display_text(&self) -> String {
        self.format.format(self.session.distance())
    }

    pub fn state(&self) -> MeasureState {
        self.session.state()
    }

    pub fn indicator(&self) -> ModeIndicator {
        if self.session.is_armed() {
            ModeIndicator {
                armed: true,
                label: "Measure: ON",
                cursor: CursorHint::Crosshair,
            }
        } else {
            ModeIndicator {
                armed: false,
                label: "Measure: OFF",
                cursor: CursorHint::Default,
            }
        }
    }

    pub fn hint(&self) -> &'static str {
        match self.session.state() {
            MeasureState::Disarmed => "Press Measure (M) to start",
            MeasureState::ArmedEmpty => "Click the first point",
            MeasureState::ArmedOnePoint => "Click the second point",
            MeasureState::ArmedComplete => "Click to start a new measurement",
        }
    }

    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn format(&self) -> DistanceFormat {
        self.format
    }

    pub fn set_format(&mut self, format: DistanceFormat) {
        self.format = format;
    }

    /// Draws the markers with the distance label. Reads state only.
    pub fn paint(
        &self,
        painter: &mut impl OverlayPainter,
        view: &ViewTransform,
        rect: Rect,
        occluder: Option<&ViewerMesh>,
    ) {
        let label = self.session.distance().map(|_| self.display_text());
        self.markers
            .draw(painter, view, rect, occluder, label.as_deref());
    }
}
