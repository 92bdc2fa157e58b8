pub mod controller;
pub mod picker;
pub mod presentation;
pub mod session;

pub use controller::{CursorHint, MeasureController, ModeIndicator};
pub use picker::{pick, pick_ray};
pub use presentation::{
    DISTANCE_PLACEHOLDER, DistanceFormat, MARKER_RENDER_ORDER, Marker, MarkerHandle, MarkerLayer,
    MarkerScene, MarkerShape, MarkerStyle, distance,
};
pub use session::{MeasureState, MeasurementSession, PickedPoint, PointOrdinal, RecordOutcome};
