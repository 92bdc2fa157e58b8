pub mod bvh;
pub mod camera;
pub mod grid;
pub mod input;
pub mod math;
pub mod mesh;
pub mod overlay;
pub mod pick;
pub mod transform;
pub mod ui;

pub use camera::OrbitCamera;
pub use grid::GroundGrid;
pub use input::{Modifiers, ViewerInput};
pub use math::{Aabb, Vec3};
pub use mesh::{SurfaceHit, ViewerMesh};
pub use overlay::{OverlayCollector, OverlayPainter, OverlayShape};
pub use transform::{
    ClipVertex, Ndc, Projection, ProjectionKind, Ray, ViewTransform, normalize_device,
};
pub use ui::{Align2, Color32, Point2, Rect, Stroke, Vec2, pos2, vec2};
