use super::math::{Aabb, Vec3};
use super::overlay::OverlayPainter;
use super::transform::ViewTransform;
use super::ui::{Color32, Rect, Stroke};

const TARGET_DIVISIONS: f64 = 10.0;
const MAX_LINES: usize = 200;

/// Reference grid on the ground plane under the model.
///
/// Drawn first and never part of the pick target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundGrid {
    pub center: Vec3,
    pub half_extent: f64,
    pub step: f64,
}

impl Default for GroundGrid {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            half_extent: 10.0,
            step: 1.0,
        }
    }
}

impl GroundGrid {
    pub fn for_bounds(bounds: Aabb) -> Self {
        let Aabb { min, max } = bounds;
        let size = (max.x - min.x).max(max.y - min.y).max(1.0e-3);
        let step = nice_step(size / TARGET_DIVISIONS);
        let half_extent = ((size * 0.75) / step).ceil() * step;
        let center = Vec3::new(
            ((min.x + max.x) * 0.5 / step).round() * step,
            ((min.y + max.y) * 0.5 / step).round() * step,
            min.z,
        );
        Self {
            center,
            half_extent,
            step,
        }
    }

    pub fn line_count(&self) -> usize {
        let per_axis = ((2.0 * self.half_extent / self.step).round() as usize + 1).min(MAX_LINES);
        per_axis * 2
    }

    pub fn draw(&self, painter: &mut impl OverlayPainter, view: &ViewTransform, rect: Rect) {
        let minor = Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 140, 60));
        let axis = Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 140, 140));
        let per_axis = self.line_count() / 2;
        let h = self.half_extent;
        for idx in 0..per_axis {
            let offset = -h + idx as f64 * self.step;
            let stroke = if offset.abs() < self.step * 0.5 { axis } else { minor };
            let lines = [
                (
                    self.center + Vec3::new(offset, -h, 0.0),
                    self.center + Vec3::new(offset, h, 0.0),
                ),
                (
                    self.center + Vec3::new(-h, offset, 0.0),
                    self.center + Vec3::new(h, offset, 0.0),
                ),
            ];
            for (start, end) in lines {
                let (Some((a, _)), Some((b, _))) = (view.project(start, rect), view.project(end, rect))
                else {
                    continue;
                };
                painter.line_segment(a, b, stroke);
            }
        }
    }
}

/// Rounds up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}
