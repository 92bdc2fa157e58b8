use egui::FontId;
use trestle_view::viewer::{Align2, Color32, OverlayPainter, OverlayShape, Point2, Rect, Stroke};

/// Hands overlay shapes to egui, moving them from viewport pixels to screen
/// points.
pub struct EguiOverlay<'a> {
    painter: &'a egui::Painter,
    origin: egui::Vec2,
}

impl<'a> EguiOverlay<'a> {
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2) -> Self {
        Self {
            painter,
            origin: origin.to_vec2(),
        }
    }

    fn pos(&self, point: Point2) -> egui::Pos2 {
        egui::pos2(point.x, point.y) + self.origin
    }

    fn rect(&self, rect: Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.pos(rect.min), self.pos(rect.max))
    }
}

impl OverlayPainter for EguiOverlay<'_> {
    fn add(&mut self, shape: OverlayShape) {
        let shape = match shape {
            OverlayShape::Plate { rect, radius, fill } => {
                egui::Shape::rect_filled(self.rect(rect), radius, color(fill))
            }
            OverlayShape::Line { start, end, stroke } => {
                egui::Shape::line_segment([self.pos(start), self.pos(end)], stroke_of(stroke))
            }
            OverlayShape::Disc {
                center,
                radius,
                fill,
            } => egui::Shape::circle_filled(self.pos(center), radius, color(fill)),
            OverlayShape::Ring {
                center,
                radius,
                stroke,
            } => egui::Shape::circle_stroke(self.pos(center), radius, stroke_of(stroke)),
            OverlayShape::Text {
                anchor,
                align,
                text,
                size,
                color: fill,
            } => {
                let align = match align {
                    Align2::LeftTop => egui::Align2::LEFT_TOP,
                    Align2::CenterBottom => egui::Align2::CENTER_BOTTOM,
                };
                self.painter.text(
                    self.pos(anchor),
                    align,
                    text,
                    FontId::proportional(size),
                    color(fill),
                );
                return;
            }
        };
        self.painter.add(shape);
    }
}

fn color(color: Color32) -> egui::Color32 {
    let [r, g, b, a] = color.to_array();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn stroke_of(stroke: Stroke) -> egui::Stroke {
    egui::Stroke::new(stroke.width, color(stroke.color))
}
