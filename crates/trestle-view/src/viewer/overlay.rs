use super::ui::{Align2, Color32, Point2, Rect, Stroke};

/// One primitive painted over the model, in viewport pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayShape {
    /// Filled, rounded backdrop behind a label.
    Plate {
        rect: Rect,
        radius: f32,
        fill: Color32,
    },
    Line {
        start: Point2,
        end: Point2,
        stroke: Stroke,
    },
    Disc {
        center: Point2,
        radius: f32,
        fill: Color32,
    },
    Ring {
        center: Point2,
        radius: f32,
        stroke: Stroke,
    },
    Text {
        anchor: Point2,
        align: Align2,
        text: String,
        size: f32,
        color: Color32,
    },
}

/// Sink for everything painted over the model: grid lines, marker glyphs
/// and captions. Shapes arrive in paint order.
pub trait OverlayPainter {
    fn add(&mut self, shape: OverlayShape);

    fn rect_filled(&mut self, rect: Rect, radius: f32, fill: Color32) {
        self.add(OverlayShape::Plate { rect, radius, fill });
    }

    fn line_segment(&mut self, start: Point2, end: Point2, stroke: Stroke) {
        self.add(OverlayShape::Line { start, end, stroke });
    }

    fn circle_filled(&mut self, center: Point2, radius: f32, fill: Color32) {
        self.add(OverlayShape::Disc {
            center,
            radius,
            fill,
        });
    }

    fn circle_stroke(&mut self, center: Point2, radius: f32, stroke: Stroke) {
        self.add(OverlayShape::Ring {
            center,
            radius,
            stroke,
        });
    }

    fn text(&mut self, anchor: Point2, align: Align2, text: String, size: f32, color: Color32) {
        self.add(OverlayShape::Text {
            anchor,
            align,
            text,
            size,
            color,
        });
    }
}

/// Keeps shapes instead of drawing them.
#[derive(Debug, Default)]
pub struct OverlayCollector {
    pub shapes: Vec<OverlayShape>,
}

impl OverlayPainter for OverlayCollector {
    fn add(&mut self, shape: OverlayShape) {
        self.shapes.push(shape);
    }
}

impl OverlayCollector {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            OverlayShape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn circle_count(&self) -> usize {
        self.count(|shape| matches!(shape, OverlayShape::Disc { .. }))
    }

    pub fn line_count(&self) -> usize {
        self.count(|shape| matches!(shape, OverlayShape::Line { .. }))
    }

    fn count(&self, pred: impl Fn(&OverlayShape) -> bool) -> usize {
        self.shapes.iter().filter(|shape| pred(shape)).count()
    }
}
