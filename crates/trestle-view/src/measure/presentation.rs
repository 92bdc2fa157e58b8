use std::collections::BTreeMap;

use trestle_base::LengthUnit;

use crate::viewer::{
    Align2, Color32, OverlayPainter, Point2, Rect, Stroke, Vec3, ViewTransform, ViewerMesh, vec2,
};

/// Text shown while no distance is available.
pub const DISTANCE_PLACEHOLDER: &str = "-";

/// Render band for measurement glyphs. Grid and mesh draw in lower bands.
pub const MARKER_RENDER_ORDER: i32 = 999;

pub const MIN_DECIMALS: usize = 2;

const POINT_RADIUS: f32 = 6.0;
const SEGMENT_WIDTH: f32 = 2.5;
const LABEL_SIZE: f32 = 14.0;
const OCCLUSION_EPS: f64 = 1.0e-6;

/// Straight-line distance in world units.
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    a.distance(b)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistanceFormat {
    decimals: usize,
    unit: LengthUnit,
}

impl Default for DistanceFormat {
    fn default() -> Self {
        Self {
            decimals: MIN_DECIMALS,
            unit: LengthUnit::Meter,
        }
    }
}

impl DistanceFormat {
    pub fn new(decimals: usize, unit: LengthUnit) -> Self {
        Self {
            decimals: decimals.max(MIN_DECIMALS),
            unit,
        }
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// `Some(5.0)` becomes `"5.00 m"`; `None` and non-finite values become the
    /// placeholder.
    pub fn format(&self, value: Option<f64>) -> String {
        match value {
            Some(value) if value.is_finite() => {
                format!("{:.*} {}", self.decimals, value, self.unit.symbol())
            }
            _ => DISTANCE_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
    pub color: Color32,
    /// Pixel radius for points, stroke width for segments.
    pub size: f32,
    /// Hide the marker wherever the target surface is in front of it, for
    /// annotations that belong to the model. Measurement markers leave it off
    /// so a point picked on a far face stays visible after orbiting.
    pub depth_test: bool,
    pub render_order: i32,
}

impl MarkerStyle {
    pub fn point() -> Self {
        Self {
            color: Color32::from_rgb(230, 60, 50),
            size: POINT_RADIUS,
            depth_test: false,
            render_order: MARKER_RENDER_ORDER,
        }
    }

    pub fn segment() -> Self {
        Self {
            color: Color32::from_rgb(255, 200, 40),
            size: SEGMENT_WIDTH,
            depth_test: false,
            render_order: MARKER_RENDER_ORDER,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerShape {
    Sphere { center: Vec3 },
    Segment { start: Vec3, end: Vec3 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub shape: MarkerShape,
    pub style: MarkerStyle,
}

impl Marker {
    pub fn point(center: Vec3) -> Self {
        Self {
            shape: MarkerShape::Sphere { center },
            style: MarkerStyle::point(),
        }
    }

    pub fn segment(start: Vec3, end: Vec3) -> Self {
        Self {
            shape: MarkerShape::Segment { start, end },
            style: MarkerStyle::segment(),
        }
    }

    pub fn is_segment(&self) -> bool {
        matches!(self.shape, MarkerShape::Segment { .. })
    }
}

/// Where measurement glyphs live while they are shown.
pub trait MarkerScene {
    fn add_marker(&mut self, marker: Marker) -> MarkerHandle;
    /// Returns false if the handle was already removed. Never fails.
    fn remove_marker(&mut self, handle: MarkerHandle) -> bool;
}

/// Marker storage drawn as an overlay on top of the rendered model.
#[derive(Clone, Debug, Default)]
pub struct MarkerLayer {
    next_id: u64,
    markers: BTreeMap<MarkerHandle, Marker>,
}

impl MarkerScene for MarkerLayer {
    fn add_marker(&mut self, marker: Marker) -> MarkerHandle {
        let handle = MarkerHandle(self.next_id);
        self.next_id += 1;
        self.markers.insert(handle, marker);
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> bool {
        self.markers.remove(&handle).is_some()
    }
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, handle: MarkerHandle) -> Option<&Marker> {
        self.markers.get(&handle)
    }

    pub fn contains(&self, handle: MarkerHandle) -> bool {
        self.markers.contains_key(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MarkerHandle, &Marker)> {
        self.markers.iter().map(|(handle, marker)| (*handle, marker))
    }

    pub fn point_count(&self) -> usize {
        self.markers.values().filter(|marker| !marker.is_segment()).count()
    }

    pub fn segment_count(&self) -> usize {
        self.markers.values().filter(|marker| marker.is_segment()).count()
    }

    /// Markers in draw order: render band first, then segments under points.
    pub fn draw_order(&self) -> Vec<(MarkerHandle, &Marker)> {
        let mut ordered: Vec<_> = self.iter().collect();
        ordered.sort_by_key(|(handle, marker)| {
            (marker.style.render_order, !marker.is_segment(), *handle)
        });
        ordered
    }

    /// Paints every marker. `occluder` only affects markers that opt into depth
    /// testing; measurement markers never do.
    pub fn draw(
        &self,
        painter: &mut impl OverlayPainter,
        view: &ViewTransform,
        rect: Rect,
        occluder: Option<&ViewerMesh>,
        label: Option<&str>,
    ) {
        for (_, marker) in self.draw_order() {
            let style = marker.style;
            match marker.shape {
                MarkerShape::Sphere { center } => {
                    if style.depth_test && is_occluded(center, view, occluder) {
                        continue;
                    }
                    let Some((pos, _)) = view.project(center, rect) else {
                        continue;
                    };
                    draw_sphere_glyph(painter, pos, style);
                }
                MarkerShape::Segment { start, end } => {
                    if style.depth_test && is_occluded((start + end) * 0.5, view, occluder) {
                        continue;
                    }
                    let (Some((a, _)), Some((b, _))) =
                        (view.project(start, rect), view.project(end, rect))
                    else {
                        continue;
                    };
                    painter.line_segment(a, b, Stroke::new(style.size + 2.0, Color32::from_gray(20)));
                    painter.line_segment(a, b, Stroke::new(style.size, style.color));
                    if let Some(text) = label {
                        draw_label(painter, a.midpoint(b), text);
                    }
                }
            }
        }
    }
}

fn draw_sphere_glyph(painter: &mut impl OverlayPainter, pos: Point2, style: MarkerStyle) {
    let radius = style.size;
    painter.circle_filled(pos, radius, style.color);
    painter.circle_stroke(pos, radius, Stroke::new(1.5, Color32::from_gray(245)));
    painter.circle_filled(
        pos + vec2(-radius * 0.35, -radius * 0.35),
        radius * 0.3,
        Color32::from_rgba_unmultiplied(255, 255, 255, 150),
    );
}

fn draw_label(painter: &mut impl OverlayPainter, anchor: Point2, text: &str) {
    let width = text.chars().count() as f32 * LABEL_SIZE * 0.6 + 10.0;
    let height = LABEL_SIZE + 8.0;
    let bottom = anchor + vec2(0.0, -8.0);
    let rect = Rect::from_center_size(bottom + vec2(0.0, -height * 0.5), vec2(width, height));
    painter.rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(20, 24, 28, 210));
    painter.text(
        bottom + vec2(0.0, -4.0),
        Align2::CenterBottom,
        text.to_string(),
        LABEL_SIZE,
        Color32::from_rgb(255, 220, 120),
    );
}

fn is_occluded(point: Vec3, view: &ViewTransform, occluder: Option<&ViewerMesh>) -> bool {
    let Some(mesh) = occluder else {
        return false;
    };
    let Some((ndc, _)) = view.to_ndc(point) else {
        return false;
    };
    let ray = view.ray(ndc);
    let reach = (point - ray.origin).dot(ray.dir);
    mesh.ray_pick(&ray)
        .is_some_and(|hit| hit.t < reach - OCCLUSION_EPS * reach.abs().max(1.0))
}
