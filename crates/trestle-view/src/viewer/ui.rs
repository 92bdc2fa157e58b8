//! Viewport pixel space, independent of the GUI toolkit. Origin at the
//! top-left corner of the viewport, y grows downward.

use std::ops::Add;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

pub const fn pos2(x: f32, y: f32) -> Point2 {
    Point2 { x, y }
}

pub const fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2 { x, y }
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        pos2(x, y)
    }

    pub fn midpoint(self, other: Point2) -> Point2 {
        pos2((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl Vec2 {
    pub const ZERO: Self = vec2(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        vec2(x, y)
    }
}

impl Add<Vec2> for Point2 {
    type Output = Point2;

    fn add(self, rhs: Vec2) -> Point2 {
        pos2(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Pixel rectangle. Both edges count as inside.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Point2,
    pub max: Point2,
}

impl Rect {
    pub fn from_min_size(min: Point2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    pub fn from_center_size(center: Point2, size: Vec2) -> Self {
        Self::from_min_size(center + vec2(-size.x * 0.5, -size.y * 0.5), size)
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.max.x - self.min.x, self.max.y - self.min.y)
    }

    pub fn width(&self) -> f32 {
        self.size().x
    }

    pub fn height(&self) -> f32 {
        self.size().y
    }

    /// Width over height, 1 for a collapsed rectangle.
    pub fn aspect(&self) -> f64 {
        let size = self.size();
        if size.y > 0.0 {
            f64::from(size.x) / f64::from(size.y)
        } else {
            1.0
        }
    }

    pub fn center(&self) -> Point2 {
        self.min.midpoint(self.max)
    }

    pub fn contains(&self, pos: Point2) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x) && (self.min.y..=self.max.y).contains(&pos.y)
    }
}

/// Straight-alpha RGBA8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color32(pub [u8; 4]);

impl Color32 {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub const fn from_gray(value: u8) -> Self {
        Self::from_rgb(value, value, value)
    }

    pub const fn from_rgba_unmultiplied(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn to_array(self) -> [u8; 4] {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color32,
}

impl Stroke {
    pub fn new(width: f32, color: Color32) -> Self {
        Self { width, color }
    }
}

/// Which point of a text block sits on its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align2 {
    /// Viewport captions.
    LeftTop,
    /// Labels floating above a marker.
    CenterBottom,
}
