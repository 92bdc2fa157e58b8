use std::ops::{Add, Div, Mul, Neg, Sub};

use truck_base::cgmath64::{Matrix3, Point3, Rad, Vector3};

/// World-space point or direction. The world is Z-up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    fn zip(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }

    /// Component by index: 0 is x, 1 is y, anything else is z.
    pub fn axis(self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn dot(self, other: Self) -> f64 {
        let p = self.zip(other, |a, b| a * b);
        p.x + p.y + p.z
    }

    pub fn cross(self, other: Self) -> Self {
        Vector3::from(self).cross(other.into()).into()
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Unit vector, or zero for a degenerate input.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f64::EPSILON { Self::ZERO } else { self / len }
    }

    pub fn min(self, other: Self) -> Self {
        self.zip(other, f64::min)
    }

    pub fn max(self, other: Self) -> Self {
        self.zip(other, f64::max)
    }

    pub fn max_component(self) -> f64 {
        let a = self.map(f64::abs);
        a.x.max(a.y).max(a.z)
    }

    pub fn is_finite(self) -> bool {
        [self.x, self.y, self.z].iter().all(|c| c.is_finite())
    }

    /// Rotates about the line through `origin` along `axis`, right-handed.
    pub fn rotated_about(self, origin: Self, axis: Self, angle: f64) -> Self {
        let axis = axis.normalized();
        if axis == Self::ZERO {
            return self;
        }
        let rotation = Matrix3::from_axis_angle(axis.into(), Rad(angle));
        origin + Vec3::from(rotation * Vector3::from(self - origin))
    }
}

impl From<Point3> for Vec3 {
    fn from(point: Point3) -> Self {
        Self::new(point.x, point.y, point.z)
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

macro_rules! componentwise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Vec3 {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a $op b)
            }
        }
    };
}

componentwise!(Add, add, +);
componentwise!(Sub, sub, -);

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.map(|c| c * rhs)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.map(|c| c / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|c| -c)
    }
}

/// Axis-aligned box, used for model extents and BVH nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Tightest box around the points, `None` when there are none.
    pub fn enclosing(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points
            .into_iter()
            .map(|p| Self { min: p, max: p })
            .reduce(Self::union)
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index of the widest axis, for `Vec3::axis`.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        (0..3)
            .max_by(|&a, &b| size.axis(a).total_cmp(&size.axis(b)))
            .unwrap_or(0)
    }

    /// Parameter range `[enter, exit]` where `origin + dir * t` is inside,
    /// clamped to `[0, max_t]`.
    pub fn ray_interval(&self, origin: Vec3, dir: Vec3, max_t: f64) -> Option<(f64, f64)> {
        let mut enter = 0.0_f64;
        let mut exit = max_t;
        for axis in 0..3 {
            let (o, d) = (origin.axis(axis), dir.axis(axis));
            let (lo, hi) = (self.min.axis(axis), self.max.axis(axis));
            if d.abs() <= 1.0e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (t0, t1) = ((lo - o) / d, (hi - o) / d);
            enter = enter.max(t0.min(t1));
            exit = exit.min(t0.max(t1));
            if exit < enter {
                return None;
            }
        }
        Some((enter, exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_about_vertical() {
        let rotated = Vec3::new(1.0, 0.0, 0.0).rotated_about(
            Vec3::ZERO,
            Vec3::UNIT_Z,
            std::f64::consts::FRAC_PI_2,
        );
        assert!(rotated.distance(Vec3::UNIT_Y) < 1.0e-12);
    }

    #[test]
    fn rotation_about_offset_pivot_keeps_radius() {
        let pivot = Vec3::new(5.0, 5.0, 0.0);
        let rotated = Vec3::new(8.0, 5.0, 2.0).rotated_about(pivot, Vec3::UNIT_Z, 1.0);
        assert!((rotated.distance(pivot) - Vec3::new(3.0, 0.0, 2.0).length()).abs() < 1.0e-12);
        assert!((rotated.z - 2.0).abs() < 1.0e-12);
    }

    #[test]
    fn enclosing_box_of_deck_corners() {
        assert!(Aabb::enclosing([]).is_none());
        let deck = Aabb::enclosing([Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0)]);
        assert_eq!(
            deck,
            Some(Aabb::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn ray_interval_enters_and_exits() {
        let span = Aabb::new(Vec3::new(-10.0, -2.0, 0.0), Vec3::new(10.0, 2.0, 1.0));
        let down = span.ray_interval(Vec3::new(0.0, 0.0, 5.0), -Vec3::UNIT_Z, f64::INFINITY);
        assert_eq!(down, Some((4.0, 5.0)));
        let beside = span.ray_interval(Vec3::new(0.0, 3.0, 5.0), -Vec3::UNIT_Z, f64::INFINITY);
        assert!(beside.is_none());
        let short = span.ray_interval(Vec3::new(0.0, 0.0, 5.0), -Vec3::UNIT_Z, 3.0);
        assert!(short.is_none());
        assert_eq!(span.longest_axis(), 0);
    }
}
