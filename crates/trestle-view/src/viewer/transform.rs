use super::math::Vec3;
use super::ui::{Point2, Rect, pos2};

const DEFAULT_NEAR: f64 = 1.0e-4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Parallel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective { fov_y_deg: f64 },
    /// World-space height covered by the viewport.
    Parallel { view_height: f64 },
}

impl Projection {
    pub fn kind(&self) -> ProjectionKind {
        match self {
            Projection::Perspective { .. } => ProjectionKind::Perspective,
            Projection::Parallel { .. } => ProjectionKind::Parallel,
        }
    }
}

/// Normalized device coordinates. Both axes span [-1, 1]; +y is up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ndc {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Polygon corner carried through near-plane clipping with its texture
/// coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipVertex {
    pub position: Vec3,
    pub uv: [f32; 2],
}

impl ClipVertex {
    fn lerp(self, other: Self, s: f64) -> Self {
        let k = s as f32;
        Self {
            position: self.position + (other.position - self.position) * s,
            uv: [
                self.uv[0] + (other.uv[0] - self.uv[0]) * k,
                self.uv[1] + (other.uv[1] - self.uv[1]) * k,
            ],
        }
    }
}

/// Maps a screen position inside `viewport` to device coordinates.
///
/// Screen y grows downward, device y grows upward. Positions outside the
/// viewport and degenerate viewports give `None`.
pub fn normalize_device(screen: Point2, viewport: Rect) -> Option<Ndc> {
    let width = viewport.width();
    let height = viewport.height();
    if !(width > 0.0 && height > 0.0) || !viewport.contains(screen) {
        return None;
    }
    let x = ((screen.x - viewport.min.x) / width) as f64 * 2.0 - 1.0;
    let y = 1.0 - ((screen.y - viewport.min.y) / height) as f64 * 2.0;
    Some(Ndc { x, y })
}

/// Camera pose plus projection for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub eye: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub projection: Projection,
    pub aspect: f64,
    pub near: f64,
}

impl ViewTransform {
    pub fn look_at(eye: Vec3, target: Vec3, up_hint: Vec3, projection: Projection, aspect: f64) -> Self {
        let mut forward = (target - eye).normalized();
        if forward.length() <= f64::EPSILON {
            forward = -Vec3::UNIT_Z;
        }
        let mut right = forward.cross(up_hint);
        if right.length() <= 1.0e-6 {
            right = forward.cross(Vec3::UNIT_Y);
        }
        let right = right.normalized();
        let up = right.cross(forward).normalized();
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Self {
            eye,
            right,
            up,
            forward,
            projection,
            aspect,
            near: DEFAULT_NEAR,
        }
    }

    fn half_extents(&self) -> (f64, f64) {
        match self.projection {
            Projection::Perspective { fov_y_deg } => {
                let t = (fov_y_deg.to_radians() * 0.5).tan();
                (t * self.aspect, t)
            }
            Projection::Parallel { view_height } => {
                let half_h = view_height * 0.5;
                (half_h * self.aspect, half_h)
            }
        }
    }

    /// World-space ray through a device position.
    pub fn ray(&self, ndc: Ndc) -> Ray {
        let (half_w, half_h) = self.half_extents();
        match self.projection {
            Projection::Perspective { .. } => {
                let dir = self.forward + self.right * (ndc.x * half_w) + self.up * (ndc.y * half_h);
                Ray {
                    origin: self.eye,
                    dir: dir.normalized(),
                }
            }
            Projection::Parallel { .. } => Ray {
                origin: self.eye + self.right * (ndc.x * half_w) + self.up * (ndc.y * half_h),
                dir: self.forward,
            },
        }
    }

    /// Device position and view depth of a world point. Points at or behind
    /// the near plane give `None`.
    pub fn to_ndc(&self, point: Vec3) -> Option<(Ndc, f64)> {
        let rel = point - self.eye;
        let cx = rel.dot(self.right);
        let cy = rel.dot(self.up);
        let depth = self.depth(point);
        if depth <= self.near {
            return None;
        }
        let (half_w, half_h) = self.half_extents();
        let ndc = match self.projection {
            Projection::Perspective { .. } => Ndc {
                x: cx / (depth * half_w),
                y: cy / (depth * half_h),
            },
            Projection::Parallel { .. } => Ndc {
                x: cx / half_w,
                y: cy / half_h,
            },
        };
        Some((ndc, depth))
    }

    /// Signed distance in front of the eye along the view direction.
    pub fn depth(&self, point: Vec3) -> f64 {
        (point - self.eye).dot(self.forward)
    }

    /// Cuts a triangle down to the part in front of the near plane, as zero,
    /// one or two triangles that all project.
    pub fn clip_near(&self, tri: [ClipVertex; 3]) -> Vec<[ClipVertex; 3]> {
        // Clip a little past `near` so corners on the cut still project.
        let plane = self.near * 2.0;
        let side = |v: &ClipVertex| self.depth(v.position) - plane;
        let mut kept: Vec<ClipVertex> = Vec::with_capacity(4);
        for (i, &a) in tri.iter().enumerate() {
            let b = tri[(i + 1) % 3];
            let (da, db) = (side(&a), side(&b));
            if da >= 0.0 {
                kept.push(a);
            }
            if (da >= 0.0) != (db >= 0.0) {
                kept.push(a.lerp(b, da / (da - db)));
            }
        }
        (1..kept.len().saturating_sub(1))
            .map(|i| [kept[0], kept[i], kept[i + 1]])
            .collect()
    }

    pub fn project(&self, point: Vec3, rect: Rect) -> Option<(Point2, f64)> {
        let (ndc, depth) = self.to_ndc(point)?;
        let center = rect.center();
        let sx = center.x + (ndc.x * rect.width() as f64 * 0.5) as f32;
        let sy = center.y - (ndc.y * rect.height() as f64 * 0.5) as f32;
        Some((pos2(sx, sy), depth))
    }
}
