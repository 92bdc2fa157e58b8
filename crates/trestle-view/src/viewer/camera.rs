use super::input::ViewerInput;
use super::math::{Aabb, Vec3};
use super::transform::{Projection, ProjectionKind, ViewTransform};
use super::ui::Rect;

const ORBIT_SPEED: f64 = 0.01;
const PAN_SPEED: f64 = 0.002;
const ZOOM_SPEED: f64 = 0.01;
const MIN_DISTANCE: f64 = 1.0e-3;
const MAX_DISTANCE: f64 = 1.0e7;

/// Orbit camera around a target in a Z-up world.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    target: Vec3,
    camera_pos: Vec3,
    camera_up: Vec3,
    fov_deg: f64,
    projection: ProjectionKind,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let yaw: f64 = 0.6;
        let pitch: f64 = 0.35;
        let distance: f64 = 50.0;
        let forward =
            -Vec3::new(yaw.cos() * pitch.cos(), yaw.sin() * pitch.cos(), pitch.sin()).normalized();
        let target = Vec3::ZERO;
        let camera_pos = target - forward * distance;
        Self {
            target,
            camera_pos,
            camera_up: Self::default_up(forward),
            fov_deg: 45.0,
            projection: ProjectionKind::Perspective,
        }
    }
}

impl OrbitCamera {
    pub fn new(projection: ProjectionKind) -> Self {
        Self {
            projection,
            ..Self::default()
        }
    }

    pub fn reset_view(&mut self) {
        let projection = self.projection;
        *self = Self::new(projection);
    }

    pub fn projection(&self) -> ProjectionKind {
        self.projection
    }

    pub fn set_projection(&mut self, projection: ProjectionKind) {
        self.projection = projection;
    }

    /// Frames the box from the current viewing direction.
    pub fn fit_bounds(&mut self, bounds: Aabb) {
        let center = bounds.center();
        let radius = bounds.size().max_component().max(1.0e-3) * 0.5;
        let forward = self.forward();
        self.target = center;
        self.camera_pos = center - forward * (radius * 3.0).max(MIN_DISTANCE * 10.0);
        self.camera_up = Self::default_up(forward);
    }

    /// Applies navigation gestures. Returns true when the view changed.
    ///
    /// Middle drag orbits, right drag or shift + middle drag pans and the
    /// wheel zooms. The primary button is left to the caller.
    pub fn handle_input(&mut self, input: &ViewerInput) -> bool {
        let delta = input.pointer_delta;
        let dragging = delta.x.abs() > 0.0 || delta.y.abs() > 0.0;
        let mut changed = false;

        let pan = input.secondary_down || (input.middle_down && input.modifiers.shift);
        if pan && dragging {
            let transform = self.transform(input.rect);
            let scale = self.distance() * PAN_SPEED;
            let delta_world = -transform.right * (delta.x as f64 * scale)
                + transform.up * (delta.y as f64 * scale);
            self.target = self.target + delta_world;
            self.camera_pos = self.camera_pos + delta_world;
            changed = true;
        } else if input.middle_down && dragging {
            self.orbit(-(delta.x as f64) * ORBIT_SPEED, -(delta.y as f64) * ORBIT_SPEED);
            changed = true;
        }

        if input.hovered && input.scroll_delta != 0.0 {
            let zoom = (-input.scroll_delta as f64 * ZOOM_SPEED).exp();
            let forward = self.forward();
            let distance = (self.distance() * zoom).clamp(MIN_DISTANCE, MAX_DISTANCE);
            self.camera_pos = self.target - forward * distance;
            changed = true;
        }

        changed
    }

    pub fn orbit(&mut self, yaw_delta: f64, pitch_delta: f64) {
        let world_up = Vec3::UNIT_Z;
        if yaw_delta != 0.0 {
            self.camera_pos = self.camera_pos.rotated_about(self.target, world_up, yaw_delta);
            self.camera_up = self
                .camera_up
                .rotated_about(Vec3::ZERO, world_up, yaw_delta)
                .normalized();
        }
        if pitch_delta != 0.0 {
            let right = self.right();
            self.camera_pos = self.camera_pos.rotated_about(self.target, right, pitch_delta);
            self.camera_up = self
                .camera_up
                .rotated_about(Vec3::ZERO, right, pitch_delta)
                .normalized();
        }
    }

    /// Frame transform for a viewport of the given size.
    pub fn transform(&self, rect: Rect) -> ViewTransform {
        let projection = match self.projection {
            ProjectionKind::Perspective => Projection::Perspective {
                fov_y_deg: self.fov_deg,
            },
            ProjectionKind::Parallel => Projection::Parallel {
                view_height: 2.0 * self.distance() * (self.fov_deg.to_radians() * 0.5).tan(),
            },
        };
        ViewTransform::look_at(
            self.camera_pos,
            self.target,
            self.camera_up,
            projection,
            rect.aspect(),
        )
    }

    pub fn distance(&self) -> f64 {
        (self.target - self.camera_pos).length()
    }

    pub fn position(&self) -> Vec3 {
        self.camera_pos
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn forward(&self) -> Vec3 {
        let dir = self.target - self.camera_pos;
        if dir.length() <= f64::EPSILON {
            -Vec3::UNIT_Z
        } else {
            dir.normalized()
        }
    }

    fn right(&self) -> Vec3 {
        let forward = self.forward();
        let right = forward.cross(self.camera_up);
        if right.length() <= 1.0e-6 {
            forward.cross(Self::default_up(forward)).normalized()
        } else {
            right.normalized()
        }
    }

    fn default_up(forward: Vec3) -> Vec3 {
        let mut up = Vec3::UNIT_Z;
        let mut right = forward.cross(up);
        if right.length() <= 1.0e-6 {
            up = Vec3::UNIT_Y;
            right = forward.cross(up);
        }
        right.normalized().cross(forward).normalized()
    }
}
