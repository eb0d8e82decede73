use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// Half-line in world space. `direction` is kept unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Pinhole viewer. Screen space is in pixels with the origin at the
/// bottom-left corner; depth is distance along [`Camera::forward`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pose: Pose,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pose: Pose::IDENTITY,
            fov_y: 60.0,
            viewport: Vec2::new(1170.0, 2532.0),
        }
    }
}

impl Camera {
    pub fn new(pose: Pose, fov_y: f32, viewport: Vec2) -> Self {
        Self {
            pose,
            fov_y,
            viewport,
        }
    }

    /// Camera at `position` looking at `target` with world +Y up.
    pub fn looking_at(position: Vec3, target: Vec3, fov_y: f32, viewport: Vec2) -> Self {
        let forward = (target - position).normalize_or_zero();
        let rotation = if forward == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            look_rotation(forward)
        };
        Self::new(Pose::new(position, rotation), fov_y, viewport)
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn forward(&self) -> Vec3 {
        self.pose.forward()
    }

    pub fn up(&self) -> Vec3 {
        self.pose.up()
    }

    pub fn screen_center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    fn half_extents(&self) -> Vec2 {
        let half_h = (self.fov_y.to_radians() * 0.5).tan();
        let aspect = if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        };
        Vec2::new(half_h * aspect, half_h)
    }

    /// Camera-space direction (unnormalized, z = -1) through a screen point.
    fn view_direction(&self, screen: Vec2) -> Vec3 {
        let ndc = (screen / self.viewport) * 2.0 - Vec2::ONE;
        let half = self.half_extents();
        Vec3::new(ndc.x * half.x, ndc.y * half.y, -1.0)
    }

    pub fn screen_point_to_ray(&self, screen: Vec2) -> Ray {
        let dir = self.pose.rotation * self.view_direction(screen);
        Ray::new(self.pose.position, dir)
    }

    /// Project a world point. Returns `(x, y, depth)`; depth is negative for
    /// points behind the camera.
    pub fn world_to_screen(&self, world: Vec3) -> Vec3 {
        let local = self.pose.inverse_transform_point(world);
        let depth = -local.z;
        if depth.abs() < f32::EPSILON {
            return Vec3::new(self.viewport.x * 0.5, self.viewport.y * 0.5, depth);
        }
        let half = self.half_extents();
        let ndc = Vec2::new(local.x / (depth * half.x), local.y / (depth * half.y));
        let screen = (ndc + Vec2::ONE) * 0.5 * self.viewport;
        Vec3::new(screen.x, screen.y, depth)
    }

    /// Unproject a screen point at a given depth back into world space.
    pub fn screen_to_world(&self, screen: Vec2, depth: f32) -> Vec3 {
        self.pose
            .transform_point(self.view_direction(screen) * depth)
    }
}

/// Rotation whose -Z axis points along `forward`, with +Y kept as close to
/// world up as possible.
pub fn look_rotation(forward: Vec3) -> Quat {
    let f = forward.normalize();
    let up = if f.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = f.cross(up).normalize();
    let true_up = right.cross(f);
    Quat::from_mat3(&glam::Mat3::from_cols(right, true_up, -f))
}
