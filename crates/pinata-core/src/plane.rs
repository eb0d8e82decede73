use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Ray;
use crate::constants::EPSILON;
use crate::pose::Pose;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneClassification {
    Floor,
    Ceiling,
    Wall,
    Other,
    Unknown,
}

/// A detected flat surface. Owned by the tracking subsystem; the engine only reads it.
///
/// The boundary polygon lies in the plane's local XZ coordinates and the
/// plane normal is the pose's local +Y.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub id: Uuid,
    pub classification: PlaneClassification,
    pub pose: Pose,
    pub boundary: Vec<Vec2>,
}

impl Plane {
    pub fn new(classification: PlaneClassification, pose: Pose, boundary: Vec<Vec2>) -> Self {
        Self {
            id: Uuid::new_v4(),
            classification,
            pose,
            boundary,
        }
    }

    /// Axis-aligned rectangle of the given size centered on the pose.
    pub fn rectangle(classification: PlaneClassification, pose: Pose, size: Vec2) -> Self {
        let h = size * 0.5;
        Self::new(
            classification,
            pose,
            vec![
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ],
        )
    }

    pub fn normal(&self) -> Vec3 {
        self.pose.up()
    }

    /// Even-odd point-in-polygon test in plane-local XZ coordinates.
    pub fn contains_local(&self, p: Vec2) -> bool {
        let n = self.boundary.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.boundary[i];
            let b = self.boundary[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Intersect a ray with the plane, restricted to its boundary polygon.
    /// Returns `(distance, point)`.
    pub fn raycast(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let normal = self.normal();
        let denom = normal.dot(ray.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = normal.dot(self.pose.position - ray.origin) / denom;
        if t < 0.0 {
            return None;
        }
        let point = ray.at(t);
        let local = self.pose.inverse_transform_point(point);
        if self.contains_local(Vec2::new(local.x, local.z)) {
            Some((t, point))
        } else {
            None
        }
    }
}

/// One plane intersected by a placement ray.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneHit {
    pub plane: Plane,
    pub point: Vec3,
    /// Hit pose: position at the hit point, orientation of the plane.
    pub pose: Pose,
    pub distance: f32,
}

/// Display treatment for a detected plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneVisibility {
    Hidden,
    Shown(PlaneStyle),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneStyle {
    Floor,
    Ceiling,
    Other,
}

/// Decides which detected planes are drawn, by classification.
#[derive(Clone, Debug)]
pub struct PlaneVisibilityFilter {
    allowed: Vec<PlaneClassification>,
}

impl PlaneVisibilityFilter {
    pub fn new(allowed: Vec<PlaneClassification>) -> Self {
        Self { allowed }
    }

    /// Only ceilings are drawn; used while the user looks for an anchor surface.
    pub fn ceilings_only() -> Self {
        Self::new(vec![PlaneClassification::Ceiling])
    }

    pub fn visibility(&self, plane: &Plane) -> PlaneVisibility {
        if !self.allowed.contains(&plane.classification) {
            return PlaneVisibility::Hidden;
        }
        let style = match plane.classification {
            PlaneClassification::Floor => PlaneStyle::Floor,
            PlaneClassification::Ceiling => PlaneStyle::Ceiling,
            _ => PlaneStyle::Other,
        };
        PlaneVisibility::Shown(style)
    }

    /// Visibility for every added or updated plane in one tracking change.
    pub fn apply<'a>(
        &self,
        changed: impl IntoIterator<Item = &'a Plane>,
    ) -> Vec<(Uuid, PlaneVisibility)> {
        changed
            .into_iter()
            .map(|plane| (plane.id, self.visibility(plane)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor(size: f32) -> Plane {
        Plane::rectangle(
            PlaneClassification::Floor,
            Pose::IDENTITY,
            Vec2::splat(size),
        )
    }

    #[test]
    fn test_contains_local_square() {
        let p = floor(2.0);
        assert!(p.contains_local(Vec2::ZERO));
        assert!(p.contains_local(Vec2::new(0.9, -0.9)));
        assert!(!p.contains_local(Vec2::new(1.1, 0.0)));
    }

    #[test]
    fn test_contains_local_concave() {
        // L-shape: the notch at (+x, +z) is outside
        let p = Plane::new(
            PlaneClassification::Floor,
            Pose::IDENTITY,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(2.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 2.0),
                Vec2::new(0.0, 2.0),
            ],
        );
        assert!(p.contains_local(Vec2::new(0.5, 1.5)));
        assert!(!p.contains_local(Vec2::new(1.5, 1.5)));
    }

    #[test]
    fn test_degenerate_boundary_never_hit() {
        let p = Plane::new(PlaneClassification::Floor, Pose::IDENTITY, vec![Vec2::ZERO]);
        assert!(!p.contains_local(Vec2::ZERO));
    }

    #[test]
    fn test_raycast_down_onto_floor() {
        let p = floor(4.0);
        let ray = Ray::new(Vec3::new(0.5, 2.0, 0.5), Vec3::NEG_Y);
        let (t, point) = p.raycast(&ray).expect("should hit");
        assert_relative_eq!(t, 2.0);
        assert_relative_eq!(point.y, 0.0);
    }

    #[test]
    fn test_raycast_outside_polygon_misses() {
        let p = floor(1.0);
        let ray = Ray::new(Vec3::new(3.0, 2.0, 0.0), Vec3::NEG_Y);
        assert!(p.raycast(&ray).is_none());
    }

    #[test]
    fn test_raycast_behind_and_parallel_miss() {
        let p = floor(4.0);
        assert!(p.raycast(&Ray::new(Vec3::Y, Vec3::Y)).is_none());
        assert!(p.raycast(&Ray::new(Vec3::Y, Vec3::X)).is_none());
    }

    #[test]
    fn test_visibility_filter() {
        let filter = PlaneVisibilityFilter::new(vec![
            PlaneClassification::Floor,
            PlaneClassification::Ceiling,
        ]);
        let f = floor(1.0);
        let w = Plane::rectangle(PlaneClassification::Wall, Pose::IDENTITY, Vec2::ONE);
        assert_eq!(filter.visibility(&f), PlaneVisibility::Shown(PlaneStyle::Floor));
        assert_eq!(filter.visibility(&w), PlaneVisibility::Hidden);

        let decisions = filter.apply([&f, &w]);
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[1], (w.id, PlaneVisibility::Hidden));
    }

    #[test]
    fn test_ceilings_only_hides_floor() {
        let filter = PlaneVisibilityFilter::ceilings_only();
        assert_eq!(filter.visibility(&floor(1.0)), PlaneVisibility::Hidden);
    }
}
