//! TOML scene descriptions.
//!
//! ```toml
//! [camera]
//! position = [0.0, 1.5, 2.0]
//! look_at = [0.0, 2.5, 0.0]
//!
//! [[planes]]
//! classification = "ceiling"
//! position = [0.0, 2.5, 0.0]
//! size = [4.0, 4.0]
//!
//! [[colliders]]
//! shape = { kind = "box", half_extents = [1.0, 0.05, 1.0] }
//! center = [0.0, 2.4, 0.0]
//! layer = 2
//!
//! [target]
//! radius = 0.3
//! ```

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use pinata_core::{Camera, Plane, PlaneClassification, Pose, euler_degrees};

use crate::error::{Result, SimError};
use crate::planes::SimPlanes;
use crate::scene::{Collider, Shape, SimScene};
use crate::world::{SimWorld, TargetSpec};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub viewport: Vec2,
}

impl Default for CameraSpec {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: Vec3::new(0.0, 1.5, 2.0),
            look_at: Vec3::new(0.0, 1.5, 0.0),
            fov_y: camera.fov_y,
            viewport: camera.viewport,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    pub classification: PlaneClassification,
    pub position: Vec3,
    /// Euler degrees.
    #[serde(default)]
    pub rotation: Vec3,
    /// Rectangle extent in the plane's local XZ.
    #[serde(default)]
    pub size: Option<Vec2>,
    /// Explicit boundary polygon in the plane's local XZ; overrides `size`.
    #[serde(default)]
    pub boundary: Option<Vec<Vec2>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColliderSpec {
    pub shape: Shape,
    pub center: Vec3,
    #[serde(default)]
    pub layer: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub camera: CameraSpec,
    pub planes: Vec<PlaneSpec>,
    pub colliders: Vec<ColliderSpec>,
    pub target: TargetSpec,
}

impl PlaneSpec {
    fn build(&self, index: usize) -> Result<Plane> {
        let pose = Pose::new(self.position, euler_degrees(self.rotation));
        match (&self.boundary, self.size) {
            (Some(boundary), _) if boundary.len() >= 3 => {
                Ok(Plane::new(self.classification, pose, boundary.clone()))
            }
            (Some(_), _) => Err(SimError::InvalidData(format!(
                "plane {index}: boundary needs at least 3 points"
            ))),
            (None, Some(size)) if size.x > 0.0 && size.y > 0.0 => {
                Ok(Plane::rectangle(self.classification, pose, size))
            }
            (None, _) => Err(SimError::InvalidData(format!(
                "plane {index}: needs a positive size or a boundary"
            ))),
        }
    }
}

impl SceneFile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn camera(&self) -> Camera {
        let c = &self.camera;
        Camera::looking_at(c.position, c.look_at, c.fov_y, c.viewport)
    }

    pub fn build(&self) -> Result<SimWorld> {
        let planes = self
            .planes
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.build(i))
            .collect::<Result<Vec<_>>>()?;
        let colliders = self
            .colliders
            .iter()
            .map(|c| Collider::new(c.shape, c.center, c.layer))
            .collect();
        tracing::debug!(
            planes = planes.len(),
            colliders = self.colliders.len(),
            "scene built"
        );
        Ok(SimWorld::new(
            self.camera(),
            SimPlanes::new(planes),
            SimScene::new(colliders),
            self.target.clone(),
        ))
    }
}

/// Load and build a scene file in one step.
pub fn load_scene(path: &Path) -> Result<SimWorld> {
    SceneFile::load(path)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pinata_core::{LayerMask, PlaneQuery, Ray, SceneRaycast};

    const ROOM: &str = r#"
        [camera]
        position = [0.0, 1.5, 2.0]
        look_at = [0.0, 2.5, 0.0]
        viewport = [1000.0, 1000.0]

        [[planes]]
        classification = "floor"
        position = [0.0, 0.0, 0.0]
        size = [6.0, 6.0]

        [[planes]]
        classification = "ceiling"
        position = [0.0, 2.5, 0.0]
        boundary = [[-2.0, -2.0], [2.0, -2.0], [2.0, 2.0], [-2.0, 2.0]]

        [[colliders]]
        shape = { kind = "box", half_extents = [1.0, 0.05, 1.0] }
        center = [3.0, 2.4, 0.0]
        layer = 2

        [target]
        radius = 0.25
        anchor_offset = [0.0, 0.6, 0.0]
    "#;

    #[test]
    fn test_room_builds() {
        let scene = SceneFile::parse(ROOM).unwrap();
        assert_eq!(scene.planes.len(), 2);
        assert_eq!(scene.target.radius, 0.25);
        assert_eq!(scene.target.mass, 1.0, "unset target fields default");

        let world = scene.build().unwrap();
        assert_eq!(world.planes.len(), 2);
        assert_eq!(world.scene.len(), 1);
        assert_relative_eq!(world.camera.viewport.x, 1000.0);

        let hits = world
            .planes
            .raycast_planes(world.camera.screen_center(), &world.camera);
        assert_eq!(hits[0].plane.classification, PlaneClassification::Ceiling);

        let up = Ray::new(Vec3::new(3.0, 0.1, 0.0), Vec3::Y);
        assert!(world.scene.raycast(&up, 7.0, LayerMask::layer(2)).is_some());
    }

    #[test]
    fn test_empty_scene_is_valid() {
        let world = SceneFile::parse("").unwrap().build().unwrap();
        assert!(world.planes.is_empty());
        assert!(world.scene.is_empty());
    }

    #[test]
    fn test_plane_without_extent_rejected() {
        let text = "[[planes]]\nclassification = \"floor\"\nposition = [0.0, 0.0, 0.0]\n";
        let err = SceneFile::parse(text).unwrap().build().unwrap_err();
        assert!(matches!(err, SimError::InvalidData(msg) if msg.contains("plane 0")));
    }

    #[test]
    fn test_unknown_classification_is_toml_error() {
        let text = "[[planes]]\nclassification = \"roof\"\nposition = [0.0, 0.0, 0.0]\n";
        assert!(matches!(SceneFile::parse(text), Err(SimError::Toml(_))));
    }
}
