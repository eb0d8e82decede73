//! Tap-to-place pose resolution.
//!
//! Fallback chain, first success wins:
//! 1. a detected ceiling under the tap,
//! 2. a "virtual ceiling": anything hit by a vertical probe above the nearest
//!    detected plane,
//! 3. a fixed height above that nearest plane.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Camera, Ray};
use crate::error::{CoreError, Result};
use crate::plane::PlaneClassification;
use crate::pose::Pose;
use crate::scene::{LayerMask, PlaneQuery, SceneRaycast};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Distance from the surface hit down to the object's anchor point.
    pub anchor_offset: f32,
    /// Height above the fallback plane when no ceiling of either kind is found.
    pub default_floor_height_offset: f32,
    /// Reach of the upward virtual-ceiling probe.
    pub virtual_ceiling_max_height: f32,
    /// The probe starts this far above the fallback hit so it cannot hit
    /// the floor it starts on.
    pub virtual_ceiling_probe_lift: f32,
    pub virtual_ceiling_layers: LayerMask,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            anchor_offset: 0.0,
            default_floor_height_offset: 2.4,
            virtual_ceiling_max_height: 7.0,
            virtual_ceiling_probe_lift: 0.1,
            virtual_ceiling_layers: LayerMask::ALL,
        }
    }
}

/// Which rung of the fallback chain produced a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPath {
    ArCeiling,
    VirtualCeiling,
    FloorDefault,
}

impl fmt::Display for PlacementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlacementPath::ArCeiling => "ar-ceiling",
            PlacementPath::VirtualCeiling => "virtual-ceiling",
            PlacementPath::FloorDefault => "floor-default",
        };
        f.write_str(s)
    }
}

/// A resolved placement pose, consumed once by object instantiation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub pose: Pose,
    pub path: PlacementPath,
    /// The detected plane the resolution started from.
    pub plane_id: Uuid,
}

#[derive(Clone, Debug, Default)]
pub struct PlacementResolver {
    config: PlacementConfig,
}

impl PlacementResolver {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Resolve a placement pose for a tap. Runs exactly one path per call and
    /// never retries; a failure waits for the next tap.
    pub fn resolve(
        &self,
        tap: Vec2,
        viewer: &Camera,
        planes: &dyn PlaneQuery,
        scene: &dyn SceneRaycast,
    ) -> Result<Placement> {
        let hits = planes.raycast_planes(tap, viewer);
        let Some(nearest) = hits.first() else {
            tracing::debug!(?tap, "no plane under tap");
            return Err(CoreError::NoSurfaceDetected);
        };

        if let Some(ceiling) = hits
            .iter()
            .find(|h| h.plane.classification == PlaneClassification::Ceiling)
        {
            let pose = Pose::new(
                ceiling.pose.position - Vec3::Y * self.config.anchor_offset,
                ceiling.pose.rotation,
            );
            tracing::info!(height = pose.position.y, "placed on detected ceiling");
            return Ok(Placement {
                pose,
                path: PlacementPath::ArCeiling,
                plane_id: ceiling.plane.id,
            });
        }

        tracing::debug!(
            classification = ?nearest.plane.classification,
            height = nearest.pose.position.y,
            "no detected ceiling, probing above nearest plane"
        );
        let probe = Ray::new(
            nearest.pose.position + Vec3::Y * self.config.virtual_ceiling_probe_lift,
            Vec3::Y,
        );
        let probe_hit = scene.raycast(
            &probe,
            self.config.virtual_ceiling_max_height,
            self.config.virtual_ceiling_layers,
        );

        let (position, path) = match probe_hit {
            Some(hit) => (
                hit.point - Vec3::Y * self.config.anchor_offset,
                PlacementPath::VirtualCeiling,
            ),
            None => (
                nearest.pose.position + Vec3::Y * self.config.default_floor_height_offset,
                PlacementPath::FloorDefault,
            ),
        };
        tracing::info!(height = position.y, %path, "placed");

        Ok(Placement {
            pose: Pose::new(position, nearest.pose.rotation),
            path,
            plane_id: nearest.plane.id,
        })
    }
}
