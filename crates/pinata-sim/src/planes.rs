use glam::Vec2;
use uuid::Uuid;

use pinata_core::{Camera, Plane, PlaneHit, PlaneQuery, PlaneVisibility, PlaneVisibilityFilter, Pose};

/// Detected planes held in memory, as a tracker would report them.
#[derive(Clone, Debug, Default)]
pub struct SimPlanes {
    planes: Vec<Plane>,
}

impl SimPlanes {
    pub fn new(planes: Vec<Plane>) -> Self {
        Self { planes }
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Plane> {
        self.planes.iter().find(|p| p.id == id)
    }

    /// Add a plane, or replace the one with the same id.
    pub fn upsert(&mut self, plane: Plane) {
        match self.planes.iter_mut().find(|p| p.id == plane.id) {
            Some(existing) => *existing = plane,
            None => self.planes.push(plane),
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Plane> {
        let index = self.planes.iter().position(|p| p.id == id)?;
        Some(self.planes.remove(index))
    }

    /// Display decision for every tracked plane.
    pub fn visibility(&self, filter: &PlaneVisibilityFilter) -> Vec<(Uuid, PlaneVisibility)> {
        filter.apply(self.planes.iter())
    }
}

impl PlaneQuery for SimPlanes {
    fn planes(&self) -> Vec<Plane> {
        self.planes.clone()
    }

    fn raycast_planes(&self, screen: Vec2, viewer: &Camera) -> Vec<PlaneHit> {
        let ray = viewer.screen_point_to_ray(screen);
        let mut hits: Vec<PlaneHit> = self
            .planes
            .iter()
            .filter_map(|plane| {
                let (distance, point) = plane.raycast(&ray)?;
                Some(PlaneHit {
                    plane: plane.clone(),
                    point,
                    pose: Pose::new(point, plane.pose.rotation),
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
