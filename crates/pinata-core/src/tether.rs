//! Sagging tether polyline between two live frames.
//!
//! The sag is cosmetic: a parabola peaking mid-span whose depth grows with
//! span length up to a cap. Nothing here feeds back into physics.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::constants::DEFAULT_TETHER_SEGMENTS;
use crate::pose::FrameHandle;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    /// Number of polyline points, endpoints included. At least 2.
    pub segments: usize,
    pub sag_strength: f32,
    /// Upper bound on mid-span sag, in meters.
    pub max_visual_sag: f32,
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            segments: DEFAULT_TETHER_SEGMENTS,
            sag_strength: 0.5,
            max_visual_sag: 0.5,
        }
    }
}

impl TetherConfig {
    /// Mid-span sag for a span of `distance` meters.
    pub fn sag_depth(&self, distance: f32) -> f32 {
        (self.sag_strength * distance * 0.5).min(self.max_visual_sag)
    }
}

/// Parabolic sag profile: 0 at both ends, 1 at `t = 0.5`.
pub fn sag_profile(t: f32) -> f32 {
    4.0 * t * (1.0 - t)
}

/// Fill `out` with the tether polyline from `start` to `end`.
pub fn tether_points(start: Vec3, end: Vec3, config: &TetherConfig, out: &mut Vec<Vec3>) {
    let n = config.segments.max(2);
    let sag = config.sag_depth(start.distance(end));
    out.clear();
    out.extend((0..n).map(|i| {
        let t = i as f32 / (n - 1) as f32;
        start.lerp(end, t) + Vec3::NEG_Y * (sag * sag_profile(t))
    }));
}

/// The two live frames a tether hangs between.
#[derive(Clone, Debug)]
pub struct TetherEndpoints {
    pub anchor: FrameHandle,
    pub hook: FrameHandle,
}

pub type SharedTether = Rc<RefCell<TetherRenderer>>;

/// Disabled until bound to endpoints; redraws every frame while armed.
#[derive(Debug)]
pub struct TetherRenderer {
    config: TetherConfig,
    endpoints: Option<TetherEndpoints>,
    facing: Vec3,
    points: Vec<Vec3>,
}

impl TetherRenderer {
    pub fn new(config: TetherConfig) -> Self {
        let capacity = config.segments.max(2);
        Self {
            config,
            endpoints: None,
            facing: Vec3::NEG_Z,
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn shared(config: TetherConfig) -> SharedTether {
        Rc::new(RefCell::new(Self::new(config)))
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn is_armed(&self) -> bool {
        self.endpoints.is_some()
    }

    pub fn endpoints(&self) -> Option<&TetherEndpoints> {
        self.endpoints.as_ref()
    }

    /// Start drawing between two frames, replacing any previous binding whole.
    pub fn bind(&mut self, anchor: FrameHandle, hook: FrameHandle) {
        tracing::debug!(anchor = %anchor.name(), hook = %hook.name(), "tether armed");
        self.endpoints = Some(TetherEndpoints { anchor, hook });
    }

    pub fn stop(&mut self) {
        if self.endpoints.take().is_some() {
            tracing::debug!("tether stopped");
        }
        self.points.clear();
    }

    /// Direction the tether's visible face is turned to.
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    /// Points from the last redraw. Empty while disabled.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Per-frame redraw: face the viewer, then resample the curve from the
    /// endpoints' current positions.
    pub fn update(&mut self, viewer: &Camera) -> Option<&[Vec3]> {
        let endpoints = self.endpoints.as_ref()?;
        let (start, end) = (endpoints.anchor.position(), endpoints.hook.position());
        self.facing = viewer.forward();
        tether_points(start, end, &self.config, &mut self.points);
        Some(&self.points)
    }
}
