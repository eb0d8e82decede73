//! In-memory reference backends for pinata-core: detected planes, collision
//! geometry, a damped rigid body, recording tactile/audio outputs, and TOML
//! loading for configuration and scene descriptions.

pub mod body;
pub mod config;
pub mod error;
pub mod feedback;
pub mod planes;
pub mod scene;
pub mod scene_file;
pub mod world;

pub use body::{Impulse, SimBody};
pub use config::{load_config, parse_config, save_config, to_toml};
pub use error::{Result, SimError};
pub use feedback::{RecordingAudio, RecordingTactile};
pub use planes::SimPlanes;
pub use scene::{Collider, Shape, SimScene};
pub use scene_file::{CameraSpec, ColliderSpec, PlaneSpec, SceneFile, load_scene};
pub use world::{SimSpawner, SimWorld, TargetSpec};
