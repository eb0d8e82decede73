/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f32 = 1e-6;

/// Vertical component substituted into a downward tap direction before
/// re-normalizing, so a strike from above still lifts the target.
pub const TAP_MIN_LIFT: f32 = 0.1;

/// Sampled ramp intensity at or below this maps to a light impact.
pub const LIGHT_INTENSITY_MAX: f32 = 0.33;

/// Sampled ramp intensity at or below this (and above light) maps to a medium impact.
pub const MEDIUM_INTENSITY_MAX: f32 = 0.66;

/// Default tether polyline resolution.
pub const DEFAULT_TETHER_SEGMENTS: usize = 15;
