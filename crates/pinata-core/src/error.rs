use std::fmt;

/// Failures the engine reports across subsystem boundaries.
///
/// Expected non-events are not errors: a strike that misses the target is
/// [`crate::interaction::Outcome::Miss`] and a throttled haptic is a `false`
/// from [`crate::haptics::HapticDispatcher::request`].
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A collaborator required by one activation sequence was never supplied.
    ConfigurationMissing(&'static str),
    /// Placement found no detected plane under the tap.
    NoSurfaceDetected,
    /// A configuration value is out of range.
    InvalidConfig(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ConfigurationMissing(what) => {
                write!(f, "configuration missing: {what} was never supplied")
            }
            CoreError::NoSurfaceDetected => write!(f, "no surface detected under tap"),
            CoreError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

pub type Result<T> = std::result::Result<T, CoreError>;
