use std::fmt;

use pinata_core::CoreError;

#[derive(Debug)]
pub enum SimError {
    Io(std::io::Error),
    Toml(String),
    InvalidData(String),
    Core(CoreError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Io(e) => write!(f, "I/O error: {e}"),
            SimError::Toml(msg) => write!(f, "TOML error: {msg}"),
            SimError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            SimError::Core(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<toml::de::Error> for SimError {
    fn from(e: toml::de::Error) -> Self {
        SimError::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for SimError {
    fn from(e: toml::ser::Error) -> Self {
        SimError::Toml(e.to_string())
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::Core(e)
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
