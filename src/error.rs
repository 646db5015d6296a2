//! Configuration errors
//!
//! The simulation itself never fails: anomalies are clamped or dropped and
//! the next frame carries on. Only loading and validating `Settings` can be
//! rejected.

use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings JSON could not be parsed
    Parse(serde_json::Error),
    /// Stage must have a positive, finite size
    StageSize { width: f32, height: f32 },
    /// Ship half-extents must leave room to move inside the stage
    ShipTooLarge { half_width: f32, half_height: f32 },
    /// A tuning value that must be strictly positive was not
    NonPositive { field: &'static str, value: f32 },
    /// A side must start with at least one life
    NoLives { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid settings JSON: {e}"),
            Self::StageSize { width, height } => {
                write!(f, "stage size must be positive, got {width}x{height}")
            }
            Self::ShipTooLarge {
                half_width,
                half_height,
            } => write!(
                f,
                "ship half-extent {half_width}x{half_height} does not fit the stage"
            ),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be greater than zero, got {value}")
            }
            Self::NoLives { field } => write!(f, "{field} must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}
