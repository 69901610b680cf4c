//! Error types for the planner.
//!
//! The numeric core (coordinates, rise/set, lunar ephemeris, scoring) is total and
//! never fails. Errors only arise at the edges: observer validation, configuration
//! files and gear resolution.

use thiserror::Error;

/// Result type for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Errors that can occur when building planner inputs
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Latitude/longitude outside the accepted range
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Setup references a camera that is not in the gear catalog
    #[error("Unknown camera '{0}'")]
    UnknownCamera(String),

    /// Setup references an optic that is not in the gear catalog
    #[error("Unknown optic '{0}'")]
    UnknownOptic(String),

    /// Builtin setup id not present in the gear catalog
    #[error("Unknown setup '{0}'")]
    UnknownSetup(String),

    /// Gear record with physically meaningless values
    #[error("Invalid gear '{id}': {reason}")]
    InvalidGear { id: String, reason: String },

    /// Catalog document failed validation
    #[error("Catalog error: {0}")]
    Catalog(String),
}
