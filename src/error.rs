//! # Error Types Module
//!
//! Centralized error handling for the Sweetie watch simulation.
//!
//! The graph core itself never fails: lookups clamp and degenerate curves are
//! ignored. Errors only come from the edges of the program.
//!
//! ## Error Types
//! - `ConfigError`: Configuration file I/O and parsing errors
//! - `PathError`: Malformed SVG path data handed to the graph
//!
//! ## Usage Examples
//! ```rust
//! // Config module uses ConfigError
//! pub fn load() -> Result<Config, ConfigError> { ... }
//!
//! // Curve module uses PathError
//! pub fn from_svg(data: &str) -> Result<CubicPath, PathError> { ... }
//! ```

use std::fmt;

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}

/// Errors that can occur while parsing SVG path data
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// Path data does not begin with a move-to
    MissingMoveTo,
    /// Command letter outside the supported M/L/C subset
    UnsupportedCommand(char),
    /// A coordinate could not be parsed as a number
    InvalidNumber(String),
    /// Command ran out of coordinates
    UnexpectedEnd(char),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingMoveTo => {
                write!(f, "Path data must start with an M command")
            }
            PathError::UnsupportedCommand(c) => {
                write!(f, "Unsupported path command '{}'", c)
            }
            PathError::InvalidNumber(token) => {
                write!(f, "Invalid number in path data: {}", token)
            }
            PathError::UnexpectedEnd(c) => {
                write!(f, "Path data ended in the middle of a '{}' command", c)
            }
        }
    }
}

impl std::error::Error for PathError {}
