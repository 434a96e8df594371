//! Error Types
//!
//! Recoverable failures are reported through these enums and handled at the
//! call site (heightmap -> procedural fallback, bridge -> plane-only
//! collision). Configuration errors are fatal at construction time.

use thiserror::Error;

/// Failures while loading an optional heightmap seed.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("heightmap decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("heightmap I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("heightmap is empty ({width}x{height})")]
    EmptyHeightmap { width: u32, height: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures while converting a height field into a collision heightfield.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("height matrix is not rectangular: expected {expected} samples, got {actual}")]
    NonRectangular { expected: usize, actual: usize },

    #[error("height matrix must be at least 2x2, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },

    #[error("non-finite height at row {row}, col {col}")]
    NonFinite { row: usize, col: usize },
}

/// Configuration parse and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error for demo construction.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_display() {
        let err = BridgeError::NonRectangular {
            expected: 16,
            actual: 15,
        };
        assert_eq!(
            err.to_string(),
            "height matrix is not rectangular: expected 16 samples, got 15"
        );
    }

    #[test]
    fn test_config_error_converts_into_engine_error() {
        let err: EngineError = ConfigError::Invalid("grid too small".into()).into();
        assert!(matches!(err, EngineError::Config(ConfigError::Invalid(_))));
        assert_eq!(err.to_string(), "invalid configuration: grid too small");
    }
}
