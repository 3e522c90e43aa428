//! Error type for position computation.

/// Why a position could not be computed.
///
/// The pipeline never returns partial results: any of these aborts the whole
/// [`compute_position`](crate::compute_position) call.
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    /// A placement string is not one of the 12 known placements.
    #[error("invalid placement: {0:?}")]
    InvalidPlacement(String),
    /// A geometry query on the platform failed.
    #[error("platform query failed: {message}")]
    Platform { message: String },
    /// The platform does not know an element (e.g. it was removed).
    #[error("element not available: {0}")]
    UnknownElement(String),
    /// A middleware produced a NaN or infinite coordinate.
    #[error("middleware {middleware:?} returned non-finite coordinates ({x}, {y})")]
    NonFiniteCoords { middleware: String, x: f64, y: f64 },
    /// Middleware data could not be encoded or decoded.
    #[error("middleware data error: {0}")]
    Data(#[from] serde_json::Error),
    /// A declarative configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PositionError {
    /// Wrap a platform failure.
    pub fn platform(message: impl core::fmt::Display) -> Self {
        Self::Platform {
            message: message.to_string(),
        }
    }
}
