//! Error types for the cloth subsystem

/// Errors surfaced while building or running a cloth simulation
///
/// Precondition violations inside the core (out-of-range particle indices,
/// index lists that are not whole triangles) are not represented here; they
/// panic at the point of violation.
#[derive(Debug, thiserror::Error)]
pub enum ClothError {
    #[error("cloth mesh '{name}' is invalid: {reason}")]
    InvalidMesh { name: String, reason: String },

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("particle read-back failed: {0}")]
    ReadBack(String),
}

impl ClothError {
    pub(crate) fn invalid_mesh(name: &str, reason: impl Into<String>) -> Self {
        ClothError::InvalidMesh {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
