use thiserror::Error;

use crate::types::DeviceId;

/// Error type for controller subsystem operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Failed to initialize the backend (SDL2 or subsystems).
    #[error("Backend init failed: {0}")]
    BackendInit(String),
    /// Requested device was not found.
    #[error("Device not found: {0}")]
    NotFound(DeviceId),
    /// Operation is not supported on the current device/backend.
    #[error("Operation unsupported")]
    Unsupported,
    /// A generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Convenient result alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;
