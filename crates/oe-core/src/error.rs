//! Error types for the oxidized-emotion frontend layer

use thiserror::Error;

/// Main error type for the frontend layer
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Quiesce error: {0}")]
    Quiesce(#[from] QuiesceError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Core error: {0}")]
    Core(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Snapshot capture/restore errors
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Snapshot buffer too short: required {required} bytes, got {actual}")]
    SizeMismatch { required: usize, actual: usize },

    #[error("Audio state block rejected: {0}")]
    AudioBlock(String),
}

/// Pause/resume handshake errors
#[derive(Error, Debug)]
pub enum QuiesceError {
    /// The core thread dropped its side of the handshake without
    /// acknowledging a pause request. There is no recovery path.
    #[error("Core thread detached before acknowledging pause")]
    CoreDetached,
}

/// Removable-media drive errors
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to mount image: {0}")]
    MountFailed(String),

    #[error("Drive fault: {0}")]
    DriveFault(String),
}

/// Result type alias for frontend-layer operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StateError::SizeMismatch {
            required: 1024,
            actual: 1023,
        };
        assert_eq!(
            format!("{}", err),
            "Snapshot buffer too short: required 1024 bytes, got 1023"
        );
    }

    #[test]
    fn test_error_conversion() {
        let state_err = StateError::SizeMismatch {
            required: 8,
            actual: 0,
        };
        let emu_err: EmulatorError = state_err.into();
        assert!(matches!(emu_err, EmulatorError::State(_)));

        let quiesce_err = QuiesceError::CoreDetached;
        let emu_err: EmulatorError = quiesce_err.into();
        assert!(matches!(emu_err, EmulatorError::Quiesce(_)));
    }
}
