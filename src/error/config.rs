//! Configuration errors

use super::HostError;

/// Creates a configuration not found error
pub fn not_found(path: impl Into<String>) -> HostError {
    HostError::ConfigNotFound { path: path.into() }
}

/// Creates a configuration read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> HostError {
    HostError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a configuration parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> HostError {
    HostError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> HostError {
    HostError::ConfigInvalid {
        message: message.into(),
    }
}
