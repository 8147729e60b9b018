//! Shared dependency scope errors

use super::HostError;

/// Creates a shared dependency conflict error
pub fn conflict(
    key: impl Into<String>,
    required_by_caller: impl Into<String>,
    resolved_version: impl Into<String>,
) -> HostError {
    HostError::SharedDependencyConflict {
        key: key.into(),
        required_by_caller: required_by_caller.into(),
        resolved_version: resolved_version.into(),
    }
}

/// Creates a dependency not declared error
pub fn not_declared(key: impl Into<String>) -> HostError {
    HostError::DependencyNotDeclared { key: key.into() }
}

/// Creates a shared type mismatch error
pub fn type_mismatch(key: impl Into<String>, expected: &'static str) -> HostError {
    HostError::SharedTypeMismatch {
        key: key.into(),
        expected,
    }
}
