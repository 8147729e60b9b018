//! Error types and handling for the fragment host
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`fragment`]: Fragment registry and loader errors
//! - [`scope`]: Shared dependency scope errors
//! - [`mount`]: Mount point and region errors
//! - [`config`]: Configuration errors
//!
//! Programmer errors (`UnknownFragment`, `DependencyNotDeclared`) are surfaced
//! immediately. Load and mount failures are recovered by the affected region.

pub mod config;
pub mod fragment;
pub mod mount;
pub mod scope;

pub use config::{
    invalid as config_invalid, not_found as config_not_found, parse_failed as config_parse_failed,
    read_failed as config_read_failed,
};
pub use fragment::{load_failed as fragment_load_failed, unknown as unknown_fragment};
pub use mount::{
    failed as mount_failed, invalid_transition as invalid_mount_transition,
    unknown_region,
};
pub use scope::{
    conflict as shared_dependency_conflict, not_declared as dependency_not_declared,
    type_mismatch as shared_type_mismatch,
};

use std::fmt;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Why a fragment load attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailureKind {
    /// Manifest or artifact could not be fetched
    Network,
    /// Manifest could not be parsed or does not describe the fragment
    Parse,
    /// Artifact digest does not match the manifest
    Integrity,
    /// An exposed module has no linked implementation in this host
    Unlinked,
}

impl fmt::Display for LoadFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadFailureKind::Network => "network",
            LoadFailureKind::Parse => "parse",
            LoadFailureKind::Integrity => "integrity",
            LoadFailureKind::Unlinked => "unlinked",
        };
        f.write_str(name)
    }
}

/// Main error type for fragment host operations
#[derive(Error, Diagnostic, Debug)]
pub enum HostError {
    // Fragment errors
    #[error("Unknown fragment '{name}'")]
    #[diagnostic(
        code(fragment_host::fragment::unknown),
        help("Register the fragment in the host configuration before loading it")
    )]
    UnknownFragment { name: String },

    #[error("Failed to load fragment '{name}' ({kind}): {message}")]
    #[diagnostic(code(fragment_host::fragment::load_failed))]
    FragmentLoadFailure {
        name: String,
        kind: LoadFailureKind,
        message: String,
    },

    // Shared scope errors
    #[error(
        "Shared dependency conflict for '{key}': caller requires {required_by_caller}, resolved version is {resolved_version}"
    )]
    #[diagnostic(
        code(fragment_host::scope::conflict),
        help("Align the fragment's required version range with the version the host provides")
    )]
    SharedDependencyConflict {
        key: String,
        required_by_caller: String,
        resolved_version: String,
    },

    #[error("Shared dependency '{key}' was never declared")]
    #[diagnostic(
        code(fragment_host::scope::not_declared),
        help("Declare the dependency in the shared scope before resolving it")
    )]
    DependencyNotDeclared { key: String },

    #[error("Shared dependency '{key}' is not of type {expected}")]
    #[diagnostic(code(fragment_host::scope::type_mismatch))]
    SharedTypeMismatch { key: String, expected: &'static str },

    #[error("Invalid version '{input}': {reason}")]
    #[diagnostic(code(fragment_host::scope::invalid_version))]
    InvalidVersion { input: String, reason: String },

    // Mount errors
    #[error("Failed to mount region '{region}': {message}")]
    #[diagnostic(code(fragment_host::mount::failed))]
    MountFailure { region: String, message: String },

    #[error("Region '{region}' cannot be mounted while {from}")]
    #[diagnostic(
        code(fragment_host::mount::invalid_transition),
        help("Retire the region before mounting it again")
    )]
    InvalidMountTransition { region: String, from: String },

    #[error("Unknown region '{name}'")]
    #[diagnostic(code(fragment_host::mount::unknown_region))]
    UnknownRegion { name: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(fragment_host::config::not_found),
        help("Pass --config or set FRAGMENT_HOST_CONFIG")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(fragment_host::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(fragment_host::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(fragment_host::config::invalid))]
    ConfigInvalid { message: String },

    // Event bus errors
    #[error("Failed to encode payload for topic '{topic}': {reason}")]
    #[diagnostic(code(fragment_host::bus::payload))]
    PayloadEncoding { topic: String, reason: String },

    // Catalog errors
    #[error("Failed to fetch catalog: {reason}")]
    #[diagnostic(code(fragment_host::catalog::fetch_failed))]
    CatalogFetchFailed { reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(fragment_host::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        HostError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for HostError {
    fn from(err: serde_yaml::Error) -> Self {
        HostError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<semver::Error> for HostError {
    fn from(err: semver::Error) -> Self {
        HostError::InvalidVersion {
            input: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, HostError>;

/// Category of a recorded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownFragment,
    Network,
    Parse,
    Integrity,
    Unlinked,
    SharedDependencyConflict,
    DependencyNotDeclared,
    Mount,
    Internal,
}

/// Plain-data failure record kept on a failed fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Convert back into an error for the named fragment
    pub fn into_error(self, name: &str) -> HostError {
        let kind = match self.kind {
            ErrorKind::UnknownFragment => return unknown_fragment(name),
            ErrorKind::Network => LoadFailureKind::Network,
            ErrorKind::Integrity => LoadFailureKind::Integrity,
            ErrorKind::Unlinked => LoadFailureKind::Unlinked,
            _ => LoadFailureKind::Parse,
        };
        fragment_load_failed(name, kind, self.message)
    }
}

impl From<&HostError> for ErrorInfo {
    fn from(err: &HostError) -> Self {
        let kind = match err {
            HostError::UnknownFragment { .. } => ErrorKind::UnknownFragment,
            HostError::FragmentLoadFailure { kind, .. } => match kind {
                LoadFailureKind::Network => ErrorKind::Network,
                LoadFailureKind::Parse => ErrorKind::Parse,
                LoadFailureKind::Integrity => ErrorKind::Integrity,
                LoadFailureKind::Unlinked => ErrorKind::Unlinked,
            },
            HostError::SharedDependencyConflict { .. } | HostError::SharedTypeMismatch { .. } => {
                ErrorKind::SharedDependencyConflict
            }
            HostError::DependencyNotDeclared { .. } => ErrorKind::DependencyNotDeclared,
            HostError::MountFailure { .. } | HostError::InvalidMountTransition { .. } => {
                ErrorKind::Mount
            }
            HostError::InvalidVersion { .. } => ErrorKind::Parse,
            _ => ErrorKind::Internal,
        };
        ErrorInfo::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_display() {
        let err = HostError::UnknownFragment {
            name: "catalog".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown fragment 'catalog'");
    }

    #[test]
    fn test_error_code() {
        let err = HostError::DependencyNotDeclared {
            key: "react".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("fragment_host::scope::not_declared".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let host_err: HostError = io_err.into();
        assert!(matches!(host_err, HostError::IoError { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str("invalid: yaml: content: [unclosed");
        let host_err: HostError = parse_result.unwrap_err().into();
        assert!(matches!(host_err, HostError::ConfigParseFailed { .. }));
    }

    test_error_contains!(
        test_conflict_message,
        shared_dependency_conflict("react", "^17.0.0", "18.2.0"),
        "react",
        "^17.0.0",
        "18.2.0"
    );

    test_error_contains!(
        test_load_failure_message,
        fragment_load_failed("catalog", LoadFailureKind::Network, "connection refused"),
        "catalog",
        "network",
        "connection refused"
    );

    test_error_contains!(
        test_invalid_transition_message,
        invalid_mount_transition("checkout", "mounted"),
        "checkout",
        "mounted"
    );

    #[test]
    fn test_error_info_from_load_failure() {
        let err = fragment_load_failed("catalog", LoadFailureKind::Integrity, "digest mismatch");
        let info = ErrorInfo::from(&err);
        assert_eq!(info.kind, ErrorKind::Integrity);
        assert!(info.message.contains("digest mismatch"));
    }

    #[test]
    fn test_error_info_from_conflict() {
        let info = ErrorInfo::from(&shared_dependency_conflict("react", "^17", "18.2.0"));
        assert_eq!(info.kind, ErrorKind::SharedDependencyConflict);
    }

    #[test]
    fn test_error_info_round_trips_to_load_failure() {
        let info = ErrorInfo::new(ErrorKind::Network, "refused");
        let err = info.into_error("cart");
        assert!(matches!(
            err,
            HostError::FragmentLoadFailure {
                kind: LoadFailureKind::Network,
                ..
            }
        ));
    }

    #[test]
    fn test_error_info_unknown_fragment_converts_back() {
        let err = ErrorInfo::new(ErrorKind::UnknownFragment, "nope").into_error("ghost");
        assert!(matches!(err, HostError::UnknownFragment { .. }));
    }

    #[test]
    fn test_load_failure_kind_display() {
        assert_eq!(LoadFailureKind::Network.to_string(), "network");
        assert_eq!(LoadFailureKind::Unlinked.to_string(), "unlinked");
    }
}
