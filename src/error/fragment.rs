//! Fragment registry and loader errors

use super::{HostError, LoadFailureKind};

/// Creates an unknown fragment error
pub fn unknown(name: impl Into<String>) -> HostError {
    HostError::UnknownFragment { name: name.into() }
}

/// Creates a fragment load failure
pub fn load_failed(
    name: impl Into<String>,
    kind: LoadFailureKind,
    message: impl Into<String>,
) -> HostError {
    HostError::FragmentLoadFailure {
        name: name.into(),
        kind,
        message: message.into(),
    }
}
