//! Mount point errors

use super::HostError;

/// Creates a mount failure for a region
pub fn failed(region: impl Into<String>, message: impl Into<String>) -> HostError {
    HostError::MountFailure {
        region: region.into(),
        message: message.into(),
    }
}

/// Creates an invalid mount transition error
pub fn invalid_transition(region: impl Into<String>, from: impl Into<String>) -> HostError {
    HostError::InvalidMountTransition {
        region: region.into(),
        from: from.into(),
    }
}

/// Creates an unknown region error
pub fn unknown_region(name: impl Into<String>) -> HostError {
    HostError::UnknownRegion { name: name.into() }
}
