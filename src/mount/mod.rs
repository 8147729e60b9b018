//! Mount points and the fragment mount contract

pub mod adapter;
pub mod container;
pub mod point;

pub use adapter::Mountable;
pub use container::{Container, Node};
pub use point::{MountOutcome, MountPoint, MountState};
