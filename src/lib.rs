//! Fragment composition runtime
//!
//! Composes one application out of independently built and deployed UI
//! fragments:
//!
//! - [`fragment`]: registry and single-flight loader of remote fragments
//! - [`scope`]: shared dependency scope keeping singleton libraries single
//! - [`mount`]: the `mount(container)` contract and per-region state machine
//! - [`bus`]: topic-keyed event bus between fragments that share no code
//! - [`cart`]: the shared cart store and its bus bridge
//!
//! [`host::Host`] wires them together from a [`config::HostConfig`].

pub mod bus;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod fragment;
pub mod fragments;
pub mod hash;
pub mod host;
pub mod logging;
pub mod mount;
pub mod notification;
pub mod scope;
pub mod subscription;

pub use context::HostContext;
pub use error::{HostError, Result};
pub use host::Host;
