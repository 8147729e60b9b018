//! Shared cart state
//!
//! - [`CartStore`]: the consistency-bearing store every fragment reaches
//!   through the shared scope
//! - [`bridge`]: wiring between the store and the event bus

pub mod bridge;
pub mod item;
pub mod money;
pub mod store;

pub use bridge::CartBridge;
pub use item::{CartItem, ItemDetails, ProductId};
pub use money::Money;
pub use store::{CartSnapshot, CartStore};

#[cfg(test)]
mod tests;
