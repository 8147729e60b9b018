//! Terminal output for the host commands

pub mod display;
