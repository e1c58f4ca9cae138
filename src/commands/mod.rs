//! Command implementations for the opcourier CLI

pub mod completions;
pub mod flatten;
pub mod nest;
pub mod push;
pub mod verify;
pub mod version;
