//! Application lifecycle and execution modes

#[cfg(feature = "server")]
pub mod lifetime;
pub mod modes;
