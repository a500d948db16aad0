//! Event types and observers.
//!
//! Submodules:
//! - [`switchdebug`] – toggle the debug anchor markers on/off
pub mod switchdebug;
