//! Register definitions for the DS64BR401
//! Taken from the SMBus register map in the DS64BR401 datasheet (SNLS311)
//!
//! - [`control`]: global reset and power-down registers, shared by all channels
//! - [`channel`]: per-channel parameter registers and their addressing map

mod channel;
mod control;

pub use channel::*;
pub use control::*;
