#![cfg_attr(not(test), no_std)]
//! DS64BR401 Signal Repeater Driver
//!
//! This crate brings up and power-manages the Texas Instruments DS64BR401, an
//! eight-channel signal repeater configured over an SMBus (I²C) register
//! interface.
//!
//! # Features
//! - Eight independent repeater lanes
//! - Per-channel idle detection, equalization, output swing and de-emphasis
//! - Global power-down of all channels through a single register
//! - Blocking and async bus access through embedded-hal 1.0
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`registers`]: Register definitions for direct hardware access
//!   - Global reset and power-down registers
//!   - Per-channel addressing map ([`channel_register`])
//!
//! - [`device`]: Register-level I²C access
//!
//! - [`config`]: Per-channel parameter sources and validation
//!
//! - [`controller`]: Bring-up and power sequencing for one device
//!
//! - [`driver`]: Host binding with runtime power management hooks
//!
//! # Usage
//! Bring-up follows a fixed sequence:
//!
//! 1. Reset the device (read-modify-write of the reset register)
//! 2. Power all channels on
//! 3. Hand power-down control to the registers
//! 4. Program idle threshold, idle rate, EQ, VOD and DEM for channels 0 to 7
//!
//! Afterwards the host may suspend and resume the device, which powers every
//! channel down or up again.
//!
//! # Important Notes
//! - Any failure aborts the running sequence; nothing already written is undone
//! - Power transitions always write the register, even if already in that state
//! - Parameter arrays must hold exactly eight values that each fit in a byte
//!
//! # Example
//! ```no_run
//! use embedded_hal::i2c::I2c;
//! use ds64br401::{Driver, Error, ParameterKind, ParameterSet};
//!
//! fn attach_repeater<I2C: I2c>(i2c: I2C) -> Result<Driver<I2C, ()>, Error<I2C::Error>> {
//!     let eq = [0x03; 8];
//!     let vod = [0x01; 8];
//!     let dem = [0x02; 8];
//!     let idle = [0x00; 8];
//!
//!     let params = ParameterSet::new()
//!         .with(ParameterKind::IdleThreshold, &idle)
//!         .with(ParameterKind::IdleRate, &idle)
//!         .with(ParameterKind::Eq, &eq)
//!         .with(ParameterKind::Vod, &vod)
//!         .with(ParameterKind::Dem, &dem);
//!
//!     Driver::attach(i2c, 0x58, &params, ())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod device;
pub mod driver;
pub mod error;
pub mod registers;

pub use config::{ConfigSource, ConfigSourceError, ParameterSet};
pub use controller::{Controller, PowerState, State};
pub use device::Device;
pub use driver::{matches, Driver, PowerManagement, DEVICE_ID};
pub use error::Error;
pub use registers::*;
