//! Global control registers
//!
//! These registers are shared by all eight channels. A write to any of them
//! affects the whole device at once.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// Set of repeater channels, one bit per channel
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Channels: u8 {
        const CH0 = 1 << 0;
        const CH1 = 1 << 1;
        const CH2 = 1 << 2;
        const CH3 = 1 << 3;
        const CH4 = 1 << 4;
        const CH5 = 1 << 5;
        const CH6 = 1 << 6;
        const CH7 = 1 << 7;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Channels {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Channels({=u8:#x})", self.bits())
    }
}

/// Reset control register (address: 0x00)
///
/// Writing bit 0 resets the device's SMBus registers to their defaults.
///
/// # Important Notes
/// - Bits 7:1 are reserved and must be written back unchanged
/// - Use [`ResetControl::with_reset`] on a value read from the device
#[register(0x00u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetControl {
    /// Raw register content, including reserved bits
    pub bits: u8,
}

impl ResetControl {
    /// Reset request bit
    pub const RESET: u8 = 0x01;

    /// Returns this value with the reset request bit set and every other
    /// bit untouched.
    pub const fn with_reset(self) -> Self {
        Self {
            bits: self.bits | Self::RESET,
        }
    }
}

/// Power-down register (address: 0x01)
///
/// Each set bit places the matching channel in its low-power state. Only
/// honoured once [`PowerDownControl::register_control`] has been written.
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerDown {
    /// Channels held in power-down
    pub channels: Channels,
}

impl PowerDown {
    /// Every channel powered (0x00)
    pub const fn on() -> Self {
        Self {
            channels: Channels::empty(),
        }
    }

    /// Every channel powered down (0xFF)
    pub const fn off() -> Self {
        Self {
            channels: Channels::all(),
        }
    }
}

/// Power-down control register (address: 0x02)
///
/// Selects whether channel power-down follows the device pins or the
/// [`PowerDown`] register.
#[register(0x02u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerDownControl {
    /// Power-down driven by register override
    /// - true = [`PowerDown`] register controls the channels
    /// - false = pin control (default)
    pub register_control: bool,
}

impl PowerDownControl {
    /// Per-channel override through the [`PowerDown`] register
    pub const fn register_control() -> Self {
        Self {
            register_control: true,
        }
    }
}

impl FromByteArray for ResetControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { bits: bytes[0] })
    }
}

impl ToByteArray for ResetControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits])
    }
}

impl FromByteArray for PowerDown {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            channels: Channels::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for PowerDown {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.channels.bits()])
    }
}

impl FromByteArray for PowerDownControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            register_control: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for PowerDownControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.register_control as u8])
    }
}
