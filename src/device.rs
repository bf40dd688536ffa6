//! DS64BR401 Register Interface
//!
//! This module provides register-level access to a DS64BR401 over its SMBus
//! (I²C) management interface. It supports both synchronous and asynchronous
//! operations.
//!
//! Every transfer uses SMBus byte-data framing:
//! - Read: write the register address, then read one byte (repeated start)
//! - Write: write the register address followed by the value
//!
//! # Example
//! ```no_run
//! use ds64br401::{Device, PowerDown};
//!
//! # fn demo<I2C: embedded_hal::i2c::I2c>(i2c: I2C) -> Result<(), ds64br401::Error<I2C::Error>> {
//! let mut device = Device::new(i2c, 0x58);
//!
//! // Read a typed register
//! let power: PowerDown = device.read_register()?;
//!
//! // Write a raw channel register
//! device.write_byte(0x0f, 0x03)?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use regiface::{FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::Error;

/// Register access to one DS64BR401.
///
/// Wraps an I²C bus together with the device's 7-bit address. Each call is a
/// single bus transaction, issued and completed before the next one.
pub struct Device<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Device<I2C> {
    /// Creates a new Device on `i2c` at the 7-bit `address`.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Bus address of the device.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Releases the underlying I²C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

fn decode<R>(raw: [u8; 1]) -> R
where
    R: ReadableRegister<IdType = u8> + FromByteArray<Error = Infallible, Array = [u8; 1]>,
{
    match R::from_bytes(raw) {
        Ok(register) => register,
        Err(never) => match never {},
    }
}

fn encode<R>(register: R) -> u8
where
    R: WritableRegister<IdType = u8> + ToByteArray<Error = Infallible, Array = [u8; 1]>,
{
    match register.to_bytes() {
        Ok([value]) => value,
        Err(never) => match never {},
    }
}

impl<I2C> Device<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Reads one byte from register `reg`.
    ///
    /// # Errors
    /// * `Error::Bus` - I²C transfer failed
    pub fn read_byte(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut value = [0u8; 1];

        self.i2c
            .write_read(self.address, &[reg], &mut value)
            .map_err(Error::Bus)?;

        Ok(value[0])
    }

    /// Writes one byte to register `reg`.
    ///
    /// # Errors
    /// * `Error::Bus` - I²C transfer failed
    pub fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Error::Bus)
    }

    /// Reads a typed register value from the device.
    ///
    /// # Errors
    /// * `Error::Bus` - I²C transfer failed
    pub fn read_register<R>(&mut self) -> Result<R, Error<I2C::Error>>
    where
        R: ReadableRegister<IdType = u8> + FromByteArray<Error = Infallible, Array = [u8; 1]>,
    {
        let raw = self.read_byte(R::id())?;
        Ok(decode([raw]))
    }

    /// Writes a typed register value to the device.
    ///
    /// # Errors
    /// * `Error::Bus` - I²C transfer failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error<I2C::Error>>
    where
        R: WritableRegister<IdType = u8> + ToByteArray<Error = Infallible, Array = [u8; 1]>,
    {
        self.write_byte(R::id(), encode(register))
    }
}

impl<I2C> Device<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Asynchronously reads one byte from register `reg`.
    ///
    /// This is the async version of [`read_byte`](Device::read_byte).
    pub async fn read_byte_async(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut value = [0u8; 1];

        self.i2c
            .write_read(self.address, &[reg], &mut value)
            .await
            .map_err(Error::Bus)?;

        Ok(value[0])
    }

    /// Asynchronously writes one byte to register `reg`.
    ///
    /// This is the async version of [`write_byte`](Device::write_byte).
    pub async fn write_byte_async(&mut self, reg: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .await
            .map_err(Error::Bus)
    }

    /// Asynchronously reads a typed register value from the device.
    ///
    /// This is the async version of [`read_register`](Device::read_register).
    pub async fn read_register_async<R>(&mut self) -> Result<R, Error<I2C::Error>>
    where
        R: ReadableRegister<IdType = u8> + FromByteArray<Error = Infallible, Array = [u8; 1]>,
    {
        let raw = self.read_byte_async(R::id()).await?;
        Ok(decode([raw]))
    }

    /// Asynchronously writes a typed register value to the device.
    ///
    /// This is the async version of [`write_register`](Device::write_register).
    pub async fn write_register_async<R>(&mut self, register: R) -> Result<(), Error<I2C::Error>>
    where
        R: WritableRegister<IdType = u8> + ToByteArray<Error = Infallible, Array = [u8; 1]>,
    {
        self.write_byte_async(R::id(), encode(register)).await
    }
}
