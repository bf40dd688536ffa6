//! Host binding
//!
//! Glue between a host's device lifecycle and the [`Controller`]. The host
//! matches devices by [`DEVICE_ID`], calls [`Driver::attach`] for each one it
//! finds, forwards runtime power-management requests, and finally calls
//! [`Driver::detach`].

use crate::{ConfigSource, Controller, Error};

/// Identification string used by hosts to match this driver to a device.
pub const DEVICE_ID: &str = "ds64br401";

/// Returns `true` if `name` identifies a DS64BR401.
pub fn matches(name: &str) -> bool {
    name == DEVICE_ID
}

/// Host runtime power management.
///
/// The driver opts a device in once bring-up succeeds and out again on
/// detach. Neither call reports failure back to the driver.
pub trait PowerManagement {
    /// Allow the host to suspend the device at `address` when idle.
    fn enable_auto_suspend(&mut self, address: u8);

    /// Stop suspending the device at `address`.
    fn disable_auto_suspend(&mut self, address: u8);
}

/// Hosts without runtime power management.
impl PowerManagement for () {
    fn enable_auto_suspend(&mut self, _address: u8) {}

    fn disable_auto_suspend(&mut self, _address: u8) {}
}

impl<T: PowerManagement + ?Sized> PowerManagement for &mut T {
    fn enable_auto_suspend(&mut self, address: u8) {
        (**self).enable_auto_suspend(address)
    }

    fn disable_auto_suspend(&mut self, address: u8) {
        (**self).disable_auto_suspend(address)
    }
}

/// An attached and configured DS64BR401.
pub struct Driver<I2C, PM> {
    controller: Controller<I2C>,
    pm: PM,
}

impl<I2C, PM> Driver<I2C, PM>
where
    PM: PowerManagement,
{
    fn attached(controller: Controller<I2C>, mut pm: PM) -> Self {
        pm.enable_auto_suspend(controller.address());

        #[cfg(feature = "defmt")]
        defmt::info!("ds64br401@{=u8:#x}: attached", controller.address());

        Self { controller, pm }
    }

    /// The controller driving this device.
    pub fn controller(&mut self) -> &mut Controller<I2C> {
        &mut self.controller
    }

    /// Opts the device out of runtime power management and releases the
    /// bus and the power-management handle.
    ///
    /// Issues no bus traffic.
    pub fn detach(mut self) -> (I2C, PM) {
        let address = self.controller.address();
        self.pm.disable_auto_suspend(address);

        #[cfg(feature = "defmt")]
        defmt::info!("ds64br401@{=u8:#x}: detached", address);

        (self.controller.release(), self.pm)
    }
}

impl<I2C, PM> Driver<I2C, PM>
where
    I2C: embedded_hal::i2c::I2c,
    PM: PowerManagement,
{
    /// Brings up the device at `address` and registers it for runtime power
    /// management.
    ///
    /// # Errors
    /// Any reset, power or configuration failure is returned as-is, the bus is
    /// dropped, and `pm` is never told about the device.
    pub fn attach<S>(i2c: I2C, address: u8, source: &S, pm: PM) -> Result<Self, Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        let mut controller = Controller::new(i2c, address);
        controller.bring_up(source)?;
        Ok(Self::attached(controller, pm))
    }

    /// Host request to power the device down.
    pub fn runtime_suspend(&mut self) -> Result<(), Error<I2C::Error>> {
        self.controller.suspend()
    }

    /// Host request to power the device back up.
    pub fn runtime_resume(&mut self) -> Result<(), Error<I2C::Error>> {
        self.controller.resume()
    }
}

impl<I2C, PM> Driver<I2C, PM>
where
    I2C: embedded_hal_async::i2c::I2c,
    PM: PowerManagement,
{
    /// Asynchronously brings up the device at `address`.
    ///
    /// This is the async version of [`attach`](Driver::attach).
    pub async fn attach_async<S>(
        i2c: I2C,
        address: u8,
        source: &S,
        pm: PM,
    ) -> Result<Self, Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        let mut controller = Controller::new(i2c, address);
        controller.bring_up_async(source).await?;
        Ok(Self::attached(controller, pm))
    }

    /// Asynchronous host request to power the device down.
    pub async fn runtime_suspend_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.controller.suspend_async().await
    }

    /// Asynchronous host request to power the device back up.
    pub async fn runtime_resume_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.controller.resume_async().await
    }
}
