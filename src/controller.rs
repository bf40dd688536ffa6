//! Bring-up and power sequencing
//!
//! The [`Controller`] drives one DS64BR401 from reset to a configured operating
//! state and toggles its power-down register afterwards.
//!
//! Bring-up runs these steps in order and stops at the first error:
//!
//! 1. Reset: read-modify-write of [`ResetControl`], setting only bit 0
//! 2. Power on: blind write of `0x00` to [`PowerDown`]
//! 3. Register control: blind write of `0x01` to [`PowerDownControl`]
//! 4. Configure: for each kind in [`ParameterKind::CONFIGURATION_ORDER`], fetch
//!    and validate the per-channel values, then write channel 0 through 7
//!
//! Nothing is rolled back on failure. Registers written before the error keep
//! their new values.
//!
//! Power transitions never consult a cached state. Every [`Controller::suspend`]
//! and [`Controller::resume`] issues the full register write.

use crate::config::validate;
use crate::{
    channel_register, ConfigSource, Device, Error, ParameterKind, PowerDown, PowerDownControl,
    ResetControl,
};

/// Lifecycle state of a controlled device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Nothing has been written since the controller was created
    Uninitialized,
    /// The device accepted a reset request
    Reset,
    /// Every channel parameter has been programmed
    Configured,
}

/// Requested power state of all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// All channels powered
    On,
    /// All channels powered down
    Off,
}

impl From<PowerState> for PowerDown {
    fn from(state: PowerState) -> Self {
        match state {
            PowerState::On => PowerDown::on(),
            PowerState::Off => PowerDown::off(),
        }
    }
}

/// Configuration and power sequencer for one DS64BR401.
pub struct Controller<I2C> {
    device: Device<I2C>,
    state: State,
}

impl<I2C> Controller<I2C> {
    /// Creates a controller for the device at `address` on `i2c`.
    ///
    /// No bus traffic is issued until an operation is called.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            device: Device::new(i2c, address),
            state: State::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Bus address of the controlled device.
    pub fn address(&self) -> u8 {
        self.device.address()
    }

    /// Register access to the controlled device.
    pub fn device(&mut self) -> &mut Device<I2C> {
        &mut self.device
    }

    /// Releases the underlying I²C bus.
    pub fn release(self) -> I2C {
        self.device.release()
    }
}

impl<I2C> Controller<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Requests a device reset.
    ///
    /// Reads [`ResetControl`], sets the reset bit and writes it back so the
    /// reserved bits keep their values.
    ///
    /// # Errors
    /// * `Error::Bus` - the read or the write failed; the state is unchanged
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        let reset: ResetControl = self.device.read_register()?;
        self.device.write_register(reset.with_reset())?;

        #[cfg(feature = "defmt")]
        defmt::debug!("ds64br401@{=u8:#x}: reset ({=u8:#x})", self.address(), reset.bits);

        self.state = State::Reset;
        Ok(())
    }

    /// Powers every channel up or down.
    ///
    /// The power-down register is overwritten without being read first.
    pub fn power(&mut self, state: PowerState) -> Result<(), Error<I2C::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("ds64br401@{=u8:#x}: power {}", self.address(), state);

        self.device.write_register(PowerDown::from(state))
    }

    /// Hands channel power-down over to the [`PowerDown`] register.
    pub fn enable_register_control(&mut self) -> Result<(), Error<I2C::Error>> {
        self.device
            .write_register(PowerDownControl::register_control())
    }

    /// Programs every channel parameter from `source`.
    ///
    /// Each kind's array is fetched and validated before any of its values is
    /// written.
    ///
    /// # Errors
    /// * `Error::ConfigSource` - an array was missing, not eight values long,
    ///   or held a value above 0xFF
    /// * `Error::Bus` - a register write failed
    pub fn configure<S>(&mut self, source: &S) -> Result<(), Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        for kind in ParameterKind::CONFIGURATION_ORDER {
            let values = validate(kind, source.parameter_array(kind)?)?;

            #[cfg(feature = "defmt")]
            defmt::trace!("ds64br401@{=u8:#x}: {} = {}", self.address(), kind, values);

            for (channel, value) in values.into_iter().enumerate() {
                self.device
                    .write_byte(channel_register(channel, kind), value)?;
            }
        }

        self.state = State::Configured;
        Ok(())
    }

    /// Runs the full bring-up sequence: reset, power on, register control and
    /// configuration.
    pub fn bring_up<S>(&mut self, source: &S) -> Result<(), Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        let result = self.run_bring_up(source);

        #[cfg(feature = "defmt")]
        match &result {
            Ok(()) => defmt::debug!("ds64br401@{=u8:#x}: configured", self.address()),
            Err(_) => defmt::warn!(
                "ds64br401@{=u8:#x}: bring-up aborted in state {}",
                self.address(),
                self.state
            ),
        }

        result
    }

    fn run_bring_up<S>(&mut self, source: &S) -> Result<(), Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        self.reset()?;
        self.power(PowerState::On)?;
        self.enable_register_control()?;
        self.configure(source)
    }

    /// Powers every channel down.
    pub fn suspend(&mut self) -> Result<(), Error<I2C::Error>> {
        self.power(PowerState::Off)
    }

    /// Powers every channel back up.
    pub fn resume(&mut self) -> Result<(), Error<I2C::Error>> {
        self.power(PowerState::On)
    }
}

impl<I2C> Controller<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Asynchronously requests a device reset.
    ///
    /// This is the async version of [`reset`](Controller::reset).
    pub async fn reset_async(&mut self) -> Result<(), Error<I2C::Error>> {
        let reset: ResetControl = self.device.read_register_async().await?;
        self.device.write_register_async(reset.with_reset()).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("ds64br401@{=u8:#x}: reset ({=u8:#x})", self.address(), reset.bits);

        self.state = State::Reset;
        Ok(())
    }

    /// Asynchronously powers every channel up or down.
    ///
    /// This is the async version of [`power`](Controller::power).
    pub async fn power_async(&mut self, state: PowerState) -> Result<(), Error<I2C::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("ds64br401@{=u8:#x}: power {}", self.address(), state);

        self.device
            .write_register_async(PowerDown::from(state))
            .await
    }

    /// Asynchronously hands channel power-down over to the [`PowerDown`] register.
    ///
    /// This is the async version of
    /// [`enable_register_control`](Controller::enable_register_control).
    pub async fn enable_register_control_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.device
            .write_register_async(PowerDownControl::register_control())
            .await
    }

    /// Asynchronously programs every channel parameter from `source`.
    ///
    /// This is the async version of [`configure`](Controller::configure).
    pub async fn configure_async<S>(&mut self, source: &S) -> Result<(), Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        for kind in ParameterKind::CONFIGURATION_ORDER {
            let values = validate(kind, source.parameter_array(kind)?)?;

            #[cfg(feature = "defmt")]
            defmt::trace!("ds64br401@{=u8:#x}: {} = {}", self.address(), kind, values);

            for (channel, value) in values.into_iter().enumerate() {
                self.device
                    .write_byte_async(channel_register(channel, kind), value)
                    .await?;
            }
        }

        self.state = State::Configured;
        Ok(())
    }

    /// Asynchronously runs the full bring-up sequence.
    ///
    /// This is the async version of [`bring_up`](Controller::bring_up).
    pub async fn bring_up_async<S>(&mut self, source: &S) -> Result<(), Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        let result = self.run_bring_up_async(source).await;

        #[cfg(feature = "defmt")]
        match &result {
            Ok(()) => defmt::debug!("ds64br401@{=u8:#x}: configured", self.address()),
            Err(_) => defmt::warn!(
                "ds64br401@{=u8:#x}: bring-up aborted in state {}",
                self.address(),
                self.state
            ),
        }

        result
    }

    async fn run_bring_up_async<S>(&mut self, source: &S) -> Result<(), Error<I2C::Error>>
    where
        S: ConfigSource + ?Sized,
    {
        self.reset_async().await?;
        self.power_async(PowerState::On).await?;
        self.enable_register_control_async().await?;
        self.configure_async(source).await
    }

    /// Asynchronously powers every channel down.
    pub async fn suspend_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.power_async(PowerState::Off).await
    }

    /// Asynchronously powers every channel back up.
    pub async fn resume_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.power_async(PowerState::On).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigSourceError, ParameterSet, CHANNEL_BASE, CHANNEL_COUNT};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x58;

    const IDLE_THRESHOLD: [u32; 8] = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17];
    const IDLE_RATE: [u32; 8] = [0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27];
    const EQ: [u32; 8] = [0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37];
    const VOD: [u32; 8] = [0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47];
    const DEM: [u32; 8] = [0x50, 0x51, 0x52, 0x53, 0x54, 0x55, 0x56, 0x57];

    fn full_set() -> ParameterSet<'static> {
        ParameterSet::new()
            .with(ParameterKind::IdleThreshold, &IDLE_THRESHOLD)
            .with(ParameterKind::IdleRate, &IDLE_RATE)
            .with(ParameterKind::Eq, &EQ)
            .with(ParameterKind::Vod, &VOD)
            .with(ParameterKind::Dem, &DEM)
    }

    fn values_for(kind: ParameterKind) -> &'static [u32; 8] {
        match kind {
            ParameterKind::IdleThreshold => &IDLE_THRESHOLD,
            ParameterKind::IdleRate => &IDLE_RATE,
            ParameterKind::Eq => &EQ,
            ParameterKind::Vod => &VOD,
            ParameterKind::Dem => &DEM,
        }
    }

    /// Writes for `kind`, channel 0 first.
    fn kind_writes(kind: ParameterKind) -> Vec<I2cTransaction> {
        values_for(kind)
            .iter()
            .enumerate()
            .map(|(channel, &value)| {
                I2cTransaction::write(
                    ADDR,
                    vec![CHANNEL_BASE[channel] + kind.offset(), value as u8],
                )
            })
            .collect()
    }

    fn bring_up_prefix() -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x00]),
            I2cTransaction::write(ADDR, vec![0x00, 0x01]),
            I2cTransaction::write(ADDR, vec![0x01, 0x00]),
            I2cTransaction::write(ADDR, vec![0x02, 0x01]),
        ]
    }

    #[test]
    fn reset_sets_only_bit_zero() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0b1010_0000]),
            I2cTransaction::write(ADDR, vec![0x00, 0b1010_0001]),
        ];
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        controller.reset().unwrap();
        assert_eq!(controller.state(), State::Reset);

        controller.release().done();
    }

    #[test]
    fn failed_reset_read_skips_write() {
        let expectations = [I2cTransaction::write_read(ADDR, vec![0x00], vec![0x00])
            .with_error(ErrorKind::Other)];
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(controller.reset(), Err(Error::Bus(ErrorKind::Other)));
        assert_eq!(controller.state(), State::Uninitialized);

        controller.release().done();
    }

    #[test]
    fn power_is_a_blind_write() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x01, 0x00]),
            I2cTransaction::write(ADDR, vec![0x01, 0xff]),
        ];
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        controller.power(PowerState::On).unwrap();
        controller.power(PowerState::Off).unwrap();

        controller.release().done();
    }

    #[test]
    fn configure_writes_every_channel_register_in_order() {
        let expectations: Vec<_> = ParameterKind::CONFIGURATION_ORDER
            .into_iter()
            .flat_map(kind_writes)
            .collect();
        assert_eq!(expectations.len(), 40);
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        controller.configure(&full_set()).unwrap();
        assert_eq!(controller.state(), State::Configured);

        controller.release().done();
    }

    #[test]
    fn short_array_aborts_before_writing_that_kind() {
        let short_eq = [0x30; 7];
        let params = full_set().with(ParameterKind::Eq, &short_eq);
        let expectations: Vec<_> = [ParameterKind::IdleThreshold, ParameterKind::IdleRate]
            .into_iter()
            .flat_map(kind_writes)
            .collect();
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(
            controller.configure(&params),
            Err(Error::ConfigSource(ConfigSourceError::WrongLength {
                kind: ParameterKind::Eq,
                expected: CHANNEL_COUNT,
                found: 7
            }))
        );
        assert_ne!(controller.state(), State::Configured);

        controller.release().done();
    }

    #[test]
    fn out_of_range_value_is_not_truncated() {
        let idle = [0x10, 0x11, 0x1ff, 0x13, 0x14, 0x15, 0x16, 0x17];
        let params = full_set().with(ParameterKind::IdleThreshold, &idle);
        let mut controller = Controller::new(I2cMock::new(&[]), ADDR);

        assert_eq!(
            controller.configure(&params),
            Err(Error::ConfigSource(ConfigSourceError::OutOfRange {
                kind: ParameterKind::IdleThreshold,
                channel: 2,
                value: 0x1ff
            }))
        );

        controller.release().done();
    }

    #[test]
    fn missing_array_is_a_config_error() {
        let params = ParameterSet::new().with(ParameterKind::IdleThreshold, &IDLE_THRESHOLD);
        let expectations = kind_writes(ParameterKind::IdleThreshold);
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(
            controller.configure(&params),
            Err(Error::ConfigSource(ConfigSourceError::Missing(
                ParameterKind::IdleRate
            )))
        );

        controller.release().done();
    }

    #[test]
    fn bus_error_stops_configuration() {
        let mut expectations: Vec<_> = [
            ParameterKind::IdleThreshold,
            ParameterKind::IdleRate,
            ParameterKind::Eq,
        ]
        .into_iter()
        .flat_map(kind_writes)
        .collect();
        let mut vod = kind_writes(ParameterKind::Vod);
        vod.truncate(4);
        let failing = vod.pop().unwrap().with_error(ErrorKind::Other);
        expectations.extend(vod);
        expectations.push(failing);
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(
            controller.configure(&full_set()),
            Err(Error::Bus(ErrorKind::Other))
        );

        controller.release().done();
    }

    #[test]
    fn bring_up_runs_the_full_sequence() {
        let mut expectations = bring_up_prefix();
        expectations.extend(
            ParameterKind::CONFIGURATION_ORDER
                .into_iter()
                .flat_map(kind_writes),
        );
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        controller.bring_up(&full_set()).unwrap();
        assert_eq!(controller.state(), State::Configured);

        controller.release().done();
    }

    #[test]
    fn bring_up_stops_when_power_on_fails() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x00]),
            I2cTransaction::write(ADDR, vec![0x00, 0x01]),
            I2cTransaction::write(ADDR, vec![0x01, 0x00]).with_error(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Data,
            )),
        ];
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        assert_eq!(
            controller.bring_up(&full_set()),
            Err(Error::Bus(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Data
            )))
        );
        assert_eq!(controller.state(), State::Reset);

        controller.release().done();
    }

    #[test]
    fn repeated_suspend_writes_every_time() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x01, 0xff]),
            I2cTransaction::write(ADDR, vec![0x01, 0xff]),
            I2cTransaction::write(ADDR, vec![0x01, 0x00]),
        ];
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        controller.suspend().unwrap();
        controller.suspend().unwrap();
        controller.resume().unwrap();

        controller.release().done();
    }

    #[tokio::test]
    async fn async_bring_up_matches_blocking_sequence() {
        let mut expectations = bring_up_prefix();
        expectations.extend(
            ParameterKind::CONFIGURATION_ORDER
                .into_iter()
                .flat_map(kind_writes),
        );
        expectations.push(I2cTransaction::write(ADDR, vec![0x01, 0xff]));
        expectations.push(I2cTransaction::write(ADDR, vec![0x01, 0x00]));
        let mut controller = Controller::new(I2cMock::new(&expectations), ADDR);

        controller.bring_up_async(&full_set()).await.unwrap();
        assert_eq!(controller.state(), State::Configured);
        controller.suspend_async().await.unwrap();
        controller.resume_async().await.unwrap();

        controller.release().done();
    }
}
