//! Per-channel parameter configuration
//!
//! The parameters programmed at bring-up come from the platform description of
//! the board: one array per [`ParameterKind`], with one value per channel.
//! Values arrive as 32-bit cells and are validated here before any of them
//! reaches the device.

use core::fmt;

use crate::{ParameterKind, CHANNEL_COUNT};

/// Problem with the per-channel parameters supplied for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigSourceError {
    /// No values were supplied for this parameter
    Missing(ParameterKind),
    /// The array does not hold exactly one value per channel
    WrongLength {
        kind: ParameterKind,
        expected: usize,
        found: usize,
    },
    /// A value does not fit in an 8-bit register
    OutOfRange {
        kind: ParameterKind,
        channel: usize,
        value: u32,
    },
}

impl fmt::Display for ConfigSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigSourceError::Missing(kind) => {
                write!(f, "missing property `{}`", kind.property_name())
            }
            ConfigSourceError::WrongLength {
                kind,
                expected,
                found,
            } => write!(
                f,
                "property `{}` has {found} values, expected {expected}",
                kind.property_name()
            ),
            ConfigSourceError::OutOfRange {
                kind,
                channel,
                value,
            } => write!(
                f,
                "property `{}` channel {channel}: {value:#x} does not fit in a register",
                kind.property_name()
            ),
        }
    }
}

impl core::error::Error for ConfigSourceError {}

/// Supplier of per-channel parameter arrays.
///
/// Queried once per parameter kind while a device is being configured.
pub trait ConfigSource {
    /// Returns the per-channel values for `kind`, channel 0 first.
    fn parameter_array(&self, kind: ParameterKind) -> Result<&[u32], ConfigSourceError>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn parameter_array(&self, kind: ParameterKind) -> Result<&[u32], ConfigSourceError> {
        (**self).parameter_array(kind)
    }
}

/// Checks a parameter array and narrows it to register values.
///
/// # Errors
/// * `ConfigSourceError::WrongLength` - not exactly [`CHANNEL_COUNT`] values
/// * `ConfigSourceError::OutOfRange` - a value above 0xFF
pub fn validate(kind: ParameterKind, values: &[u32]) -> Result<[u8; CHANNEL_COUNT], ConfigSourceError> {
    if values.len() != CHANNEL_COUNT {
        return Err(ConfigSourceError::WrongLength {
            kind,
            expected: CHANNEL_COUNT,
            found: values.len(),
        });
    }

    let mut out = [0u8; CHANNEL_COUNT];
    for (channel, (slot, &value)) in out.iter_mut().zip(values).enumerate() {
        *slot = u8::try_from(value).map_err(|_| ConfigSourceError::OutOfRange {
            kind,
            channel,
            value,
        })?;
    }
    Ok(out)
}

/// In-memory parameter set, one borrowed array per parameter kind.
///
/// ```
/// use ds64br401::{ConfigSource, ParameterKind, ParameterSet};
///
/// let eq = [0x03; 8];
/// let params = ParameterSet::new().with(ParameterKind::Eq, &eq);
/// assert_eq!(params.parameter_array(ParameterKind::Eq), Ok(&eq[..]));
/// assert!(params.parameter_array(ParameterKind::Vod).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterSet<'a> {
    arrays: [Option<&'a [u32]>; ParameterKind::COUNT],
}

impl<'a> ParameterSet<'a> {
    /// Creates an empty parameter set.
    pub const fn new() -> Self {
        Self {
            arrays: [None; ParameterKind::COUNT],
        }
    }

    /// Returns this set with the values for `kind` replaced by `values`.
    pub fn with(mut self, kind: ParameterKind, values: &'a [u32]) -> Self {
        self.set(kind, values);
        self
    }

    /// Stores `values` for `kind`.
    pub fn set(&mut self, kind: ParameterKind, values: &'a [u32]) {
        self.arrays[kind.offset() as usize] = Some(values);
    }

    /// Stores `values` under a platform description property name.
    ///
    /// Returns the matching kind, or `None` if the name is not a channel
    /// parameter and nothing was stored.
    pub fn set_property(&mut self, name: &str, values: &'a [u32]) -> Option<ParameterKind> {
        let kind = ParameterKind::from_property_name(name)?;
        self.set(kind, values);
        Some(kind)
    }

    /// Returns the values stored under a platform description property name.
    pub fn lookup_by_property(&self, name: &str) -> Option<&'a [u32]> {
        let kind = ParameterKind::from_property_name(name)?;
        self.arrays[kind.offset() as usize]
    }
}

impl ConfigSource for ParameterSet<'_> {
    fn parameter_array(&self, kind: ParameterKind) -> Result<&[u32], ConfigSourceError> {
        self.arrays[kind.offset() as usize].ok_or(ConfigSourceError::Missing(kind))
    }
}
