//! Per-channel parameter registers
//!
//! Each of the eight repeater lanes owns a small block of registers holding its
//! idle detection, equalization and driver settings. The blocks are not evenly
//! spaced, so the base of every block is taken from the device register map
//! rather than computed.

/// Number of repeater lanes on the device.
pub const CHANNEL_COUNT: usize = 8;

/// Base register address of each channel's parameter block.
pub const CHANNEL_BASE: [u8; CHANNEL_COUNT] = [0x0e, 0x15, 0x1c, 0x23, 0x2b, 0x32, 0x39, 0x40];

/// A per-channel parameter.
///
/// The discriminant of each variant is its register offset from the channel
/// base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterKind {
    /// Rate at which the idle detector samples the input
    IdleRate = 0x00,
    /// Receive equalization boost
    Eq = 0x01,
    /// Output differential voltage
    Vod = 0x02,
    /// Output de-emphasis
    Dem = 0x03,
    /// Idle detection threshold
    IdleThreshold = 0x04,
}

impl ParameterKind {
    /// Number of per-channel parameters.
    pub const COUNT: usize = 5;

    /// Every parameter, in register offset order.
    pub const ALL: [ParameterKind; Self::COUNT] = [
        ParameterKind::IdleRate,
        ParameterKind::Eq,
        ParameterKind::Vod,
        ParameterKind::Dem,
        ParameterKind::IdleThreshold,
    ];

    /// Order in which parameters are programmed during bring-up.
    ///
    /// Idle detection is configured before the signal path settings.
    pub const CONFIGURATION_ORDER: [ParameterKind; Self::COUNT] = [
        ParameterKind::IdleThreshold,
        ParameterKind::IdleRate,
        ParameterKind::Eq,
        ParameterKind::Vod,
        ParameterKind::Dem,
    ];

    /// Register offset of this parameter within a channel block.
    pub const fn offset(self) -> u8 {
        self as u8
    }

    /// Name of the platform description property carrying this parameter's
    /// per-channel values.
    pub const fn property_name(self) -> &'static str {
        match self {
            ParameterKind::IdleRate => "idle-rate",
            ParameterKind::Eq => "eq",
            ParameterKind::Vod => "vod",
            ParameterKind::Dem => "dem",
            ParameterKind::IdleThreshold => "idle-threshold",
        }
    }

    /// Looks up a parameter by its platform description property name.
    pub fn from_property_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.property_name() == name)
    }
}

/// Returns the register address holding `kind` for `channel`.
///
/// `channel` must be below [`CHANNEL_COUNT`]; every caller in this crate
/// iterates a bounded channel range.
pub const fn channel_register(channel: usize, kind: ParameterKind) -> u8 {
    debug_assert!(channel < CHANNEL_COUNT);
    CHANNEL_BASE[channel] + kind.offset()
}
