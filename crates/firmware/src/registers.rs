//! Host-visible application registers.
//!
//! Five registers sit above the Harp core register space, starting at
//! address 32. The generic framework handles framing and routes each
//! write here with its raw little-endian payload; validation and the
//! resulting reconfiguration live in [`crate::app`].

use platform::RegisterAddress;

use crate::config;

/// First application register address assigned by the core framework.
pub const APP_REG_BASE: RegisterAddress = 32;

/// Application register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppRegister {
    /// Bitmask of devices detected on the clock-output channels (u16, RO).
    ConnectedDevices,
    /// Periodic event counter (u32, RW).
    Counter,
    /// Counter event rate in Hz, 0 = disabled (u16, RW, clamped).
    CounterFrequencyHz,
    /// Auxiliary port function selector (u8, RW, enum 0/1/2).
    AuxPortFn,
    /// Auxiliary clock broadcast baud rate (u32, RW, range-checked).
    AuxBaudRate,
}

impl AppRegister {
    /// Absolute register address on the Harp link.
    #[allow(clippy::arithmetic_side_effects)] // base 32 + offset <= 36
    pub const fn address(self) -> RegisterAddress {
        match self {
            Self::ConnectedDevices => APP_REG_BASE,
            Self::Counter => APP_REG_BASE + 1,
            Self::CounterFrequencyHz => APP_REG_BASE + 2,
            Self::AuxPortFn => APP_REG_BASE + 3,
            Self::AuxBaudRate => APP_REG_BASE + 4,
        }
    }

    /// Map an absolute address back to a register.
    pub const fn from_address(address: RegisterAddress) -> Option<Self> {
        match address {
            32 => Some(Self::ConnectedDevices),
            33 => Some(Self::Counter),
            34 => Some(Self::CounterFrequencyHz),
            35 => Some(Self::AuxPortFn),
            36 => Some(Self::AuxBaudRate),
            _ => None,
        }
    }
}

/// The register block. Written only from the main-loop thread (host
/// writes and the periodic poll); interrupt handlers never touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppRegisters {
    /// Device-presence bitmask, channel-ordered.
    pub connected_devices: u16,
    /// Periodic event counter.
    pub counter: u32,
    /// Counter event rate (Hz), 0 = disabled.
    pub counter_frequency_hz: u16,
    /// Auxiliary port function (register encoding of
    /// [`crate::aux::AuxFunction`]).
    pub aux_port_fn: u8,
    /// Auxiliary broadcast baud rate.
    pub aux_baud_rate: u32,
}

impl AppRegisters {
    /// Values applied at reset: counter idle, auxiliary clock broadcast
    /// enabled at the default rate.
    pub const fn boot_defaults() -> Self {
        Self {
            connected_devices: 0,
            counter: 0,
            counter_frequency_hz: 0,
            aux_port_fn: 1,
            aux_baud_rate: config::AUX_DEFAULT_BAUD,
        }
    }
}

impl Default for AppRegisters {
    fn default() -> Self {
        Self::boot_defaults()
    }
}

/// Decode a little-endian u8 payload of exactly the register width.
pub fn parse_u8(payload: &[u8]) -> Option<u8> {
    match payload {
        [b] => Some(*b),
        _ => None,
    }
}

/// Decode a little-endian u16 payload of exactly the register width.
pub fn parse_u16(payload: &[u8]) -> Option<u16> {
    payload.try_into().ok().map(u16::from_le_bytes)
}

/// Decode a little-endian u32 payload of exactly the register width.
pub fn parse_u32(payload: &[u8]) -> Option<u32> {
    payload.try_into().ok().map(u32::from_le_bytes)
}
