//! UART configuration value types.

/// UART configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits
    pub data_bits: DataBits,
    /// Parity
    pub parity: Parity,
    /// Stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 8 data bits, 1 stop bit, no parity, no flow control: the framing
    /// every Harp serial channel uses; only the baud rate varies.
    pub const fn eight_n_one(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Total bits on the wire per byte (start + data + stop).
    #[allow(clippy::arithmetic_side_effects)] // sums of constants <= 12
    pub const fn bits_per_byte(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        1 + data + parity + stop
    }

    /// Wire time of an `n`-byte frame in microseconds, rounded up.
    ///
    /// Returns `None` for a zero baud rate.
    // u64 arithmetic cannot overflow for any 32-bit baud/count; the result
    // is far below u32::MAX µs for every frame this device sends.
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
    pub const fn frame_time_us(&self, n: u32) -> Option<u32> {
        if self.baud_rate == 0 {
            return None;
        }
        let bits = self.bits_per_byte() as u64 * n as u64;
        let us = (bits * 1_000_000).div_ceil(self.baud_rate as u64);
        Some(us as u32)
    }
}

/// Data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    /// 5 data bits
    Five,
    /// 6 data bits
    Six,
    /// 7 data bits
    Seven,
    /// 8 data bits
    Eight,
}

/// Parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    /// No parity
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// 1 stop bit
    One,
    /// 2 stop bits
    Two,
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn eight_n_one_is_ten_bits_per_byte() {
        let cfg = UartConfig::eight_n_one(100_000);
        assert_eq!(cfg.bits_per_byte(), 10);
    }

    #[test]
    fn six_byte_frame_at_100k_baud_takes_600us() {
        let cfg = UartConfig::eight_n_one(100_000);
        assert_eq!(cfg.frame_time_us(6), Some(600));
    }

    #[test]
    fn four_byte_frame_at_minimum_viable_baud_fills_one_second() {
        // 4 bytes × 10 bits at 40 baud is exactly one second — the floor
        // for an aux broadcast that must complete inside each second.
        let cfg = UartConfig::eight_n_one(40);
        assert_eq!(cfg.frame_time_us(4), Some(1_000_000));
    }

    #[test]
    fn zero_baud_has_no_frame_time() {
        let cfg = UartConfig::eight_n_one(0);
        assert_eq!(cfg.frame_time_us(4), None);
    }
}
