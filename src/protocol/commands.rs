//! # ESC/POS Control Commands
//!
//! Byte sequences for the small set of control commands a ticket job needs.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix, used by raster graphics
pub const GS: u8 = 0x1D;

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets every mode to its power-on default.
/// Sent at the start of each job.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ```
/// use ticketera::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Print and Feed Paper (ESC J n)
///
/// Advances the paper by `n` dots. Used after the last raster chunk so the
/// printed ticket clears the tear bar.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC J n  |
/// | Hex     | 1B 4A n  |
#[inline]
pub fn feed_dots(n: u8) -> Vec<u8> {
    vec![ESC, b'J', n]
}

/// # Set Heating Parameters (ESC 7 n1 n2 n3)
///
/// - `n1`: max heating dots (units of 8 dots)
/// - `n2`: heating time (units of 10µs)
/// - `n3`: heating interval (units of 10µs)
///
/// Higher heat time gives darker output at the cost of print speed.
#[inline]
pub fn heat_settings(dots: u8, time: u8, interval: u8) -> Vec<u8> {
    vec![ESC, b'7', dots, time, interval]
}

/// Split a u16 into little-endian bytes `[low, high]`.
#[inline]
pub fn u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_feed_dots() {
        assert_eq!(feed_dots(120), vec![0x1B, 0x4A, 120]);
    }

    #[test]
    fn test_heat_settings() {
        assert_eq!(heat_settings(0x07, 0xA0, 0x02), vec![0x1B, 0x37, 0x07, 0xA0, 0x02]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(u16_le(48), [48, 0]);
        assert_eq!(u16_le(500), [0xF4, 0x01]);
    }
}
