//! WS2812 one-wire bitstream emulation over SPI.
//!
//! WS2812 LEDs take a single data line where every bit is a high pulse followed
//! by a low gap; the *length* of the high pulse tells a `0` from a `1`:
//!
//! | Symbol | High time (T_H) | Low time (T_L) |
//! |--------|-----------------|----------------|
//! | `0`    | 200 – 500 ns    | ≥ 650 ns       |
//! | `1`    | 550 – 850 ns    | ≥ 450 ns       |
//!
//! Holding the line low for more than ~50 µs latches the data and resets the
//! chain, so a frame has to be streamed without long pauses.
//!
//! Here every WS2812 bit is sent as one full SPI byte clocked at
//! [`BIT_CLOCK_HZ`] (72 MHz system clock divided by 8), MSB first, so each SPI
//! bit lasts ~111 ns:
//!
//! ```text
//! ZERO_PATTERN 0x70  0111_0000  ___‾‾‾‾‾‾___________   T_H ≈ 333 ns
//! ONE_PATTERN  0x7E  0111_1110  ___‾‾‾‾‾‾‾‾‾‾‾‾‾‾___   T_H ≈ 667 ns
//! ```
//!
//! The leading zero bit of every pattern merges with the trailing low bits of
//! the previous one and the inter-byte gap of the peripheral to form T_L.

/// SPI byte sent for a WS2812 `1` bit.
pub const ONE_PATTERN: u8 = 0x7E;

/// SPI byte sent for a WS2812 `0` bit.
pub const ZERO_PATTERN: u8 = 0x70;

/// SPI bytes needed to encode one 8-bit channel value.
pub const BYTES_PER_CHANNEL: usize = 8;

/// Channels per LED, sent in green, red, blue order.
pub const CHANNELS_PER_LED: usize = 3;

/// SPI bytes needed to encode one LED.
pub const BYTES_PER_LED: usize = BYTES_PER_CHANNEL * CHANNELS_PER_LED;

/// SPI bit clock the patterns are tuned for.
pub const BIT_CLOCK_HZ: u32 = 9_000_000;

/// Minimum time the line has to stay low to latch a frame.
pub const RESET_TIME_US: u32 = 50;

/// Accepted WS2812 high time of a `0` symbol, in nanoseconds.
pub const T0H_NS: core::ops::RangeInclusive<u32> = 200..=500;

/// Accepted WS2812 high time of a `1` symbol, in nanoseconds.
pub const T1H_NS: core::ops::RangeInclusive<u32> = 550..=850;

/// SPI byte for a single WS2812 bit.
#[inline(always)]
#[must_use]
pub const fn pattern_for_bit(bit: bool) -> u8 {
    if bit {
        ONE_PATTERN
    } else {
        ZERO_PATTERN
    }
}

/// Encode one duty value into eight SPI bytes, most significant bit first.
#[inline(always)]
#[must_use]
pub const fn encode(mut duty: u8) -> [u8; BYTES_PER_CHANNEL] {
    let mut bytes = [0; BYTES_PER_CHANNEL];
    let mut i = 0;
    while i < BYTES_PER_CHANNEL {
        bytes[i] = pattern_for_bit(duty & 0x80 != 0);
        duty <<= 1;
        i += 1;
    }
    bytes
}

/// Length of the high pulse produced by `pattern`, in nanoseconds, when each
/// SPI bit lasts `bit_time_ns`.
///
/// Only the first run of one bits counts, which is what the WS2812 samples.
#[must_use]
pub const fn high_time_ns(pattern: u8, bit_time_ns: u32) -> u32 {
    if pattern == 0 {
        return 0;
    }
    let leading_zeros = pattern.leading_zeros();
    let ones = (pattern << leading_zeros).leading_ones();
    ones * bit_time_ns
}
