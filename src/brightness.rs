//! Perceptual brightness correction.
//!
//! The pixel store keeps every channel as a 5-bit *linear* level. LEDs do not
//! look linear though: doubling the PWM duty cycle is nowhere near doubling the
//! perceived brightness at the low end. Right before a frame is shifted out,
//! every stored level is run through [`PWM_TABLE`] which maps the 32 linear
//! levels onto 8-bit duty values along the CIE 1931 lightness curve.
//!
//! The correction happens at transmit time only. The stored value is never
//! corrected, so the same level produces the same duty byte on every frame.

/// Number of bits per stored channel level.
pub const LEVEL_BITS: u8 = 5;

/// Largest stored channel level.
pub const MAX_LEVEL: u8 = (1 << LEVEL_BITS) - 1;

/// 5-bit linear level to 8-bit PWM duty value.
///
/// Values follow the CIE 1931 lightness curve. Entry 0 is fully off and entry
/// [`MAX_LEVEL`] is fully on.
pub const PWM_TABLE: [u8; 32] = [
    0, 1, 2, 3, 4, 5, 7, 9, 12, 15, 18, 22, 27, 32, 37, 44, 50, 58, 66, 75, 85, 96, 107, 120,
    133, 147, 163, 179, 196, 215, 234, 255,
];

/// Coarse 4-bit visual brightness to PWM duty value.
///
/// Used by [`brightness_to_pwm`] for callers that want a perceptually uniform
/// brightness knob to feed into the linear scaling setters.
pub const VISUAL_BRIGHTNESS_TABLE: [u8; 16] = [
    0, 1, 2, 3, 4, 6, 8, 12, 23, 36, 48, 70, 95, 135, 190, 255,
];

/// Convert a stored 5-bit channel level into the PWM duty value that is sent
/// to the LED.
///
/// Bits above [`LEVEL_BITS`] are ignored.
#[inline]
#[must_use]
pub const fn pwm_for_level(level: u8) -> u8 {
    PWM_TABLE[(level & MAX_LEVEL) as usize]
}

/// Convert a visual brightness (0..=255) into a PWM scaling factor.
///
/// Only the top four bits of `brightness` are significant. The result is meant
/// to be passed as the `brightness` argument of
/// [`Ws2812Spi::set_color_dimmed`](crate::Ws2812Spi::set_color_dimmed), so a
/// linear sweep of `brightness` looks like a linear fade to the eye.
#[inline]
#[must_use]
pub const fn brightness_to_pwm(brightness: u8) -> u8 {
    VISUAL_BRIGHTNESS_TABLE[(brightness >> 4) as usize]
}
