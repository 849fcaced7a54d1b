//! Colour helpers.

use embedded_graphics::pixelcolor::Rgb888;

/// Colour type used at the driver boundary, 8 bits per channel.
pub type Color = Rgb888;

/// Position on a green → red → blue → green colour wheel.
///
/// `0` is pure green, `85` pure red and `170` pure blue. Stepping `position`
/// by one per frame gives a smooth colour cycle.
#[must_use]
pub const fn wheel(position: u8) -> Color {
    match position {
        0..=84 => Color::new(position * 3, 255 - position * 3, 0),
        85..=169 => {
            let position = position - 85;
            Color::new(255 - position * 3, 0, position * 3)
        }
        _ => {
            let position = position - 170;
            Color::new(0, position * 3, 255 - position * 3)
        }
    }
}
