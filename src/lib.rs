//! WS2812 LED strip driver that produces the one-wire bitstream with an SPI
//! peripheral.
//!
//! ## How WS2812 LEDs Work
//!
//! WS2812 ("NeoPixel") LEDs are daisy-chained on a single data line. Every LED
//! takes the first 24 bits it sees, in green, red, blue order and MSB first,
//! and passes everything after that on to the next LED. When the line stays low
//! for more than ~50 µs all LEDs latch the colour they received and the next
//! bit starts a new frame.
//!
//! Bits are encoded by pulse width:
//! - **0** – short high pulse (200–500 ns), long low gap
//! - **1** – long high pulse (550–850 ns), shorter low gap
//!
//! ### Emulating the protocol with SPI
//! Bit-banging these timings from software is fragile. Instead every WS2812
//! bit is sent as one byte on an SPI bus clocked at 9 MHz, so each SPI bit is
//! ~111 ns and the byte pattern shapes the pulse (see [`encoder`]). The price
//! is a blocking transfer of 24 SPI bytes per LED with interrupts off, a stray
//! interrupt in the middle of a frame would look like a reset to the strip.
//!
//! ### Brightness
//! Colours are stored with 5 bits per channel to keep the buffer at two bytes
//! per LED. The stored linear level is corrected to a perceptual PWM duty value
//! at transmit time (see [`brightness`]).
//!
//! ## Layouts
//! Strips folded into a matrix are described by a [`Layout`]: row length,
//! whether rows run right-to-left, and whether every other row flips direction
//! (serpentine wiring). Pixels can be addressed by `(x, y)`, by logical LED
//! number, or by drawing on the driver with `embedded-graphics`.
//!
//! ## Hardware Collaborators
//! The driver never touches registers itself. It needs:
//! - a [`SerialPeripheral`], any `embedded-hal` 1.0 `SpiBus` can be wrapped in
//!   a [`SpiBusPeripheral`]
//! - an [`InterruptControl`], [`GlobalCriticalSection`] uses the target's
//!   `critical-section` implementation
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and emits `defmt` log
//! messages when the driver starts and around every frame. Nothing is logged
//! while interrupts are suppressed.
//!
//! ```toml
//! [dependencies]
//! ws2812-spi-strip = { version = "0.1.0", features = ["defmt"] }
//! ```
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_arguments)]

extern crate alloc;

pub mod brightness;
pub mod bus;
pub mod color;
pub mod driver;
pub mod encoder;
pub mod interrupts;
pub mod layout;
pub mod pixel;

pub use bus::{BitOrder, ClockDivider, SerialPeripheral, SpiBusPeripheral};
pub use color::Color;
pub use driver::{State, Ws2812Spi};
pub use interrupts::{GlobalCriticalSection, InterruptControl};
pub use layout::{Layout, LayoutOptions};

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use embedded_graphics::mono_font::{ascii::FONT_4X6, MonoTextStyle};
    use embedded_graphics::pixelcolor::RgbColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::text::{Baseline, Text};
    use embedded_hal::spi::{ErrorKind, ErrorType, SpiBus};

    use super::*;

    /// Bus that only records what was written.
    #[derive(Default)]
    struct RecordingBus {
        written: Vec<u8>,
    }

    impl ErrorType for RecordingBus {
        type Error = ErrorKind;
    }

    impl SpiBus<u8> for RecordingBus {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(write);
            read.fill(0);
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            words.fill(0);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_embedded_hal_bus_end_to_end() {
        let mut strip = Ws2812Spi::with_global_critical_section(
            SpiBusPeripheral::new(RecordingBus::default()),
            8,
            LayoutOptions::serpentine(4),
        );
        strip.begin();
        assert_eq!(strip.peripheral_mut().divider(), Some(ClockDivider::Div8));

        strip.set_color(0, 255, 255, 255);
        strip.show();

        let (mut peripheral, _cs) = strip.release();
        assert_eq!(peripheral.take_error(), None);
        let written = peripheral.into_inner().written;
        // idle byte, then 8 LEDs
        assert_eq!(written.len(), 1 + 8 * 24);
        assert_eq!(written[0], 0);
        assert!(written[1..25].iter().all(|b| *b == encoder::ONE_PATTERN));
        assert!(written[25..].iter().all(|b| *b == encoder::ZERO_PATTERN));
    }

    #[test]
    fn test_text_renders_onto_matrix() {
        let mut strip = Ws2812Spi::with_global_critical_section(
            SpiBusPeripheral::new(RecordingBus::default()),
            16 * 8,
            LayoutOptions::serpentine(16),
        );
        let style = MonoTextStyle::new(&FONT_4X6, Color::WHITE);
        Text::with_baseline("Hi", Point::zero(), style, Baseline::Top)
            .draw(&mut strip)
            .unwrap();

        let lit = strip
            .pixels()
            .iter()
            .filter(|pixel| pixel.rgb8() != (0, 0, 0))
            .count();
        assert!(lit > 0);
        // nothing is drawn past the two 4 px wide glyphs
        for y in 0..8 {
            for x in 8..16 {
                assert_eq!(strip.get_color_xy(x, y), Some(Color::BLACK));
            }
        }
    }

    #[test]
    fn test_color_cycle_frame() {
        let mut strip = Ws2812Spi::with_global_critical_section(
            SpiBusPeripheral::new(RecordingBus::default()),
            240,
            LayoutOptions::linear(),
        );
        strip.begin();
        for offset in 0..4u8 {
            for led in 0..strip.num_leds() {
                let position = ((led * 256 / strip.num_leds()) as u8).wrapping_add(offset);
                let color = color::wheel(position);
                strip.set_color_dimmed(led, color.r(), color.g(), color.b(), 128);
            }
            strip.show();
        }
        let written = strip.release().0.into_inner().written;
        assert_eq!(written.len(), 1 + 4 * 240 * 24);
    }
}
