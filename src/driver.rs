//! The WS2812 strip driver.
//!
//! [`Ws2812Spi`] owns the pixel buffer and the layout, and talks to the
//! hardware through a [`SerialPeripheral`] and an [`InterruptControl`].
//!
//! # Lifecycle
//! ```text
//!  new() ──► Constructed ──begin()──► Ready ──show()──► Transmitting ──► Ready
//! ```
//! Buffer writes are plain memory operations and are fine in any state.
//! [`show`](Ws2812Spi::show) brings the peripheral up itself if
//! [`begin`](Ws2812Spi::begin) was never called.
//!
//! # Example
//! ```rust
//! use ws2812_spi_strip::{BitOrder, ClockDivider, InterruptControl, LayoutOptions, SerialPeripheral, Ws2812Spi};
//!
//! struct Spi;
//! impl SerialPeripheral for Spi {
//!     fn configure(&mut self, _divider: ClockDivider, _bit_order: BitOrder) {}
//!     fn transfer_byte(&mut self, byte: u8) -> u8 { byte }
//! }
//!
//! struct NoIrq;
//! impl InterruptControl for NoIrq {
//!     fn suppress(&mut self) {}
//!     fn restore(&mut self) {}
//! }
//!
//! // 4 rows of 8 LEDs wired as a serpentine
//! let mut strip = Ws2812Spi::new(Spi, NoIrq, 32, LayoutOptions::serpentine(8));
//! strip.begin();
//! strip.set_color_xy(0, 1, 255, 0, 0);
//! strip.set_color_dimmed(3, 255, 255, 255, 64);
//! strip.show();
//! ```

use core::convert::Infallible;

use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::{OriginDimensions, Size};
use embedded_hal::delay::DelayNs;

use crate::brightness::pwm_for_level;
use crate::bus::{BitOrder, ClockDivider, SerialPeripheral};
use crate::color::Color;
use crate::encoder::{self, BYTES_PER_LED, RESET_TIME_US};
use crate::interrupts::{GlobalCriticalSection, InterruptControl, InterruptGuard};
use crate::layout::{Layout, LayoutOptions};
use crate::pixel::PixelStore;

/// Divider used by [`Ws2812Spi::begin`], 72 MHz / 8 = 9 MHz bit clock.
pub const CLOCK_DIVIDER: ClockDivider = ClockDivider::Div8;

/// Bit order used by [`Ws2812Spi::begin`].
pub const BIT_ORDER: BitOrder = BitOrder::MsbFirst;

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Buffer allocated, peripheral not configured yet.
    Constructed,
    /// Peripheral configured and the data line idles low.
    Ready,
    /// A frame is being shifted out.
    Transmitting,
}

/// Scale an 8-bit channel by an 8-bit factor, `(channel * factor) >> 8`.
#[inline]
#[must_use]
pub const fn scale8(channel: u8, factor: u8) -> u8 {
    ((channel as u16 * factor as u16) >> 8) as u8
}

/// WS2812 strip driven through an oversampled SPI bitstream.
///
/// # Type Parameters
/// - `P`: the serial peripheral the bitstream goes out on
/// - `I`: interrupt control held for the duration of a frame
///
/// LEDs can be addressed three ways:
/// - by `(x, y)` coordinate, mapped through the [`Layout`]
/// - by flat LED number, a *logical* row-major number that is split into
///   `(x, y)` first and then mapped, so with serpentine wiring LED number 5 is
///   not necessarily the sixth LED on the wire
/// - through `embedded-graphics`, the driver is a [`DrawTarget`] whose canvas
///   is [`Layout::width`] × [`Layout::height`]
///
/// Colours are stored with 5 bits per channel. Out-of-range addresses are
/// silently ignored.
///
/// [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget
pub struct Ws2812Spi<P, I = GlobalCriticalSection> {
    peripheral: P,
    interrupts: I,
    pixels: PixelStore,
    layout: Layout,
    state: State,
}

impl<P: SerialPeripheral> Ws2812Spi<P, GlobalCriticalSection> {
    /// Create a driver that uses the global `critical-section` implementation
    /// to keep interrupts off during [`show`](Self::show).
    #[must_use]
    pub fn with_global_critical_section(
        peripheral: P,
        led_count: usize,
        options: LayoutOptions,
    ) -> Self {
        Self::new(peripheral, GlobalCriticalSection::new(), led_count, options)
    }
}

impl<P: SerialPeripheral, I: InterruptControl> Ws2812Spi<P, I> {
    /// Create a driver for `led_count` LEDs, all off.
    ///
    /// Nothing is sent to the peripheral until [`begin`](Self::begin). If the
    /// pixel buffer cannot be allocated the driver still works but every
    /// buffer operation is a no-op and [`show`](Self::show) sends nothing.
    #[must_use]
    pub fn new(peripheral: P, interrupts: I, led_count: usize, options: LayoutOptions) -> Self {
        Self {
            peripheral,
            interrupts,
            pixels: PixelStore::new(led_count),
            layout: Layout::new(led_count, options),
            state: State::Constructed,
        }
    }

    /// Configure the peripheral and drive the data line low.
    ///
    /// Calling it again once the driver is ready does nothing.
    pub fn begin(&mut self) {
        if self.state != State::Constructed {
            #[cfg(feature = "defmt")]
            defmt::debug!("begin: already in state {}", self.state);
            return;
        }
        self.peripheral.configure(CLOCK_DIVIDER, BIT_ORDER);
        // the line keeps the level of the last bit sent
        self.peripheral.transfer_byte(0);
        self.peripheral.flush();
        self.state = State::Ready;
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "begin: {} LEDs, layout {}",
            self.layout.led_count(),
            self.layout
        );
    }

    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of LEDs the driver was created for.
    #[inline]
    #[must_use]
    pub fn num_leds(&self) -> usize {
        self.layout.led_count()
    }

    /// The coordinate mapping.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The pixel buffer in physical wiring order.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &PixelStore {
        &self.pixels
    }

    /// Number of SPI byte transfers one [`show`](Self::show) performs.
    #[inline]
    #[must_use]
    pub fn frame_transfer_count(&self) -> usize {
        self.pixels.len() * BYTES_PER_LED
    }

    /// Set the colour of a logical LED number.
    pub fn set_color(&mut self, led: usize, red: u8, green: u8, blue: u8) {
        if let Some(index) = self.layout.index_from_led_number(led) {
            self.pixels.set(index, red, green, blue);
        }
    }

    /// Set the colour of the LED at `(x, y)`.
    ///
    /// `x` must be less than the row length. Larger values are ignored
    /// instead of wrapping into the next row.
    pub fn set_color_xy(&mut self, x: usize, y: usize, red: u8, green: u8, blue: u8) {
        if let Some(index) = self.layout.index_from_xy(x, y) {
            self.pixels.set(index, red, green, blue);
        }
    }

    /// Set the colour of a logical LED number, scaled linearly by `brightness`.
    ///
    /// Each channel becomes `(channel * brightness) >> 8`. For a perceptually
    /// even knob pass the brightness through
    /// [`brightness_to_pwm`](crate::brightness::brightness_to_pwm) first.
    pub fn set_color_dimmed(&mut self, led: usize, red: u8, green: u8, blue: u8, brightness: u8) {
        self.set_color(
            led,
            scale8(red, brightness),
            scale8(green, brightness),
            scale8(blue, brightness),
        );
    }

    /// Set the colour of the LED at `(x, y)`, scaled linearly by `brightness`.
    pub fn set_color_dimmed_xy(
        &mut self,
        x: usize,
        y: usize,
        red: u8,
        green: u8,
        blue: u8,
        brightness: u8,
    ) {
        self.set_color_xy(
            x,
            y,
            scale8(red, brightness),
            scale8(green, brightness),
            scale8(blue, brightness),
        );
    }

    /// Set a logical LED number from a [`Color`].
    #[inline]
    pub fn set_pixel(&mut self, led: usize, color: Color) {
        self.set_color(led, color.r(), color.g(), color.b());
    }

    /// Stored colour of a logical LED number.
    ///
    /// The three low bits of every channel read back as zero.
    #[must_use]
    pub fn get_color(&self, led: usize) -> Option<Color> {
        let index = self.layout.index_from_led_number(led)?;
        self.stored_color(index)
    }

    /// Stored colour of the LED at `(x, y)`.
    #[must_use]
    pub fn get_color_xy(&self, x: usize, y: usize) -> Option<Color> {
        let index = self.layout.index_from_xy(x, y)?;
        self.stored_color(index)
    }

    fn stored_color(&self, index: usize) -> Option<Color> {
        self.pixels
            .get(index)
            .map(|(red, green, blue)| Color::new(red, green, blue))
    }

    /// Turn every LED off in the buffer. Call [`show`](Self::show) to send it.
    pub fn erase(&mut self) {
        self.pixels.erase();
    }

    /// Shift the whole buffer out to the strip.
    ///
    /// Interrupts stay suppressed from the first to the last byte. Pixels go
    /// out in physical order, each as green, red, blue, brightness corrected
    /// and encoded into eight SPI bytes per channel. Blocks for
    /// [`frame_transfer_count`](Self::frame_transfer_count) byte times.
    ///
    /// The LEDs only latch the new colours after the line has been idle for
    /// [`RESET_TIME_US`], see [`show_latched`](Self::show_latched).
    pub fn show(&mut self) {
        if self.state == State::Constructed {
            self.begin();
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("show: {} bytes", self.frame_transfer_count());

        self.state = State::Transmitting;
        {
            let _guard = InterruptGuard::new(&mut self.interrupts);
            for pixel in self.pixels.iter() {
                for level in pixel.grb_levels() {
                    for byte in encoder::encode(pwm_for_level(level)) {
                        self.peripheral.transfer_byte(byte);
                    }
                }
            }
            self.peripheral.flush();
        }
        self.state = State::Ready;

        #[cfg(feature = "defmt")]
        defmt::trace!("show: done");
    }

    /// [`show`](Self::show), then wait the WS2812 reset time so the frame is
    /// latched before this returns.
    pub fn show_latched<D: DelayNs>(&mut self, delay: &mut D) {
        self.show();
        delay.delay_us(RESET_TIME_US);
    }

    /// Access the serial peripheral.
    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }

    /// Give back the peripheral and the interrupt control.
    pub fn release(self) -> (P, I) {
        (self.peripheral, self.interrupts)
    }
}

impl<P, I> OriginDimensions for Ws2812Spi<P, I> {
    fn size(&self) -> Size {
        Size::new(self.layout.width() as u32, self.layout.height() as u32)
    }
}

impl<P: SerialPeripheral, I: InterruptControl> embedded_graphics::draw_target::DrawTarget
    for Ws2812Spi<P, I>
{
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<T>(&mut self, pixels: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            if pixel.0.x < 0 || pixel.0.y < 0 {
                continue;
            }
            self.set_color_xy(
                pixel.0.x as usize,
                pixel.0.y as usize,
                pixel.1.r(),
                pixel.1.g(),
                pixel.1.b(),
            );
        }
        Ok(())
    }
}

impl<P, I> core::fmt::Debug for Ws2812Spi<P, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ws2812Spi")
            .field("layout", &self.layout)
            .field("allocated", &self.pixels.is_allocated())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<P, I> defmt::Format for Ws2812Spi<P, I> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Ws2812Spi {{ layout: {}, allocated: {}, state: {} }}",
            self.layout,
            self.pixels.is_allocated(),
            self.state
        );
    }
}
