//! Serial peripheral abstraction.
//!
//! The driver only needs two things from the SPI peripheral: setting the clock
//! divider and bit order once, and exchanging single bytes with a fixed latency.
//! [`SerialPeripheral`] captures exactly that. Any `embedded-hal` 1.0
//! [`SpiBus`] can be plugged in through [`SpiBusPeripheral`].

use embedded_hal::spi::SpiBus;

/// Divider applied to the system clock to derive the SPI bit clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDivider {
    /// System clock / 2
    Div2,
    /// System clock / 4
    Div4,
    /// System clock / 8, gives the 9 MHz bit clock from a 72 MHz system clock
    #[default]
    Div8,
    /// System clock / 16
    Div16,
    /// System clock / 32
    Div32,
    /// System clock / 64
    Div64,
    /// System clock / 128
    Div128,
    /// System clock / 256
    Div256,
}

impl ClockDivider {
    /// The divisor as a number.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div8 => 8,
            Self::Div16 => 16,
            Self::Div32 => 32,
            Self::Div64 => 64,
            Self::Div128 => 128,
            Self::Div256 => 256,
        }
    }

    /// SPI bit clock for the given system clock.
    #[must_use]
    pub const fn bit_clock_hz(self, system_clock_hz: u32) -> u32 {
        system_clock_hz / self.divisor()
    }
}

/// Order in which the bits of a byte go out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// Synchronous serial peripheral used to shift out the bitstream.
pub trait SerialPeripheral {
    /// Set the clock divider and bit order. Called once from
    /// [`Ws2812Spi::begin`](crate::Ws2812Spi::begin).
    fn configure(&mut self, divider: ClockDivider, bit_order: BitOrder);

    /// Exchange one byte, blocking until it has been shifted out.
    fn transfer_byte(&mut self, byte: u8) -> u8;

    /// Wait until every queued byte has left the peripheral.
    fn flush(&mut self) {}
}

impl<T: SerialPeripheral + ?Sized> SerialPeripheral for &mut T {
    #[inline]
    fn configure(&mut self, divider: ClockDivider, bit_order: BitOrder) {
        T::configure(self, divider, bit_order);
    }

    #[inline]
    fn transfer_byte(&mut self, byte: u8) -> u8 {
        T::transfer_byte(self, byte)
    }

    #[inline]
    fn flush(&mut self) {
        T::flush(self);
    }
}

/// [`SerialPeripheral`] on top of an `embedded-hal` [`SpiBus`].
///
/// `embedded-hal` has no notion of clock dividers, the bus must already be
/// running at the bit clock the driver expects (9 MHz, see
/// [`BIT_CLOCK_HZ`](crate::encoder::BIT_CLOCK_HZ)). The divider passed to
/// [`configure`](SerialPeripheral::configure) is only recorded and can be read
/// back with [`divider`](Self::divider). LSB-first order is emulated by
/// reversing every byte before it goes out.
///
/// A frame is never cut short by a bus error. The first error is kept and can
/// be collected with [`take_error`](Self::take_error) after
/// [`show`](crate::Ws2812Spi::show) returns.
#[derive(Debug)]
pub struct SpiBusPeripheral<S: SpiBus<u8>> {
    bus: S,
    divider: Option<ClockDivider>,
    bit_order: BitOrder,
    error: Option<S::Error>,
}

impl<S: SpiBus<u8>> SpiBusPeripheral<S> {
    /// Wrap an SPI bus.
    pub const fn new(bus: S) -> Self {
        Self {
            bus,
            divider: None,
            bit_order: BitOrder::MsbFirst,
            error: None,
        }
    }

    /// Divider requested by the last [`configure`](SerialPeripheral::configure).
    pub const fn divider(&self) -> Option<ClockDivider> {
        self.divider
    }

    /// Bit order requested by the last [`configure`](SerialPeripheral::configure).
    pub const fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Take the first bus error seen since the last call.
    pub fn take_error(&mut self) -> Option<S::Error> {
        self.error.take()
    }

    /// Access the wrapped bus.
    pub fn bus_mut(&mut self) -> &mut S {
        &mut self.bus
    }

    /// Give the wrapped bus back.
    pub fn into_inner(self) -> S {
        self.bus
    }

    fn record(&mut self, result: Result<(), S::Error>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
                false
            }
        }
    }

    #[inline]
    const fn order(&self, byte: u8) -> u8 {
        match self.bit_order {
            BitOrder::MsbFirst => byte,
            BitOrder::LsbFirst => byte.reverse_bits(),
        }
    }
}

impl<S: SpiBus<u8>> SerialPeripheral for SpiBusPeripheral<S> {
    fn configure(&mut self, divider: ClockDivider, bit_order: BitOrder) {
        self.divider = Some(divider);
        self.bit_order = bit_order;
    }

    #[inline]
    fn transfer_byte(&mut self, byte: u8) -> u8 {
        let mut word = [self.order(byte)];
        let result = self.bus.transfer_in_place(&mut word);
        if self.record(result) {
            self.order(word[0])
        } else {
            0
        }
    }

    fn flush(&mut self) {
        let result = self.bus.flush();
        self.record(result);
    }
}
