//! Packed pixel storage.
//!
//! Each LED is kept as three 5-bit channel levels packed into a single `u16`.
//! The public boundary stays 8 bits per channel: writes drop the three low bits
//! of every channel and reads put them back as zeros. That loss is permanent,
//! no original 8-bit value is kept anywhere.
//!
//! The store is indexed in *physical wiring order*, the order the pixels are
//! shifted out on the wire. Mapping from `(x, y)` coordinates happens one layer
//! up in [`Layout`](crate::layout::Layout).

use alloc::vec::Vec;

use bitfield::bitfield;

/// Number of low bits dropped from each 8-bit channel value.
const LEVEL_SHIFT: u8 = 8 - crate::brightness::LEVEL_BITS;

bitfield! {
    /// 16-bit word holding the three channel levels of one LED.
    ///
    /// The bit layout is as follows:
    /// - Bit 15: unused
    /// - Bits 14-10: Red level
    /// - Bits 9-5: Green level
    /// - Bits 4-0: Blue level
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Pixel(u16);
    impl Debug;
    pub u8, red, set_red: 14, 10;
    pub u8, green, set_green: 9, 5;
    pub u8, blue, set_blue: 4, 0;
}

impl Pixel {
    /// A pixel with all channels off.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Build a pixel from 8-bit channel values, keeping the top five bits of each.
    #[must_use]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        let mut pixel = Self::new();
        pixel.set_rgb8(r, g, b);
        pixel
    }

    /// Store 8-bit channel values, keeping the top five bits of each.
    pub fn set_rgb8(&mut self, r: u8, g: u8, b: u8) {
        self.set_red(r >> LEVEL_SHIFT);
        self.set_green(g >> LEVEL_SHIFT);
        self.set_blue(b >> LEVEL_SHIFT);
    }

    /// Channel values widened back to 8 bits. The low three bits are always zero.
    #[must_use]
    pub fn rgb8(&self) -> (u8, u8, u8) {
        (
            self.red() << LEVEL_SHIFT,
            self.green() << LEVEL_SHIFT,
            self.blue() << LEVEL_SHIFT,
        )
    }

    /// Raw channel levels in wire order: green, red, blue.
    #[must_use]
    pub fn grb_levels(&self) -> [u8; 3] {
        [self.green(), self.red(), self.blue()]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Pixel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Pixel {{ r: {}, g: {}, b: {} }}",
            self.red(),
            self.green(),
            self.blue()
        );
    }
}

/// Fixed-size pixel buffer in physical wiring order.
///
/// The buffer is allocated once by [`PixelStore::new`] and never resized. If
/// the allocation fails the store is empty and every operation on it is a
/// no-op, the requested LED count is still reported by [`requested_len`].
///
/// [`requested_len`]: PixelStore::requested_len
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PixelStore {
    pixels: Vec<Pixel>,
    requested_len: usize,
}

impl PixelStore {
    /// Allocate storage for `len` pixels, all off.
    #[must_use]
    pub fn new(len: usize) -> Self {
        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(len).is_ok() {
            pixels.resize(len, Pixel::new());
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("pixel buffer allocation for {} LEDs failed", len);
        }
        Self {
            pixels,
            requested_len: len,
        }
    }

    /// Number of pixels that can actually be addressed.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// `true` when no pixel can be addressed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Number of pixels asked for at construction.
    #[inline]
    #[must_use]
    pub fn requested_len(&self) -> usize {
        self.requested_len
    }

    /// `false` if the buffer allocation failed.
    #[inline]
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.pixels.len() == self.requested_len
    }

    /// Store an 8-bit colour at `index`. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, index: usize, r: u8, g: u8, b: u8) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            pixel.set_rgb8(r, g, b);
        }
    }

    /// Read back the colour at `index`, or `None` if out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(u8, u8, u8)> {
        self.pixels.get(index).map(Pixel::rgb8)
    }

    /// The packed pixel at `index`, or `None` if out of range.
    #[inline]
    #[must_use]
    pub fn pixel(&self, index: usize) -> Option<Pixel> {
        self.pixels.get(index).copied()
    }

    /// Turn every pixel off.
    pub fn erase(&mut self) {
        self.pixels.fill(Pixel::new());
    }

    /// Pixels in physical wiring order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Pixel> {
        self.pixels.iter()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;

    #[test]
    fn test_pixel_construction() {
        let pixel = Pixel::new();
        assert_eq!(pixel.0, 0);
        assert_eq!(pixel.red(), 0);
        assert_eq!(pixel.green(), 0);
        assert_eq!(pixel.blue(), 0);
        assert_eq!(Pixel::default(), pixel);
    }

    #[test]
    fn test_pixel_bit_layout() {
        let mut pixel = Pixel::new();
        pixel.set_red(0b11111);
        assert_eq!(pixel.0, 0b0111_1100_0000_0000);

        let mut pixel = Pixel::new();
        pixel.set_green(0b11111);
        assert_eq!(pixel.0, 0b0000_0011_1110_0000);

        let mut pixel = Pixel::new();
        pixel.set_blue(0b11111);
        assert_eq!(pixel.0, 0b0000_0000_0001_1111);
    }

    #[test]
    fn test_pixel_field_isolation() {
        let mut pixel = Pixel::new();
        pixel.set_red(0b10101);
        pixel.set_green(0b01010);
        pixel.set_blue(0b11111);
        assert_eq!(pixel.red(), 0b10101);
        assert_eq!(pixel.green(), 0b01010);
        assert_eq!(pixel.blue(), 0b11111);

        pixel.set_green(0);
        assert_eq!(pixel.red(), 0b10101);
        assert_eq!(pixel.green(), 0);
        assert_eq!(pixel.blue(), 0b11111);
    }

    #[test]
    fn test_pixel_drops_low_bits() {
        let pixel = Pixel::from_rgb8(255, 7, 0b1010_1010);
        assert_eq!(pixel.red(), 31);
        assert_eq!(pixel.green(), 0);
        assert_eq!(pixel.blue(), 0b10101);
        assert_eq!(pixel.rgb8(), (248, 0, 0b1010_1000));
    }

    #[test]
    fn test_pixel_grb_levels() {
        let pixel = Pixel::from_rgb8(8, 16, 24);
        assert_eq!(pixel.grb_levels(), [2, 1, 3]);
    }

    #[test]
    fn test_pixel_debug() {
        let pixel = Pixel::from_rgb8(255, 0, 0);
        let debug = format!("{:?}", pixel);
        assert!(debug.contains("red: 31"));
    }

    #[test]
    fn test_store_starts_dark() {
        let store = PixelStore::new(8);
        assert_eq!(store.len(), 8);
        assert_eq!(store.requested_len(), 8);
        assert!(store.is_allocated());
        assert!(!store.is_empty());
        for index in 0..8 {
            assert_eq!(store.get(index), Some((0, 0, 0)));
        }
    }

    #[test]
    fn test_store_round_trip_masks_low_bits() {
        let mut store = PixelStore::new(4);
        for (index, (r, g, b)) in [(255, 128, 1), (7, 8, 9), (0xAB, 0xCD, 0xEF), (0, 0, 0)]
            .into_iter()
            .enumerate()
        {
            store.set(index, r, g, b);
            assert_eq!(store.get(index), Some((r & 0xF8, g & 0xF8, b & 0xF8)));
        }
    }

    #[test]
    fn test_store_out_of_range_is_ignored() {
        let mut store = PixelStore::new(3);
        store.set(0, 10, 20, 30);
        store.set(1, 40, 50, 60);
        store.set(2, 70, 80, 90);
        let before = store.clone();

        store.set(3, 255, 255, 255);
        store.set(usize::MAX, 255, 255, 255);

        assert_eq!(store, before);
        assert_eq!(store.get(3), None);
        assert_eq!(store.pixel(3), None);
    }

    #[test]
    fn test_store_erase() {
        let mut store = PixelStore::new(5);
        for index in 0..5 {
            store.set(index, 255, 255, 255);
        }
        store.erase();
        assert!(store.iter().all(|pixel| *pixel == Pixel::new()));
    }

    #[test]
    fn test_store_iter_is_physical_order() {
        let mut store = PixelStore::new(3);
        store.set(2, 255, 0, 0);
        let reds: std::vec::Vec<u8> = store.iter().map(Pixel::red).collect();
        assert_eq!(reds, [0, 0, 31]);
    }

    #[test]
    fn test_empty_store_is_inert() {
        let mut store = PixelStore::new(0);
        assert!(store.is_empty());
        assert!(store.is_allocated());
        store.set(0, 1, 2, 3);
        assert_eq!(store.get(0), None);
        store.erase();
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn test_allocation_failure_is_inert() {
        // capacity overflow, `try_reserve_exact` fails without aborting
        let mut store = PixelStore::new(usize::MAX);
        assert!(!store.is_allocated());
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.requested_len(), usize::MAX);

        store.set(0, 255, 255, 255);
        store.set(usize::MAX - 1, 255, 255, 255);
        assert_eq!(store.get(0), None);
        assert_eq!(store.pixel(0), None);

        store.erase();
        assert_eq!(store.iter().count(), 0);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_pixel_grb_levels_full_scale() {
        let pixel = Pixel::from_rgb8(255, 255, 255);
        assert_eq!(pixel.grb_levels(), [31, 31, 31]);
    }
}
