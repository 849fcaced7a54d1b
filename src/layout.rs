//! Mapping between `(x, y)` coordinates and the physical wiring order.
//!
//! A strip bent into rows is rarely wired left-to-right on every row. Two
//! wirings are supported:
//! - **reversed**: every row runs right-to-left
//! - **alternating** (serpentine): every odd row runs in the opposite direction
//!   of the even rows
//!
//! Both can be combined, a reversed alternating layout starts right-to-left on
//! row 0 and runs left-to-right on row 1.
//!
//! ```text
//! row_length = 5, alternating
//!
//!   x:   0  1  2  3  4
//!   y=0  0  1  2  3  4
//!   y=1  9  8  7  6  5
//!   y=2 10 11 12 13 14
//! ```
//!
//! The mapping is deliberately asymmetric. [`Layout::index_from_xy`] applies the
//! direction flags, [`Layout::xy_from_index`] is a plain row-major split. A flat
//! LED number handed to the driver is therefore a *logical* row-major number that
//! is split with `xy_from_index` and then wired with `index_from_xy`.

/// Construction parameters of a [`Layout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayoutOptions {
    /// LEDs per row, `0` means a single row holding every LED.
    pub row_length: usize,
    /// Rows are wired right-to-left.
    pub x_reversed: bool,
    /// Odd rows are wired in the opposite direction of even rows.
    pub alternating: bool,
}

impl LayoutOptions {
    /// A single straight row.
    #[must_use]
    pub const fn linear() -> Self {
        Self {
            row_length: 0,
            x_reversed: false,
            alternating: false,
        }
    }

    /// Rows of `row_length` LEDs wired in a serpentine.
    #[must_use]
    pub const fn serpentine(row_length: usize) -> Self {
        Self {
            row_length,
            x_reversed: false,
            alternating: true,
        }
    }

    /// Set the row length.
    #[must_use]
    pub const fn with_row_length(mut self, row_length: usize) -> Self {
        self.row_length = row_length;
        self
    }

    /// Set the reversed flag.
    #[must_use]
    pub const fn with_x_reversed(mut self, x_reversed: bool) -> Self {
        self.x_reversed = x_reversed;
        self
    }

    /// Set the alternating flag.
    #[must_use]
    pub const fn with_alternating(mut self, alternating: bool) -> Self {
        self.alternating = alternating;
        self
    }
}

/// Immutable description of how a strip is folded into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layout {
    led_count: usize,
    row_length: usize,
    x_reversed: bool,
    alternating: bool,
}

impl Layout {
    /// Build a layout for `led_count` LEDs.
    ///
    /// A `row_length` of zero becomes `led_count`. The row length is never zero,
    /// even for an empty strip.
    #[must_use]
    pub const fn new(led_count: usize, options: LayoutOptions) -> Self {
        let row_length = if options.row_length == 0 {
            led_count
        } else {
            options.row_length
        };
        Self {
            led_count,
            row_length: if row_length == 0 { 1 } else { row_length },
            x_reversed: options.x_reversed,
            alternating: options.alternating,
        }
    }

    /// Total number of LEDs.
    #[inline]
    #[must_use]
    pub const fn led_count(&self) -> usize {
        self.led_count
    }

    /// LEDs per row.
    #[inline]
    #[must_use]
    pub const fn row_length(&self) -> usize {
        self.row_length
    }

    /// Number of columns, same as [`row_length`](Self::row_length).
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.row_length
    }

    /// Number of rows, counting a partially populated last row.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.led_count.div_ceil(self.row_length)
    }

    /// `true` if rows are wired right-to-left.
    #[inline]
    #[must_use]
    pub const fn x_reversed(&self) -> bool {
        self.x_reversed
    }

    /// `true` if odd rows flip direction.
    #[inline]
    #[must_use]
    pub const fn alternating(&self) -> bool {
        self.alternating
    }

    /// `true` if row `y` is wired right-to-left.
    #[inline]
    #[must_use]
    pub const fn is_row_reversed(&self, y: usize) -> bool {
        self.x_reversed ^ (self.alternating && y % 2 == 1)
    }

    /// Physical wiring index of `(x, y)`.
    ///
    /// Returns `None` when `x` lies outside the row or the index is past the end
    /// of the strip.
    #[must_use]
    pub const fn index_from_xy(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.row_length {
            return None;
        }
        let Some(base) = y.checked_mul(self.row_length) else {
            return None;
        };
        let offset = if self.is_row_reversed(y) {
            self.row_length - 1 - x
        } else {
            x
        };
        match base.checked_add(offset) {
            Some(index) if index < self.led_count => Some(index),
            _ => None,
        }
    }

    /// Row-major split of a flat LED number, ignoring the direction flags.
    #[inline]
    #[must_use]
    pub const fn xy_from_index(&self, index: usize) -> (usize, usize) {
        (index % self.row_length, index / self.row_length)
    }

    /// Physical wiring index of a logical, row-major LED number.
    #[inline]
    #[must_use]
    pub const fn index_from_led_number(&self, led: usize) -> Option<usize> {
        let (x, y) = self.xy_from_index(led);
        self.index_from_xy(x, y)
    }
}
