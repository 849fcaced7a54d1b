//! Interrupt suppression around frame transmission.
//!
//! WS2812 chips treat a low pause of ~50 µs as the end of a frame. An interrupt
//! firing in the middle of [`show`](crate::Ws2812Spi::show) can easily stretch
//! a gap past that and the rest of the frame lands on the wrong LEDs. The driver
//! therefore keeps interrupts off for the whole frame, accepting the interrupt
//! latency that comes with it.

use critical_section::RestoreState;

/// Matched pair of operations that turn asynchronous interruption off and on.
///
/// The driver always calls [`suppress`](Self::suppress) and
/// [`restore`](Self::restore) in strictly balanced pairs and never nests them.
pub trait InterruptControl {
    /// Stop interrupts from running.
    fn suppress(&mut self);

    /// Let interrupts run again.
    fn restore(&mut self);
}

impl<T: InterruptControl + ?Sized> InterruptControl for &mut T {
    #[inline]
    fn suppress(&mut self) {
        T::suppress(self);
    }

    #[inline]
    fn restore(&mut self) {
        T::restore(self);
    }
}

/// [`InterruptControl`] backed by the global `critical-section` implementation
/// of the target (e.g. `cortex-m`'s `critical-section-single-core`).
#[derive(Default)]
pub struct GlobalCriticalSection {
    state: Option<RestoreState>,
}

impl core::fmt::Debug for GlobalCriticalSection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlobalCriticalSection")
            .field("active", &self.is_active())
            .finish()
    }
}

impl GlobalCriticalSection {
    /// Create an inactive critical section.
    #[must_use]
    pub const fn new() -> Self {
        Self { state: None }
    }

    /// `true` between `suppress` and `restore`.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_some()
    }
}

impl InterruptControl for GlobalCriticalSection {
    fn suppress(&mut self) {
        if self.state.is_none() {
            // SAFETY: released exactly once by `restore`, which is always paired
            // with this call by `InterruptGuard`.
            self.state = Some(unsafe { critical_section::acquire() });
        }
    }

    fn restore(&mut self) {
        if let Some(state) = self.state.take() {
            // SAFETY: `state` came from the matching `acquire` above.
            unsafe { critical_section::release(state) };
        }
    }
}

/// Keeps interrupts suppressed for as long as it lives.
pub(crate) struct InterruptGuard<'a, I: InterruptControl> {
    control: &'a mut I,
}

impl<'a, I: InterruptControl> InterruptGuard<'a, I> {
    pub(crate) fn new(control: &'a mut I) -> Self {
        control.suppress();
        Self { control }
    }
}

impl<I: InterruptControl> Drop for InterruptGuard<'_, I> {
    fn drop(&mut self) {
        self.control.restore();
    }
}
