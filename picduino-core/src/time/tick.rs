//! Free-running tick counter
//!
//! The tick value is 32 bits wide. The low 16 bits come straight from
//! the hardware timer; the high 16 bits are kept in RAM and bumped by the
//! timer's overflow interrupt. Reading both halves is not atomic, so
//! [`TickCounter::now`] samples the high part on either side of the
//! hardware read and retries if an overflow landed in between.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counts contributed by one overflow of a 16-bit timer
pub const TIMER_RANGE: u32 = 0x1_0000;

/// Source of the low 16 bits of the tick value
pub trait CounterSource {
    /// Current hardware counter value
    fn low(&self) -> u16;
}

impl<F: Fn() -> u16> CounterSource for F {
    fn low(&self) -> u16 {
        self()
    }
}

/// Overflow-extended hardware counter
///
/// Only the time-base interrupt handler calls [`advance`](Self::advance);
/// it is the sole writer, so a plain load/store pair is enough and no
/// read-modify-write atomics are needed.
#[derive(Debug)]
pub struct TickCounter {
    high: AtomicU32,
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            high: AtomicU32::new(0),
        }
    }

    /// Account for one hardware overflow
    ///
    /// Interrupt context only.
    pub fn advance(&self) {
        let high = self.high.load(Ordering::Acquire);
        self.high
            .store(high.wrapping_add(TIMER_RANGE), Ordering::Release);
    }

    /// Overflow-accumulated high part
    pub fn high(&self) -> u32 {
        self.high.load(Ordering::Acquire)
    }

    /// Current tick value, wrapping modulo 2^32
    ///
    /// Loops until no overflow is observed across the hardware read. Must
    /// not be called from the time-base handler itself.
    pub fn now<S: CounterSource + ?Sized>(&self, source: &S) -> u32 {
        loop {
            let high = self.high.load(Ordering::Acquire);
            let low = source.low();
            if high == self.high.load(Ordering::Acquire) {
                return high | u32::from(low);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_starts_at_zero() {
        let tick = TickCounter::new();
        assert_eq!(tick.now(&|| 0u16), 0);
        assert_eq!(tick.now(&|| 0x1234u16), 0x1234);
    }

    #[test]
    fn test_advance_adds_timer_range() {
        let tick = TickCounter::new();
        tick.advance();
        tick.advance();
        assert_eq!(tick.high(), 2 * TIMER_RANGE);
        assert_eq!(tick.now(&|| 5u16), 0x0002_0005);
    }

    #[test]
    fn test_overflow_between_reads_retries() {
        let tick = TickCounter::new();
        let reads = Cell::new(0u32);
        // First hardware read races with an overflow: the counter reads
        // 0xFFFF but the interrupt fires before the second high sample.
        let source = || {
            reads.set(reads.get() + 1);
            if reads.get() == 1 {
                tick.advance();
                0xFFFF
            } else {
                0x0003
            }
        };
        assert_eq!(tick.now(&source), 0x0001_0003);
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn test_wraps_modulo_2_32() {
        let tick = TickCounter::new();
        for _ in 0..0x1_0000u32 {
            tick.advance();
        }
        assert_eq!(tick.high(), 0);
        assert_eq!(tick.now(&|| 7u16), 7);
    }
}
