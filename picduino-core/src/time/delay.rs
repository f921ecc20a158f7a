//! Busy-wait delays on the tick counter
//!
//! There is no scheduler to yield to: a delay spins on
//! [`TickCounter::now`] until enough ticks have elapsed. The overflow
//! interrupt must be running, so delays cannot be used from an interrupt
//! handler at or above the time base's priority.

use crate::clock::Clock;
use crate::error::HardwareTimeout;
use crate::poll::{wait_until, PollBound};
use crate::time::tick::{CounterSource, TickCounter};

/// Delay provider over a tick counter and its hardware source
pub struct Delay<'a, S> {
    tick: &'a TickCounter,
    source: S,
    clock: Clock,
}

impl<'a, S: CounterSource> Delay<'a, S> {
    pub fn new(tick: &'a TickCounter, source: S, clock: Clock) -> Self {
        Self {
            tick,
            source,
            clock,
        }
    }

    /// Current tick value
    pub fn ticks(&self) -> u32 {
        self.tick.now(&self.source)
    }

    /// Milliseconds since start-up, wrapping with the tick counter
    pub fn millis(&self) -> u32 {
        self.ticks() / self.clock.ticks_per_ms().max(1)
    }

    /// Microseconds since start-up, wrapping with the tick counter
    pub fn micros(&self) -> u32 {
        self.ticks() / self.clock.ticks_per_us().max(1)
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Spin for at least `ms` milliseconds
    pub fn delay(&self, ms: u32) {
        self.spin(span(ms, self.clock.ticks_per_ms()));
    }

    /// Spin for at least `us` microseconds
    pub fn delay_microseconds(&self, us: u32) {
        self.spin(span(us, self.clock.ticks_per_us()));
    }

    /// As [`delay`](Self::delay), giving up after `bound` checks of the counter
    pub fn try_delay(&self, ms: u32, bound: PollBound) -> Result<(), HardwareTimeout> {
        self.spin_bounded(span(ms, self.clock.ticks_per_ms()), bound)
    }

    pub fn try_delay_microseconds(&self, us: u32, bound: PollBound) -> Result<(), HardwareTimeout> {
        self.spin_bounded(span(us, self.clock.ticks_per_us()), bound)
    }

    /// Spin until `span` ticks have passed since the call
    pub fn delay_ticks(&self, span: u32) {
        self.spin(u64::from(span));
    }

    /// Spin until `span` ticks have elapsed
    ///
    /// Elapsed time is summed sample to sample, so spans longer than the
    /// 32-bit counter's period are honoured as long as two consecutive
    /// samples are less than one period apart.
    fn spin(&self, span: u64) {
        let mut elapsed = Elapsed::start(self);
        while !elapsed.reached(self, span) {
            core::hint::spin_loop();
        }
    }

    fn spin_bounded(&self, span: u64, bound: PollBound) -> Result<(), HardwareTimeout> {
        let mut elapsed = Elapsed::start(self);
        wait_until(bound, || elapsed.reached(self, span))
    }
}

/// Tick span of `count` units of `ticks_per_unit`, without wrapping
fn span(count: u32, ticks_per_unit: u32) -> u64 {
    u64::from(count) * u64::from(ticks_per_unit)
}

/// Ticks accumulated since a starting sample
struct Elapsed {
    last: u32,
    total: u64,
}

impl Elapsed {
    fn start<S: CounterSource>(delay: &Delay<'_, S>) -> Self {
        Self {
            last: delay.ticks(),
            total: 0,
        }
    }

    /// True once `span` ticks have passed; a zero span needs no new sample
    fn reached<S: CounterSource>(&mut self, delay: &Delay<'_, S>, span: u64) -> bool {
        if self.total >= span {
            return true;
        }
        let now = delay.ticks();
        self.total += u64::from(now.wrapping_sub(self.last));
        self.last = now;
        self.total >= span
    }
}

impl<S: CounterSource> embedded_hal::delay::DelayNs for Delay<'_, S> {
    fn delay_ns(&mut self, ns: u32) {
        // Round up so a nonzero request never becomes a zero-tick wait
        let ticks = (u64::from(ns) * u64::from(self.clock.cpu_hz())).div_ceil(1_000_000_000);
        self.spin(ticks);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_microseconds(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Hardware counter that moves `step` ticks per read and raises the
    /// overflow on the shared tick counter when it wraps
    struct SteppingTimer<'a> {
        tick: &'a TickCounter,
        counter: Cell<u16>,
        step: u16,
    }

    impl CounterSource for SteppingTimer<'_> {
        fn low(&self) -> u16 {
            let value = self.counter.get();
            let (next, wrapped) = value.overflowing_add(self.step);
            self.counter.set(next);
            if wrapped {
                self.tick.advance();
            }
            value
        }
    }

    #[test]
    fn test_zero_delay_returns_without_progress() {
        let tick = TickCounter::new();
        let reads = Cell::new(0u32);
        let frozen = || {
            reads.set(reads.get() + 1);
            0x4000u16
        };
        let delay = Delay::new(&tick, frozen, Clock::from_cpu_hz(1_000_000));

        delay.delay(0);
        assert_eq!(reads.get(), 1);
        assert_eq!(delay.try_delay(0, PollBound::Iterations(0)), Ok(()));
        assert_eq!(reads.get(), 2);
        delay.delay_microseconds(0);
        assert_eq!(reads.get(), 3);
    }

    /// Counter that moves `step` ticks per read and keeps the true
    /// number of ticks elapsed, beyond the 32-bit range
    struct CountingTimer<'a> {
        tick: &'a TickCounter,
        counter: Cell<u16>,
        step: u16,
        total: Cell<u64>,
    }

    impl CounterSource for CountingTimer<'_> {
        fn low(&self) -> u16 {
            let value = self.counter.get();
            let (next, wrapped) = value.overflowing_add(self.step);
            self.counter.set(next);
            self.total.set(self.total.get() + u64::from(self.step));
            if wrapped {
                self.tick.advance();
            }
            value
        }
    }

    #[test]
    fn test_long_delay_is_not_truncated() {
        let tick = TickCounter::new();
        let timer = CountingTimer {
            tick: &tick,
            counter: Cell::new(0),
            step: 0x8000,
            total: Cell::new(0),
        };
        let delay = Delay::new(&tick, timer, Clock::from_cpu_hz(16_000_000));

        // 300 s at 16 MHz is more than one 32-bit counter period
        delay.delay(300_000);
        let requested = 300_000u64 * 16_000;
        assert!(requested > u64::from(u32::MAX));
        assert!(delay.source.total.get() >= requested);
    }

    #[test]
    fn test_delay_waits_for_span() {
        let tick = TickCounter::new();
        let timer = SteppingTimer {
            tick: &tick,
            counter: Cell::new(0),
            step: 250,
        };
        let delay = Delay::new(&tick, timer, Clock::from_cpu_hz(1_000_000));
        let start = delay.ticks();
        delay.delay(3);
        assert!(delay.ticks().wrapping_sub(start) >= 3_000);
    }

    #[test]
    fn test_delay_across_overflow() {
        let tick = TickCounter::new();
        let timer = SteppingTimer {
            tick: &tick,
            counter: Cell::new(0xFF00),
            step: 0x100,
        };
        let delay = Delay::new(&tick, timer, Clock::from_cpu_hz(1_000_000));
        delay.delay(1);
        assert!(tick.high() >= 0x1_0000);
    }

    #[test]
    fn test_stalled_counter_times_out() {
        let tick = TickCounter::new();
        let frozen = || 0u16;
        let delay = Delay::new(&tick, frozen, Clock::from_cpu_hz(1_000_000));
        assert_eq!(
            delay.try_delay(1, PollBound::Iterations(100)),
            Err(HardwareTimeout)
        );
    }

    #[test]
    fn test_millis_and_micros() {
        let tick = TickCounter::new();
        tick.advance();
        let fixed = || 0u16;
        let delay = Delay::new(&tick, fixed, Clock::from_cpu_hz(4_000_000));
        assert_eq!(delay.millis(), 0x1_0000 / 4_000);
        assert_eq!(delay.micros(), 0x1_0000 / 4);
    }

    #[test]
    fn test_delay_ns_rounds_up() {
        use embedded_hal::delay::DelayNs;

        let tick = TickCounter::new();
        let timer = SteppingTimer {
            tick: &tick,
            counter: Cell::new(0),
            step: 1,
        };
        let mut delay = Delay::new(&tick, timer, Clock::from_cpu_hz(1_000_000));
        let start = delay.ticks();
        delay.delay_ns(1);
        assert!(delay.ticks().wrapping_sub(start) >= 1);
    }
}
