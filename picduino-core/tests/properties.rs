use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use picduino_core::clock::Clock;
use picduino_core::gpio::Gpio;
use picduino_core::interrupt::{CallbackRegistry, InterruptSource};
use picduino_core::map::Port;
use picduino_core::peripherals::format_number;
use picduino_core::pins::Pin;
use picduino_core::sim::{SimChip, SimRegisters};
use picduino_core::time::{CounterSource, Delay, TickCounter};
use picduino_hal::gpio::{Level, PinMode};
use picduino_hal::interrupt::Callable;
use proptest::prelude::*;

/// 16-bit hardware timer that raises the overflow on the tick counter
/// whenever it wraps, as the time-base interrupt would
struct WrappingTimer<'a> {
    tick: &'a TickCounter,
    counter: Cell<u16>,
    step: u16,
}

impl WrappingTimer<'_> {
    fn bump(&self, delta: u16) {
        let (next, wrapped) = self.counter.get().overflowing_add(delta);
        self.counter.set(next);
        if wrapped {
            self.tick.advance();
        }
    }
}

impl CounterSource for WrappingTimer<'_> {
    fn low(&self) -> u16 {
        let value = self.counter.get();
        self.bump(self.step);
        value
    }
}

struct Counter(AtomicU32);

impl Callable for Counter {
    fn invoke(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

static COUNTERS: [Counter; InterruptSource::COUNT] = {
    const ZERO: Counter = Counter(AtomicU32::new(0));
    [ZERO; InterruptSource::COUNT]
};

proptest! {
    #[test]
    fn test_tick_is_monotonic(deltas in prop::collection::vec(any::<u16>(), 1..200)) {
        let tick = TickCounter::new();
        let timer = WrappingTimer { tick: &tick, counter: Cell::new(0), step: 0 };
        let mut last = tick.now(&timer);
        for delta in deltas {
            timer.bump(delta);
            let now = tick.now(&timer);
            prop_assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_overflow_during_read_is_never_torn(
        overflows in 0u32..1000,
        after in any::<u16>(),
    ) {
        let tick = TickCounter::new();
        for _ in 0..overflows {
            tick.advance();
        }
        let reads = Cell::new(0u32);
        let source = || {
            reads.set(reads.get() + 1);
            if reads.get() == 1 {
                tick.advance();
                0xFFFF
            } else {
                after
            }
        };
        let expected = ((overflows + 1) << 16) | u32::from(after);
        prop_assert_eq!(tick.now(&source), expected);
    }

    #[test]
    fn test_delay_lower_bound(
        ms in 0u32..4,
        step in 1u16..3000,
        start in any::<u16>(),
        cpu_hz in prop::sample::select(vec![1_000_000u32, 4_000_000, 16_000_000]),
    ) {
        let tick = TickCounter::new();
        let timer = WrappingTimer { tick: &tick, counter: Cell::new(start), step };
        let clock = Clock::from_cpu_hz(cpu_hz);
        let delay = Delay::new(&tick, timer, clock);

        let before = delay.ticks();
        delay.delay(ms);
        let elapsed = delay.ticks().wrapping_sub(before);
        prop_assert!(elapsed >= ms * clock.ticks_per_ms());
    }

    #[test]
    fn test_pin_round_trip(
        index in 0usize..Pin::<SimChip>::COUNT,
        levels in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        let sim = SimRegisters::new();
        for port in [Port::A, Port::B, Port::C] {
            let regs = picduino_core::map::PortRegs::of(port);
            sim.mirror(regs.lat, regs.port);
        }
        let gpio = Gpio::<_, SimChip>::new(&sim);
        let pin = Pin::<SimChip>::from_index(index).unwrap();
        gpio.pin_mode(pin, PinMode::Output);

        for high in levels {
            let level = Level::from(high);
            gpio.digital_write(pin, level);
            prop_assert_eq!(gpio.digital_read(pin), level);
        }
    }

    #[test]
    fn test_callbacks_reach_only_their_source(attached in prop::collection::vec(any::<bool>(), InterruptSource::COUNT)) {
        let registry = CallbackRegistry::new();
        let before: Vec<u32> = COUNTERS.iter().map(|c| c.0.load(Ordering::Relaxed)).collect();

        for (source, &attach) in InterruptSource::ALL.iter().zip(&attached) {
            if attach {
                registry.attach(*source, &COUNTERS[source.index()]);
            }
        }
        for source in InterruptSource::ALL {
            registry.invoke(source);
        }

        for (i, &attach) in attached.iter().enumerate() {
            let fired = COUNTERS[i].0.load(Ordering::Relaxed) - before[i];
            prop_assert_eq!(fired, u32::from(attach));
        }
    }

    #[test]
    fn test_number_line_layout(label in "[a-z =]{0,6}", value in any::<i32>()) {
        let line = format_number(&label, value);
        prop_assert_eq!(line.len(), 20);
        prop_assert_eq!(&line[6..7] == "-", value < 0);

        let digits: String = line[7..20].chars().filter(|c| *c != ',').collect();
        prop_assert_eq!(digits.parse::<u64>().unwrap(), u64::from(value.unsigned_abs()));
        prop_assert_eq!(&line[8..9], ",");
        prop_assert_eq!(&line[12..13], ",");
        prop_assert_eq!(&line[16..17], ",");
    }
}
