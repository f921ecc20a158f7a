//! Interrupt dispatcher
//!
//! Owns the callback registry, the tick counter and the per-channel output
//! compare periods. Vector glue calls [`InterruptDispatcher::on_interrupt`]
//! with the source that fired; the dispatcher clears the pending flag,
//! performs the source's own bookkeeping and then runs the user callback.
//!
//! All register access goes through a [`Registers`] implementation passed
//! to each call, so the same dispatcher drives real MMIO on target and
//! the simulated register file in host tests.

use core::cell::Cell;
use core::marker::PhantomData;

use critical_section::Mutex;
use picduino_hal::interrupt::Callable;
use picduino_hal::regs::{Bit, Field, Reg, Registers};

use super::registry::CallbackRegistry;
use super::source::{Channel, ExtInt, InterruptSource, TimerId};
use crate::clock::Clock;
use crate::config::HalConfig;
use crate::error::{ConfigurationError, HalResult};
use crate::map::{RegisterMap, TimerRegs};
use crate::poll::wait_until;
use crate::time::{CounterSource, Delay, TickCounter};

// TxCON bits
const TON: u8 = 15;
const TGATE: u8 = 6;
const TCKPS_POS: u8 = 4;
const T32: u8 = 3;
const TCS: u8 = 1;

/// OCM = 0b011: compare match toggles the output
const OCM_TOGGLE: u16 = 0b011;

/// Capture buffer not empty
const ICBNE: u8 = 3;

/// Output compare period used until `init` sets one
const DEFAULT_OC_PERIOD: u16 = 0xFFFF;

/// Timer input clock prescaler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    #[default]
    Div1,
    Div8,
    Div64,
    Div256,
}

impl Prescaler {
    /// TCKPS field value
    pub const fn bits(self) -> u16 {
        (self as u16) & 0b11
    }
}

/// External interrupt trigger edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    #[default]
    Rising,
    Falling,
}

/// Input capture trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureEdge {
    Every,
    Falling,
    #[default]
    Rising,
}

impl CaptureEdge {
    /// ICM field value
    pub const fn mode(self) -> u16 {
        match self {
            CaptureEdge::Every => 0b001,
            CaptureEdge::Falling => 0b010,
            CaptureEdge::Rising => 0b011,
        }
    }
}

/// Per-source options for [`InterruptDispatcher::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceConfig {
    Timer { prescaler: Prescaler, period: u16 },
    /// Interrupt every `period` counts of Timer2
    OutputCompare { period: u16 },
    InputCapture { edge: CaptureEdge },
    External { edge: Edge },
    /// Pin mask over CN0..CN31
    ChangeNotification { pins: u32 },
}

impl SourceConfig {
    /// Configuration used when a caller has no particular requirements
    pub const fn default_for(source: InterruptSource) -> Self {
        match source {
            InterruptSource::Timer(_) => SourceConfig::Timer {
                prescaler: Prescaler::Div1,
                period: 0xFFFF,
            },
            InterruptSource::OutputCompare(_) => SourceConfig::OutputCompare {
                period: DEFAULT_OC_PERIOD,
            },
            InterruptSource::InputCapture(_) => SourceConfig::InputCapture {
                edge: CaptureEdge::Rising,
            },
            InterruptSource::External(_) => SourceConfig::External { edge: Edge::Rising },
            InterruptSource::ChangeNotification => SourceConfig::ChangeNotification { pins: 0 },
        }
    }

    const fn matches(&self, source: InterruptSource) -> bool {
        matches!(
            (self, source),
            (SourceConfig::Timer { .. }, InterruptSource::Timer(_))
                | (SourceConfig::OutputCompare { .. }, InterruptSource::OutputCompare(_))
                | (SourceConfig::InputCapture { .. }, InterruptSource::InputCapture(_))
                | (SourceConfig::External { .. }, InterruptSource::External(_))
                | (SourceConfig::ChangeNotification { .. }, InterruptSource::ChangeNotification)
        )
    }
}

/// Two 16-bit timers chained into one 32-bit timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerPair {
    /// Timer2 low word, Timer3 high word
    T23,
    /// Timer4 low word, Timer5 high word
    T45,
}

impl TimerPair {
    pub const fn low(self) -> TimerId {
        match self {
            TimerPair::T23 => TimerId::T2,
            TimerPair::T45 => TimerId::T4,
        }
    }

    /// The odd timer, which also owns the pair's interrupt
    pub const fn high(self) -> TimerId {
        match self {
            TimerPair::T23 => TimerId::T3,
            TimerPair::T45 => TimerId::T5,
        }
    }
}

/// Hardware counter of the timer driving the tick
pub struct TimerCounter<'a, R> {
    regs: &'a R,
    timer: TimerRegs,
}

impl<R: Registers> CounterSource for TimerCounter<'_, R> {
    fn low(&self) -> u16 {
        self.regs.read(self.timer.tmr)
    }
}

/// Interrupt dispatcher for chip family `M`
///
/// Meant to live in a `static`; every method takes `&self`.
pub struct InterruptDispatcher<M> {
    registry: CallbackRegistry,
    tick: TickCounter,
    periods: [Mutex<Cell<u16>>; 5],
    config: HalConfig,
    _map: PhantomData<fn() -> M>,
}

impl<M: RegisterMap> InterruptDispatcher<M> {
    pub const fn new(config: HalConfig) -> Self {
        const PERIOD: Mutex<Cell<u16>> = Mutex::new(Cell::new(DEFAULT_OC_PERIOD));
        Self {
            registry: CallbackRegistry::new(),
            tick: TickCounter::new(),
            periods: [PERIOD; 5],
            config,
            _map: PhantomData,
        }
    }

    pub fn tick(&self) -> &TickCounter {
        &self.tick
    }

    /// Configuration the dispatcher was built with
    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    /// Timer reserved for the tick counter
    pub fn tick_timer(&self) -> TimerId {
        self.config.tick_timer.timer()
    }

    /// Current output compare period of `ch`
    pub fn period(&self, ch: Channel) -> u16 {
        critical_section::with(|cs| self.periods[ch.index()].borrow(cs).get())
    }

    /// Low half of the tick value, read from the tick timer
    pub fn counter<'a, R: Registers>(&self, regs: &'a R) -> TimerCounter<'a, R> {
        TimerCounter {
            regs,
            timer: M::timer(self.tick_timer()),
        }
    }

    /// Current 32-bit tick value
    pub fn now<R: Registers>(&self, regs: &R) -> u32 {
        self.tick.now(&self.counter(regs))
    }

    pub fn delay<'a, R: Registers>(&'a self, regs: &'a R, clock: Clock) -> Delay<'a, TimerCounter<'a, R>> {
        Delay::new(&self.tick, self.counter(regs), clock)
    }

    /// Start the tick timer free-running over its full range
    ///
    /// The peripheral must already be powered; see [`crate::system`].
    pub fn start_time_base<R: Registers>(&self, regs: &R) {
        let id = self.tick_timer();
        let timer = M::timer(id);
        let lines = M::irq(InterruptSource::Timer(id));

        configure_timer(regs, &timer, Prescaler::Div1, 0xFFFF);
        regs.write_field(lines.priority, u16::from(self.config.priorities.timer));
        regs.clear_bit(lines.flag);
        regs.set_bit(lines.enable);
        regs.set_bit(Bit::new(timer.con, TON));

        #[cfg(feature = "defmt")]
        defmt::info!("time base running on {}", id);
    }

    /// Reset `source` to a known state and configure its peripheral
    ///
    /// The callback goes back to the no-op default and the interrupt is
    /// left disabled until [`attach_isr`](Self::attach_isr).
    pub fn init<R: Registers>(&self, regs: &R, source: InterruptSource, config: SourceConfig) -> HalResult<()> {
        if !config.matches(source) {
            return Err(ConfigurationError::SourceMismatch.into());
        }
        if self.is_time_base(source) {
            return Err(ConfigurationError::TickTimerReserved.into());
        }

        let lines = M::irq(source);
        self.registry.reset(source);
        regs.clear_bit(lines.enable);
        regs.clear_bit(lines.flag);

        match (source, config) {
            (InterruptSource::Timer(id), SourceConfig::Timer { prescaler, period }) => {
                let timer = M::timer(id);
                regs.clear_bit(timer.power);
                configure_timer(regs, &timer, prescaler, period);
                regs.set_bit(Bit::new(timer.con, TON));
            }
            (InterruptSource::OutputCompare(ch), SourceConfig::OutputCompare { period }) => {
                critical_section::with(|cs| self.periods[ch.index()].borrow(cs).set(period));
                let oc = M::output_compare(ch);
                regs.clear_bit(oc.power);
                regs.write(oc.con, 0);
                if let Some(con2) = oc.con2 {
                    regs.write(con2, 0);
                }
                // OCTSEL = 0 selects Timer2 on every family
                regs.write(oc.con, OCM_TOGGLE);
                regs.write_field(lines.priority, u16::from(self.config.priorities.output_compare));
            }
            (InterruptSource::InputCapture(ch), SourceConfig::InputCapture { edge }) => {
                let ic = M::input_capture(ch);
                regs.clear_bit(ic.power);
                regs.write(ic.con, 0);
                if let Some(con2) = ic.con2 {
                    regs.write(con2, 0);
                }
                regs.write(ic.con, ic.timer2_select | edge.mode());

                let not_empty = Bit::new(ic.con, ICBNE);
                wait_until(self.config.poll_bound, || {
                    if regs.is_set(not_empty) {
                        regs.read(ic.buf);
                        false
                    } else {
                        true
                    }
                })?;
                // Stale captures raise the flag again while draining
                regs.clear_bit(lines.flag);
            }
            (InterruptSource::External(int), SourceConfig::External { edge }) => {
                regs.write_bit(intxep(M::intcon2(), int), edge == Edge::Falling);
            }
            (InterruptSource::ChangeNotification, SourceConfig::ChangeNotification { pins }) => {
                let cn = M::change_notification();
                let (low, high) = (pins as u16, (pins >> 16) as u16);
                regs.write(cn.cnen1, low);
                regs.write(cn.cnen2, high);
                regs.write(cn.cnpu1, low);
                regs.write(cn.cnpu2, high);
            }
            _ => return Err(ConfigurationError::SourceMismatch.into()),
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("init {}: {}", source, config);

        Ok(())
    }

    /// Install `callback` for `source` and enable its interrupt
    ///
    /// On the tick timer only the callback is installed: the time base
    /// is already running and a pending overflow must not be cleared.
    pub fn attach_isr<R: Registers>(&self, regs: &R, source: InterruptSource, callback: &'static dyn Callable) {
        self.registry.attach(source, callback);
        if self.is_time_base(source) {
            return;
        }

        let lines = M::irq(source);
        match source {
            InterruptSource::OutputCompare(ch) => {
                let tmr2 = regs.read(M::timer(TimerId::T2).tmr);
                regs.write(M::output_compare(ch).r, tmr2.wrapping_add(self.period(ch)));
            }
            InterruptSource::Timer(_) => {
                regs.write_field(lines.priority, u16::from(self.config.priorities.timer));
            }
            _ => {}
        }
        regs.clear_bit(lines.flag);
        regs.set_bit(lines.enable);

        #[cfg(feature = "defmt")]
        defmt::debug!("attached {}", source);
    }

    /// Disable `source` and drop its callback
    ///
    /// The tick timer keeps its interrupt enabled; only the callback goes.
    pub fn detach<R: Registers>(&self, regs: &R, source: InterruptSource) {
        if !self.is_time_base(source) {
            regs.clear_bit(M::irq(source).enable);
        }
        self.registry.reset(source);
    }

    fn is_time_base(&self, source: InterruptSource) -> bool {
        source == InterruptSource::Timer(self.tick_timer())
    }

    /// Interrupt handler body for `source`
    ///
    /// The pending flag is cleared before anything else, so an event that
    /// arrives while the callback runs is latched and serviced again.
    pub fn on_interrupt<R: Registers>(&self, regs: &R, source: InterruptSource) {
        regs.clear_bit(M::irq(source).flag);

        match source {
            _ if self.is_time_base(source) => self.tick.advance(),
            InterruptSource::OutputCompare(ch) => {
                let r = M::output_compare(ch).r;
                let next = regs.read(r).wrapping_add(self.period(ch));
                regs.write(r, next);
            }
            _ => {}
        }

        self.registry.invoke(source);
    }

    /// Configure `pair` as one 32-bit timer and start it
    ///
    /// Neither half may be the tick timer. The pair interrupts through the
    /// high timer's source; its callback is reset here.
    pub fn init_pair<R: Registers>(&self, regs: &R, pair: TimerPair, prescaler: Prescaler, period: u32) -> HalResult<()> {
        let tick = self.tick_timer();
        if pair.low() == tick || pair.high() == tick {
            return Err(ConfigurationError::TickTimerReserved.into());
        }

        let low = M::timer(pair.low());
        let high = M::timer(pair.high());
        for id in [pair.low(), pair.high()] {
            let lines = M::irq(InterruptSource::Timer(id));
            self.registry.reset(InterruptSource::Timer(id));
            regs.clear_bit(lines.enable);
            regs.clear_bit(lines.flag);
            regs.clear_bit(M::timer(id).power);
        }

        regs.write(low.con, 0);
        regs.write(high.con, 0);
        regs.write(low.con, (prescaler.bits() << TCKPS_POS) | (1 << T32));
        regs.write(low.tmr, 0);
        regs.write(high.tmr, 0);
        regs.write(low.pr, period as u16);
        regs.write(high.pr, (period >> 16) as u16);
        regs.set_bit(Bit::new(low.con, TON));
        Ok(())
    }

    /// Read a 32-bit pair without tearing across a carry
    pub fn read_pair<R: Registers>(&self, regs: &R, pair: TimerPair) -> u32 {
        let low = M::timer(pair.low()).tmr;
        let high = M::timer(pair.high()).tmr;
        loop {
            let hi = regs.read(high);
            let lo = regs.read(low);
            if hi == regs.read(high) {
                return (u32::from(hi) << 16) | u32::from(lo);
            }
        }
    }
}

/// TON=0, internal clock, no gating, 16-bit mode, counter and period set
fn configure_timer<R: Registers>(regs: &R, timer: &TimerRegs, prescaler: Prescaler, period: u16) {
    regs.clear_bit(Bit::new(timer.con, TON));
    regs.clear_bit(Bit::new(timer.con, TCS));
    regs.clear_bit(Bit::new(timer.con, T32));
    regs.write_field(Field::new(timer.con, TCKPS_POS, 2), prescaler.bits());
    regs.clear_bit(Bit::new(timer.con, TGATE));
    regs.write(timer.tmr, 0);
    regs.write(timer.pr, period);
}

/// INTxEP: set for falling-edge trigger
fn intxep(intcon2: Reg, int: ExtInt) -> Bit {
    Bit::new(intcon2, int.index() as u8)
}
