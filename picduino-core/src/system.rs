//! Start-up and the Arduino-style facade
//!
//! [`Hal::start`] brings the chip from reset to a known state: FRC
//! postscaler set, every peripheral powered down, every analog pin
//! digital, and the tick timer running. The returned [`Hal`] bundles the
//! register file, the dispatcher and the decoded clock so sketches can
//! call `digital_write`, `millis`, `delay` and friends directly.

use picduino_hal::gpio::{Level, PinMode};
use picduino_hal::interrupt::Callable;
use picduino_hal::regs::{Bit, Field, Registers};

use crate::clock::{Clock, ClockSettings, Oscillator};
use crate::config::HalConfig;
use crate::error::{ConfigurationError, HalResult};
use crate::gpio::Gpio;
use crate::interrupt::{InterruptDispatcher, InterruptSource, SourceConfig, TimerCounter};
use crate::map::{OscRegs, RegisterMap, UartId};
use crate::peripherals::{Adc, Crc, Serial};
use crate::pins::Pin;
use crate::time::Delay;

/// Value for every PMD register at start-up: all modules off
const ALL_MODULES_OFF: u16 = 0xFFFF;
/// AD1PCFG value making every shared pin digital
const ALL_DIGITAL: u16 = 0xFFFF;
/// FRC postscaler at start-up (divide by 2)
const START_RCDIV: u16 = 1;

const fn cosc(osc: &OscRegs) -> Field {
    Field::new(osc.osccon, 12, 3)
}

const fn rcdiv(osc: &OscRegs) -> Field {
    Field::new(osc.clkdiv, 8, 3)
}

const fn doze(osc: &OscRegs) -> Field {
    Field::new(osc.clkdiv, 12, 3)
}

const fn dozen(osc: &OscRegs) -> Bit {
    Bit::new(osc.clkdiv, 11)
}

/// Read the oscillator selection left by the configuration fuses
///
/// A reserved COSC value is reported as FRC.
pub fn read_clock_settings<R: Registers, M: RegisterMap>(regs: &R) -> ClockSettings {
    let osc = M::osc();
    let oscillator = Oscillator::from_cosc(regs.read_field(cosc(&osc))).unwrap_or(Oscillator::Frc);
    let doze = if regs.is_set(dozen(&osc)) {
        Some(regs.read_field(doze(&osc)) as u8)
    } else {
        None
    };
    ClockSettings {
        oscillator,
        rcdiv: regs.read_field(rcdiv(&osc)) as u8,
        doze,
    }
}

/// Running HAL for chip `M`
pub struct Hal<'d, R, M: RegisterMap> {
    regs: R,
    dispatcher: &'d InterruptDispatcher<M>,
    clock: Clock,
}

impl<'d, R: Registers, M: RegisterMap> Hal<'d, R, M> {
    /// Bring the chip to its start-up state and start the time base
    ///
    /// Nothing is written if the dispatcher's configuration is invalid.
    pub fn start(regs: R, dispatcher: &'d InterruptDispatcher<M>) -> Result<Self, ConfigurationError> {
        let config = *dispatcher.config();
        config.validate()?;

        let osc = M::osc();
        regs.write_field(rcdiv(&osc), START_RCDIV);
        for &pmd in M::PMD {
            regs.write(pmd, ALL_MODULES_OFF);
        }
        regs.write(M::adc().pcfg, ALL_DIGITAL);

        regs.clear_bit(M::timer(dispatcher.tick_timer()).power);
        dispatcher.start_time_base(&regs);

        let settings = read_clock_settings::<R, M>(&regs);
        let clock = Clock::from_settings(&settings, config.f_xtal_hz, config.f_sosc_hz);
        clock.check()?;

        #[cfg(feature = "defmt")]
        defmt::info!("{} up, {} Hz core, {} Hz cpu", M::NAME, clock.core_hz(), clock.cpu_hz());

        Ok(Self {
            regs,
            dispatcher,
            clock,
        })
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn config(&self) -> &HalConfig {
        self.dispatcher.config()
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn dispatcher(&self) -> &'d InterruptDispatcher<M> {
        self.dispatcher
    }

    pub fn gpio(&self) -> Gpio<&R, M> {
        Gpio::new(&self.regs)
    }

    /// Delay provider, also usable through `embedded_hal::delay::DelayNs`
    pub fn delays(&self) -> Delay<'_, TimerCounter<'_, R>> {
        self.dispatcher.delay(&self.regs, self.clock)
    }

    pub fn uart(&self, id: UartId) -> Serial<&R, M> {
        Serial::new(&self.regs, id, self.config().poll_bound)
    }

    pub fn crc(&self) -> Crc<&R, M> {
        Crc::new(&self.regs, self.config().priorities.crc, self.config().poll_bound)
    }

    pub fn adc(&self) -> Adc<&R, M> {
        Adc::new(&self.regs, self.config().poll_bound)
    }

    pub fn pin_mode(&self, pin: Pin<M>, mode: PinMode) {
        self.gpio().pin_mode(pin, mode);
    }

    pub fn digital_write(&self, pin: Pin<M>, level: Level) {
        self.gpio().digital_write(pin, level);
    }

    pub fn digital_read(&self, pin: Pin<M>) -> Level {
        self.gpio().digital_read(pin)
    }

    pub fn pin_flip(&self, pin: Pin<M>) {
        self.gpio().pin_flip(pin);
    }

    /// Raw tick count (instruction cycles since start)
    pub fn ticks(&self) -> u32 {
        self.dispatcher.now(&self.regs)
    }

    pub fn millis(&self) -> u32 {
        self.delays().millis()
    }

    pub fn micros(&self) -> u32 {
        self.delays().micros()
    }

    pub fn delay(&self, ms: u32) {
        self.delays().delay(ms);
    }

    pub fn delay_microseconds(&self, us: u32) {
        self.delays().delay_microseconds(us);
    }

    /// Reset and configure an interrupt source; see [`InterruptDispatcher::init`]
    pub fn init_source(&self, source: InterruptSource, config: SourceConfig) -> HalResult<()> {
        self.dispatcher.init(&self.regs, source, config)
    }

    pub fn attach_isr(&self, source: InterruptSource, callback: &'static dyn Callable) {
        self.dispatcher.attach_isr(&self.regs, source, callback);
    }

    pub fn detach(&self, source: InterruptSource) {
        self.dispatcher.detach(&self.regs, source);
    }
}
