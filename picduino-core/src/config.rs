//! Start-up configuration
//!
//! The values here mirror the options a PIC24 project fixes at build
//! time: crystal frequency, which timer carries the tick counter and the
//! default interrupt priorities. Everything is `const` so a board can
//! declare its configuration as a `const` item and have
//! [`HalConfig::assert_valid`] reject mistakes during compilation.

use crate::error::ConfigurationError;
use crate::interrupt::TimerId;
use crate::poll::PollBound;

/// Default crystal frequency (Hz)
pub const DEFAULT_F_XTAL: u32 = 8_000_000;

/// Default secondary oscillator frequency (Hz)
pub const DEFAULT_F_SOSC: u32 = 32_768;

/// Default priority for timer and output-compare interrupts
pub const DEFAULT_PRIORITY: u8 = 5;

/// Hardware timer that drives the tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickTimer {
    Timer1,
    #[default]
    Timer2,
}

impl TickTimer {
    pub const fn timer(self) -> TimerId {
        match self {
            TickTimer::Timer1 => TimerId::T1,
            TickTimer::Timer2 => TimerId::T2,
        }
    }
}

/// Interrupt priority levels (1 = lowest, 7 = highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priorities {
    /// Timer overflow interrupts, including the tick timer
    pub timer: u8,
    /// Output compare match interrupts
    pub output_compare: u8,
    /// CRC engine interrupt
    pub crc: u8,
}

impl Priorities {
    pub const fn new() -> Self {
        Self {
            timer: DEFAULT_PRIORITY,
            output_compare: DEFAULT_PRIORITY,
            crc: DEFAULT_PRIORITY,
        }
    }
}

impl Default for Priorities {
    fn default() -> Self {
        Self::new()
    }
}

/// HAL configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HalConfig {
    /// Primary oscillator (crystal) frequency in Hz
    pub f_xtal_hz: u32,
    /// Secondary oscillator frequency in Hz
    pub f_sosc_hz: u32,
    /// Timer used for the tick counter
    pub tick_timer: TickTimer,
    /// Default interrupt priorities
    pub priorities: Priorities,
    /// Limit applied to peripheral polling waits
    pub poll_bound: PollBound,
}

impl HalConfig {
    /// Default configuration: 8 MHz crystal, tick on Timer2, priority 5
    pub const fn new() -> Self {
        Self {
            f_xtal_hz: DEFAULT_F_XTAL,
            f_sosc_hz: DEFAULT_F_SOSC,
            tick_timer: TickTimer::Timer2,
            priorities: Priorities::new(),
            poll_bound: PollBound::Unbounded,
        }
    }

    pub const fn with_tick_timer(mut self, tick_timer: TickTimer) -> Self {
        self.tick_timer = tick_timer;
        self
    }

    pub const fn with_xtal(mut self, f_xtal_hz: u32) -> Self {
        self.f_xtal_hz = f_xtal_hz;
        self
    }

    pub const fn with_priorities(mut self, priorities: Priorities) -> Self {
        self.priorities = priorities;
        self
    }

    pub const fn with_poll_bound(mut self, poll_bound: PollBound) -> Self {
        self.poll_bound = poll_bound;
        self
    }

    /// Check the configuration for inconsistent options
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        if self.f_xtal_hz == 0 || self.f_sosc_hz == 0 {
            return Err(ConfigurationError::ZeroFrequency);
        }
        if !valid_priority(self.priorities.timer)
            || !valid_priority(self.priorities.output_compare)
            || !valid_priority(self.priorities.crc)
        {
            return Err(ConfigurationError::InvalidPriority);
        }
        Ok(())
    }

    /// Return the configuration, panicking if it is invalid
    ///
    /// Used in a `const` item this turns a bad configuration into a
    /// compile error.
    pub const fn assert_valid(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(ConfigurationError::ZeroFrequency) => panic!("clock frequency is zero"),
            Err(ConfigurationError::InvalidPriority) => panic!("interrupt priority out of range"),
            Err(_) => panic!("invalid HAL configuration"),
        }
    }
}

impl Default for HalConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Priority 0 disables the interrupt, so it is not accepted as a default
const fn valid_priority(level: u8) -> bool {
    level >= 1 && level <= 7
}
