//! Oscillator decode and tick rates
//!
//! The tick timer is clocked from the instruction clock, so delay math
//! needs the CPU frequency. That is derived from the active oscillator
//! (OSCCON.COSC), the FRC postscaler and the doze divider in CLKDIV.

use crate::error::ConfigurationError;

/// Fast RC oscillator (Hz)
pub const F_FRC: u32 = 8_000_000;

/// Low-power RC oscillator (Hz)
pub const F_LPRC: u32 = 31_000;

/// PLL multiplier
const PLL_MULTIPLIER: u32 = 4;

/// Active oscillator, as reported by OSCCON.COSC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// 0b000
    Frc,
    /// 0b001
    FrcPll,
    /// 0b010
    Primary,
    /// 0b011
    PrimaryPll,
    /// 0b100
    Secondary,
    /// 0b101
    LowPowerRc,
    /// 0b111
    FrcDiv,
}

impl Oscillator {
    /// Decode a COSC value; 0b110 is reserved
    pub fn from_cosc(cosc: u16) -> Option<Self> {
        match cosc & 0b111 {
            0b000 => Some(Oscillator::Frc),
            0b001 => Some(Oscillator::FrcPll),
            0b010 => Some(Oscillator::Primary),
            0b011 => Some(Oscillator::PrimaryPll),
            0b100 => Some(Oscillator::Secondary),
            0b101 => Some(Oscillator::LowPowerRc),
            0b111 => Some(Oscillator::FrcDiv),
            _ => None,
        }
    }
}

/// Oscillator control state read at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSettings {
    pub oscillator: Oscillator,
    /// FRC postscaler exponent (CLKDIV.RCDIV), 0..=7
    pub rcdiv: u8,
    /// Doze divider exponent (CLKDIV.DOZE) when doze is enabled
    pub doze: Option<u8>,
}

/// Core clock frequency for `settings`
pub fn core_clock_hz(settings: &ClockSettings, f_xtal_hz: u32, f_sosc_hz: u32) -> u32 {
    let frc_div = F_FRC >> (settings.rcdiv & 0x07);
    match settings.oscillator {
        Oscillator::FrcDiv => frc_div,
        Oscillator::LowPowerRc => F_LPRC,
        Oscillator::Secondary => f_sosc_hz,
        Oscillator::PrimaryPll => f_xtal_hz.saturating_mul(PLL_MULTIPLIER),
        Oscillator::Primary => f_xtal_hz,
        Oscillator::FrcPll => frc_div * PLL_MULTIPLIER,
        Oscillator::Frc => F_FRC,
    }
}

/// Running clock rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clock {
    core_hz: u32,
    cpu_hz: u32,
}

impl Clock {
    /// Rates for a core clock, with an optional doze divider exponent
    pub const fn new(core_hz: u32, doze: Option<u8>) -> Self {
        let peripheral = core_hz / 2;
        let cpu_hz = match doze {
            Some(shift) => peripheral >> (shift & 0x07),
            None => peripheral,
        };
        Self { core_hz, cpu_hz }
    }

    /// Rates for an instruction clock given directly
    pub const fn from_cpu_hz(cpu_hz: u32) -> Self {
        Self {
            core_hz: cpu_hz * 2,
            cpu_hz,
        }
    }

    pub fn from_settings(settings: &ClockSettings, f_xtal_hz: u32, f_sosc_hz: u32) -> Self {
        Self::new(core_clock_hz(settings, f_xtal_hz, f_sosc_hz), settings.doze)
    }

    /// Oscillator output after the postscaler
    pub const fn core_hz(&self) -> u32 {
        self.core_hz
    }

    /// Peripheral bus clock (core / 2), which drives UART baud generation
    pub const fn peripheral_hz(&self) -> u32 {
        self.core_hz / 2
    }

    /// Instruction clock, and so the tick rate
    pub const fn cpu_hz(&self) -> u32 {
        self.cpu_hz
    }

    pub const fn ticks_per_ms(&self) -> u32 {
        self.cpu_hz / 1000
    }

    /// Ticks per microsecond; zero for clocks below 1 MHz
    pub const fn ticks_per_us(&self) -> u32 {
        self.cpu_hz / 1_000_000
    }

    pub fn check(&self) -> Result<(), ConfigurationError> {
        if self.cpu_hz == 0 {
            return Err(ConfigurationError::ZeroFrequency);
        }
        Ok(())
    }
}

impl Default for Clock {
    /// FRC with the reset-default 2:1 postscaler
    fn default() -> Self {
        Self::new(F_FRC >> 1, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(oscillator: Oscillator, rcdiv: u8) -> ClockSettings {
        ClockSettings {
            oscillator,
            rcdiv,
            doze: None,
        }
    }

    #[test]
    fn test_decode_cosc() {
        assert_eq!(Oscillator::from_cosc(0b011), Some(Oscillator::PrimaryPll));
        assert_eq!(Oscillator::from_cosc(0b110), None);
        assert_eq!(Oscillator::from_cosc(0b1111), Some(Oscillator::FrcDiv));
    }

    #[test]
    fn test_core_clock_sources() {
        let xtal = 8_000_000;
        let sosc = 32_768;
        assert_eq!(core_clock_hz(&settings(Oscillator::FrcDiv, 1), xtal, sosc), 4_000_000);
        assert_eq!(core_clock_hz(&settings(Oscillator::FrcPll, 0), xtal, sosc), 32_000_000);
        assert_eq!(core_clock_hz(&settings(Oscillator::PrimaryPll, 0), xtal, sosc), 32_000_000);
        assert_eq!(core_clock_hz(&settings(Oscillator::Secondary, 0), xtal, sosc), 32_768);
        assert_eq!(core_clock_hz(&settings(Oscillator::LowPowerRc, 0), xtal, sosc), F_LPRC);
        assert_eq!(core_clock_hz(&settings(Oscillator::Frc, 3), xtal, sosc), F_FRC);
    }

    #[test]
    fn test_tick_rates() {
        let clock = Clock::new(32_000_000, None);
        assert_eq!(clock.peripheral_hz(), 16_000_000);
        assert_eq!(clock.ticks_per_ms(), 16_000);
        assert_eq!(clock.ticks_per_us(), 16);

        let dozing = Clock::new(32_000_000, Some(2));
        assert_eq!(dozing.cpu_hz(), 4_000_000);
        assert_eq!(dozing.peripheral_hz(), 16_000_000);
    }

    #[test]
    fn test_slow_clock_has_no_microsecond_resolution() {
        let clock = Clock::new(F_LPRC, None);
        assert_eq!(clock.ticks_per_us(), 0);
        assert_eq!(clock.ticks_per_ms(), 15);
    }
}
