//! GPIO pin abstractions
//!
//! Arduino-style levels and modes, plus pin traits that the core's pin
//! handles implement.

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Direction bit set, output driver off
    Input,
    /// Direction bit cleared, pin driven from the latch
    Output,
}

/// Bit order for shifted transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    LsbFirst,
    MsbFirst,
}

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Invert the output latch
    fn toggle(&mut self);

    /// Drive the pin to `level`
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Check if the output latch is set
    fn is_set_high(&self) -> bool;

    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Sampled level
    fn level(&self) -> Level {
        Level::from(self.is_high())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LatchPin {
        latch: bool,
    }

    impl OutputPin for LatchPin {
        fn set_high(&mut self) {
            self.latch = true;
        }

        fn set_low(&mut self) {
            self.latch = false;
        }

        fn toggle(&mut self) {
            self.latch = !self.latch;
        }

        fn is_set_high(&self) -> bool {
            self.latch
        }
    }

    impl InputPin for LatchPin {
        fn is_high(&self) -> bool {
            self.latch
        }
    }

    #[test]
    fn test_level_conversions() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(!Level::High, Level::Low);
        assert!(!Level::Low.is_high());
    }

    #[test]
    fn test_set_level_default() {
        let mut pin = LatchPin { latch: false };
        pin.set_level(Level::High);
        assert!(pin.is_set_high());
        assert_eq!(pin.level(), Level::High);
        pin.toggle();
        assert!(pin.is_set_low());
        assert!(pin.is_low());
    }
}
