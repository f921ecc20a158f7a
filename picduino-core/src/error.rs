//! Error types

use core::fmt;

/// Invalid combination of build-time or start-up options
///
/// Detected before any hardware is touched. Treat as fatal: see
/// [`crate::config::HalConfig::assert_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// The timer driving the tick counter was requested for user timing
    TickTimerReserved,
    /// Interrupt priority outside 1..=7
    InvalidPriority,
    /// A clock frequency of zero
    ZeroFrequency,
    /// Source configuration does not belong to the interrupt source
    SourceMismatch,
    /// Baud rate not reachable with a 16-bit BRG at this clock
    InvalidBaudRate,
    /// CRC polynomial length outside the engine's range
    InvalidCrcLength,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TickTimerReserved => write!(f, "timer is reserved for the tick counter"),
            Self::InvalidPriority => write!(f, "interrupt priority out of range"),
            Self::ZeroFrequency => write!(f, "clock frequency is zero"),
            Self::SourceMismatch => write!(f, "configuration does not match interrupt source"),
            Self::InvalidBaudRate => write!(f, "baud rate out of range for clock"),
            Self::InvalidCrcLength => write!(f, "crc length out of range"),
        }
    }
}

/// A bounded polling wait ran out of iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardwareTimeout;

impl fmt::Display for HardwareTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hardware flag did not change within the polling bound")
    }
}

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    Configuration(ConfigurationError),
    Timeout(HardwareTimeout),
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "configuration error: {}", e),
            Self::Timeout(e) => write!(f, "timeout: {}", e),
        }
    }
}

impl From<ConfigurationError> for HalError {
    fn from(e: ConfigurationError) -> Self {
        HalError::Configuration(e)
    }
}

impl From<HardwareTimeout> for HalError {
    fn from(e: HardwareTimeout) -> Self {
        HalError::Timeout(e)
    }
}

impl embedded_io::Error for HalError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::Configuration(_) => embedded_io::ErrorKind::InvalidInput,
            Self::Timeout(_) => embedded_io::ErrorKind::TimedOut,
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::Error as _;

    #[test]
    fn test_conversions() {
        let e: HalError = HardwareTimeout.into();
        assert_eq!(e, HalError::Timeout(HardwareTimeout));
        assert_eq!(e.kind(), embedded_io::ErrorKind::TimedOut);

        let e: HalError = ConfigurationError::TickTimerReserved.into();
        assert_eq!(e.kind(), embedded_io::ErrorKind::InvalidInput);
    }
}
