//! UART serial communication abstractions
//!
//! Blocking byte-at-a-time traits. A PIC24 UART has a four-deep transmit
//! FIFO and no DMA, so every transfer is a polling wait on a status bit.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Queue one byte, waiting for room in the transmit buffer
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write all of `data`
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Wait until the shift register is empty
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take the received byte, if one is waiting
    fn try_read_byte(&mut self) -> Option<u8>;

    /// Read a single byte, waiting until one arrives
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Fill `buf`, returning the number of bytes read
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(buf.len())
    }
}

/// Standard baud rates
///
/// Frames are always 8 data bits, no parity, one stop bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudRate {
    B300,
    B600,
    B1200,
    B2400,
    B4800,
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    /// All supported rates, slowest first
    pub const ALL: [BaudRate; 10] = [
        BaudRate::B300,
        BaudRate::B600,
        BaudRate::B1200,
        BaudRate::B2400,
        BaudRate::B4800,
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    /// Rate in bits per second
    pub const fn bps(self) -> u32 {
        match self {
            BaudRate::B300 => 300,
            BaudRate::B600 => 600,
            BaudRate::B1200 => 1200,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }

    /// Look up a rate by its bits-per-second value
    pub fn from_bps(bps: u32) -> Option<BaudRate> {
        Self::ALL.iter().copied().find(|rate| rate.bps() == bps)
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate::B9600
    }
}
