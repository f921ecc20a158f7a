//! UART driver
//!
//! 8N1 framing, high-speed baud generator (BRGH = 1), no flow control
//! and no interrupts. Transmission waits for room in the four-deep
//! transmit FIFO; nothing is buffered in RAM.

use core::fmt;
use core::marker::PhantomData;

use picduino_hal::regs::{Bit, Registers};
use picduino_hal::uart::{BaudRate, UartRx, UartTx};

use crate::clock::Clock;
use crate::error::{ConfigurationError, HalError, HardwareTimeout};
use crate::map::{RegisterMap, UartId, UartRegs};
use crate::peripherals::format::format_number;
use crate::poll::{wait_until, PollBound};

// UxMODE
const UARTEN: u8 = 15;
const BRGH: u8 = 3;
// UxSTA
const UTXEN: u8 = 10;
const UTXBF: u8 = 9;
const TRMT: u8 = 8;
const URXDA: u8 = 0;

/// BRG value for `bps` with BRGH = 1
pub fn brg_for(clock: &Clock, bps: u32) -> Result<u16, ConfigurationError> {
    if bps == 0 {
        return Err(ConfigurationError::InvalidBaudRate);
    }
    let divisor = clock.peripheral_hz() / 4 / bps;
    if divisor == 0 {
        return Err(ConfigurationError::InvalidBaudRate);
    }
    u16::try_from(divisor - 1).map_err(|_| ConfigurationError::InvalidBaudRate)
}

/// Polled UART on chip `M`
pub struct Serial<R, M> {
    regs: R,
    uart: UartRegs,
    bound: PollBound,
    _map: PhantomData<fn() -> M>,
}

impl<R: Registers, M: RegisterMap> Serial<R, M> {
    pub fn new(regs: R, id: UartId, bound: PollBound) -> Self {
        Self {
            regs,
            uart: M::uart(id),
            bound,
            _map: PhantomData,
        }
    }

    /// Power up and enable the UART at a standard rate
    pub fn init(&mut self, clock: &Clock, baud: BaudRate) -> Result<(), ConfigurationError> {
        self.init_bps(clock, baud.bps())
    }

    /// Power up and enable the UART at an arbitrary rate
    pub fn init_bps(&mut self, clock: &Clock, bps: u32) -> Result<(), ConfigurationError> {
        let brg = brg_for(clock, bps)?;
        let u = self.uart;

        self.regs.clear_bit(u.power);
        self.regs.write(u.mode, (1 << UARTEN) | (1 << BRGH));
        self.regs.write(u.brg, brg);
        for lines in [u.tx_irq, u.rx_irq] {
            self.regs.clear_bit(lines.flag);
            self.regs.clear_bit(lines.enable);
        }
        self.regs.write(u.sta, 1 << UTXEN);

        #[cfg(feature = "defmt")]
        defmt::debug!("uart at {} bps, brg {}", bps, brg);

        Ok(())
    }

    /// Send one byte once the transmit FIFO has room
    pub fn putch(&mut self, byte: u8) -> Result<(), HardwareTimeout> {
        let full = Bit::new(self.uart.sta, UTXBF);
        wait_until(self.bound, || !self.regs.is_set(full))?;
        self.regs.write(self.uart.txreg, u16::from(byte));
        Ok(())
    }

    pub fn puts(&mut self, s: &str) -> Result<(), HardwareTimeout> {
        s.bytes().try_for_each(|b| self.putch(b))
    }

    /// Send `line` followed by CR LF
    pub fn putline(&mut self, line: &str) -> Result<(), HardwareTimeout> {
        self.puts(line)?;
        self.puts("\r\n")
    }

    /// Take the byte at the head of the receive FIFO
    ///
    /// Returns whatever the register holds; check [`available`](Self::available) first.
    pub fn getch(&mut self) -> u8 {
        self.regs.read(self.uart.rxreg) as u8
    }

    /// Received data is waiting
    pub fn available(&self) -> bool {
        self.regs.is_set(Bit::new(self.uart.sta, URXDA))
    }

    /// Transmit FIFO is full
    pub fn busy(&self) -> bool {
        self.regs.is_set(Bit::new(self.uart.sta, UTXBF))
    }

    /// Send a labelled number in the fixed-column layout
    pub fn print_number(&mut self, label: &str, value: i32) -> Result<(), HardwareTimeout> {
        self.puts(&format_number(label, value))
    }

    fn wait_idle(&self) -> Result<(), HardwareTimeout> {
        let empty = Bit::new(self.uart.sta, TRMT);
        wait_until(self.bound, || self.regs.is_set(empty))
    }
}

impl<R: Registers, M: RegisterMap> UartTx for Serial<R, M> {
    type Error = HalError;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        Ok(self.putch(byte)?)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(self.wait_idle()?)
    }
}

impl<R: Registers, M: RegisterMap> UartRx for Serial<R, M> {
    type Error = HalError;

    fn try_read_byte(&mut self) -> Option<u8> {
        if self.available() {
            Some(self.getch())
        } else {
            None
        }
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let ready = Bit::new(self.uart.sta, URXDA);
        wait_until(self.bound, || self.regs.is_set(ready))?;
        Ok(self.getch())
    }
}

impl<R, M> embedded_io::ErrorType for Serial<R, M> {
    type Error = HalError;
}

impl<R: Registers, M: RegisterMap> embedded_io::Write for Serial<R, M> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.putch(byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(self.wait_idle()?)
    }
}

impl<R: Registers, M: RegisterMap> fmt::Write for Serial<R, M> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.puts(s).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimChip, SimRegisters};

    fn serial(sim: &SimRegisters, bound: PollBound) -> Serial<&SimRegisters, SimChip> {
        Serial::new(sim, UartId::Uart1, bound)
    }

    #[test]
    fn test_brg_calculation() {
        let clock = Clock::new(32_000_000, None);
        assert_eq!(brg_for(&clock, 9600), Ok(415));
        assert_eq!(brg_for(&clock, 115_200), Ok(33));
        assert_eq!(brg_for(&clock, 0), Err(ConfigurationError::InvalidBaudRate));
        assert_eq!(brg_for(&clock, 5_000_000), Err(ConfigurationError::InvalidBaudRate));

        let slow = Clock::new(32_000_000 * 8, None);
        assert_eq!(brg_for(&slow, 1), Err(ConfigurationError::InvalidBaudRate));
    }

    #[test]
    fn test_init_programs_registers() {
        let sim = SimRegisters::new();
        let regs = SimChip::uart(UartId::Uart1);
        sim.set_bit(regs.power);
        sim.set_bit(regs.rx_irq.enable);

        let mut uart = serial(&sim, PollBound::Unbounded);
        uart.init(&Clock::new(32_000_000, None), BaudRate::B9600).unwrap();

        assert!(!sim.bit(regs.power));
        assert_eq!(sim.get(regs.mode), 0x8008);
        assert_eq!(sim.get(regs.brg), 415);
        assert_eq!(sim.get(regs.sta), 1 << UTXEN);
        assert!(!sim.bit(regs.rx_irq.enable));
    }

    #[test]
    fn test_bad_rate_leaves_hardware_alone() {
        let sim = SimRegisters::new();
        let regs = SimChip::uart(UartId::Uart2);
        let mut uart = Serial::<_, SimChip>::new(&sim, UartId::Uart2, PollBound::Unbounded);
        assert_eq!(
            uart.init_bps(&Clock::new(32_000_000, None), 0),
            Err(ConfigurationError::InvalidBaudRate)
        );
        assert_eq!(sim.get(regs.mode), 0);
    }

    #[test]
    fn test_putch_writes_txreg() {
        let sim = SimRegisters::new();
        let mut uart = serial(&sim, PollBound::Iterations(4));
        uart.putline("ok").unwrap();
        assert_eq!(sim.get(SimChip::uart(UartId::Uart1).txreg), u16::from(b'\n'));
    }

    #[test]
    fn test_full_fifo_times_out() {
        let sim = SimRegisters::new();
        sim.stick(Bit::new(SimChip::uart(UartId::Uart1).sta, UTXBF), true);
        let mut uart = serial(&sim, PollBound::Iterations(16));
        assert!(uart.busy());
        assert_eq!(uart.putch(b'x'), Err(HardwareTimeout));
        assert_eq!(uart.write_byte(b'x'), Err(HalError::Timeout(HardwareTimeout)));
        assert!(core::fmt::Write::write_str(&mut uart, "x").is_err());
    }

    #[test]
    fn test_receive() {
        let sim = SimRegisters::new();
        let regs = SimChip::uart(UartId::Uart1);
        let mut uart = serial(&sim, PollBound::Iterations(4));
        assert_eq!(uart.try_read_byte(), None);
        assert_eq!(uart.read_byte(), Err(HalError::Timeout(HardwareTimeout)));

        sim.set(regs.rxreg, u16::from(b'A'));
        sim.set_bit(Bit::new(regs.sta, URXDA));
        assert!(uart.available());
        assert_eq!(uart.try_read_byte(), Some(b'A'));
    }

    #[test]
    fn test_flush_waits_for_shift_register() {
        let sim = SimRegisters::new();
        let regs = SimChip::uart(UartId::Uart1);
        let mut uart = serial(&sim, PollBound::Iterations(4));
        assert!(UartTx::flush(&mut uart).is_err());
        sim.set_bit(Bit::new(regs.sta, TRMT));
        assert!(embedded_io::Write::flush(&mut uart).is_ok());
    }

    #[test]
    fn test_print_number_ends_with_last_digit() {
        let sim = SimRegisters::new();
        let mut uart = serial(&sim, PollBound::Unbounded);
        uart.print_number("n", 7).unwrap();
        assert_eq!(sim.get(SimChip::uart(UartId::Uart1).txreg), u16::from(b'7'));
    }
}
