//! Programmable CRC engine
//!
//! Data is fed 16 bits at a time, big-endian within each word, through a
//! small input FIFO. After the last word a zero word is pushed to shift
//! the remainder out, and the result is read back from the working
//! register once the FIFO reports empty.

use core::marker::PhantomData;

use picduino_hal::regs::{Bit, Field, Reg, Registers};

use crate::error::{ConfigurationError, HardwareTimeout};
use crate::map::{CrcControl, CrcRegs, RegisterMap};
use crate::poll::{wait_until, PollBound};

// CRCCON / CRCCON1
const CRCEN: u8 = 15;
const CRCFUL: u8 = 7;
const CRCMPT: u8 = 6;
const CRCGO: u8 = 4;

/// Polled CRC engine on chip `M`
pub struct Crc<R, M> {
    regs: R,
    crc: CrcRegs,
    priority: u8,
    bound: PollBound,
    _map: PhantomData<fn() -> M>,
}

impl<R: Registers, M: RegisterMap> Crc<R, M> {
    pub fn new(regs: R, priority: u8, bound: PollBound) -> Self {
        Self {
            regs,
            crc: M::crc(),
            priority,
            bound,
            _map: PhantomData,
        }
    }

    /// Longest polynomial the engine supports
    pub fn max_len(&self) -> u8 {
        match self.crc.control {
            CrcControl::Single { .. } => 16,
            CrcControl::Split { .. } => 32,
        }
    }

    /// Power up the engine for a `len`-bit polynomial `poly`
    ///
    /// `poly` omits the implicit top term: CRC-16/CCITT is `(16, 0x1021)`.
    /// The interrupt is left disabled.
    pub fn init(&mut self, len: u8, poly: u32) -> Result<(), ConfigurationError> {
        if len == 0 || len > self.max_len() {
            return Err(ConfigurationError::InvalidCrcLength);
        }
        let c = self.crc;
        let plen = u16::from(len - 1);

        self.regs.clear_bit(c.power);
        match c.control {
            CrcControl::Single { con } => {
                self.regs.write(con, 0);
                self.regs.write_field(Field::new(con, 0, 4), plen);
            }
            CrcControl::Split { con1, con2 } => {
                self.regs.write(con1, 0);
                self.regs.write(con2, 0);
                self.regs.write_field(Field::new(con2, 0, 5), plen);
                self.regs.write_field(Field::new(con2, 8, 5), plen);
            }
        }

        self.regs.write(c.xor, poly as u16);
        if let Some(high) = c.xor_high {
            self.regs.write(high, (poly >> 16) as u16);
        }

        self.regs.clear_bit(c.irq.flag);
        self.regs.write_field(c.irq.priority, u16::from(self.priority));
        self.regs.clear_bit(c.irq.enable);

        if let CrcControl::Split { con1, .. } = c.control {
            self.regs.set_bit(Bit::new(con1, CRCEN));
        }
        Ok(())
    }

    /// CRC of `msg` starting from `init`
    ///
    /// Bytes are paired as `msg[i] << 8 | msg[i + 1]`; an odd final byte
    /// is paired with zero.
    pub fn crc16(&mut self, msg: &[u8], init: u16) -> Result<u16, HardwareTimeout> {
        let status = self.status();
        let full = Bit::new(status, CRCFUL);
        let empty = Bit::new(status, CRCMPT);

        self.regs.write(self.crc.wdat, init);
        self.regs.set_bit(Bit::new(status, CRCGO));

        for pair in msg.chunks(2) {
            let word = (u16::from(pair[0]) << 8) | u16::from(pair.get(1).copied().unwrap_or(0));
            self.push(full, word)?;
        }
        self.push(full, 0)?;
        wait_until(self.bound, || self.regs.is_set(empty))?;

        Ok(self.regs.read(self.crc.wdat))
    }

    fn push(&self, full: Bit, word: u16) -> Result<(), HardwareTimeout> {
        wait_until(self.bound, || !self.regs.is_set(full))?;
        self.regs.write(self.crc.dat, word);
        Ok(())
    }

    fn status(&self) -> Reg {
        match self.crc.control {
            CrcControl::Single { con } => con,
            CrcControl::Split { con1, .. } => con1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimChip, SimRegisters};
    use core::cell::RefCell;
    use heapless::Vec;

    /// Register file that logs every write
    struct Recorder {
        sim: SimRegisters,
        writes: RefCell<Vec<(Reg, u16), 64>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                sim: SimRegisters::new(),
                writes: RefCell::new(Vec::new()),
            }
        }

        fn written_to(&self, reg: Reg) -> Vec<u16, 64> {
            self.writes
                .borrow()
                .iter()
                .filter(|(r, _)| *r == reg)
                .map(|(_, v)| *v)
                .collect()
        }
    }

    impl Registers for Recorder {
        fn read(&self, reg: Reg) -> u16 {
            self.sim.read(reg)
        }

        fn write(&self, reg: Reg, value: u16) {
            let _ = self.writes.borrow_mut().push((reg, value));
            self.sim.write(reg, value);
        }
    }

    fn con() -> Reg {
        match SimChip::crc().control {
            CrcControl::Single { con } => con,
            CrcControl::Split { con1, .. } => con1,
        }
    }

    #[test]
    fn test_init_single_layout() {
        let sim = SimRegisters::new();
        let regs = SimChip::crc();
        sim.set_bit(regs.power);

        let mut crc = Crc::<_, SimChip>::new(&sim, 5, PollBound::Unbounded);
        crc.init(16, 0x1021).unwrap();

        assert!(!sim.bit(regs.power));
        assert_eq!(sim.get(con()), 0x000F);
        assert_eq!(sim.get(regs.xor), 0x1021);
        assert_eq!(sim.read_field(regs.irq.priority), 5);
        assert!(!sim.bit(regs.irq.enable));
    }

    #[test]
    fn test_length_range() {
        let sim = SimRegisters::new();
        let mut crc = Crc::<_, SimChip>::new(&sim, 5, PollBound::Unbounded);
        assert_eq!(crc.init(0, 0x07), Err(ConfigurationError::InvalidCrcLength));
        assert_eq!(crc.init(17, 0x07), Err(ConfigurationError::InvalidCrcLength));
        assert_eq!(crc.init(8, 0x07), Ok(()));
    }

    #[test]
    fn test_words_fed_big_endian_with_padding() {
        let rec = Recorder::new();
        let regs = SimChip::crc();
        rec.sim.stick(Bit::new(con(), CRCMPT), true);
        rec.sim.set(regs.wdat, 0x29B1);

        let mut crc = Crc::<_, SimChip>::new(&rec, 5, PollBound::Iterations(4));
        assert_eq!(crc.crc16(&[0x12, 0x34, 0x56], 0xFFFF), Ok(0xFFFF));

        assert_eq!(rec.written_to(regs.dat).as_slice(), &[0x1234, 0x5600, 0x0000]);
        assert_eq!(rec.written_to(regs.wdat).as_slice(), &[0xFFFF]);
        assert!(rec.sim.bit(Bit::new(con(), CRCGO)));
    }

    #[test]
    fn test_full_fifo_times_out() {
        let sim = SimRegisters::new();
        sim.stick(Bit::new(con(), CRCFUL), true);
        let mut crc = Crc::<_, SimChip>::new(&sim, 5, PollBound::Iterations(8));
        assert_eq!(crc.crc16(b"ab", 0), Err(HardwareTimeout));
    }

    #[test]
    fn test_never_empty_times_out() {
        let sim = SimRegisters::new();
        let mut crc = Crc::<_, SimChip>::new(&sim, 5, PollBound::Iterations(8));
        assert_eq!(crc.crc16(b"", 0), Err(HardwareTimeout));
    }
}
