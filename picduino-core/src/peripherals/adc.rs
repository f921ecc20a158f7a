//! 10-bit ADC, single-ended, mux A only
//!
//! Sampling is started by software and ends automatically after the
//! configured acquisition time (SSRC = auto-convert).

use core::marker::PhantomData;

use picduino_hal::regs::{Bit, Field, Registers};

use crate::error::HardwareTimeout;
use crate::map::{AdcRegs, RegisterMap};
use crate::poll::{wait_until, PollBound};

// AD1CON1
const ADON: u8 = 15;
const SAMP: u8 = 1;
const DONE: u8 = 0;
/// Auto-convert once sampling ends
const SSRC_AUTO: u16 = 7;
/// 31 TAD acquisition
const SAMC: u16 = 31;
/// TAD = 3 TCY
const ADCS: u16 = 2;
/// Band gap reference input
const PCFG_BANDGAP: u8 = 15;

/// Polled ADC on chip `M`
pub struct Adc<R, M> {
    regs: R,
    adc: AdcRegs,
    bound: PollBound,
    _map: PhantomData<fn() -> M>,
}

impl<R: Registers, M: RegisterMap> Adc<R, M> {
    pub fn new(regs: R, bound: PollBound) -> Self {
        Self {
            regs,
            adc: M::adc(),
            bound,
            _map: PhantomData,
        }
    }

    pub fn init(&mut self) {
        let a = self.adc;
        self.regs.clear_bit(a.power);
        self.regs.write(a.con1, 0);
        self.regs.write(a.con2, 0);
        self.regs.write(a.con3, 0);
        self.regs.write_field(Field::new(a.con1, 5, 3), SSRC_AUTO);
        self.regs.write_field(Field::new(a.con3, 8, 5), SAMC);
        self.regs.write_field(Field::new(a.con3, 0, 8), ADCS);
        self.regs.write(a.cssl, 0);
        self.regs.set_bit(Bit::new(a.pcfg, PCFG_BANDGAP));
        self.regs.set_bit(Bit::new(a.con1, ADON));
    }

    /// Convert channel `ch` (0..=15, higher bits ignored)
    ///
    /// The channel's pin is switched to analog for the conversion and the
    /// previous pin configuration restored afterwards, including on timeout.
    pub fn analog_read(&mut self, ch: u8) -> Result<u16, HardwareTimeout> {
        let a = self.adc;
        let ch = ch & 0x0F;
        let saved = self.regs.read(a.pcfg);

        self.regs.clear_bit(Bit::new(a.con1, DONE));
        self.regs.clear_bit(Bit::new(a.pcfg, ch));
        self.regs.write(a.chs, u16::from(ch));
        self.regs.set_bit(Bit::new(a.con1, SAMP));

        let done = Bit::new(a.con1, DONE);
        let converted = wait_until(self.bound, || self.regs.is_set(done));
        self.regs.write(a.pcfg, saved);
        converted?;

        Ok(self.regs.read(a.buf0))
    }
}
