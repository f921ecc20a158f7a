//! PIC24FJ64GA002/GA004
//!
//! Single-register output compare and CRC control, three PMD registers.

use picduino_core::interrupt::Channel;
use picduino_core::map::{
    ic_power, oc_power, CrcControl, CrcRegs, InputCaptureRegs, OutputCompareRegs, RegisterMap,
    CRC_IRQ, CRC_POWER, PMD1, PMD2, PMD3,
};
use picduino_core::pins::PinDescriptor;
use picduino_hal::regs::Reg;

use super::{Package, PackageOf};

/// GA00x family in package `P`
pub struct Ga00x<P>(PackageOf<P>);

const OC1RS: u16 = 0x0180;
const OC_STRIDE: u16 = 6;
const IC1BUF: u16 = 0x0140;
const IC_STRIDE: u16 = 4;
/// ICTMR: capture Timer2 instead of Timer3
const ICTMR: u16 = 1 << 7;

impl<P: Package> RegisterMap for Ga00x<P> {
    const NAME: &'static str = "PIC24FJ64GA00x";
    const PIN_TABLE: &'static [PinDescriptor] = P::PIN_TABLE;
    const PMD: &'static [Reg] = &[PMD1, PMD2, PMD3];

    fn output_compare(ch: Channel) -> OutputCompareRegs {
        let rs = Reg(OC1RS + OC_STRIDE * ch.index() as u16);
        OutputCompareRegs {
            con: rs.offset(4),
            con2: None,
            r: rs.offset(2),
            rs,
            power: oc_power(ch),
        }
    }

    fn input_capture(ch: Channel) -> InputCaptureRegs {
        let buf = Reg(IC1BUF + IC_STRIDE * ch.index() as u16);
        InputCaptureRegs {
            con: buf.offset(2),
            con2: None,
            buf,
            power: ic_power(ch),
            timer2_select: ICTMR,
        }
    }

    fn crc() -> CrcRegs {
        CrcRegs {
            control: CrcControl::Single { con: Reg(0x0640) },
            xor: Reg(0x0642),
            xor_high: None,
            dat: Reg(0x0644),
            wdat: Reg(0x0646),
            power: CRC_POWER,
            irq: CRC_IRQ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Pic24Fj64Ga002;

    #[test]
    fn test_output_compare_layout() {
        let oc3 = Pic24Fj64Ga002::output_compare(Channel::Ch3);
        assert_eq!(oc3.rs, Reg(0x018C));
        assert_eq!(oc3.r, Reg(0x018E));
        assert_eq!(oc3.con, Reg(0x0190));
    }

    #[test]
    fn test_input_capture_layout() {
        let ic2 = Pic24Fj64Ga002::input_capture(Channel::Ch2);
        assert_eq!(ic2.buf, Reg(0x0144));
        assert_eq!(ic2.con, Reg(0x0146));
        assert_eq!(ic2.timer2_select, 0x0080);
    }
}
