//! PIC24FJ64GA102/GA104
//!
//! Two-register output compare and input capture control, a 32-bit
//! capable CRC engine with split CRCCON1/CRCCON2, and a fourth PMD
//! register. The GB00x parts share this layout.

use picduino_core::interrupt::Channel;
use picduino_core::map::{
    ic_power, oc_power, CrcControl, CrcRegs, InputCaptureRegs, OutputCompareRegs, RegisterMap,
    CRC_IRQ, CRC_POWER, PMD1, PMD2, PMD3,
};
use picduino_core::pins::PinDescriptor;
use picduino_hal::regs::Reg;

use super::{Package, PackageOf};

/// GA10x family in package `P`
pub struct Ga10x<P>(PackageOf<P>);

pub const PMD4: Reg = Reg(0x0776);

const OC1CON1: u16 = 0x0190;
const OC_STRIDE: u16 = 0x0A;
const IC1CON1: u16 = 0x0140;
const IC_STRIDE: u16 = 8;
/// ICTSEL = 0b001: capture Timer2
const ICTSEL_TIMER2: u16 = 1 << 10;

pub(crate) const PMD: &[Reg] = &[PMD1, PMD2, PMD3, PMD4];

pub(crate) fn output_compare(ch: Channel) -> OutputCompareRegs {
    let con1 = Reg(OC1CON1 + OC_STRIDE * ch.index() as u16);
    OutputCompareRegs {
        con: con1,
        con2: Some(con1.offset(2)),
        rs: con1.offset(4),
        r: con1.offset(6),
        power: oc_power(ch),
    }
}

pub(crate) fn input_capture(ch: Channel) -> InputCaptureRegs {
    let con1 = Reg(IC1CON1 + IC_STRIDE * ch.index() as u16);
    InputCaptureRegs {
        con: con1,
        con2: Some(con1.offset(2)),
        buf: con1.offset(4),
        power: ic_power(ch),
        timer2_select: ICTSEL_TIMER2,
    }
}

pub(crate) fn crc() -> CrcRegs {
    CrcRegs {
        control: CrcControl::Split {
            con1: Reg(0x0640),
            con2: Reg(0x0642),
        },
        xor: Reg(0x0644),
        xor_high: Some(Reg(0x0646)),
        dat: Reg(0x0648),
        wdat: Reg(0x064C),
        power: CRC_POWER,
        irq: CRC_IRQ,
    }
}

impl<P: Package> RegisterMap for Ga10x<P> {
    const NAME: &'static str = "PIC24FJ64GA10x";
    const PIN_TABLE: &'static [PinDescriptor] = P::PIN_TABLE;
    const PMD: &'static [Reg] = PMD;

    fn output_compare(ch: Channel) -> OutputCompareRegs {
        output_compare(ch)
    }

    fn input_capture(ch: Channel) -> InputCaptureRegs {
        input_capture(ch)
    }

    fn crc() -> CrcRegs {
        crc()
    }
}
