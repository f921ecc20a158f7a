//! PIC24FJ64GB002/GB004
//!
//! USB parts with the GA10x peripheral layout for everything this crate
//! drives.

use picduino_core::interrupt::Channel;
use picduino_core::map::{CrcRegs, InputCaptureRegs, OutputCompareRegs, RegisterMap};
use picduino_core::pins::PinDescriptor;
use picduino_hal::regs::Reg;

use super::{ga10x, Package, PackageOf};

/// GB00x family in package `P`
pub struct Gb00x<P>(PackageOf<P>);

impl<P: Package> RegisterMap for Gb00x<P> {
    const NAME: &'static str = "PIC24FJ64GB00x";
    const PIN_TABLE: &'static [PinDescriptor] = P::PIN_TABLE;
    const PMD: &'static [Reg] = ga10x::PMD;

    fn output_compare(ch: Channel) -> OutputCompareRegs {
        ga10x::output_compare(ch)
    }

    fn input_capture(ch: Channel) -> InputCaptureRegs {
        ga10x::input_capture(ch)
    }

    fn crc() -> CrcRegs {
        ga10x::crc()
    }
}
