//! `critical-section` implementation for single-core PIC24
//!
//! Entering raises the CPU priority in SR.IPL to 7, masking every
//! maskable interrupt; leaving restores the previous level. Nesting works
//! because each acquire returns the level it replaced.

#![allow(unsafe_code)]

use picduino_hal::regs::{Field, Reg, Registers};

use crate::mmio::Mmio;

const SR: Reg = Reg(0x0042);
const IPL: Field = Field::new(SR, 5, 3);
const IPL_MASK_ALL: u16 = 7;

struct IplCriticalSection;

critical_section::set_impl!(IplCriticalSection);

unsafe impl critical_section::Impl for IplCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let previous = Mmio.read_field(IPL);
        Mmio.write_field(IPL, IPL_MASK_ALL);
        previous
    }

    unsafe fn release(previous: critical_section::RawRestoreState) {
        Mmio.write_field(IPL, previous);
    }
}
