//! Volatile access to the SFR space

use picduino_hal::regs::{Reg, Registers};

/// The chip's own special function registers
///
/// Zero-sized; every access is a volatile 16-bit load or store at the
/// register's data-space address.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mmio;

#[allow(unsafe_code)]
impl Registers for Mmio {
    #[inline(always)]
    fn read(&self, reg: Reg) -> u16 {
        let ptr = usize::from(reg.0) as *const u16;
        // SAFETY: register maps only name word-aligned SFR addresses,
        // which are always mapped and readable.
        unsafe { core::ptr::read_volatile(ptr) }
    }

    #[inline(always)]
    fn write(&self, reg: Reg, value: u16) {
        let ptr = usize::from(reg.0) as *mut u16;
        // SAFETY: as above; SFR writes have no aliasing requirements
        // beyond the read-modify-write discipline of the callers.
        unsafe { core::ptr::write_volatile(ptr, value) }
    }
}
