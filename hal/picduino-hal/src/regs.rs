//! Special function register access
//!
//! PIC24 peripherals are controlled through 16-bit registers in the SFR
//! space (0x0000..0x07FF). Register maps describe locations with [`Reg`],
//! [`Bit`] and [`Field`]; an implementation of [`Registers`] performs the
//! actual access.

/// Address of a 16-bit special function register
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reg(pub u16);

impl Reg {
    /// Register at `offset` bytes past this one
    pub const fn offset(self, offset: u16) -> Reg {
        Reg(self.0 + offset)
    }
}

/// Single bit within a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bit {
    pub reg: Reg,
    pub pos: u8,
}

impl Bit {
    pub const fn new(reg: Reg, pos: u8) -> Self {
        Self { reg, pos }
    }

    pub const fn mask(self) -> u16 {
        1 << self.pos
    }
}

/// Contiguous bit field within a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pub reg: Reg,
    pub pos: u8,
    pub width: u8,
}

impl Field {
    pub const fn new(reg: Reg, pos: u8, width: u8) -> Self {
        Self { reg, pos, width }
    }

    /// Mask of the field in register position
    pub const fn mask(self) -> u16 {
        ((((1u32 << self.width) - 1) << self.pos) & 0xFFFF) as u16
    }
}

/// Register file access
///
/// Takes `&self`: SFRs are shared hardware state and are written from
/// both normal and interrupt context. Implementations must not cache.
pub trait Registers {
    /// Read a register
    fn read(&self, reg: Reg) -> u16;

    /// Write a register
    fn write(&self, reg: Reg, value: u16);

    /// Read-modify-write the bits selected by `mask`
    fn modify(&self, reg: Reg, mask: u16, value: u16) {
        let current = self.read(reg);
        self.write(reg, (current & !mask) | (value & mask));
    }

    fn set_bits(&self, reg: Reg, mask: u16) {
        let current = self.read(reg);
        self.write(reg, current | mask);
    }

    fn clear_bits(&self, reg: Reg, mask: u16) {
        let current = self.read(reg);
        self.write(reg, current & !mask);
    }

    fn toggle_bits(&self, reg: Reg, mask: u16) {
        let current = self.read(reg);
        self.write(reg, current ^ mask);
    }

    fn set_bit(&self, bit: Bit) {
        self.set_bits(bit.reg, bit.mask());
    }

    fn clear_bit(&self, bit: Bit) {
        self.clear_bits(bit.reg, bit.mask());
    }

    /// Write a single bit to `value`
    fn write_bit(&self, bit: Bit, value: bool) {
        if value {
            self.set_bit(bit);
        } else {
            self.clear_bit(bit);
        }
    }

    fn is_set(&self, bit: Bit) -> bool {
        self.read(bit.reg) & bit.mask() != 0
    }

    /// Write `value` into a field; bits outside the field width are dropped
    fn write_field(&self, field: Field, value: u16) {
        self.modify(field.reg, field.mask(), value << field.pos);
    }

    fn read_field(&self, field: Field) -> u16 {
        (self.read(field.reg) & field.mask()) >> field.pos
    }
}

impl<T: Registers + ?Sized> Registers for &T {
    fn read(&self, reg: Reg) -> u16 {
        (**self).read(reg)
    }

    fn write(&self, reg: Reg, value: u16) {
        (**self).write(reg, value)
    }
}
