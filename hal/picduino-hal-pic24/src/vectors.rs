//! Mapping hardware vector numbers to callback sources
//!
//! The IRQ number of a vector is its position across the IFS registers:
//! 16 per IFS word, plus the bit. Vector stubs that only know their
//! number use [`source_for_irq`] to reach the dispatcher.

use picduino_core::interrupt::InterruptSource;
use picduino_core::map::{IrqLines, RegisterMap};

const IFS0: u16 = 0x0084;

/// IRQ number of the vector owning `lines`
pub const fn irq_number(lines: &IrqLines) -> u8 {
    let word = (lines.flag.reg.0 - IFS0) / 2;
    (word * 16) as u8 + lines.flag.pos
}

/// Callback source served by IRQ `irq`, if it has one
pub fn source_for_irq<M: RegisterMap>(irq: u8) -> Option<InterruptSource> {
    InterruptSource::ALL
        .into_iter()
        .find(|&source| irq_number(&M::irq(source)) == irq)
}
