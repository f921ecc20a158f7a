//! Register maps of the supported PIC24FJ64 parts
//!
//! A part is a family (register layout) combined with a package (which
//! ports are bonded out). 28-pin packages have ports A and B, 44-pin
//! packages add port C.

use core::marker::PhantomData;

use picduino_core::map::Port;
use picduino_core::pins::{pin_table, PinDescriptor};

pub mod ga00x;
pub mod ga10x;
pub mod gb00x;

pub use ga00x::Ga00x;
pub use ga10x::Ga10x;
pub use gb00x::Gb00x;

/// Bonded-out ports of a package
pub trait Package: 'static {
    const PIN_TABLE: &'static [PinDescriptor];
}

/// 28-pin SPDIP/SOIC/SSOP/QFN
pub struct Pins28;

/// 44-pin TQFP/QFN
pub struct Pins44;

const PINS_28: [PinDescriptor; 32] = pin_table(&[Port::A, Port::B]);
const PINS_44: [PinDescriptor; 48] = pin_table(&[Port::A, Port::B, Port::C]);

impl Package for Pins28 {
    const PIN_TABLE: &'static [PinDescriptor] = &PINS_28;
}

impl Package for Pins44 {
    const PIN_TABLE: &'static [PinDescriptor] = &PINS_44;
}

/// Marker tying a family map to its package
pub(crate) type PackageOf<P> = PhantomData<fn() -> P>;

pub type Pic24Fj64Ga002 = Ga00x<Pins28>;
pub type Pic24Fj64Ga004 = Ga00x<Pins44>;
pub type Pic24Fj64Ga102 = Ga10x<Pins28>;
pub type Pic24Fj64Ga104 = Ga10x<Pins44>;
pub type Pic24Fj64Gb002 = Gb00x<Pins28>;
pub type Pic24Fj64Gb004 = Gb00x<Pins44>;
