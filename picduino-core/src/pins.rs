//! Pin table
//!
//! Abstract pins are numbered 0..N-1 across the ports a package bonds
//! out, 16 per port, in port order: PA0..PA15 are 0..15, PB0..PB15 are
//! 16..31, and so on. Each index resolves through a compile-time table to
//! the port's register block and the pin's bit mask, so digital I/O never
//! branches on the port.
//!
//! A [`Pin`] is tied to a [`RegisterMap`] and can only be constructed for
//! a pin present in that map's table.

use core::fmt;
use core::marker::PhantomData;

use crate::map::{Port, PortRegs, RegisterMap};

/// Pins per port group
pub const PINS_PER_PORT: usize = 16;

/// Table entry for one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinDescriptor {
    pub port: Port,
    pub regs: PortRegs,
    pub mask: u16,
}

/// Build the pin table for a package bonding out `ports`
///
/// `N` must be `16 * ports.len()`; anything else fails const evaluation.
pub const fn pin_table<const N: usize>(ports: &[Port]) -> [PinDescriptor; N] {
    assert!(N == ports.len() * PINS_PER_PORT, "pin table length must be 16 per port");

    let placeholder = PinDescriptor {
        port: Port::A,
        regs: PortRegs::of(Port::A),
        mask: 0,
    };
    let mut table = [placeholder; N];
    let mut i = 0;
    while i < N {
        let port = ports[i / PINS_PER_PORT];
        table[i] = PinDescriptor {
            port,
            regs: PortRegs::of(port),
            mask: 1 << (i % PINS_PER_PORT),
        };
        i += 1;
    }
    table
}

/// A digital pin of chip `M`
pub struct Pin<M> {
    index: u8,
    _map: PhantomData<fn() -> M>,
}

impl<M: RegisterMap> Pin<M> {
    /// Number of pins on this chip
    pub const COUNT: usize = M::PIN_TABLE.len();

    const fn at(index: u8) -> Self {
        Self {
            index,
            _map: PhantomData,
        }
    }

    /// Pin with table index `index`
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < M::PIN_TABLE.len() {
            Some(Self::at(index as u8))
        } else {
            None
        }
    }

    /// Pin `bit` of `port`, if the chip bonds it out
    pub const fn new(port: Port, bit: u8) -> Option<Self> {
        if bit as usize >= PINS_PER_PORT {
            return None;
        }
        let mut base = 0;
        while base < M::PIN_TABLE.len() {
            if M::PIN_TABLE[base].port as usize == port as usize {
                return Self::from_index(base + bit as usize);
            }
            base += PINS_PER_PORT;
        }
        None
    }

    /// Stable table index
    pub const fn index(self) -> usize {
        self.index as usize
    }

    pub const fn descriptor(self) -> PinDescriptor {
        M::PIN_TABLE[self.index as usize]
    }

    pub const fn port(self) -> Port {
        self.descriptor().port
    }

    /// Bit position within the port
    pub const fn bit(self) -> u8 {
        self.index % PINS_PER_PORT as u8
    }

    /// Unwrap a pin at compile time; naming a missing pin fails the build
    const fn present(pin: Option<Self>) -> Self {
        match pin {
            Some(pin) => pin,
            None => panic!("pin is not bonded out on this chip"),
        }
    }

    /// Iterate over every pin of the chip
    pub fn all() -> impl Iterator<Item = Pin<M>> {
        (0..M::PIN_TABLE.len()).map(|i| Self::at(i as u8))
    }
}

macro_rules! port_pins {
    ($($name:ident = $index:expr),* $(,)?) => {
        impl<M: RegisterMap> Pin<M> {
            $(
                pub const $name: Self = Self::at($index);
            )*
        }
    };
}

// Ports A and B exist on every supported package
port_pins! {
    PA0 = 0, PA1 = 1, PA2 = 2, PA3 = 3, PA4 = 4, PA5 = 5, PA6 = 6, PA7 = 7,
    PA8 = 8, PA9 = 9, PA10 = 10, PA11 = 11, PA12 = 12, PA13 = 13, PA14 = 14, PA15 = 15,
    PB0 = 16, PB1 = 17, PB2 = 18, PB3 = 19, PB4 = 20, PB5 = 21, PB6 = 22, PB7 = 23,
    PB8 = 24, PB9 = 25, PB10 = 26, PB11 = 27, PB12 = 28, PB13 = 29, PB14 = 30, PB15 = 31,
}

macro_rules! port_c_pins {
    ($($name:ident = $bit:expr),* $(,)?) => {
        impl<M: RegisterMap> Pin<M> {
            $(
                pub const $name: Self = Self::present(Self::new(Port::C, $bit));
            )*
        }
    };
}

// Port C is bonded out on 44-pin packages only
port_c_pins! {
    PC0 = 0, PC1 = 1, PC2 = 2, PC3 = 3, PC4 = 4, PC5 = 5, PC6 = 6, PC7 = 7,
    PC8 = 8, PC9 = 9, PC10 = 10, PC11 = 11, PC12 = 12, PC13 = 13, PC14 = 14, PC15 = 15,
}

impl<M> Clone for Pin<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Pin<M> {}

impl<M> PartialEq for Pin<M> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<M> Eq for Pin<M> {}

impl<M: RegisterMap> fmt::Debug for Pin<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.port().letter(), self.bit())
    }
}

#[cfg(feature = "defmt")]
impl<M: RegisterMap> defmt::Format for Pin<M> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "P{}{}", self.port().letter(), self.bit())
    }
}
