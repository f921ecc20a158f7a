//! picduino Hardware Abstraction Layer
//!
//! This crate defines the traits shared by the variant-agnostic core and
//! the chip-specific register maps. Everything that touches a PIC24
//! special function register goes through [`regs::Registers`], so the
//! same logic runs against real memory-mapped I/O on the target and a
//! simulated register file on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (setup / loop)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  picduino-core (tick, dispatch, gpio)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  picduino-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ picduino-hal- │       │  core::sim    │
//! │    pic24      │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`regs::Registers`] - 16-bit SFR read/write
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`interrupt::Callable`] - Interrupt callbacks

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod interrupt;
pub mod regs;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, Level, OutputPin, PinMode};
pub use interrupt::{Callable, Noop};
pub use regs::{Bit, Field, Reg, Registers};
pub use uart::{BaudRate, UartRx, UartTx};
