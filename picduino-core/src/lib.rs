//! Variant-agnostic core for PIC24FJ microcontrollers
//!
//! Arduino-style services built on the register access traits from
//! `picduino-hal`, independent of which PIC24FJ family is selected:
//!
//! - Register map trait describing a chip family ([`map`])
//! - Compile-time pin table and digital I/O ([`pins`], [`gpio`])
//! - 32-bit tick counter, `millis`/`micros` and busy-wait delays ([`time`])
//! - Interrupt callback registry and dispatcher ([`interrupt`])
//! - Start-up sequence and the `Hal` facade ([`system`])
//! - Polled UART, CRC and ADC drivers ([`peripherals`])
//! - Bounded polling and error types ([`poll`], [`error`])
//!
//! With the `sim` feature, [`sim`] provides a host-side register file and
//! a small register map so all of the above can be tested off-target.

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod error;
pub mod gpio;
pub mod interrupt;
pub mod map;
pub mod peripherals;
pub mod pins;
pub mod poll;
#[cfg(feature = "sim")]
pub mod sim;
pub mod system;
pub mod time;

pub use config::HalConfig;
pub use error::{ConfigurationError, HalError, HalResult, HardwareTimeout};
pub use interrupt::{InterruptDispatcher, InterruptSource};
pub use pins::Pin;
pub use poll::PollBound;
pub use system::Hal;
