//! On-chip peripheral drivers
//!
//! Each driver busy-waits on status bits through [`crate::poll::wait_until`]
//! using the bound it was built with.

pub mod adc;
pub mod crc;
pub mod format;
pub mod uart;

pub use adc::Adc;
pub use crc::Crc;
pub use format::{format_number, LINE_WIDTH};
pub use uart::Serial;
