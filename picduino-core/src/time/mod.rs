//! Time base
//!
//! - [`tick`] - overflow-extended hardware counter
//! - [`delay`] - busy-wait delays built on it

pub mod delay;
pub mod tick;

pub use delay::Delay;
pub use tick::{CounterSource, TickCounter, TIMER_RANGE};
