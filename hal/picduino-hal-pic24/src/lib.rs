//! PIC24FJ64 support for picduino
//!
//! Register maps for the GA00x, GA10x and GB00x families, volatile SFR
//! access, and the glue that ties the core dispatcher to the chip's
//! interrupt vectors.
//!
//! # Features
//!
//! - `pic24fj64ga002`, `pic24fj64ga004`, `pic24fj64ga102`,
//!   `pic24fj64ga104`, `pic24fj64gb002`, `pic24fj64gb004` - Select the
//!   target part (at most one)
//! - `systick-tmr1` - Run the tick counter on Timer1 instead of Timer2
//! - `critical-section-impl` - Provide the `critical-section`
//!   implementation (SR.IPL raised to 7)
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! ```ignore
//! let hal = picduino_hal_pic24::start()?;
//! hal.pin_mode(Pin::PB5, PinMode::Output);
//! loop {
//!     hal.pin_flip(Pin::PB5);
//!     hal.delay(500);
//! }
//! ```
//!
//! Each vector stub forwards to [`dispatch_irq`] with its IRQ number.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "critical-section-impl")]
mod critical;
pub mod map;
pub mod mmio;
pub mod vectors;

use picduino_core::config::TickTimer;
use picduino_core::HalConfig;

pub use mmio::Mmio;
pub use vectors::{irq_number, source_for_irq};

const SELECTED_CHIPS: usize = cfg!(feature = "pic24fj64ga002") as usize
    + cfg!(feature = "pic24fj64ga004") as usize
    + cfg!(feature = "pic24fj64ga102") as usize
    + cfg!(feature = "pic24fj64ga104") as usize
    + cfg!(feature = "pic24fj64gb002") as usize
    + cfg!(feature = "pic24fj64gb004") as usize;

const _: () = assert!(SELECTED_CHIPS <= 1, "select at most one PIC24FJ64 chip feature");

#[cfg(feature = "pic24fj64ga002")]
pub type Chip = map::Pic24Fj64Ga002;
#[cfg(feature = "pic24fj64ga004")]
pub type Chip = map::Pic24Fj64Ga004;
#[cfg(feature = "pic24fj64ga102")]
pub type Chip = map::Pic24Fj64Ga102;
#[cfg(feature = "pic24fj64ga104")]
pub type Chip = map::Pic24Fj64Ga104;
#[cfg(feature = "pic24fj64gb002")]
pub type Chip = map::Pic24Fj64Gb002;
#[cfg(feature = "pic24fj64gb004")]
pub type Chip = map::Pic24Fj64Gb004;

/// Timer driving the tick counter
pub const TICK_TIMER: TickTimer = if cfg!(feature = "systick-tmr1") {
    TickTimer::Timer1
} else {
    TickTimer::Timer2
};

/// Configuration used by [`DISPATCHER`]
pub const DEFAULT_CONFIG: HalConfig = HalConfig::new().with_tick_timer(TICK_TIMER).assert_valid();

#[cfg(any(
    feature = "pic24fj64ga002",
    feature = "pic24fj64ga004",
    feature = "pic24fj64ga102",
    feature = "pic24fj64ga104",
    feature = "pic24fj64gb002",
    feature = "pic24fj64gb004",
))]
mod runtime {
    use picduino_core::interrupt::InterruptSource;
    use picduino_core::{ConfigurationError, Hal, InterruptDispatcher};

    use super::{Chip, Mmio, DEFAULT_CONFIG};

    /// Dispatcher shared by the application and the vector stubs
    pub static DISPATCHER: InterruptDispatcher<Chip> = InterruptDispatcher::new(DEFAULT_CONFIG);

    /// Bring the chip up and start the time base
    pub fn start() -> Result<Hal<'static, Mmio, Chip>, ConfigurationError> {
        Hal::start(Mmio, &DISPATCHER)
    }

    /// Service `source`: clear its flag, keep the time base and output
    /// compare schedule going, then run its callback
    pub fn on_interrupt(source: InterruptSource) {
        DISPATCHER.on_interrupt(&Mmio, source);
    }

    /// Service hardware vector `irq`
    ///
    /// Vectors without a callback slot are ignored.
    pub fn dispatch_irq(irq: u8) {
        if let Some(source) = super::source_for_irq::<Chip>(irq) {
            on_interrupt(source);
        }
    }
}

#[cfg(any(
    feature = "pic24fj64ga002",
    feature = "pic24fj64ga004",
    feature = "pic24fj64ga102",
    feature = "pic24fj64ga104",
    feature = "pic24fj64gb002",
    feature = "pic24fj64gb004",
))]
pub use runtime::{dispatch_irq, on_interrupt, start, DISPATCHER};
