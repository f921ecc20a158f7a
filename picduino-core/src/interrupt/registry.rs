//! Callback slots, one per interrupt source

use core::cell::Cell;

use critical_section::Mutex;
use picduino_hal::interrupt::{Callable, Noop};

use super::source::InterruptSource;

type Slot = Mutex<Cell<&'static dyn Callable>>;

/// Callback table keyed by [`InterruptSource`]
///
/// Every slot always holds a callable; an empty slot holds [`Noop`]. A
/// `&dyn Callable` is two words wide, so replacing one cannot be a single
/// store on a 16-bit core: slot access goes through a critical section.
pub struct CallbackRegistry {
    slots: [Slot; InterruptSource::COUNT],
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    pub const fn new() -> Self {
        const EMPTY: Slot = Mutex::new(Cell::new(&Noop));
        Self {
            slots: [EMPTY; InterruptSource::COUNT],
        }
    }

    /// Install `callback` for `source`, replacing whatever was there
    pub fn attach(&self, source: InterruptSource, callback: &'static dyn Callable) {
        critical_section::with(|cs| self.slots[source.index()].borrow(cs).set(callback));
    }

    /// Restore the no-op default
    pub fn reset(&self, source: InterruptSource) {
        self.attach(source, &Noop);
    }

    /// Run the callback installed for `source`
    ///
    /// The slot is read inside a critical section; the callback itself
    /// runs outside it so it can be preempted by higher priorities.
    pub fn invoke(&self, source: InterruptSource) {
        let callback = critical_section::with(|cs| self.slots[source.index()].borrow(cs).get());
        callback.invoke();
    }
}
