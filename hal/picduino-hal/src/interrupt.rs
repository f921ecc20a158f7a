//! Interrupt callbacks
//!
//! A callback is anything that can be invoked with no arguments from
//! interrupt context. Plain functions and non-capturing closures qualify
//! through the blanket impl.

/// Code run when an interrupt source fires
///
/// Runs in interrupt context at the source's priority. A callback that
/// never returns stalls every interrupt of equal or lower priority.
pub trait Callable: Sync {
    fn invoke(&self);
}

impl<F: Fn() + Sync> Callable for F {
    fn invoke(&self) {
        self()
    }
}

/// Callback that does nothing
///
/// Every slot starts out pointing here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Noop;

impl Callable for Noop {
    fn invoke(&self) {}
}
