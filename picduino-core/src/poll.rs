//! Busy-wait polling on hardware flags
//!
//! Every loop that spins on a status bit goes through [`wait_until`]. The
//! default bound is [`PollBound::Unbounded`], matching a bare spin on the
//! target; tests and cautious callers pass an iteration limit instead.

use crate::error::HardwareTimeout;

/// Limit on the number of predicate evaluations in a polling wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollBound {
    /// Spin until the condition holds
    #[default]
    Unbounded,
    /// Give up after this many failed checks
    Iterations(u32),
}

/// Spin until `ready` returns true
///
/// The predicate is evaluated before the bound is consulted, so a
/// condition that already holds succeeds even with `Iterations(0)`.
pub fn wait_until<F>(bound: PollBound, mut ready: F) -> Result<(), HardwareTimeout>
where
    F: FnMut() -> bool,
{
    match bound {
        PollBound::Unbounded => {
            while !ready() {
                core::hint::spin_loop();
            }
            Ok(())
        }
        PollBound::Iterations(limit) => {
            let mut remaining = limit;
            loop {
                if ready() {
                    return Ok(());
                }
                if remaining == 0 {
                    return Err(HardwareTimeout);
                }
                remaining -= 1;
                core::hint::spin_loop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_immediately() {
        assert_eq!(wait_until(PollBound::Iterations(0), || true), Ok(()));
    }

    #[test]
    fn test_times_out() {
        let mut checks = 0;
        let result = wait_until(PollBound::Iterations(5), || {
            checks += 1;
            false
        });
        assert_eq!(result, Err(HardwareTimeout));
        // Initial check plus one per remaining iteration
        assert_eq!(checks, 6);
    }

    #[test]
    fn test_unbounded_succeeds_eventually() {
        let mut countdown = 100;
        let result = wait_until(PollBound::Unbounded, || {
            countdown -= 1;
            countdown == 0
        });
        assert_eq!(result, Ok(()));
    }
}
