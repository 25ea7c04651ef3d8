//! Clock collaborator and calendar helpers.
//!
//! The core never reads the wall clock directly: every per-instant computation
//! takes an [`EpochSeconds`] value obtained from a [`Clock`], so tests and
//! replay harnesses can substitute a deterministic source. Calendar
//! decomposition (the solar estimator needs the Gregorian year of an instant)
//! goes through [`hifitime::Epoch`].

use hifitime::Epoch;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::EpochSeconds;

/// Injectable time source.
///
/// Return
/// ----------
/// * `now()`: the current instant as fractional Unix epoch seconds (UTC).
pub trait Clock {
    fn now(&self) -> EpochSeconds;
}

/// Wall-clock [`Clock`] implementation backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochSeconds {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Fixed [`Clock`] returning a constant instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub EpochSeconds);

impl Clock for FixedClock {
    fn now(&self) -> EpochSeconds {
        self.0
    }
}

/// Gregorian (UTC) year of an epoch instant.
///
/// Arguments
/// -----------------
/// * `now`: Instant in Unix epoch seconds.
///
/// Return
/// ----------
/// * The calendar year, e.g. `2017` for `1503338331.2`.
pub fn year_of(now: EpochSeconds) -> i32 {
    let (year, ..) = Epoch::from_unix_seconds(now).to_gregorian_utc();
    year
}

#[cfg(test)]
mod time_tests {
    use super::*;

    #[test]
    fn test_year_of_epoch_instants() {
        assert_eq!(year_of(0.0), 1970);
        assert_eq!(year_of(1503338331.2), 2017, "2017-08-21 eclipse epoch");
        assert_eq!(year_of(1712599469.0), 2024, "2024-04-08 eclipse epoch");
    }

    #[test]
    fn test_fixed_clock_is_constant() {
        let clock = FixedClock(1234.5);
        assert_eq!(clock.now(), 1234.5);
        assert_eq!(clock.now(), 1234.5);
    }
}
