//! Solar Position Estimator.
//!
//! Carruthers-type truncated Fourier approximation of the Sun's declination
//! and the equation of time, plus the UTC time-of-day — everything the
//! terminator needs, independent of any eclipse dataset. The day-of-year
//! step deliberately ignores leap days: this is a visualization-grade model,
//! not a calendar library, and the residual error is well below the width of
//! the twilight blend.

use crate::constants::{
    EpochSeconds, Hour, Radian, DECLINATION_CLAMP_DEG, DPI, MILLIS_PER_DAY, MILLIS_PER_HOUR,
    RADEG,
};
use crate::time;

/// Solar geometry at an instant: pure function output, no persistent identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarSituation {
    /// UTC time of day, hours in `[0, 24)`.
    pub local_time: Hour,
    /// Solar declination, radians, clamped to ±89.9°.
    pub declination: Radian,
    /// Equation of time, hours.
    pub equation: Hour,
}

/// Non-negative fractional part, so harmonic arguments never flip sign.
fn frac(value: f64) -> f64 {
    value.rem_euclid(1.0)
}

/// Compute the solar situation for an instant.
///
/// Steps:
/// 1. Julian day fraction `J = 1 + ms/86400000 − (year − 1970)·365.25`.
/// 2. `local_time = (ms mod 86400000)/3600000`.
/// 3. Declination from 1st–3rd harmonics of `2π·frac((J−1)/365)`, clamped.
/// 4. Equation of time (seconds → hours) from 1st–4th harmonics of
///    `2π/360·((279.134 + 0.985647·J) mod 360)`.
///
/// All `frac`/`mod` reductions return non-negative remainders.
///
/// Arguments
/// -----------------
/// * `now`: Instant in Unix epoch seconds (UTC).
///
/// Return
/// ----------
/// * The [`SolarSituation`] at `now`.
pub fn situation(now: EpochSeconds) -> SolarSituation {
    let millis = now * 1000.0;
    let year = time::year_of(now);

    let julian_day = 1.0 + millis / MILLIS_PER_DAY - f64::from(year - 1970) * 365.25;
    let local_time = millis.rem_euclid(MILLIS_PER_DAY) / MILLIS_PER_HOUR;

    let t = DPI * frac((julian_day - 1.0) / 365.0);
    let declination_deg = 0.396372 - 22.91327 * t.cos() + 4.02543 * t.sin()
        - 0.387205 * (2.0 * t).cos()
        + 0.051967 * (2.0 * t).sin()
        - 0.154527 * (3.0 * t).cos()
        + 0.084798 * (3.0 * t).sin();
    let declination =
        declination_deg.clamp(-DECLINATION_CLAMP_DEG, DECLINATION_CLAMP_DEG) * RADEG;

    let t2 = RADEG * (279.134 + 0.985647 * julian_day).rem_euclid(360.0);
    let equation_seconds = 5.0323 - 100.976 * t2.sin()
        + 595.275 * (2.0 * t2).sin()
        + 3.6858 * (3.0 * t2).sin()
        - 12.47 * (4.0 * t2).sin()
        - 430.847 * t2.cos()
        + 12.5024 * (2.0 * t2).cos()
        + 18.25 * (3.0 * t2).cos();
    let equation = equation_seconds / 3600.0;

    SolarSituation {
        local_time,
        declination,
        equation,
    }
}

#[cfg(test)]
mod solar_tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 2017-08-21 17:58:51.2 UTC, the 2017 eclipse reference epoch.
    const ECLIPSE_2017: f64 = 1503338331.2;

    #[test]
    fn test_local_time_of_day() {
        let situation = situation(ECLIPSE_2017);
        // 64731.2 s past midnight.
        assert_relative_eq!(situation.local_time, 17.980888888888888, epsilon = 1e-9);
    }

    #[test]
    fn test_declination_late_august() {
        let situation = situation(ECLIPSE_2017);
        let declination_deg = situation.declination / RADEG;
        // True declination is ≈ +11.9°; the truncated series lands within a
        // fraction of a degree of it.
        assert!(
            (11.0..13.0).contains(&declination_deg),
            "declination {declination_deg}° out of late-August range"
        );
    }

    #[test]
    fn test_declination_solstices() {
        // 2020-06-21 and 2020-12-14 reference epochs.
        let june = situation(1592719130.6).declination / RADEG;
        let december = situation(1607961530.6).declination / RADEG;
        assert!(june > 20.0, "June declination {june}° should be strongly north");
        assert!(
            december < -20.0,
            "December declination {december}° should be strongly south"
        );
    }

    #[test]
    fn test_equation_of_time_bounds() {
        // The equation of time never exceeds ±17 minutes; sample across a year.
        for day in 0..365 {
            let now = 1672531200.0 + f64::from(day) * 86400.0;
            let equation = situation(now).equation;
            assert!(
                equation.abs() < 17.0 / 60.0,
                "day {day}: equation {equation} h out of physical range"
            );
        }
    }

    #[test]
    fn test_equation_of_time_late_august_sign() {
        // Late August: apparent sun runs ≈ 3 minutes behind the mean sun.
        let equation = situation(ECLIPSE_2017).equation;
        assert!(
            (-0.12..0.0).contains(&equation),
            "equation {equation} h should be slightly negative"
        );
    }

    #[test]
    fn test_declination_clamped_and_reduced() {
        // Negative instants exercise the non-negative remainder policy.
        let situation = situation(-1.0e9);
        assert!(situation.declination.abs() <= DECLINATION_CLAMP_DEG * RADEG);
        assert!((0.0..24.0).contains(&situation.local_time));
    }
}
