//! Obscuration Function.
//!
//! Pure per-sample combination of the eclipse shadow geometry and the solar
//! altitude into a single overlay opacity, plus the optional city-light
//! luminance. Two opacity channels exist: the **base** obscuration `obs`
//! (scaled by the configured obscure factor) and the **override** channel
//! used for the umbral full shadow, which bypasses the linear falloff. The
//! final opacity is `max(override, factor·obs)`, clamped to `[0, 1]`.
//!
//! Numeric policy: the `asin` argument is clamped to `[−1, 1]` before use —
//! floating-point drift near the poles must never reach the domain boundary.

use crate::constants::{
    Radian, CITY_LIGHTS_FLOOR, CITY_LIGHTS_THRESHOLD, RADEG, SIDEREAL_RATE, TWILIGHT_BAND_RAD,
    UMBRA_RAMP_CUTOFF,
};
use crate::eclipse::InterpolatedElements;
use crate::grid::GeoSample;
use crate::solar::SolarSituation;

/// Result of one obscuration evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obscuration {
    /// Overlay opacity in `[0, 1]`.
    pub opacity: f64,
    /// City-light luminance, present only deep inside the night side when
    /// city lights are enabled and a night-raster sample was available.
    pub city_light: Option<f64>,
}

/// Eclipse shadow term for one sample.
///
/// Projects the sample onto the fundamental plane, measures its distance `d`
/// from the shadow axis against the local penumbral/umbral radii
/// `L1 = l1 − Z·tanf1`, `L2 = l2 − Z·tanf2`, and returns
/// `(base obscuration, override opacity)`. Inside the umbra (`d < |L2|`) the
/// distance is pinned to `|L2|` and the override saturates at 1; above the
/// 0.95 cutoff the override ramps linearly up to 1 so the umbra edge meets
/// the penumbral falloff without a seam. The cutoff and ramp are hand-tuned
/// for this obscuration range.
fn eclipse_term(elements: &InterpolatedElements, lat: Radian, lng_deg: f64) -> (f64, f64) {
    let declination = elements.d * RADEG;
    let hour_angle =
        (elements.mu + lng_deg + SIDEREAL_RATE * 15.0 * elements.deltat / 3600.0) * RADEG;

    // Unit shadow-cone coordinates of the sample.
    let x = lat.cos() * hour_angle.sin();
    let y = lat.sin() * declination.cos() - lat.cos() * hour_angle.cos() * declination.sin();
    let z = lat.sin() * declination.sin() + lat.cos() * hour_angle.cos() * declination.cos();

    let dx = elements.x - x;
    let dy = elements.y - y;
    let mut distance = (dx * dx + dy * dy).sqrt();

    let l1 = elements.l1 - z * elements.tanf1;
    let l2 = elements.l2 - z * elements.tanf2;

    if distance >= l1 {
        return (0.0, 0.0);
    }

    let mut override_obs: f64 = 0.0;
    if distance < l2.abs() {
        // Total shadow: full opacity, bypassing the linear falloff.
        distance = l2.abs();
        override_obs = 1.0;
    }
    let obs = (l1 - distance) / (l1 + l2);
    if obs > UMBRA_RAMP_CUTOFF {
        let ramp = (obs - UMBRA_RAMP_CUTOFF) / (1.0 - UMBRA_RAMP_CUTOFF);
        override_obs = override_obs.max(ramp);
    }
    (obs, override_obs)
}

/// Solar altitude of a sample, radians.
///
/// Longitude contributes `4 min/deg` to the solar time; the resulting hour
/// angle and the situation's declination give `sin(alt)`, clamped before
/// `asin`.
fn solar_altitude(situation: &SolarSituation, lat: Radian, lng_deg: f64) -> Radian {
    let difference = lng_deg * 4.0 / 60.0;
    let solar_time = situation.local_time + situation.equation + difference;
    let hour_angle = (15.0 * (solar_time - 12.0)) * RADEG;

    let sin_altitude = (situation.declination.sin() * lat.sin()
        + situation.declination.cos() * lat.cos() * hour_angle.cos())
    .clamp(-1.0, 1.0);
    sin_altitude.asin()
}

/// Night opacity as a continuous function of solar altitude: 0 above the
/// civil-twilight band, 1 below it, linear inside `±0.018` rad.
fn twilight_blend(altitude: Radian) -> f64 {
    if altitude >= TWILIGHT_BAND_RAD {
        0.0
    } else if altitude <= -TWILIGHT_BAND_RAD {
        1.0
    } else {
        (TWILIGHT_BAND_RAD - altitude) / (2.0 * TWILIGHT_BAND_RAD)
    }
}

/// Evaluate the obscuration for one geographic sample.
///
/// The eclipse term only runs when `elements.deltat > 0`; the solar-altitude
/// term always runs, and on the night side (altitude below 0) the eclipse
/// override is dropped — darkness already dominates there, and the umbra must
/// not render darker than the configured night opacity.
///
/// Arguments
/// -----------------
/// * `elements`: Interpolated shadow geometry (possibly the disabled sentinel).
/// * `situation`: Solar geometry at the same instant.
/// * `sample`: Geographic sample to evaluate.
/// * `obscure_factor`: Configured maximum night opacity in `[0, 1]`.
/// * `city_lights_enabled`: Whether to compute the city-light channel.
/// * `night_sample`: Night-raster RGB at the sample, each channel in `[0, 1]`,
///   if the composite raster is loaded.
///
/// Return
/// ----------
/// * The [`Obscuration`] for the sample.
pub fn obscuration(
    elements: &InterpolatedElements,
    situation: &SolarSituation,
    sample: &GeoSample,
    obscure_factor: f64,
    city_lights_enabled: bool,
    night_sample: Option<[f64; 3]>,
) -> Obscuration {
    let lat = sample.lat * RADEG;

    let (mut obs, mut override_obs) = if elements.eclipse_active() {
        eclipse_term(elements, lat, sample.lng)
    } else {
        (0.0, 0.0)
    };

    let altitude = solar_altitude(situation, lat, sample.lng);
    obs = obs.max(twilight_blend(altitude));
    if altitude < 0.0 {
        override_obs = 0.0;
    }

    let opacity = override_obs.max(obscure_factor * obs).clamp(0.0, 1.0);

    let city_light = if city_lights_enabled && obs > CITY_LIGHTS_THRESHOLD {
        night_sample.map(|rgb| {
            let average = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
            let ramp = (obs - CITY_LIGHTS_THRESHOLD) / (1.0 - CITY_LIGHTS_THRESHOLD);
            (ramp * (average - CITY_LIGHTS_FLOOR)).max(0.0)
        })
    } else {
        None
    };

    Obscuration {
        opacity,
        city_light,
    }
}

#[cfg(test)]
mod obscuration_tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn sample(lat: f64, lng: f64) -> GeoSample {
        GeoSample {
            lat,
            lng,
            world: Vector2::zeros(),
        }
    }

    /// Situation with the sun on the equator and no equation-of-time offset:
    /// altitude at `(0, 0)` is controlled purely by `local_time`.
    fn equatorial_situation(local_time: f64) -> SolarSituation {
        SolarSituation {
            local_time,
            declination: 0.0,
            equation: 0.0,
        }
    }

    #[test]
    fn test_midpoint_of_twilight_blend() {
        // Sun exactly on the horizon: hour angle 90°, altitude 0.
        let situation = equatorial_situation(18.0);
        let result = obscuration(
            &InterpolatedElements::disabled(),
            &situation,
            &sample(0.0, 0.0),
            1.0,
            false,
            None,
        );
        assert_relative_eq!(result.opacity, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_twilight_blend_continuity() {
        let band = TWILIGHT_BAND_RAD;
        assert_relative_eq!(twilight_blend(band), 0.0);
        assert_relative_eq!(twilight_blend(band - 1e-12), 0.0, epsilon = 1e-9);
        assert_relative_eq!(twilight_blend(-band), 1.0);
        assert_relative_eq!(twilight_blend(-band + 1e-12), 1.0, epsilon = 1e-9);
        assert_relative_eq!(twilight_blend(0.0), 0.5);
        // Strictly decreasing inside the band.
        assert!(twilight_blend(-0.01) > twilight_blend(0.01));
    }

    #[test]
    fn test_full_day_and_full_night() {
        let noon = equatorial_situation(12.0);
        let midnight = equatorial_situation(0.0);
        let elements = InterpolatedElements::disabled();
        let day = obscuration(&elements, &noon, &sample(0.0, 0.0), 0.8, false, None);
        let night = obscuration(&elements, &midnight, &sample(0.0, 0.0), 0.8, false, None);
        assert_eq!(day.opacity, 0.0);
        assert_relative_eq!(night.opacity, 0.8, epsilon = 1e-12);
    }

    /// Synthetic elements whose shadow axis sits over `(lat 0, lng 0)`:
    /// with `mu + correction = 0` the sample projects to `X = 0, Y = 0`.
    fn axis_overhead_elements() -> InterpolatedElements {
        InterpolatedElements {
            x: 0.0,
            y: 0.0,
            d: 0.0,
            l1: 0.54,
            l2: -0.004,
            mu: -1.002738 * 15.0 * 3600.0 / 3600.0,
            deltat: 3600.0,
            tanf1: 0.0046,
            tanf2: 0.0046,
        }
    }

    #[test]
    fn test_total_shadow_overrides_falloff() {
        let elements = axis_overhead_elements();
        // Noon at (0, 0): eclipse during full daylight.
        let situation = equatorial_situation(12.0);
        let result = obscuration(&elements, &situation, &sample(0.0, 0.0), 0.7, false, None);
        assert_eq!(result.opacity, 1.0, "umbra center is full shadow");
    }

    #[test]
    fn test_penumbra_monotone_in_distance() {
        let elements = axis_overhead_elements();
        let situation = equatorial_situation(12.0);
        // Walk east from the axis: distance from the shadow axis grows with
        // longitude, obscuration must never increase.
        let mut previous = f64::INFINITY;
        for step in 1..=20 {
            let lng = f64::from(step) * 1.5;
            let result =
                obscuration(&elements, &situation, &sample(0.0, lng), 1.0, false, None);
            assert!(
                result.opacity <= previous + 1e-12,
                "opacity increased moving away from the axis at lng {lng}"
            );
            previous = result.opacity;
        }
    }

    #[test]
    fn test_umbra_edge_ramp_beats_scaled_falloff() {
        let elements = axis_overhead_elements();
        let situation = equatorial_situation(12.0);
        // Just outside the umbra (distance 0.0100 vs |L2| = 0.0086): the base
        // obscuration is ≈ 0.99734, past the 0.95 cutoff, so the override ramp
        // (obs − 0.95)/0.05 ≈ 0.94682 sets the opacity — well above the scaled
        // falloff 0.6·obs ≈ 0.59840 that would apply without the ramp.
        let result = obscuration(&elements, &situation, &sample(0.0, 0.573), 0.6, false, None);
        assert_relative_eq!(result.opacity, 0.9468186, epsilon = 1e-4);
        assert!(
            result.opacity > 0.6,
            "ramp must exceed anything the obscure factor can produce, got {}",
            result.opacity
        );
        assert!(
            result.opacity < 1.0,
            "outside the umbra the ramp stays below full shadow, got {}",
            result.opacity
        );
    }

    #[test]
    fn test_override_dropped_on_night_side() {
        let elements = axis_overhead_elements();
        // Same geometry, but local midnight: the umbra must not render darker
        // than the configured night opacity.
        let situation = equatorial_situation(0.0);
        let result = obscuration(&elements, &situation, &sample(0.0, 0.0), 0.6, false, None);
        assert_relative_eq!(result.opacity, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_city_lights_ramp() {
        let elements = InterpolatedElements::disabled();
        let midnight = equatorial_situation(0.0);
        let lit = obscuration(
            &elements,
            &midnight,
            &sample(0.0, 0.0),
            1.0,
            true,
            Some([0.6, 0.6, 0.6]),
        );
        // obs = 1.0 → full ramp, luminance = avg − 0.1.
        let luminance = lit.city_light.expect("night sample should produce a luminance");
        assert_relative_eq!(luminance, 0.5, epsilon = 1e-12);

        // Dark raster sample floors at zero.
        let dark = obscuration(
            &elements,
            &midnight,
            &sample(0.0, 0.0),
            1.0,
            true,
            Some([0.05, 0.05, 0.05]),
        );
        assert_eq!(dark.city_light, Some(0.0));

        // Daylight or disabled: no channel at all.
        let noon = equatorial_situation(12.0);
        let day = obscuration(
            &elements,
            &noon,
            &sample(0.0, 0.0),
            1.0,
            true,
            Some([0.6, 0.6, 0.6]),
        );
        assert_eq!(day.city_light, None);
        let disabled = obscuration(
            &elements,
            &midnight,
            &sample(0.0, 0.0),
            1.0,
            false,
            Some([0.6, 0.6, 0.6]),
        );
        assert_eq!(disabled.city_light, None);
    }

    #[test]
    fn test_city_lights_mid_ramp_luminance() {
        let elements = InterpolatedElements::disabled();
        // Sun at altitude −0.9·band just after sunset at (0, 0): the twilight
        // blend is exactly 0.95, halfway up the city-light ramp.
        let local_time = 18.0 + 0.9 * TWILIGHT_BAND_RAD * 12.0 / std::f64::consts::PI;
        let situation = equatorial_situation(local_time);
        let result = obscuration(
            &elements,
            &situation,
            &sample(0.0, 0.0),
            1.0,
            true,
            Some([0.6, 0.6, 0.6]),
        );
        // ramp = (0.95 − 0.90)/0.10 = 0.5, luminance = 0.5·(avg − 0.1).
        let luminance = result.city_light.expect("dusk sample should produce a luminance");
        assert_relative_eq!(luminance, 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_asin_argument_clamped_at_pole() {
        // Declination clamp keeps sin/cos finite; a polar sample with the sun
        // overhead pushes sin(alt) to the domain edge.
        let situation = SolarSituation {
            local_time: 12.0,
            declination: 89.9 * RADEG,
            equation: 0.0,
        };
        let result = obscuration(
            &InterpolatedElements::disabled(),
            &situation,
            &sample(90.0, 0.0),
            1.0,
            false,
            None,
        );
        assert!(result.opacity.is_finite());
        assert_eq!(result.opacity, 0.0, "polar day under overhead sun");
    }
}
