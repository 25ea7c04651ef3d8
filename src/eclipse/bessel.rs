//! Cubic evaluation of Besselian elements at an instant.
//!
//! Mirrors the classical procedure: every polynomial field of the selected
//! dataset is a cubic in `Δt = (now − t0)/3600` hours, the constants pass
//! through unchanged, and the ±4 h window check afterwards decides whether
//! the result is usable at all. An unusable (or absent) dataset is encoded as
//! `deltat = −1`, the single sentinel the obscuration stage looks at.

use crate::constants::{Degree, EpochSeconds, DATASET_WINDOW_SECONDS, SECONDS_PER_HOUR};
use crate::eclipse::dataset::{select, EclipseDataset};

/// Instantaneous shadow-geometry elements, one scalar per polynomial field.
///
/// Recomputed on every evaluation; `deltat <= 0` means the eclipse term is
/// disabled and the remaining fields must not be trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedElements {
    /// Shadow-axis unit-vector component `x`.
    pub x: f64,
    /// Shadow-axis unit-vector component `y`.
    pub y: f64,
    /// Shadow-axis declination (degrees).
    pub d: Degree,
    /// Penumbral radius on the fundamental plane.
    pub l1: f64,
    /// Umbral radius on the fundamental plane.
    pub l2: f64,
    /// Shadow hour angle (degrees).
    pub mu: Degree,
    /// ΔT correction (seconds); `−1` disables the eclipse term.
    pub deltat: f64,
    /// Tangent of the penumbral cone half-angle.
    pub tanf1: f64,
    /// Tangent of the umbral cone half-angle.
    pub tanf2: f64,
}

impl InterpolatedElements {
    /// The "no eclipse geometry applies" state.
    pub fn disabled() -> Self {
        InterpolatedElements {
            x: 0.0,
            y: 0.0,
            d: 0.0,
            l1: 0.0,
            l2: 0.0,
            mu: 0.0,
            deltat: -1.0,
            tanf1: 0.0,
            tanf2: 0.0,
        }
    }

    /// Whether the eclipse term should be evaluated at all.
    pub fn eclipse_active(&self) -> bool {
        self.deltat > 0.0
    }
}

/// `c0 + c1·Δt + c2·Δt² + c3·Δt³`, evaluated in Horner form.
fn cubic(coefficients: &[f64; 4], dt: f64) -> f64 {
    coefficients[0] + dt * (coefficients[1] + dt * (coefficients[2] + dt * coefficients[3]))
}

impl EclipseDataset {
    /// Evaluate this dataset's cubics at an instant.
    ///
    /// `Δt = (now − t0)/3600` hours; non-polynomial fields pass through
    /// unchanged. At `now == t0` each field is exactly its constant
    /// coefficient. No window check is applied here — callers wanting the
    /// checked path use [`elements_for`].
    ///
    /// Arguments
    /// -----------------
    /// * `now`: Instant in Unix epoch seconds.
    ///
    /// Return
    /// ----------
    /// * The [`InterpolatedElements`] at `now`.
    pub fn evaluate(&self, now: EpochSeconds) -> InterpolatedElements {
        let dt = (now - self.t0) / SECONDS_PER_HOUR;
        InterpolatedElements {
            x: cubic(&self.x, dt),
            y: cubic(&self.y, dt),
            d: cubic(&self.d, dt),
            l1: cubic(&self.l1, dt),
            l2: cubic(&self.l2, dt),
            mu: cubic(&self.mu, dt),
            deltat: self.deltat,
            tanf1: self.tanf1,
            tanf2: self.tanf2,
        }
    }
}

/// Select and evaluate the applicable dataset, with window check.
///
/// This is the per-tick entry point: it runs the Dataset Selector, evaluates
/// the cubics, and overwrites `deltat` with `−1` whenever `|now − t0| > 4 h`
/// — the mechanism by which stale or absent datasets disable the
/// umbra/penumbra term without the obscuration stage needing any dataset
/// awareness.
///
/// Arguments
/// -----------------
/// * `datasets`: Table ordered by strictly increasing `t0`.
/// * `now`: Instant in Unix epoch seconds.
///
/// Return
/// ----------
/// * Usable [`InterpolatedElements`], or the disabled sentinel.
pub fn elements_for(datasets: &[EclipseDataset], now: EpochSeconds) -> InterpolatedElements {
    match select(datasets, now) {
        Some(dataset) => {
            let mut elements = dataset.evaluate(now);
            if (now - dataset.t0).abs() > DATASET_WINDOW_SECONDS {
                elements.deltat = -1.0;
            }
            elements
        }
        None => InterpolatedElements::disabled(),
    }
}
