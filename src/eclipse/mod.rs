//! Besselian eclipse geometry: dataset table, selector and interpolator.
//!
//! An eclipse is described here the classical way, by **Besselian elements**:
//! low-order polynomials in time for the shadow-axis position (`x`, `y`), the
//! shadow-axis declination (`d`), the penumbral/umbral radii (`l1`, `l2`) and
//! the shadow hour angle (`mu`), plus the cone-angle tangents (`tanf1`,
//! `tanf2`) and the ΔT correction carried as constants. Each coefficient set
//! is tagged with a reference epoch `t0` and is only trusted inside a ±4 h
//! window around it.
//!
//! The flow per clock tick is: [`select`](dataset::select) picks the
//! applicable [`EclipseDataset`](dataset::EclipseDataset) for the instant,
//! [`elements_for`](bessel::elements_for) evaluates its cubics at
//! `Δt = (now − t0)/3600` hours and applies the window check, yielding
//! [`InterpolatedElements`](bessel::InterpolatedElements) — with
//! `deltat = −1` as the defined "no eclipse geometry applies" state that
//! downstream obscuration reads without any dataset awareness.

pub mod bessel;
pub mod dataset;

pub use bessel::{elements_for, InterpolatedElements};
pub use dataset::{builtin_datasets, select, EclipseDataset};
